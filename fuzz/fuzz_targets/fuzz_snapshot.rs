#![no_main]

use libfuzzer_sys::fuzz_target;
use snake_stream_client::protocol::GameSnapshot;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<GameSnapshot>(data);

    // Frames arrive as text, so also drive the decoder the client uses.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(snapshot) = GameSnapshot::from_frame(s) {
            let _ = snapshot.head();
            let _ = snapshot.is_running();
        }
    }
});
