#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Project policy tests for the snake stream client.
//!
//! These tests read the manifest and library sources and check that they
//! still conform to project policy. If any test fails, the project has
//! drifted from the agreed-upon standards.
//!
//! All checks are synchronous filesystem reads; no network access or async
//! runtime needed.

use std::path::{Path, PathBuf};

/// Returns the project root directory (where Cargo.toml lives).
fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Reads a file relative to the project root and returns its contents.
fn read_project_file(relative_path: &str) -> String {
    let path = project_root().join(relative_path);
    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to read '{}': {}. This file is required by project policy.",
            path.display(),
            e
        )
    })
}

/// Collects every `.rs` file under `dir`, recursively.
fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: panic_policy
// ─────────────────────────────────────────────────────────────────────────────

mod panic_policy {
    use super::*;

    const REQUIRED_DENY_LINTS: &[&str] = &[
        "unwrap_used",
        "expect_used",
        "panic",
        "todo",
        "unimplemented",
        "indexing_slicing",
    ];

    #[test]
    fn cargo_toml_has_all_panic_free_lints() {
        let cargo = read_project_file("Cargo.toml");

        for lint in REQUIRED_DENY_LINTS {
            let pattern = format!("{lint} = \"deny\"");
            assert!(
                cargo.contains(&pattern),
                "Cargo.toml is missing `{pattern}` in [lints.clippy]. \
                 All panic-prone lints must be set to deny level so that no \
                 event handler can take the client down."
            );
        }
    }

    #[test]
    fn cargo_toml_has_lints_clippy_section() {
        let cargo = read_project_file("Cargo.toml");
        assert!(
            cargo.contains("[lints.clippy]"),
            "Cargo.toml is missing [lints.clippy] section."
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: lifecycle_policy
// ─────────────────────────────────────────────────────────────────────────────

mod lifecycle_policy {
    use super::*;

    /// The client must never retry or time out on its own: recovery is always
    /// an explicit player action.
    #[test]
    fn library_uses_no_timers() {
        for file in rust_sources(&project_root().join("src")) {
            let contents = std::fs::read_to_string(&file).unwrap();
            for forbidden in ["tokio::time", "std::thread::sleep", "interval("] {
                assert!(
                    !contents.contains(forbidden),
                    "{} uses `{forbidden}`. The library must not schedule \
                     reconnects or enforce timeouts.",
                    file.display()
                );
            }
        }
    }

    #[test]
    fn websocket_transport_is_default_feature() {
        let cargo = read_project_file("Cargo.toml");
        assert!(
            cargo.contains("default = [\"transport-websocket\"]"),
            "The WebSocket transport must stay enabled by default."
        );
    }
}
