//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: session code runs on the tokio runtime and MUST NOT use
//! blocking I/O.
//! **Required**: `tokio::fs` for the token file, `reqwest` async client for
//! HTTP.
//!
//! Configuration loading is exempt: it runs once, before the runtime starts
//! doing anything else.

use architectural_enforcement::{report, scan};

const BLOCKING_FS: &[&str] = &["std::fs::", "use std::fs", "File::open(", "File::create("];

#[test]
fn test_no_blocking_fs_in_session_code() {
    let violations = scan("room/core/src/session", |_, code| {
        BLOCKING_FS.iter().any(|pattern| code.contains(pattern))
    });

    report("blocking file I/O in session code (use tokio::fs)", &violations);
}

#[test]
fn test_no_blocking_http_client() {
    let mut violations = scan("room/core/src", |_, code| code.contains("reqwest::blocking"));
    violations.extend(scan("tui/src", |_, code| code.contains("reqwest::blocking")));

    report("blocking HTTP client (use async reqwest)", &violations);
}

#[test]
fn test_no_sleep_in_core() {
    // Transitions are time-based in the surface; the core never waits
    let violations = scan("room/core/src", |_, code| {
        code.contains("thread::sleep") || code.contains("time::sleep(")
    });

    report("sleep in core production code", &violations);
}
