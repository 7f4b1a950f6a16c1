//! Integration Test: Overlay Registry Ownership
//!
//! **Policy**: the overlay controller is the only writer of the registry.
//! Snapshot mutators are crate-private, so other crates cannot reach them;
//! this test keeps the rest of the core crate honest as well.

use std::path::Path;

use architectural_enforcement::{report, scan};

const REGISTRY_MUTATORS: &[&str] = &["snapshot.register(", ".set_open(", "snapshot.clear()"];

fn is_registry_owner(path: &Path) -> bool {
    path.ends_with("overlay/controller.rs") || path.ends_with("overlay/registry.rs")
}

#[test]
fn test_only_controller_mutates_registry() {
    let mut violations = scan("room/core/src", |path, code| {
        !is_registry_owner(path) && REGISTRY_MUTATORS.iter().any(|m| code.contains(m))
    });
    violations.extend(scan("tui/src", |_, code| {
        REGISTRY_MUTATORS.iter().any(|m| code.contains(m))
    }));

    report("overlay registry mutated outside the controller", &violations);
}

#[test]
fn test_surface_does_not_build_snapshots() {
    // The surface only reads snapshots it receives from the controller
    let violations = scan("tui/src", |_, code| code.contains("OverlaySnapshot::empty()"));

    report("terminal surface constructs its own overlay snapshot", &violations);
}
