//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `orgdir_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("orgdir_core version={}", orgdir_core::core_version());
    println!(
        "orgdir_core user_levels={}",
        orgdir_core::access::supported_user_level_strings().join(",")
    );
}
