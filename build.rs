// SPDX-License-Identifier: MPL-2.0
//! Build script for the baked-in signing fingerprint.
//!
//! The expected fingerprint is read from `SELFCHECK_SIGNING_FINGERPRINT` at
//! compile time. A malformed value fails the build instead of producing a
//! binary whose integrity check can never pass.

const FINGERPRINT_ENV: &str = "SELFCHECK_SIGNING_FINGERPRINT";

fn main() {
    println!("cargo:rerun-if-env-changed={FINGERPRINT_ENV}");

    if let Ok(value) = std::env::var(FINGERPRINT_ENV) {
        let valid_len = value.len() == 40 || value.len() == 64;
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !(valid_len && valid_chars) {
            panic!(
                "{FINGERPRINT_ENV} must be 40 or 64 lowercase hex characters, got {:?}",
                value
            );
        }
    }
}
