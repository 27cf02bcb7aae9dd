// SPDX-License-Identifier: MPL-2.0
//! Build integrity verification.
//!
//! Confirms that the running build was signed with the expected certificate
//! by comparing a digest of the certificate bytes against a fingerprint baked
//! in at build time. Used to detect repackaged builds before enabling
//! sensitive features.
//!
//! The internal result is a [`VerificationOutcome`] so callers and tests can
//! see why a check failed. The public gate, [`verify`], collapses it to a
//! `bool` and is fail-closed: every failure (missing certificate, unknown
//! algorithm, a panicking provider) is logged and yields `false`.


use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::application::port::SigningIdentity;
use crate::crash::catch_contained;
use crate::domain::integrity::{Fingerprint, FingerprintAlgorithm};
use crate::error::Error;
use crate::logging::log_failure;

/// Fingerprint of the release signing certificate, baked in at compile time
/// from `SELFCHECK_SIGNING_FINGERPRINT`. The build script rejects malformed
/// values.
pub const EXPECTED_FINGERPRINT: Option<&str> = option_env!("SELFCHECK_SIGNING_FINGERPRINT");

/// Digests `certificate` and renders it as lowercase hex.
#[must_use]
pub fn compute_fingerprint(algorithm: FingerprintAlgorithm, certificate: &[u8]) -> Fingerprint {
    match algorithm {
        FingerprintAlgorithm::Sha1 => Fingerprint::from_digest(&Sha1::digest(certificate)),
        FingerprintAlgorithm::Sha256 => Fingerprint::from_digest(&Sha256::digest(certificate)),
    }
}

/// Result of comparing the running build against an expected fingerprint.
#[derive(Debug)]
pub enum VerificationOutcome {
    /// Computed fingerprint equals the expected one exactly.
    Verified,
    /// The certificate was read but its fingerprint differs.
    Mismatched {
        /// What the running build actually hashes to.
        computed: Fingerprint,
    },
    /// The comparison could not be made.
    Unavailable(Error),
}

impl VerificationOutcome {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Computes and compares without logging or collapsing the outcome.
pub fn evaluate<P>(
    provider: &P,
    algorithm: FingerprintAlgorithm,
    expected: &str,
) -> VerificationOutcome
where
    P: SigningIdentity + ?Sized,
{
    let certificate = match catch_contained(|| provider.signing_certificate()) {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(err)) => return VerificationOutcome::Unavailable(err.into()),
        Err(message) => {
            return VerificationOutcome::Unavailable(Error::MetadataUnavailable(format!(
                "identity provider panicked: {message}"
            )))
        }
    };

    let computed = compute_fingerprint(algorithm, &certificate);
    if computed.matches(expected) {
        VerificationOutcome::Verified
    } else {
        VerificationOutcome::Mismatched { computed }
    }
}

/// Like [`evaluate`], with the algorithm given by name (`"sha1"`, `"SHA-256"`).
pub fn evaluate_named<P>(provider: &P, algorithm: &str, expected: &str) -> VerificationOutcome
where
    P: SigningIdentity + ?Sized,
{
    match algorithm.parse::<FingerprintAlgorithm>() {
        Ok(algorithm) => evaluate(provider, algorithm, expected),
        Err(err) => VerificationOutcome::Unavailable(Error::DigestAlgorithmUnavailable(err.0)),
    }
}

/// Returns `true` only if the SHA-1 fingerprint of the signing certificate
/// equals `expected` exactly. Never panics and never returns an error.
pub fn verify<P>(provider: &P, expected: &str) -> bool
where
    P: SigningIdentity + ?Sized,
{
    collapse(evaluate(provider, FingerprintAlgorithm::Sha1, expected), expected)
}

/// [`verify`] with a named digest algorithm; unknown names fail closed.
pub fn verify_with<P>(provider: &P, algorithm: &str, expected: &str) -> bool
where
    P: SigningIdentity + ?Sized,
{
    collapse(evaluate_named(provider, algorithm, expected), expected)
}

/// Verifies against [`EXPECTED_FINGERPRINT`]. Builds without a baked-in
/// fingerprint never verify.
pub fn verify_build<P>(provider: &P) -> bool
where
    P: SigningIdentity + ?Sized,
{
    let Some(expected) = EXPECTED_FINGERPRINT else {
        tracing::warn!("no signing fingerprint was baked into this build");
        return false;
    };
    let algorithm = FingerprintAlgorithm::for_hex_len(expected.len()).unwrap_or_default();
    collapse(evaluate(provider, algorithm, expected), expected)
}

fn collapse(outcome: VerificationOutcome, expected: &str) -> bool {
    match outcome {
        VerificationOutcome::Verified => {
            tracing::debug!("signing certificate fingerprint verified");
            true
        }
        VerificationOutcome::Mismatched { computed } => {
            tracing::warn!(%computed, expected, "signing certificate fingerprint mismatch");
            false
        }
        VerificationOutcome::Unavailable(err) => {
            log_failure("signing certificate verification", &err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::PackageError;

    const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    struct Cert(Vec<u8>);

    impl SigningIdentity for Cert {
        fn signing_certificate(&self) -> Result<Vec<u8>, PackageError> {
            Ok(self.0.clone())
        }
    }

    struct Missing;

    impl SigningIdentity for Missing {
        fn signing_certificate(&self) -> Result<Vec<u8>, PackageError> {
            Err(PackageError::NotFound("self".to_string()))
        }
    }

    struct Panicking;

    impl SigningIdentity for Panicking {
        fn signing_certificate(&self) -> Result<Vec<u8>, PackageError> {
            panic!("certificate store exploded")
        }
    }

    #[test]
    fn compute_known_vectors() {
        assert_eq!(
            compute_fingerprint(FingerprintAlgorithm::Sha1, b"abc").as_str(),
            ABC_SHA1
        );
        assert_eq!(
            compute_fingerprint(FingerprintAlgorithm::Sha256, b"abc").as_str(),
            ABC_SHA256
        );
        assert_eq!(
            compute_fingerprint(FingerprintAlgorithm::Sha1, b"").as_str(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn verify_accepts_exact_match() {
        assert!(verify(&Cert(b"abc".to_vec()), ABC_SHA1));
    }

    #[test]
    fn verify_rejects_case_whitespace_and_length_differences() {
        let cert = Cert(b"abc".to_vec());
        assert!(!verify(&cert, &ABC_SHA1.to_uppercase()));
        assert!(!verify(&cert, &format!("{ABC_SHA1}\n")));
        assert!(!verify(&cert, &ABC_SHA1[..39]));
        assert!(!verify(&cert, ""));
    }

    #[test]
    fn mismatch_reports_computed_fingerprint() {
        let outcome = evaluate(&Cert(b"abc".to_vec()), FingerprintAlgorithm::Sha1, &"0".repeat(40));
        match outcome {
            VerificationOutcome::Mismatched { computed } => assert_eq!(computed.as_str(), ABC_SHA1),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_certificate_is_unavailable_and_false() {
        let outcome = evaluate(&Missing, FingerprintAlgorithm::Sha1, ABC_SHA1);
        assert!(matches!(
            outcome,
            VerificationOutcome::Unavailable(Error::MetadataUnavailable(_))
        ));
        assert!(!verify(&Missing, ABC_SHA1));
    }

    #[test]
    fn panicking_provider_fails_closed() {
        let outcome = evaluate(&Panicking, FingerprintAlgorithm::Sha1, ABC_SHA1);
        match outcome {
            VerificationOutcome::Unavailable(Error::MetadataUnavailable(msg)) => {
                assert!(msg.contains("certificate store exploded"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert!(!verify(&Panicking, ABC_SHA1));
    }

    #[test]
    fn unknown_algorithm_fails_closed() {
        let outcome = evaluate_named(&Cert(b"abc".to_vec()), "md5", ABC_SHA1);
        assert!(matches!(
            outcome,
            VerificationOutcome::Unavailable(Error::DigestAlgorithmUnavailable(_))
        ));
        assert!(!verify_with(&Cert(b"abc".to_vec()), "md5", ABC_SHA1));
    }

    #[test]
    fn verify_with_sha256() {
        assert!(verify_with(&Cert(b"abc".to_vec()), "sha256", ABC_SHA256));
        assert!(!verify_with(&Cert(b"abc".to_vec()), "sha256", ABC_SHA1));
    }

    #[test]
    fn verify_build_matches_baked_constant() {
        // Without a baked-in fingerprint nothing verifies.
        if EXPECTED_FINGERPRINT.is_none() {
            assert!(!verify_build(&Cert(b"abc".to_vec())));
        }
    }
}
