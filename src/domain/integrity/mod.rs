// SPDX-License-Identifier: MPL-2.0
//! Build-identity fingerprint types.
//!
//! A [`Fingerprint`] is the lowercase hexadecimal rendering of a digest over
//! the signing certificate. Hashing itself lives in [`crate::integrity`]; this
//! module only knows how a well-formed fingerprint looks.

use std::fmt;
use std::str::FromStr;

/// Digest algorithm used to fingerprint the signing certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintAlgorithm {
    /// 160-bit SHA-1, 40 hex characters.
    #[default]
    Sha1,
    /// 256-bit SHA-256, 64 hex characters.
    Sha256,
}

impl FingerprintAlgorithm {
    /// Digest length in bytes.
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Length of the hex rendering.
    #[must_use]
    pub fn hex_len(self) -> usize {
        self.digest_len() * 2
    }

    /// Algorithm whose hex rendering has `len` characters.
    #[must_use]
    pub fn for_hex_len(len: usize) -> Option<Self> {
        [Self::Sha1, Self::Sha256]
            .into_iter()
            .find(|algorithm| algorithm.hex_len() == len)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
        }
    }
}

/// Returned when an algorithm name is not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported digest algorithm: {}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for FingerprintAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Reasons a string is not a well-formed fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Length matches no supported digest.
    InvalidLength(usize),
    /// Contains something other than `[0-9a-f]`.
    InvalidCharacter(char),
}

impl fmt::Display for FingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => {
                write!(f, "fingerprint must be 40 or 64 hex characters, got {len}")
            }
            Self::InvalidCharacter(c) => {
                write!(f, "fingerprint contains non lowercase-hex character {c:?}")
            }
        }
    }
}

impl std::error::Error for FingerprintError {}

/// Lowercase hex digest of a signing certificate.
///
/// Equality is exact: no case folding and no whitespace tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Renders raw digest bytes, two lowercase hex characters per byte.
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parses an expected fingerprint, rejecting anything not 40/64 lowercase hex.
    pub fn parse(value: &str) -> Result<Self, FingerprintError> {
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_digit() || ('a'..='f').contains(c)))
        {
            return Err(FingerprintError::InvalidCharacter(bad));
        }
        let len = value.len();
        if len != FingerprintAlgorithm::Sha1.hex_len()
            && len != FingerprintAlgorithm::Sha256.hex_len()
        {
            return Err(FingerprintError::InvalidLength(len));
        }
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against an untrusted expected value.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.0 == expected
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
