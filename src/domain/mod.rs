// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core types with ZERO external dependencies.
//!
//! This module contains pure value objects and business rules. It depends on
//! `std` only, so everything here is testable without adapters.
//!
//! # Modules
//!
//! - [`diagnostics`]: Report building blocks ([`AppIdentity`](diagnostics::AppIdentity),
//!   [`PlatformInfo`](diagnostics::PlatformInfo), [`AuxiliaryFlags`](diagnostics::AuxiliaryFlags))
//!   and deadline newtypes ([`ReadTimeout`](diagnostics::ReadTimeout),
//!   [`MetadataTimeout`](diagnostics::MetadataTimeout))
//! - [`integrity`]: Build identity ([`Fingerprint`](integrity::Fingerprint),
//!   [`FingerprintAlgorithm`](integrity::FingerprintAlgorithm))

pub mod diagnostics;
pub mod integrity;
