// SPDX-License-Identifier: MPL-2.0
//! Diagnostics domain types.
//!
//! This module provides pure domain types for the support report:
//! - [`AppIdentity`], [`PlatformInfo`], [`AuxiliaryFlags`]: report building blocks
//! - [`ShareRequest`]: what the presenter is handed
//! - [`ReadTimeout`], [`MetadataTimeout`]: deadlines for blocking collection steps

mod newtypes;
mod types;

pub use newtypes::{metadata_timeout_bounds, read_timeout_bounds, MetadataTimeout, ReadTimeout};
pub use types::{
    AppIdentity, AuxiliaryFlag, AuxiliaryFlags, PlatformInfo, ShareRequest,
    UNKNOWN_PROPERTY,
};
