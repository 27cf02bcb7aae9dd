// SPDX-License-Identifier: MPL-2.0
//! Presenter port definition.

use crate::domain::diagnostics::ShareRequest;
use crate::error::Result;

/// Displays or forwards a composed report (share sheet, mail draft, stdout).
///
/// Implementations may be UI-affine, so this trait is not `Send`; the
/// collector only calls it from the thread that owns it.
pub trait Presenter {
    /// Hands `request` to the user.
    ///
    /// # Errors
    ///
    /// Returns `Error::PresentationFailure` when no handler is available or
    /// the output cannot be written.
    fn present(&mut self, request: &ShareRequest) -> Result<()>;
}
