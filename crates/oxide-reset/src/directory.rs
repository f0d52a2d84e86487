//! User directory seam.

use crate::error::Result;

/// Where user credentials live.
///
/// [`crate::ResetTokens::reset_password`] only ever hands over an Argon2id
/// PHC string, never the plain password.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    /// Replaces the stored password hash of `user_id`.
    ///
    /// Failures should be reported as [`crate::ResetError::Directory`].
    async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()>;
}
