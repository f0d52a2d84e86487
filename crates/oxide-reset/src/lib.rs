//! Password reset tokens on top of `oxide-table`.
//!
//! A reset entry ties a random token to a user and stays valid for a window
//! (two hours by default). Entries older than the window are invisible to
//! lookups and are removed by [`ResetTokens::clean_up`], which is meant to be
//! run on a schedule (see the `reset-tokens clean-up` command).
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_reset::ResetTokens;
//! use oxide_table::SqliteStore;
//!
//! let store = SqliteStore::connect("sqlite:db.sqlite3").await?.with_prefix("wp_");
//! let tokens = ResetTokens::new(store).await?;
//!
//! let request = tokens.issue("alice@example.com").await?;
//! // ... deliver request.token to the user ...
//!
//! if let Some(entry) = tokens.get(&request.token).await? {
//!     tokens.reset_password(entry.id, "n3w-secret", &directory).await?;
//! }
//! ```

pub mod directory;
pub mod error;
pub mod password;
pub mod tokens;

pub use directory::UserDirectory;
pub use error::{ResetError, Result};
pub use tokens::{ResetEntry, ResetRequest, ResetTokens};
