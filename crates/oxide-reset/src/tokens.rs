//! Password reset token repository.

use chrono::{Duration, NaiveDateTime, Utc};
use oxide_table::value::DATETIME_FORMAT;
use oxide_table::{
    ColumnDef, Data, Filters, LogicalType, Row, Schema, Store, Table, TableError, Value,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::directory::UserDirectory;
use crate::error::{ResetError, Result};
use crate::password::hash_password;

/// Base name of the reset table.
pub const TABLE_NAME: &str = "reset_password";

/// Token generation gives up after this many failed inserts.
pub const MAX_ATTEMPTS: u32 = 5;

/// Default lifetime of a reset entry, in minutes.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 120;

/// Schema of the reset table.
pub fn schema() -> Result<Schema> {
    Ok(Schema::define(
        TABLE_NAME,
        vec![
            ColumnDef::new("id", LogicalType::Int)
                .primary_key()
                .auto_increment(),
            ColumnDef::new("user_id", LogicalType::String),
            ColumnDef::new("token", LogicalType::String).unique(),
            ColumnDef::new("datetime", LogicalType::DateTime)
                .default_expr("CURRENT_TIMESTAMP")
                .on_update("CURRENT_TIMESTAMP"),
        ],
    )?)
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    /// Entry id, used to complete the reset.
    pub id: i64,
    /// 64 hex characters, handed to the user.
    pub token: String,
}

/// A stored reset entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetEntry {
    /// Entry id.
    pub id: i64,
    /// User the token was issued for.
    pub user_id: String,
    /// The 64 character hex token.
    pub token: String,
    /// Creation (or last update) time, UTC.
    pub datetime: NaiveDateTime,
}

impl ResetEntry {
    fn from_row(row: &Row) -> Result<Self> {
        let text = |column: &str| {
            row.get(column)
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .ok_or_else(|| ResetError::Malformed(format!("missing {column}")))
        };

        let id = row
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ResetError::Malformed("missing id".to_string()))?;
        let datetime = NaiveDateTime::parse_from_str(&text("datetime")?, DATETIME_FORMAT)
            .map_err(|e| ResetError::Malformed(format!("datetime: {e}")))?;

        Ok(Self {
            id,
            user_id: text("user_id")?,
            token: text("token")?,
            datetime,
        })
    }
}

/// Password reset entries with a validity window.
///
/// Lookups only see entries younger than the window; [`ResetTokens::clean_up`]
/// removes the rest.
pub struct ResetTokens<S: Store> {
    table: Table<S>,
    validity: Duration,
}

impl<S: Store> ResetTokens<S> {
    /// Opens the reset table on `store`, creating it if needed.
    pub async fn new(store: S) -> Result<Self> {
        Ok(Self {
            table: Table::new(store, schema()?).await?,
            validity: Duration::minutes(DEFAULT_VALIDITY_MINUTES),
        })
    }

    /// Sets the validity window.
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Returns the validity window.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &Table<S> {
        &self.table
    }

    /// Issues a new token for `user_id`.
    ///
    /// # Errors
    ///
    /// [`ResetError::MaxAttempts`] when [`MAX_ATTEMPTS`] inserts all failed.
    pub async fn issue(&self, user_id: &str) -> Result<ResetRequest> {
        for attempt in 1..=MAX_ATTEMPTS {
            let token = generate_token();
            let data = Data::new()
                .set("user_id", user_id)
                .set("token", token.as_str());

            match self.table.insert(&data).await {
                Ok(id) => {
                    info!(user_id = %user_id, id, "Issued password reset token");
                    return Ok(ResetRequest { id, token });
                }
                Err(TableError::Persistence(message)) => {
                    warn!(attempt, error = %message, "Reset token insert failed");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ResetError::MaxAttempts(MAX_ATTEMPTS))
    }

    /// Looks up a valid entry by token.
    pub async fn get(&self, token: &str) -> Result<Option<ResetEntry>> {
        self.find_valid(Filters::new().eq("token", token)).await
    }

    /// Looks up the most relevant valid entry of a user.
    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<ResetEntry>> {
        self.find_valid(Filters::new().eq("user_id", user_id)).await
    }

    /// Looks up a valid entry by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ResetEntry>> {
        self.find_valid(Filters::new().eq("id", id)).await
    }

    /// Deletes an entry. Returns the number of removed rows.
    pub async fn delete(&self, id: i64) -> Result<u64> {
        Ok(self.table.delete(&Filters::new().eq("id", id)).await?)
    }

    /// Deletes every entry older than the validity window.
    pub async fn clean_up(&self) -> Result<u64> {
        let expired = Filters::new().compare("datetime", "<", self.cutoff());
        let removed = self.table.delete(&expired).await?;
        info!(removed, "Removed expired password reset entries");
        Ok(removed)
    }

    /// Completes a reset: stores the hashed password through `directory` and
    /// consumes the entry.
    ///
    /// Returns `false`, leaving `directory` untouched, when `id` names no
    /// valid entry.
    pub async fn reset_password<D: UserDirectory>(
        &self,
        id: i64,
        new_password: &str,
        directory: &D,
    ) -> Result<bool> {
        let Some(entry) = self.get_by_id(id).await? else {
            debug!(id, "No valid password reset entry");
            return Ok(false);
        };

        let password_hash = hash_password(new_password)?;
        directory
            .set_password_hash(&entry.user_id, &password_hash)
            .await?;
        self.delete(entry.id).await?;

        info!(user_id = %entry.user_id, id, "Password reset completed");
        Ok(true)
    }

    fn cutoff(&self) -> Value {
        Value::from(Utc::now().naive_utc() - self.validity)
    }

    async fn find_valid(&self, filters: Filters) -> Result<Option<ResetEntry>> {
        let filters = filters.compare("datetime", ">", self.cutoff());
        self.table
            .get_row(&filters)
            .await?
            .as_ref()
            .map(ResetEntry::from_row)
            .transpose()
    }
}

/// Generates a 64 character hex token from 32 random bytes.
pub fn generate_token() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(&bytes)
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
