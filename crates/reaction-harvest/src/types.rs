//! Core data types for harvested records and harvest failures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::page::PageError;

/// One harvested list entry.
///
/// `index` is 1-based and equals the entry's position in the list at
/// extraction time. Unresolvable string fields are empty, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub index: u32,
    pub reaction_type: String,
    pub user_name: String,
    pub current_role: String,
    pub profile_link: String,
}

impl Record {
    /// Columns in output order.
    pub fn columns(&self) -> [String; 5] {
        [
            self.index.to_string(),
            self.reaction_type.clone(),
            self.user_name.clone(),
            self.current_role.clone(),
            self.profile_link.clone(),
        ]
    }
}

/// Which record field a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    UserName,
    CurrentRole,
    ProfileLink,
    ReactionType,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::UserName,
        FieldKind::CurrentRole,
        FieldKind::ProfileLink,
        FieldKind::ReactionType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::UserName => "user_name",
            FieldKind::CurrentRole => "current_role",
            FieldKind::ProfileLink => "profile_link",
            FieldKind::ReactionType => "reaction_type",
        }
    }
}

/// Per-field count of lookups that fell back to an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMisses {
    pub user_name: u32,
    pub current_role: u32,
    pub profile_link: u32,
    pub reaction_type: u32,
}

impl FieldMisses {
    pub fn record(&mut self, kind: FieldKind) {
        match kind {
            FieldKind::UserName => self.user_name += 1,
            FieldKind::CurrentRole => self.current_role += 1,
            FieldKind::ProfileLink => self.profile_link += 1,
            FieldKind::ReactionType => self.reaction_type += 1,
        }
    }

    pub fn get(&self, kind: FieldKind) -> u32 {
        match kind {
            FieldKind::UserName => self.user_name,
            FieldKind::CurrentRole => self.current_role,
            FieldKind::ProfileLink => self.profile_link,
            FieldKind::ReactionType => self.reaction_type,
        }
    }

    pub fn total(&self) -> u32 {
        self.user_name + self.current_role + self.profile_link + self.reaction_type
    }
}

/// Errors that can stop or degrade a harvest.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("Scrollable container unavailable after {timeout_ms}ms: {reason}")]
    ContainerUnavailable { timeout_ms: u64, reason: String },

    #[error("List never produced visible items: {0}")]
    EmptyOrUnopenable(String),

    #[error("Authentication not observed within {0}s")]
    AuthTimeout(u64),

    #[error("Failed to write {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}

impl HarvestError {
    /// Whether this error stops the run before any output is produced.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HarvestError::PersistenceFailure { .. })
    }
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
