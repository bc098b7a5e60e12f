//! Typed ID wrappers for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strongly-typed wrapper for ad account IDs.
///
/// Stored without the Graph API's `act_` prefix; use
/// [`as_act`](AccountId::as_act) when building API paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account ID, stripping a leading `act_` prefix if present.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.strip_prefix("act_") {
            Some(bare) => Self(bare.to_string()),
            None => Self(id),
        }
    }

    /// Returns the bare account ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the ID in the `act_<id>` form the Graph API expects.
    #[must_use]
    pub fn as_act(&self) -> String {
        format!("act_{}", self.0)
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
