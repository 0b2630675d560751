//! Domain records shared by services and routes.
//!
//! DESIGN
//! ======
//! Every enum is a closed set serialized as its SCREAMING_SNAKE_CASE wire
//! value, so deserializing model output or request bodies rejects anything
//! outside the declared variants. Records serialize as camelCase JSON.

pub mod civic;
pub mod facility;
pub mod market;
pub mod order;
pub mod party;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use civic::*;
pub use facility::*;
pub use market::*;
pub use order::*;
pub use party::*;

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// ROLES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Client,
    Driver,
    Disposal,
    Property,
    Government,
    Fleet,
    Enterprise,
    Worker,
}

impl UserRole {
    pub const ALL: [Self; 8] = [
        Self::Client,
        Self::Driver,
        Self::Disposal,
        Self::Property,
        Self::Government,
        Self::Fleet,
        Self::Enterprise,
        Self::Worker,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Driver => "DRIVER",
            Self::Disposal => "DISPOSAL",
            Self::Property => "PROPERTY",
            Self::Government => "GOVERNMENT",
            Self::Fleet => "FLEET",
            Self::Enterprise => "ENTERPRISE",
            Self::Worker => "WORKER",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Roles that settle through the platform instead of paying on site.
    #[must_use]
    pub fn is_account_customer(self) -> bool {
        matches!(self, Self::Enterprise | Self::Property)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller of an operation: which dashboard, and which account within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: UserRole,
    pub id: uuid::Uuid,
}

impl Actor {
    #[must_use]
    pub fn new(role: UserRole, id: uuid::Uuid) -> Self {
        Self { role, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Approved,
    Pending,
    Rejected,
}

// =============================================================================
// LOCATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeoLocation {
    #[must_use]
    pub fn at(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self { lat, lng, address: Some(address.into()) }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
