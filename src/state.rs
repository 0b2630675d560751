//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. All
//! records live in one [`Store`] behind a `tokio::sync::RwLock`. Services
//! take the lock once per operation; AI calls happen with the lock released.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::LlmGenerate;
use crate::model::{
    ChatMessage, Complaint, Driver, EnterpriseAccount, Facility, Fleet, GovernmentAccount, Manifest, Notice, Order,
    PropertyAccount, RecycledProduct, RenovationApplication, Worker,
};
use crate::rate_limit::RateLimiter;

// =============================================================================
// STORE
// =============================================================================

/// Every record the platform knows about.
#[derive(Default)]
pub struct Store {
    pub orders: HashMap<Uuid, Order>,
    pub facilities: HashMap<Uuid, Facility>,
    pub fleets: HashMap<Uuid, Fleet>,
    pub drivers: HashMap<Uuid, Driver>,
    pub workers: HashMap<Uuid, Worker>,
    pub enterprises: HashMap<Uuid, EnterpriseAccount>,
    pub properties: HashMap<Uuid, PropertyAccount>,
    pub governments: HashMap<Uuid, GovernmentAccount>,
    pub renovations: HashMap<Uuid, RenovationApplication>,
    /// Keyed by serial number.
    pub manifests: HashMap<String, Manifest>,
    pub products: Vec<RecycledProduct>,
    pub notices: Vec<Notice>,
    pub complaints: Vec<Complaint>,
    /// Copilot transcript per actor, oldest first.
    pub copilot_history: HashMap<Uuid, VecDeque<ChatMessage>>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders sorted newest first.
    #[must_use]
    pub fn orders_newest_first(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        orders
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmGenerate>>,
    /// In-memory rate limiter for AI requests.
    pub rate_limiter: RateLimiter,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, llm: Option<Arc<dyn LlmGenerate>>) -> Self {
        Self::with_store(config, llm, Store::new())
    }

    #[must_use]
    pub fn with_store(config: AppConfig, llm: Option<Arc<dyn LlmGenerate>>, store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            llm,
            rate_limiter: RateLimiter::new(config.rate_limit),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
