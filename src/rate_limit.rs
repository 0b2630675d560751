//! In-memory rate limiting for AI requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<Uuid, VecDeque<Instant>>`,
//! keyed by the calling actor. Three limits are enforced:
//! - Per-actor: 10 AI requests/min
//! - Global: 20 model calls/min, retries included
//! - Token budget: 50k tokens/actor/hour
//!
//! TRADE-OFFS
//! ==========
//! Token budgeting uses reservations so concurrent requests cannot
//! oversubscribe quota. A reservation can briefly exceed eventual usage; it
//! is settled or released as soon as the call returns.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

pub const DEFAULT_PER_CLIENT_LIMIT: usize = 10;
pub const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 60;

pub const DEFAULT_GLOBAL_LIMIT: usize = 20;
pub const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

pub const DEFAULT_TOKEN_BUDGET: u64 = 50_000;
pub const DEFAULT_TOKEN_WINDOW_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
    pub token_budget: u64,
    pub token_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client_limit: DEFAULT_PER_CLIENT_LIMIT,
            per_client_window: Duration::from_secs(DEFAULT_PER_CLIENT_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
            token_budget: DEFAULT_TOKEN_BUDGET,
            token_window: Duration::from_secs(DEFAULT_TOKEN_WINDOW_SECS),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-actor rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
    #[error("token budget exceeded (max {budget} tokens/{window_secs}s)")]
    TokenBudgetExceeded { budget: u64, window_secs: u64 },
}

impl crate::error::ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PerClientExceeded { .. } => "E_RATE_LIMIT_ACTOR",
            Self::GlobalExceeded { .. } => "E_RATE_LIMIT_GLOBAL",
            Self::TokenBudgetExceeded { .. } => "E_TOKEN_BUDGET",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    /// Per-actor request timestamps.
    client_requests: HashMap<Uuid, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
    /// Per-actor token usage: (timestamp, `token_count`).
    client_tokens: HashMap<Uuid, VecDeque<(Instant, u64)>>,
    /// Per-actor in-flight token reservations: (timestamp, reserved tokens).
    client_token_reservations: HashMap<Uuid, VecDeque<(Instant, u64)>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check both per-actor and global rate limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded; nothing is recorded then.
    pub fn check_and_record(&self, client_id: Uuid) -> Result<(), RateLimitError> {
        self.check_and_record_at(client_id, Instant::now())
    }

    fn check_and_record_at(&self, client_id: Uuid, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let client_deque = inner.client_requests.entry(client_id).or_default();
        prune_window(client_deque, now, cfg.per_client_window);
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        client_deque.push_back(now);
        inner.global_requests.push_back(now);

        Ok(())
    }

    /// Count a retried model call against the global window only. The
    /// per-actor window already holds the original request.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::GlobalExceeded`]; nothing is recorded then.
    pub fn check_and_record_retry(&self) -> Result<(), RateLimitError> {
        self.check_and_record_retry_at(Instant::now())
    }

    fn check_and_record_retry_at(&self, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Reserve token budget before issuing a model call.
    ///
    /// The reservation is atomic with the budget check so concurrent requests
    /// see each other's in-flight usage.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::TokenBudgetExceeded`] when used plus reserved
    /// tokens would pass the budget.
    pub fn reserve_token_budget(&self, client_id: Uuid, reserved_tokens: u64) -> Result<(), RateLimitError> {
        self.reserve_token_budget_at(client_id, reserved_tokens, Instant::now())
    }

    fn reserve_token_budget_at(
        &self,
        client_id: Uuid,
        reserved_tokens: u64,
        now: Instant,
    ) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;
        let exceeded =
            || RateLimitError::TokenBudgetExceeded { budget: cfg.token_budget, window_secs: cfg.token_window.as_secs() };

        let used_tokens: u64 = {
            let token_deque = inner.client_tokens.entry(client_id).or_default();
            prune_token_window(token_deque, now, cfg.token_window);
            token_deque.iter().map(|(_, t)| t).sum()
        };
        let reserved_total: u64 = {
            let reservation_deque = inner
                .client_token_reservations
                .entry(client_id)
                .or_default();
            prune_token_window(reservation_deque, now, cfg.token_window);
            reservation_deque.iter().map(|(_, t)| t).sum()
        };
        let Some(projected_total) = used_tokens
            .checked_add(reserved_total)
            .and_then(|n| n.checked_add(reserved_tokens))
        else {
            return Err(exceeded());
        };
        let exceeds_budget = if reserved_tokens == 0 {
            projected_total >= cfg.token_budget
        } else {
            projected_total > cfg.token_budget
        };
        if exceeds_budget {
            return Err(exceeded());
        }
        if reserved_tokens > 0 {
            inner
                .client_token_reservations
                .entry(client_id)
                .or_default()
                .push_back((now, reserved_tokens));
        }
        Ok(())
    }

    /// Record token usage after a model response and settle the reservation.
    pub fn record_tokens(&self, client_id: Uuid, tokens: u64, reserved_tokens: u64) {
        self.record_tokens_at(client_id, tokens, reserved_tokens, Instant::now());
    }

    fn record_tokens_at(&self, client_id: Uuid, tokens: u64, reserved_tokens: u64, now: Instant) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;
        {
            let reservation_deque = inner
                .client_token_reservations
                .entry(client_id)
                .or_default();
            prune_token_window(reservation_deque, now, cfg.token_window);
            consume_reserved_tokens(reservation_deque, reserved_tokens);
        }
        let token_deque = inner.client_tokens.entry(client_id).or_default();
        prune_token_window(token_deque, now, cfg.token_window);
        token_deque.push_back((now, tokens));
    }

    /// Release a reservation for a failed model call.
    pub fn release_reserved_tokens(&self, client_id: Uuid, reserved_tokens: u64) {
        let now = Instant::now();
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;
        let reservation_deque = inner
            .client_token_reservations
            .entry(client_id)
            .or_default();
        prune_token_window(reservation_deque, now, cfg.token_window);
        consume_reserved_tokens(reservation_deque, reserved_tokens);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn prune_token_window(deque: &mut VecDeque<(Instant, u64)>, now: Instant, window: Duration) {
    while let Some(&(front, _)) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn consume_reserved_tokens(deque: &mut VecDeque<(Instant, u64)>, mut amount: u64) {
    while amount > 0 {
        let Some((_, front_tokens)) = deque.front_mut() else {
            break;
        };
        if *front_tokens <= amount {
            amount -= *front_tokens;
            deque.pop_front();
        } else {
            *front_tokens -= amount;
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
