//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint is JSON under `/api`, plus `/healthz`. Callers name
//! themselves with the `x-ecoclear-role` and `x-ecoclear-actor` headers
//! (see [`actor`]). Handlers stay thin: extract, call one service function,
//! and map the service error onto an [`ApiError`](crate::error::ApiError).
//!
//! Routes that accept inline media get a [`DefaultBodyLimit`] of
//! `AppConfig::max_body_bytes`; the rest keep axum's 2 MB default.

pub mod actor;
pub mod ai;
pub mod dashboard;
pub mod enterprise;
pub mod facilities;
pub mod fleets;
pub mod governance;
pub mod market;
pub mod orders;
pub mod pricing;
pub mod property;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let media = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/healthz", get(healthz))
        // AI
        .route("/api/ai/waste", post(ai::analyze_waste).layer(media.clone()))
        .route("/api/ai/product", post(ai::analyze_product).layer(media.clone()))
        .route("/api/copilot/chat", post(ai::copilot_chat))
        .route("/api/copilot/history", get(ai::copilot_history))
        .route("/api/pricing/quote", get(pricing::quote))
        .route("/api/pricing/enterprise", post(pricing::enterprise_quote))
        // Orders
        .route("/api/orders", get(orders::list).post(orders::create).layer(media.clone()))
        .route("/api/orders/self", post(orders::self_order).layer(media.clone()))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/confirm", post(orders::confirm))
        .route("/api/orders/{id}/accept", post(orders::accept))
        .route("/api/orders/{id}/advance", post(orders::advance))
        .route("/api/orders/{id}/grab", post(orders::grab))
        .route("/api/orders/{id}/assign", post(orders::assign))
        .route("/api/orders/{id}/worker-accept", post(orders::worker_accept))
        .route("/api/orders/{id}/worker-complete", post(orders::worker_complete))
        .route("/api/orders/{id}/disposal-entry", post(orders::disposal_entry))
        .route("/api/orders/{id}/manifest", get(orders::manifest))
        // Facilities
        .route("/api/facilities", get(facilities::list))
        .route("/api/facilities/{id}", get(facilities::get).patch(facilities::update))
        .route("/api/facilities/{id}/status", put(facilities::set_status))
        .route("/api/facilities/{id}/promotions", post(facilities::promote))
        .route("/api/facilities/{id}/settlement", get(facilities::settlement))
        .route("/api/facilities/{id}/history", get(facilities::history))
        // Fleets & drivers
        .route("/api/fleets", get(fleets::list))
        .route("/api/fleets/{id}", get(fleets::get))
        .route("/api/fleets/{id}/drivers", get(fleets::drivers))
        .route("/api/fleets/{id}/ledger", get(fleets::ledger))
        .route("/api/fleets/{id}/verify", post(fleets::verify_fleet))
        .route("/api/fleets/{id}/projects", post(fleets::add_project))
        .route("/api/fleets/{id}/projects/{project_id}/review", post(fleets::review_project))
        .route("/api/drivers", post(fleets::onboard_driver))
        .route("/api/drivers/{id}/verify", post(fleets::verify_driver))
        // Market
        .route("/api/market/products", get(market::list).post(market::publish).layer(media.clone()))
        .route("/api/market/clearance", get(market::clearance))
        .route("/api/market/demand", get(market::demand))
        // Enterprise
        .route("/api/enterprise/{id}", get(enterprise::account))
        .route("/api/enterprise/{id}/projects", post(enterprise::add_project))
        .route("/api/enterprise/{id}/projects/{project_id}/cost", get(enterprise::project_cost))
        .route("/api/enterprise/{id}/bulk-removal", post(enterprise::bulk_removal))
        .route("/api/enterprise/{id}/procurement", post(enterprise::procurement))
        // Property
        .route("/api/renovations", get(property::applications).post(property::submit))
        .route("/api/renovations/{id}/approve", post(property::approve))
        .route("/api/renovations/{id}/reject", post(property::reject))
        .route("/api/property/{id}/clearance", post(property::dispatch_clearance).layer(media))
        .route("/api/property/{id}/orders", get(property::community_orders))
        .route("/api/property/{id}/unsettled", get(property::unsettled))
        // Governance
        .route("/api/notices", get(governance::notices).post(governance::publish))
        .route("/api/complaints", get(governance::complaints).post(governance::file))
        .route("/api/complaints/{id}/resolve", post(governance::resolve))
        .route("/api/gov/stats", get(governance::stats))
        .route("/api/dashboard", get(dashboard::summary))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
