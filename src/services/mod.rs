//! Business logic, one module per area of the platform.
//!
//! Services take `&AppState` and an [`Actor`](crate::model::Actor), lock the
//! store once per operation, and return their own `thiserror` enum. Routes
//! translate those into HTTP statuses.

pub mod ai;
pub mod classify;
pub mod copilot;
pub mod dashboard;
pub mod enterprise;
pub mod facility;
pub mod fleet;
pub mod governance;
pub mod manifest;
pub mod market;
pub mod order;
pub mod pricing;
pub mod property;
