//! Per-role dashboard counters and the one-line summary fed to the copilot.

use serde::Serialize;

use crate::model::{
    Actor, ComplaintStatus, FacilityOperationalStatus, Order, OrderStatus, OrderType, PaymentStatus, ProjectStatus,
    SettlementStatus, UserRole,
};
use crate::state::{AppState, Store};

use super::governance::VOLUME_PER_TRUCK_M3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub role: UserRole,
    pub total_orders: usize,
    pub my_orders: usize,
    pub counters: RoleCounters,
}

/// Counters specific to one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum RoleCounters {
    Customer { awaiting_confirmation: usize, in_progress: usize, completed: usize, spent: i64 },
    Driver { open_pool: usize, active: usize, completed: usize, earnings: i64 },
    Fleet { open_pool: usize, awaiting_dispatch: usize, drivers: usize, revenue: i64 },
    Disposal { inbound: usize, completed: usize, pending_settlement: i64, operational_status: Option<FacilityOperationalStatus> },
    Property { communities: usize, pending_applications: usize, unsettled: i64 },
    Government { completed: usize, total_volume_m3: u64, pending_complaints: usize, full_facilities: usize },
    Enterprise { available_credit: i64, approved_projects: usize, open_orders: usize },
    Worker { job_hall: usize, active: usize, completed: usize },
}

pub async fn summary(state: &AppState, actor: Actor) -> DashboardSummary {
    let store = state.store.read().await;
    summarize(&store, actor)
}

/// `"<n> orders total."` followed by the caller's own counts.
#[must_use]
pub fn context_summary(store: &Store, actor: Actor) -> String {
    let summary = summarize(store, actor);
    let active = store
        .orders
        .values()
        .filter(|o| involves(o, actor) && is_active(o))
        .count();
    format!(
        "{} orders total. {} involve you, {} still active.",
        summary.total_orders, summary.my_orders, active
    )
}

#[must_use]
pub fn summarize(store: &Store, actor: Actor) -> DashboardSummary {
    let mine: Vec<&Order> = store.orders.values().filter(|o| involves(o, actor)).collect();
    let count = |pred: &dyn Fn(&Order) -> bool| mine.iter().copied().filter(|&o| pred(o)).count();
    let value = |pred: &dyn Fn(&Order) -> bool| -> i64 {
        mine.iter().copied().filter(|&o| pred(o)).map(Order::estimated_price).sum()
    };
    let done = |o: &Order| o.status == OrderStatus::Completed;

    let counters = match actor.role {
        UserRole::Client => RoleCounters::Customer {
            awaiting_confirmation: count(&|o| matches!(o.status, OrderStatus::Analyzing | OrderStatus::ReviewRequired)),
            in_progress: count(&in_flight),
            completed: count(&done),
            spent: value(&done),
        },
        UserRole::Driver => RoleCounters::Driver {
            open_pool: open_removals(store).filter(|o| o.assigned_driver.is_none()).count(),
            active: count(&|o| in_flight(o) && o.status != OrderStatus::PendingPickup),
            completed: count(&done),
            earnings: value(&done),
        },
        UserRole::Fleet => RoleCounters::Fleet {
            open_pool: open_removals(store).filter(|o| o.fleet_id().is_none() && !o.has_driver()).count(),
            awaiting_dispatch: count(&|o| o.status == OrderStatus::PendingPickup && !o.has_driver()),
            drivers: store.drivers.values().filter(|d| d.fleet_id == Some(actor.id)).count(),
            revenue: value(&|_| true),
        },
        UserRole::Disposal => RoleCounters::Disposal {
            inbound: store
                .orders
                .values()
                .filter(|o| matches!(o.status, OrderStatus::LoadingComplete | OrderStatus::ArrivedDisposal))
                .count(),
            completed: count(&done),
            pending_settlement: mine
                .iter()
                .filter_map(|o| o.disposal.as_ref())
                .filter(|d| d.settlement_status == SettlementStatus::PendingPlatform)
                .map(|d| d.fee)
                .sum(),
            operational_status: store.facilities.get(&actor.id).map(|f| f.operational_status),
        },
        UserRole::Property => {
            let account = store.properties.get(&actor.id);
            let manages = |community: &str| account.is_some_and(|a| a.manages(community));
            RoleCounters::Property {
                communities: account.map_or(0, |a| a.managed_communities.len()),
                pending_applications: store
                    .renovations
                    .values()
                    .filter(|a| a.status == ProjectStatus::Pending && manages(&a.community_name))
                    .count(),
                unsettled: store
                    .orders
                    .values()
                    .filter(|o| o.pickup_details.as_ref().is_some_and(|p| manages(&p.community)))
                    .filter(|&o| o.payment_status == Some(PaymentStatus::MonthlyBill) && !done(o))
                    .map(Order::estimated_price)
                    .sum(),
            }
        }
        UserRole::Government => {
            let completed = store.orders.values().filter(|&o| done(o)).count();
            RoleCounters::Government {
                completed,
                total_volume_m3: completed as u64 * VOLUME_PER_TRUCK_M3,
                pending_complaints: store
                    .complaints
                    .iter()
                    .filter(|c| c.status == ComplaintStatus::Pending)
                    .count(),
                full_facilities: store.facilities.values().filter(|f| f.is_full()).count(),
            }
        }
        UserRole::Enterprise => {
            let account = store.enterprises.get(&actor.id);
            RoleCounters::Enterprise {
                available_credit: account.map_or(0, |a| a.available_credit()),
                approved_projects: account.map_or(0, |a| {
                    a.projects.iter().filter(|p| p.status == ProjectStatus::Approved).count()
                }),
                open_orders: count(&|o| !done(o)),
            }
        }
        UserRole::Worker => RoleCounters::Worker {
            job_hall: store
                .orders
                .values()
                .filter(|o| {
                    o.status == OrderStatus::PendingPickup && o.order_type.is_crew_job() && o.assigned_worker.is_none()
                })
                .count(),
            active: count(&|o| in_flight(o) && o.assigned_worker.as_ref().is_some_and(|w| w.worker_id == actor.id)),
            completed: count(&done),
        },
    };

    DashboardSummary { role: actor.role, total_orders: store.orders.len(), my_orders: mine.len(), counters }
}

fn open_removals(store: &Store) -> impl Iterator<Item = &Order> {
    store
        .orders
        .values()
        .filter(|o| o.status == OrderStatus::PendingPickup && o.order_type == OrderType::WasteRemoval)
}

fn is_active(order: &Order) -> bool {
    !matches!(order.status, OrderStatus::Created | OrderStatus::Completed)
}

/// Released for pickup and not yet completed.
fn in_flight(order: &Order) -> bool {
    is_active(order) && !matches!(order.status, OrderStatus::Analyzing | OrderStatus::ReviewRequired)
}

/// Whether the order belongs on this actor's dashboard.
fn involves(order: &Order, actor: Actor) -> bool {
    match actor.role {
        UserRole::Driver => order.assigned_driver.as_ref().and_then(|d| d.driver_id) == Some(actor.id),
        UserRole::Fleet => order.fleet_id() == Some(actor.id),
        UserRole::Disposal => order.disposal.as_ref().is_some_and(|d| d.facility_id == actor.id),
        UserRole::Government => true,
        UserRole::Worker => {
            order.customer.id == actor.id || order.assigned_worker.as_ref().is_some_and(|w| w.worker_id == actor.id)
        }
        UserRole::Client | UserRole::Property | UserRole::Enterprise => order.customer.id == actor.id,
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
