//! Admin dashboard figures

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderDetail, OrderQuery};

use crate::catalog::{CatalogStore, StoreResult};

/// Length of the reporting window
pub const PERIOD_DAYS: i64 = 30;
pub const RECENT_ORDERS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub revenue: Decimal,
    pub orders: usize,
    pub customers: usize,
}

impl PeriodTotals {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut revenue = Decimal::ZERO;
        let mut count = 0;
        let mut emails = HashSet::new();
        for order in orders {
            revenue += order.total_amount;
            count += 1;
            emails.insert(order.customer_email.to_ascii_lowercase());
        }
        Self {
            revenue,
            orders: count,
            customers: emails.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub unique_customers: usize,
    pub active_locations: usize,
    /// Percent versus the previous period; 100 when that period was zero
    pub revenue_change: f64,
    pub orders_change: f64,
    pub customers_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<OrderDetail>,
}

pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 100.0;
    }
    (current - previous) / previous * 100.0
}

pub fn compute_stats(
    current: PeriodTotals,
    previous: PeriodTotals,
    active_locations: usize,
) -> DashboardStats {
    DashboardStats {
        total_revenue: current.revenue,
        total_orders: current.orders,
        unique_customers: current.customers,
        active_locations,
        revenue_change: percent_change(
            current.revenue.to_f64().unwrap_or(0.0),
            previous.revenue.to_f64().unwrap_or(0.0),
        ),
        orders_change: percent_change(current.orders as f64, previous.orders as f64),
        customers_change: percent_change(current.customers as f64, previous.customers as f64),
    }
}

/// Last 30 days against the 30 before, plus the newest orders
pub async fn load_dashboard(store: &dyn CatalogStore, now: DateTime<Utc>) -> StoreResult<Dashboard> {
    let period_start = now - Duration::days(PERIOD_DAYS);
    let previous_start = period_start - Duration::days(PERIOD_DAYS);

    let current_q = OrderQuery {
        since: Some(period_start),
        ..Default::default()
    };
    let previous_q = OrderQuery::between(previous_start, period_start);
    let recent_q = OrderQuery::recent(RECENT_ORDERS);

    let (current, previous, locations, recent_orders) = futures::try_join!(
        store.list_orders(&current_q),
        store.list_orders(&previous_q),
        store.list_locations(),
        store.list_orders(&recent_q),
    )?;

    let current = PeriodTotals::from_orders(current.iter().map(|d| &d.order));
    let previous = PeriodTotals::from_orders(previous.iter().map(|d| &d.order));

    Ok(Dashboard {
        stats: compute_stats(current, previous, locations.len()),
        recent_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(0.0, 0.0), 100.0);
        assert_eq!(percent_change(10.0, 0.0), 100.0);
    }

    #[test]
    fn test_compute_stats() {
        let current = PeriodTotals {
            revenue: Decimal::new(30000, 2),
            orders: 6,
            customers: 4,
        };
        let previous = PeriodTotals {
            revenue: Decimal::new(20000, 2),
            orders: 6,
            customers: 0,
        };
        let stats = compute_stats(current, previous, 3);
        assert_eq!(stats.total_revenue, Decimal::new(30000, 2));
        assert_eq!(stats.revenue_change, 50.0);
        assert_eq!(stats.orders_change, 0.0);
        assert_eq!(stats.customers_change, 100.0);
        assert_eq!(stats.active_locations, 3);
    }
}
