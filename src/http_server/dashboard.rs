//! Display-ready view of the cached results.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tokio::time::Instant;

use super::{ApiError, ApiState};
use crate::{
    display::{format_count, format_inr, format_percent},
    models::{
        AggregateResult, CustomerSegments, GeoRollup, MainMetrics, MetricData, MetricKind,
        SkuRanking, StatePerformance, time_window::to_iso,
    },
    scheduler::{DashboardState, MetricSlot, WindowStatus},
};

/// Lifecycle of a dashboard panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    /// Never fetched and nothing in flight.
    Pending,
    /// First fetch in flight.
    Loading,
    /// Holds a successful result.
    Ready,
    /// Holds a failure; a manual retry clears it.
    Error,
}

/// A labelled, formatted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    /// Display label.
    pub label: &'static str,
    /// Formatted value.
    pub value: String,
}

/// One aggregator's panel.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    /// Aggregator kind.
    pub kind: MetricKind,
    /// Panel title.
    pub title: &'static str,
    /// Panel lifecycle.
    pub status: PanelStatus,
    /// Whether a refresh is running, including background refreshes of a
    /// ready panel.
    pub fetching: bool,
    /// When the shown result was produced.
    pub as_of: Option<String>,
    /// Seconds until the next automatic refresh.
    pub next_refresh_in_secs: Option<u64>,
    /// Failure message of an errored panel.
    pub error: Option<String>,
    /// Headline figures.
    pub stats: Vec<Stat>,
    /// Column headers of the table, empty without a table.
    pub columns: Vec<&'static str>,
    /// Formatted table rows.
    pub rows: Vec<Vec<String>>,
}

/// The whole dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Campaign window.
    pub window: WindowStatus,
    /// Whether panels refresh on their own.
    pub auto_refresh: bool,
    /// Panels in evaluation order.
    pub panels: Vec<Panel>,
}

fn stat(label: &'static str, value: String) -> Stat {
    Stat { label, value }
}

fn title(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Main => "Orders & Revenue",
        MetricKind::Sku => "Top SKUs",
        MetricKind::Map => "Orders by Location",
        MetricKind::Customer => "New vs Returning Customers",
        MetricKind::State => "State Performance",
    }
}

fn main_stats(m: &MainMetrics) -> Vec<Stat> {
    vec![
        stat("Total orders", format_count(m.total_orders)),
        stat("Total sales", format_inr(m.total_sales)),
        stat("Campaign orders", format_count(m.tagged_orders)),
        stat("Campaign sales", format_inr(m.tagged_sales)),
        stat("Average order value", format_inr(m.avg_order_value)),
        stat("Unique customers", format_count(m.unique_customers)),
        stat("Orders per customer", format!("{:.2}", m.orders_per_customer)),
        stat("Campaign conversion", format_percent(m.conversion_rate)),
        stat("Open carts (30 min)", format_count(m.recent_carts)),
    ]
}

fn sku_panel(panel: &mut Panel, ranking: &SkuRanking) {
    panel.stats = vec![
        stat("Distinct SKUs", format_count(ranking.distinct_skus as u64)),
        stat("Units sold", format_count(ranking.total_quantity)),
        stat("Revenue", format_inr(ranking.total_revenue)),
        stat("Top 10 units", format_count(ranking.top_quantity())),
        stat("Top 10 revenue", format_inr(ranking.top_revenue())),
    ];
    panel.columns = vec!["SKU", "Units", "Revenue"];
    panel.rows = ranking
        .top
        .iter()
        .map(|s| vec![s.sku.clone(), format_count(s.quantity), format_inr(s.revenue)])
        .collect();
}

fn map_panel(panel: &mut Panel, rollup: &GeoRollup) {
    let summary = rollup.map_summary();
    panel.stats = vec![
        stat("Plotted orders", format_count(summary.plotted_orders as u64)),
        stat("Cities", format_count(summary.distinct_cities as u64)),
        stat("Plotted revenue", format_inr(summary.plotted_revenue)),
        stat("States", format_count(rollup.states.len() as u64)),
    ];
    panel.columns = vec!["State", "Orders", "Revenue", "Revenue share"];
    panel.rows = rollup
        .states
        .iter()
        .map(|s| {
            vec![
                s.state.clone(),
                format_count(s.orders),
                format_inr(s.revenue),
                format_percent(s.revenue_percentage),
            ]
        })
        .collect();
}

fn customer_stats(c: &CustomerSegments) -> Vec<Stat> {
    vec![
        stat("New customers", format_count(c.new_customers)),
        stat("Returning customers", format_count(c.returning_customers)),
        stat("New customer share", format_percent(c.new_customer_percentage())),
        stat("Orders from new", format_count(c.new_customer_orders)),
        stat("Orders from returning", format_count(c.returning_customer_orders)),
    ]
}

fn state_panel(panel: &mut Panel, performance: &StatePerformance) {
    let top = performance.top_state();
    panel.stats = vec![
        stat("States", format_count(performance.total_states as u64)),
        stat("Top state", top.map_or_else(|| "-".to_string(), |s| s.state.clone())),
        stat("Top state share", format_percent(top.map_or(0.0, |s| s.revenue_percentage))),
        stat("Revenue", format_inr(performance.total_revenue)),
    ];
    panel.columns = vec!["State", "Revenue", "Revenue share", "Units share"];
    panel.rows = performance
        .top_states
        .iter()
        .map(|s| {
            vec![
                s.state.clone(),
                format_inr(s.revenue),
                format_percent(s.revenue_percentage),
                format_percent(s.quantity_percentage),
            ]
        })
        .collect();
}

fn build_panel(slot: &MetricSlot, now: Instant) -> Panel {
    let fetching = slot.is_fetching();
    let mut panel = Panel {
        kind: slot.kind(),
        title: title(slot.kind()),
        status: if fetching { PanelStatus::Loading } else { PanelStatus::Pending },
        fetching,
        as_of: None,
        next_refresh_in_secs: slot.next_refresh_in(now).map(|d| d.as_secs()),
        error: None,
        stats: Vec::new(),
        columns: Vec::new(),
        rows: Vec::new(),
    };

    let Some(result) = slot.result() else { return panel };
    panel.as_of = Some(to_iso(&result.as_of()));
    match result.as_ref() {
        AggregateResult::Failure { error, .. } => {
            panel.status = PanelStatus::Error;
            panel.error = Some(error.clone());
        }
        AggregateResult::Success { data, .. } => {
            panel.status = PanelStatus::Ready;
            match data {
                MetricData::Main(m) => panel.stats = main_stats(m),
                MetricData::Sku(ranking) => sku_panel(&mut panel, ranking),
                MetricData::Map(rollup) => map_panel(&mut panel, rollup),
                MetricData::Customer(c) => panel.stats = customer_stats(c),
                MetricData::State(performance) => state_panel(&mut panel, performance),
            }
        }
    }
    panel
}

/// Renders every slot into its display form.
pub fn build_view(state: &DashboardState) -> DashboardView {
    let now = Instant::now();
    DashboardView {
        window: state.window_status(),
        auto_refresh: state.auto_refresh(),
        panels: state.slots().iter().map(|slot| build_panel(slot, now)).collect(),
    }
}

/// Retrieves the display-ready dashboard.
pub async fn dashboard(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(build_view(&state.dashboard))))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        config::RefreshConfig,
        models::{SkuSales, TimeWindow, WindowMode},
    };

    fn state() -> DashboardState {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 2, 0, 0, 0).unwrap(),
            WindowMode::Fixed,
        )
        .unwrap();
        DashboardState::new(&RefreshConfig::default(), window)
    }

    fn store(state: &DashboardState, kind: MetricKind, result: AggregateResult) {
        state.slot(kind).try_begin().unwrap().complete(result, Instant::now());
    }

    fn stat_value<'a>(panel: &'a Panel, label: &str) -> &'a str {
        panel.stats.iter().find(|s| s.label == label).map(|s| s.value.as_str()).unwrap()
    }

    #[test]
    fn test_empty_state_renders_pending_panels() {
        let view = build_view(&state());
        assert_eq!(view.panels.len(), 5);
        assert!(view.panels.iter().all(|p| p.status == PanelStatus::Pending));
        assert!(view.panels.iter().all(|p| p.stats.is_empty()));
    }

    #[test]
    fn test_in_flight_first_fetch_renders_loading() {
        let state = state();
        let _guard = state.slot(MetricKind::Sku).try_begin().unwrap();
        let view = build_view(&state);
        assert_eq!(view.panels[1].status, PanelStatus::Loading);
        assert!(view.panels[1].fetching);
    }

    #[test]
    fn test_main_panel_uses_rupee_formatting() {
        let state = state();
        store(
            &state,
            MetricKind::Main,
            AggregateResult::success(
                MetricData::Main(MainMetrics {
                    total_orders: 1_234_567,
                    total_sales: 1_234_567.89,
                    tagged_orders: 617,
                    unique_customers: 3,
                    orders_per_customer: 2.0 / 3.0,
                    conversion_rate: 50.0,
                    ..Default::default()
                }),
                Utc::now(),
            ),
        );

        let view = build_view(&state);
        let main = &view.panels[0];
        assert_eq!(main.status, PanelStatus::Ready);
        assert_eq!(stat_value(main, "Total orders"), "1,234,567");
        assert_eq!(stat_value(main, "Orders per customer"), "0.67");
        assert_eq!(stat_value(main, "Total sales"), "₹12,34,567.89");
        assert_eq!(stat_value(main, "Campaign conversion"), "50.0%");
        assert_eq!(stat_value(main, "Total sales").chars().next(), Some('₹'));
        assert!(matches!(main.next_refresh_in_secs, Some(29..=30)));
    }

    #[test]
    fn test_sku_panel_has_table() {
        let state = state();
        store(
            &state,
            MetricKind::Sku,
            AggregateResult::success(
                MetricData::Sku(SkuRanking {
                    top: vec![SkuSales { sku: "TEE-1".into(), quantity: 3, revenue: 0.0 }],
                    distinct_skus: 1,
                    total_quantity: 3,
                    total_revenue: 0.0,
                }),
                Utc::now(),
            ),
        );

        let panel = &build_view(&state).panels[1];
        assert_eq!(panel.columns, vec!["SKU", "Units", "Revenue"]);
        assert_eq!(panel.rows, vec![vec!["TEE-1".to_string(), "3".into(), "₹0".into()]]);
    }

    #[test]
    fn test_failure_renders_error_panel() {
        let state = state();
        store(&state, MetricKind::Customer, AggregateResult::failure("Throttled", Utc::now()));

        let panel = &build_view(&state).panels[3];
        assert_eq!(panel.status, PanelStatus::Error);
        assert_eq!(panel.error.as_deref(), Some("Throttled"));
        assert!(panel.stats.is_empty());
    }
}
