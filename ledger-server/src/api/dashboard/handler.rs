//! Dashboard API Handlers

use axum::{
    Json,
    extract::{Extension, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregation::{CardMetrics, PeriodReport, aggregate_by_period, aggregate_cards};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{card, extension, order};
use crate::money;
use crate::utils::AppResult;

/// Extension-wide report
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub extension_id: i64,
    pub extension_name: Option<String>,
    /// Timezone the months are counted in
    pub timezone: String,
    /// Year → month buckets of every order
    pub periods: PeriodReport,
    /// Per-card and total balances
    pub cards: CardMetrics,
    pub commission_rate: Decimal,
    /// Commission on the total owed amount of all cards
    pub commission: Decimal,
}

/// GET /api/dashboard - 分店报表
pub async fn get_report(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<DashboardReport>> {
    let extension_id = current_user.extension_id;
    let tz = state.config.timezone;

    let ext = extension::find_by_id(&state.pool, extension_id).await?;
    let orders = order::find_by_extension(&state.pool, extension_id).await?;
    let cards = card::find_by_extension(&state.pool, extension_id).await?;

    let periods = aggregate_by_period(&orders, tz);
    let metrics = aggregate_cards(&cards);
    let rate = state.commission_rate(ext.as_ref());

    tracing::debug!(
        extension_id,
        orders = orders.len(),
        cards = cards.len(),
        skipped_undated = periods.skipped_undated,
        "Dashboard report built"
    );

    Ok(Json(DashboardReport {
        extension_id,
        extension_name: ext.map(|e| e.name),
        timezone: tz.name().to_string(),
        commission: money::commission(metrics.totals.amount, rate),
        commission_rate: rate,
        periods,
        cards: metrics,
    }))
}
