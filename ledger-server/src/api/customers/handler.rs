//! Customer API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregation::{CardSummary, CardTotals, aggregate_cards};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{customer, extension};
use crate::money;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{CardWithOrders, Customer, CustomerCreate, CustomerListItem};

/// One card on the customer page
#[derive(Debug, Serialize)]
pub struct CustomerCard {
    #[serde(flatten)]
    pub card: CardWithOrders,
    pub summary: CardSummary,
    pub commission: Decimal,
}

/// Customer page: cards (newest first) with per-card summaries
#[derive(Debug, Serialize)]
pub struct CustomerPage {
    #[serde(flatten)]
    pub customer: Customer,
    pub cards: Vec<CustomerCard>,
    /// Sums over all of the customer's cards
    pub totals: CardTotals,
    pub commission_rate: Decimal,
    pub commission: Decimal,
}

/// GET /api/customers - 分店客户列表 (含当前卡)
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<CustomerListItem>>> {
    let customers = customer::find_all(&state.pool, current_user.extension_id).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id} - 客户详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerPage>> {
    let detail = customer::find_with_cards(&state.pool, id)
        .await?
        .filter(|c| c.customer.extension_id == current_user.extension_id)
        .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))?;

    let ext = extension::find_by_id(&state.pool, current_user.extension_id).await?;
    let rate = state.commission_rate(ext.as_ref());
    let metrics = aggregate_cards(&detail.cards);

    let cards = detail
        .cards
        .into_iter()
        .zip(metrics.cards)
        .map(|(card, summary)| CustomerCard {
            commission: money::commission(summary.totals.amount, rate),
            card,
            summary,
        })
        .collect();

    Ok(Json(CustomerPage {
        customer: detail.customer,
        cards,
        commission: money::commission(metrics.totals.amount, rate),
        commission_rate: rate,
        totals: metrics.totals,
    }))
}

/// POST /api/customers - 新建客户 (同时开 1 号卡)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    payload: Result<Json<CustomerCreate>, JsonRejection>,
) -> AppResult<Json<Customer>> {
    let Json(payload) = payload?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.customer_number, "customer_number", MAX_SHORT_TEXT_LEN)?;

    let payload = CustomerCreate {
        name: payload.name.trim().to_string(),
        customer_number: payload.customer_number.trim().to_string(),
    };

    let created = customer::create(&state.pool, current_user.extension_id, payload).await?;
    tracing::info!(
        customer_id = created.id,
        extension_id = created.extension_id,
        user_id = current_user.id,
        "Customer created"
    );

    Ok(Json(created))
}
