//! Card API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregation::{CardSummary, summarize_card};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{card, extension};
use crate::money;
use crate::utils::{AppError, AppResult};
use shared::models::{Card, CardUpdate, CardUpdateType, CardWithOrders, StatusAck};

/// Card page: the card, its orders, and its summary
#[derive(Debug, Serialize)]
pub struct CardDetail {
    #[serde(flatten)]
    pub card: CardWithOrders,
    pub summary: CardSummary,
    pub commission_rate: Decimal,
    /// Commission on the card's owed amount
    pub commission: Decimal,
}

/// Load a card owned by the caller's extension
///
/// Cards of other extensions are reported as missing.
async fn load_owned(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<Card> {
    card::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.extension_id == user.extension_id)
        .ok_or_else(|| AppError::not_found(format!("Card {} not found", id)))
}

/// Optional body fields must agree with the stored card
fn check_update_matches(card: &Card, payload: &CardUpdate) -> AppResult<()> {
    if let Some(customer_id) = payload.customer_id
        && customer_id != card.customer_id
    {
        return Err(AppError::validation(format!(
            "Card {} does not belong to customer {}",
            card.id, customer_id
        )));
    }
    if let Some(extension_id) = payload.extension_id
        && extension_id != card.extension_id
    {
        return Err(AppError::validation(format!(
            "Card {} does not belong to extension {}",
            card.id, extension_id
        )));
    }
    if payload.update_type == CardUpdateType::Status
        && let Some(next_number) = payload.card_number
        && next_number != card.card_number + 1
    {
        return Err(AppError::validation(format!(
            "Successor of card {} must be number {}, got {}",
            card.card_number,
            card.card_number + 1,
            next_number
        )));
    }
    Ok(())
}

/// GET /api/cards - 分店所有卡片 (含订单)
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<CardWithOrders>>> {
    let cards = card::find_by_extension(&state.pool, current_user.extension_id).await?;
    Ok(Json(cards))
}

/// GET /api/card/{id} - 单张卡片
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<CardDetail>> {
    load_owned(&state, &current_user, id).await?;
    let card = card::find_with_orders(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Card {} not found", id)))?;

    let ext = extension::find_by_id(&state.pool, current_user.extension_id).await?;
    let rate = state.commission_rate(ext.as_ref());
    let summary = summarize_card(&card);

    Ok(Json(CardDetail {
        commission: money::commission(summary.totals.amount, rate),
        commission_rate: rate,
        summary,
        card,
    }))
}

/// PATCH /api/card/{id} - 关闭卡片 (并开新卡) 或标记已付
///
/// `updateType == "Status"` closes the card and opens `card_number + 1` in
/// one transaction; any other value marks the card PAID.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    payload: Result<Json<CardUpdate>, JsonRejection>,
) -> AppResult<Json<StatusAck>> {
    let Json(payload) = payload?;
    let existing = load_owned(&state, &current_user, id).await?;
    check_update_matches(&existing, &payload)?;

    match payload.update_type {
        CardUpdateType::Status => {
            let result = card::close_and_succeed(&state.pool, id).await?;
            tracing::info!(
                card_id = result.closed.id,
                card_number = result.closed.card_number,
                successor_id = result.successor.id,
                successor_number = result.successor.card_number,
                customer_id = result.closed.customer_id,
                user_id = current_user.id,
                "Card closed"
            );
        }
        CardUpdateType::Payment => {
            let paid = card::mark_paid(&state.pool, id).await?;
            tracing::info!(
                card_id = paid.id,
                card_number = paid.card_number,
                user_id = current_user.id,
                "Card marked as paid"
            );
        }
    }

    Ok(Json(StatusAck::ok()))
}
