//! Order API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::NewOrder;
use crate::db::repository::{card, customer, order};
use crate::utils::time;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Order, OrderCreate, OrderCreated, OrderDetail, OrderType};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// No limit when absent
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// Form-level checks that need no database access
fn validate_order(payload: &OrderCreate) -> AppResult<()> {
    validate_amount(payload.amount, "amount")?;
    validate_amount(payload.amount_paid, "amountpaid")?;
    validate_amount(payload.voucher_paid, "voucherpaid")?;
    validate_amount(payload.amount_delivered, "amountdelivered")?;
    // Negative when the customer overpays
    if let Some(voucher) = payload.voucher {
        validate_amount(voucher.abs(), "voucher")?;
    }
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;

    match payload.order_type {
        OrderType::Order => {
            if payload.customer_id.is_none() {
                return Err(AppError::validation("customerid is required for ORDER"));
            }
            if payload.amount <= Decimal::ZERO && payload.voucher_paid <= Decimal::ZERO {
                return Err(AppError::validation(
                    "ORDER needs a positive amount or voucherpaid",
                ));
            }
        }
        _ => {
            let name = payload.name.as_deref().unwrap_or_default();
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
    }
    Ok(())
}

/// Voucher issued on the order: explicit value, else `amount - amountpaid`
fn resolve_voucher(payload: &OrderCreate) -> Decimal {
    payload
        .voucher
        .unwrap_or(payload.amount - payload.amount_paid)
}

/// POST /api/order - 录入订单
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> AppResult<Json<OrderCreated>> {
    let Json(payload) = payload?;
    validate_order(&payload)?;

    if let Some(user_id) = payload.user_id
        && user_id != current_user.id
    {
        return Err(AppError::forbidden(format!(
            "Orders are recorded as the signed-in user, not user {user_id}"
        )));
    }

    // 客户必须属于当前分店
    if let Some(customer_id) = payload.customer_id {
        customer::find_by_id(&state.pool, customer_id)
            .await?
            .filter(|c| c.extension_id == current_user.extension_id)
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", customer_id)))?;
    }

    let card_id = match (payload.card_id, payload.order_type, payload.customer_id) {
        (Some(card_id), _, _) => {
            card::find_by_id(&state.pool, card_id)
                .await?
                .filter(|c| c.extension_id == current_user.extension_id)
                .ok_or_else(|| AppError::not_found(format!("Card {} not found", card_id)))?;
            Some(card_id)
        }
        // ORDER without a card goes on the customer's open card
        (None, OrderType::Order, Some(customer_id)) => {
            let open = card::find_open_by_customer(&state.pool, customer_id)
                .await?
                .ok_or_else(|| {
                    AppError::business_rule(format!("Customer {} has no open card", customer_id))
                })?;
            Some(open.id)
        }
        (None, _, _) => None,
    };

    let date_ordered = match payload.date_ordered.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => time::parse_datetime_millis(value, state.config.timezone)?,
        _ => shared::util::now_millis(),
    };

    let new_order = NewOrder {
        order_type: payload.order_type,
        name: payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        amount: payload.amount,
        amount_paid: payload.amount_paid,
        voucher: resolve_voucher(&payload),
        voucher_paid: payload.voucher_paid,
        amount_to_be_delivered: payload.amount_delivered,
        date_ordered,
        card_id,
        customer_id: payload.customer_id,
        user_id: current_user.id,
    };

    let order_id = order::create(&state.pool, new_order).await?;
    tracing::info!(
        order_id,
        order_type = payload.order_type.as_tag(),
        card_id = ?card_id,
        customer_id = ?payload.customer_id,
        user_id = current_user.id,
        "Order created"
    );

    Ok(Json(OrderCreated { order_id }))
}

/// GET /api/orders - 分店订单列表 (新到旧)
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let limit = query.limit.filter(|l| *l >= 0);
    let offset = query.offset.max(0);
    let orders =
        order::find_details_by_extension(&state.pool, current_user.extension_id, limit, offset)
            .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - 单个订单 (含送货记录)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let owner = order::find_extension_id(&state.pool, id).await?;
    if owner != Some(current_user.extension_id) {
        return Err(AppError::not_found(format!("Order {} not found", id)));
    }
    let order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit_order(amount: i64, paid: i64) -> OrderCreate {
        OrderCreate {
            order_type: OrderType::Order,
            customer_id: Some(1),
            amount: Decimal::from(amount),
            amount_paid: Decimal::from(paid),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_requires_customer() {
        let mut payload = credit_order(100, 0);
        payload.customer_id = None;
        assert!(validate_order(&payload).is_err());
    }

    #[test]
    fn test_order_requires_amount_or_voucher_paid() {
        assert!(validate_order(&credit_order(0, 0)).is_err());
        assert!(validate_order(&credit_order(100, 0)).is_ok());

        let mut repayment = credit_order(0, 0);
        repayment.voucher_paid = Decimal::from(20);
        assert!(validate_order(&repayment).is_ok());
    }

    #[test]
    fn test_non_card_entries_require_name() {
        let mut cash = OrderCreate {
            order_type: OrderType::CashSale,
            amount: Decimal::from(15),
            amount_paid: Decimal::from(15),
            ..Default::default()
        };
        assert!(validate_order(&cash).is_err());

        cash.name = Some("  ".to_string());
        assert!(validate_order(&cash).is_err());

        cash.name = Some("Walk-in".to_string());
        assert!(validate_order(&cash).is_ok());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let payload = OrderCreate {
            amount_delivered: Decimal::from(-1),
            ..credit_order(10, 0)
        };
        assert!(validate_order(&payload).is_err());
    }

    #[test]
    fn test_overpaid_voucher_accepted() {
        let mut payload = credit_order(50, 80);
        payload.voucher = Some(Decimal::from(-30));
        assert!(validate_order(&payload).is_ok());
    }

    #[test]
    fn test_voucher_defaults_to_amount_minus_paid() {
        assert_eq!(resolve_voucher(&credit_order(100, 60)), Decimal::from(40));
        assert_eq!(resolve_voucher(&credit_order(50, 80)), Decimal::from(-30));

        let mut explicit = credit_order(100, 60);
        explicit.voucher = Some(Decimal::from(10));
        assert_eq!(resolve_voucher(&explicit), Decimal::from(10));
    }
}
