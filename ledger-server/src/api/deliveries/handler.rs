//! Delivery API Handlers

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{delivery, order};
use crate::utils::time;
use crate::utils::validation::validate_amount;
use crate::utils::{AppError, AppResult};
use shared::models::{Delivery, DeliveryCreate};

/// POST /api/deliveries - 记录送货
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    payload: Result<Json<DeliveryCreate>, JsonRejection>,
) -> AppResult<Json<Delivery>> {
    let Json(payload) = payload?;
    validate_amount(payload.amount_delivered, "amount_delivered")?;

    let owner = order::find_extension_id(&state.pool, payload.order_id).await?;
    if owner != Some(current_user.extension_id) {
        return Err(AppError::not_found(format!(
            "Order {} not found",
            payload.order_id
        )));
    }

    let date_delivered = match payload.date_delivered.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => time::parse_datetime_millis(value, state.config.timezone)?,
        _ => shared::util::now_millis(),
    };

    let created = delivery::create(
        &state.pool,
        payload.order_id,
        payload.amount_delivered,
        date_delivered,
    )
    .await?;

    tracing::info!(
        delivery_id = created.id,
        order_id = created.order_id,
        user_id = current_user.id,
        "Delivery recorded"
    );

    Ok(Json(created))
}
