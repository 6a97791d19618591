use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use rota_booking::InstallmentTracker;
use rota_core::{ExcursionSettings, Reservation, SettingsPatch};
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::admin_auth_middleware, state::AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/settings", get(get_settings))
        .route("/v1/admin/settings", patch(update_settings))
        .route("/v1/admin/reservations", get(list_reservations))
        .route(
            "/v1/admin/reservations/{id}/installments",
            post(mark_installment_paid),
        )
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

/// GET /v1/admin/settings
async fn get_settings(State(state): State<AppState>) -> Result<Json<ExcursionSettings>, AppError> {
    let settings = state.store.read_settings().await?;
    Ok(Json(settings))
}

/// PATCH /v1/admin/settings: partial price/date update.
async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ExcursionSettings>, AppError> {
    if patch.is_empty() {
        return Err(AppError::ValidationError(
            "no settings fields to update".to_string(),
        ));
    }
    if matches!(patch.leito_price_cents, Some(cents) if cents < 0)
        || matches!(patch.semi_leito_price_cents, Some(cents) if cents < 0)
    {
        return Err(AppError::ValidationError(
            "prices must not be negative".to_string(),
        ));
    }

    let settings = state.store.update_settings(&patch).await?;

    tracing::info!(
        leito_price_cents = settings.leito_price_cents,
        semi_leito_price_cents = settings.semi_leito_price_cents,
        "excursion settings updated"
    );

    Ok(Json(settings))
}

/// GET /v1/admin/reservations: every reservation, newest first.
async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservations = state.store.list_reservations().await?;
    Ok(Json(reservations))
}

/// POST /v1/admin/reservations/{id}/installments: mark the next
/// installment paid; the first payment confirms the reservation.
async fn mark_installment_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .store
        .get_reservation(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("reservation {id} not found")))?;

    let tracker = InstallmentTracker::new(state.store.clone());
    let updated = tracker.mark_installment_paid(&reservation).await?;

    Ok(Json(updated))
}
