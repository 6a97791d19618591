use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use rota_booking::{PassengerDraftSet, SeatInventory};
use rota_core::SeatCategory;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    category: SeatCategory,
    seat_count: i32,
    occupied: Vec<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/seats/{category}", get(seat_map))
}

/// GET /v1/seats/{category}: occupied seat numbers for one category's
/// fixed diagram, from the persisted non-cancelled reservations.
async fn seat_map(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let category: SeatCategory = category
        .parse()
        .map_err(|_| AppError::ValidationError(format!("unknown seat category: {category}")))?;

    let snapshot = state.store.occupied_seats().await?;

    let inventory = SeatInventory::from_snapshot(snapshot);
    let occupied = inventory
        .occupied_seats(category, &PassengerDraftSet::new(), None)
        .into_iter()
        .collect();

    Ok(Json(SeatMapResponse {
        category,
        seat_count: category.seat_count(),
        occupied,
    }))
}
