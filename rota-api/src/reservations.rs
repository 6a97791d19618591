use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rota_booking::{
    can_issue_ticket, PassengerDraftSet, PricingResolver, ReservationFinalizer, SeatInventory,
    Ticket,
};
use rota_core::{PassengerDetails, PaymentPlan, Reservation, SeatCategory};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
struct PassengerRequest {
    name: String,
    document: String,
    city: String,
    group_name: String,
    contact: String,
    seat_category: SeatCategory,
    seat_number: i32,
}

#[derive(Debug, Deserialize)]
struct CreateReservationRequest {
    passengers: Vec<PassengerRequest>,
    payment: PaymentPlan,
}

#[derive(Debug, Deserialize)]
struct LookupQuery {
    document: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation).get(find_reservations))
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/tickets", get(get_tickets))
}

/// POST /v1/reservations: assemble a draft set from the request, claim the
/// chosen seats against current occupancy, and finalize.
async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let settings = state.store.read_settings().await?;
    let pricing = PricingResolver::with_settings(settings);

    let snapshot = state.store.occupied_seats().await?;
    let inventory = SeatInventory::from_snapshot(snapshot);

    let mut draft = PassengerDraftSet::new();
    for passenger in req.passengers {
        let registered = draft.add(PassengerDetails {
            name: passenger.name,
            document: passenger.document,
            city: passenger.city,
            group_name: passenger.group_name,
            contact: passenger.contact,
            seat_category: passenger.seat_category,
        });
        inventory.claim_seat(&mut draft, registered.id, passenger.seat_number)?;
    }

    let finalizer = ReservationFinalizer::new(state.store.clone());
    let reservation = finalizer.finalize(&draft, &pricing, req.payment).await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /v1/reservations?document=...: reservations holding a passenger
/// with that document, newest first.
async fn find_reservations(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    if query.document.trim().is_empty() {
        return Err(AppError::ValidationError("document is required".to_string()));
    }
    let reservations = state.store.find_by_document(query.document.trim()).await?;
    Ok(Json(reservations))
}

/// GET /v1/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .store
        .get_reservation(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("reservation {id} not found")))?;
    Ok(Json(reservation))
}

/// GET /v1/reservations/{id}/tickets: one ticket per passenger, only once
/// the reservation is confirmed.
async fn get_tickets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let reservation = state
        .store
        .get_reservation(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("reservation {id} not found")))?;

    if !can_issue_ticket(&reservation) {
        return Err(AppError::ConflictError(
            "reservation is not confirmed yet".to_string(),
        ));
    }

    let settings = state.store.read_settings().await?;
    let tickets = Ticket::for_reservation(&reservation, &settings)?;
    Ok(Json(tickets))
}
