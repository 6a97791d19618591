use chrono::NaiveDate;
use rota_core::{ExcursionSettings, Reservation, ReservationStatus, SeatCategory};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Only confirmed reservations may issue tickets, regardless of how many
/// installments remain.
pub fn can_issue_ticket(reservation: &Reservation) -> bool {
    reservation.status == ReservationStatus::Confirmed
}

/// The printable/shareable ticket content for one passenger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub reservation_code: String,
    pub passenger_name: String,
    pub document: String,
    pub seat_category: SeatCategory,
    pub seat_number: i32,
    pub trip_start: NaiveDate,
    pub trip_end: NaiveDate,
}

impl Ticket {
    /// Ticket for one passenger of a confirmed reservation.
    pub fn for_passenger(
        reservation: &Reservation,
        passenger_id: Uuid,
        settings: &ExcursionSettings,
    ) -> Result<Ticket, TicketError> {
        if !can_issue_ticket(reservation) {
            return Err(TicketError::NotConfirmed {
                status: reservation.status,
            });
        }
        let passenger = reservation
            .passengers
            .iter()
            .find(|p| p.id == passenger_id)
            .ok_or(TicketError::UnknownPassenger(passenger_id))?;

        Ok(Ticket {
            reservation_code: reservation.short_code(),
            passenger_name: passenger.name.clone(),
            document: passenger.document.clone(),
            seat_category: passenger.seat_category,
            seat_number: passenger.seat_number,
            trip_start: settings.trip_start,
            trip_end: settings.trip_end,
        })
    }

    /// Tickets for every passenger of a confirmed reservation.
    pub fn for_reservation(
        reservation: &Reservation,
        settings: &ExcursionSettings,
    ) -> Result<Vec<Ticket>, TicketError> {
        reservation
            .passengers
            .iter()
            .map(|p| Ticket::for_passenger(reservation, p.id, settings))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("reservation is not confirmed (status {})", status.as_str())]
    NotConfirmed { status: ReservationStatus },

    #[error("no passenger with id {0} on this reservation")]
    UnknownPassenger(Uuid),
}
