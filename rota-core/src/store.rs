use crate::reservation::{BoundPassenger, PaymentPlan, Reservation, ReservationStatus};
use crate::seat::SeatCategory;
use crate::settings::{ExcursionSettings, SettingsPatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One occupied seat, as reported by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatAssignment {
    pub category: SeatCategory,
    pub seat_number: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store's uniqueness guarantee fired: the seat already belongs to
    /// a passenger of a non-cancelled reservation.
    #[error("seat {seat_number} ({category}) is already taken")]
    SeatTaken {
        category: SeatCategory,
        seat_number: i32,
    },

    #[error("reservation not found: {0}")]
    NotFound(Uuid),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// Read/write contract against the hosted relational backend.
///
/// Uniqueness of (category, seat number) among non-cancelled reservations is
/// enforced here, at the store boundary; callers check occupancy first for
/// a friendly error but must not rely on that check alone.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Current excursion settings; creates the default row if none exists.
    async fn read_settings(&self) -> Result<ExcursionSettings, StoreError>;

    /// Partial settings update; returns the updated row.
    async fn update_settings(&self, patch: &SettingsPatch)
        -> Result<ExcursionSettings, StoreError>;

    /// Seats of all passengers belonging to non-cancelled reservations.
    async fn occupied_seats(&self) -> Result<Vec<SeatAssignment>, StoreError>;

    /// Insert a reservation shell: status pending, zero paid installments.
    async fn insert_reservation(
        &self,
        total_cents: i32,
        plan: PaymentPlan,
    ) -> Result<Uuid, StoreError>;

    /// Bind passenger rows to a reservation. Fails with `SeatTaken` if any
    /// seat is already held by a non-cancelled reservation.
    async fn insert_passengers(
        &self,
        reservation_id: Uuid,
        passengers: &[BoundPassenger],
    ) -> Result<(), StoreError>;

    /// Compensating rollback of a reservation whose passenger insert failed.
    async fn delete_reservation(&self, reservation_id: Uuid) -> Result<(), StoreError>;

    /// Set the paid-installments counter and optionally the status.
    /// Cancelling a reservation also releases its seats.
    async fn update_reservation(
        &self,
        reservation_id: Uuid,
        paid_installments: i32,
        status: Option<ReservationStatus>,
    ) -> Result<(), StoreError>;

    /// Advance the paid-installments counter by one, confirming the
    /// reservation on its first payment. The increment is relative so
    /// concurrent payments never overwrite each other. Returns the updated
    /// reservation, or `None` when the counter already reached the
    /// installment total or the reservation is cancelled.
    async fn advance_installment(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError>;

    async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Reservations containing a passenger with the given document number,
    /// newest first, passengers nested.
    async fn find_by_document(&self, document: &str) -> Result<Vec<Reservation>, StoreError>;

    /// Every reservation, newest first. Admin panel view.
    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError>;
}
