use crate::draft_set::PassengerDraftSet;
use crate::pricing::{PricingError, PricingResolver};
use rota_core::{PaymentPlan, Reservation, ReservationStore, SeatCategory, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Validates a completed draft set, computes the total, and persists the
/// reservation plus its passengers as one unit, or rolls the reservation
/// back.
///
/// No transaction spans the two inserts; the compensating delete is the only
/// consistency mechanism at this layer, and it is best-effort. A failed
/// compensating delete is surfaced as `RollbackFailed` so the orphaned
/// reservation is never silently hidden.
pub struct ReservationFinalizer {
    store: Arc<dyn ReservationStore>,
}

impl ReservationFinalizer {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    pub async fn finalize(
        &self,
        draft: &PassengerDraftSet,
        pricing: &PricingResolver,
        plan: PaymentPlan,
    ) -> Result<Reservation, FinalizeError> {
        // All validation happens before any store write.
        if draft.is_empty() {
            return Err(FinalizeError::EmptyDraft);
        }
        if plan.installments < 1 {
            return Err(FinalizeError::InvalidInstallments(plan.installments));
        }
        if !pricing.is_loaded() {
            return Err(FinalizeError::SettingsNotLoaded);
        }

        let passengers = draft
            .bound_passengers()
            .map_err(|p| FinalizeError::MissingSeat {
                passenger: p.details.name.clone(),
            })?;

        let mut claimed: HashSet<(SeatCategory, i32)> = HashSet::new();
        let mut total_cents: i32 = 0;
        for passenger in &passengers {
            let category = passenger.details.seat_category;
            if !category.contains(passenger.seat_number) {
                return Err(FinalizeError::SeatOutOfRange {
                    category,
                    seat_number: passenger.seat_number,
                });
            }
            if !claimed.insert((category, passenger.seat_number)) {
                return Err(FinalizeError::DuplicateSeatInDraft {
                    category,
                    seat_number: passenger.seat_number,
                });
            }
            total_cents += pricing.unit_price(category)?;
        }

        let reservation_id = self.store.insert_reservation(total_cents, plan).await?;

        if let Err(insert_err) = self
            .store
            .insert_passengers(reservation_id, &passengers)
            .await
        {
            warn!(
                %reservation_id,
                error = %insert_err,
                "passenger insert failed, rolling reservation back"
            );
            if let Err(delete_err) = self.store.delete_reservation(reservation_id).await {
                // Persisted garbage: an orphaned pending reservation with no
                // passengers may remain. Surfaced distinctly, never hidden.
                error!(
                    %reservation_id,
                    error = %delete_err,
                    "compensating rollback failed, orphaned reservation may remain"
                );
                return Err(FinalizeError::RollbackFailed {
                    reservation_id,
                    source: delete_err,
                });
            }
            return Err(match insert_err {
                StoreError::SeatTaken {
                    category,
                    seat_number,
                } => FinalizeError::SeatConflict {
                    category,
                    seat_number,
                },
                other => FinalizeError::Store(other),
            });
        }

        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| {
                FinalizeError::Store(StoreError::Backend(format!(
                    "reservation {reservation_id} vanished after insert"
                )))
            })?;

        info!(
            %reservation_id,
            passengers = reservation.passengers.len(),
            total_cents,
            "reservation finalized"
        );

        Ok(reservation)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    #[error("draft set is empty")]
    EmptyDraft,

    #[error("passenger {passenger} has no seat selected")]
    MissingSeat { passenger: String },

    #[error("seat {seat_number} does not exist in category {category}")]
    SeatOutOfRange {
        category: SeatCategory,
        seat_number: i32,
    },

    #[error("seat {seat_number} ({category}) is claimed twice in this draft")]
    DuplicateSeatInDraft {
        category: SeatCategory,
        seat_number: i32,
    },

    #[error("installment count must be at least 1, got {0}")]
    InvalidInstallments(i32),

    #[error("excursion settings are not loaded yet")]
    SettingsNotLoaded,

    /// Another session persisted the same seat first; the reservation was
    /// rolled back and the caller should prompt a reselect.
    #[error("seat {seat_number} ({category}) was taken by another reservation")]
    SeatConflict {
        category: SeatCategory,
        seat_number: i32,
    },

    /// Passenger insert failed and the compensating delete failed too.
    #[error("rollback of reservation {reservation_id} failed: {source}")]
    RollbackFailed {
        reservation_id: Uuid,
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PricingError> for FinalizeError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::SettingsNotLoaded => FinalizeError::SettingsNotLoaded,
        }
    }
}
