use rota_core::{Reservation, ReservationStatus, ReservationStore, StoreError};
use std::sync::Arc;
use tracing::info;

/// Advances a reservation's paid-installment counter. The first payment
/// also flips the status from pending to confirmed, which is what makes the
/// reservation eligible for ticket issuance.
///
/// The in-memory copy is only advanced after the store confirms the write;
/// on failure the caller's reservation is untouched and the error is
/// retry-capable.
pub struct InstallmentTracker {
    store: Arc<dyn ReservationStore>,
}

impl InstallmentTracker {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    pub async fn mark_installment_paid(
        &self,
        reservation: &Reservation,
    ) -> Result<Reservation, PaymentError> {
        if reservation.status == ReservationStatus::Cancelled {
            return Err(PaymentError::Cancelled);
        }
        if reservation.is_fully_paid() {
            // Already fully paid: a no-op, not an error.
            return Ok(reservation.clone());
        }

        // The store increments relatively, so a concurrent payment against
        // the same stale copy still lands as its own installment.
        let updated = match self.store.advance_installment(reservation.id).await? {
            Some(updated) => updated,
            None => {
                // Someone else finished or cancelled it since this copy
                // was read; report the persisted state.
                let current = self
                    .store
                    .get_reservation(reservation.id)
                    .await?
                    .ok_or(StoreError::NotFound(reservation.id))?;
                if current.status == ReservationStatus::Cancelled {
                    return Err(PaymentError::Cancelled);
                }
                return Ok(current);
            }
        };

        info!(
            reservation_id = %updated.id,
            paid = updated.paid_installments,
            installments = updated.installments,
            status = updated.status.as_str(),
            "installment marked paid"
        );

        Ok(updated)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("reservation is cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}
