use async_trait::async_trait;
use chrono::Utc;
use rota_core::{
    BoundPassenger, ExcursionSettings, PaymentPlan, Reservation, ReservationPassenger,
    ReservationStatus, ReservationStore, SeatAssignment, SettingsPatch, StoreError,
};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    settings: Option<ExcursionSettings>,
    reservations: Vec<Reservation>,
    fail_deletes: bool,
}

/// In-memory `ReservationStore` with the same observable semantics as the
/// Postgres store, including the uniqueness guarantee on (category, seat)
/// among non-cancelled reservations. Used by tests and local development.
#[derive(Default)]
pub struct MemoryReservationStore {
    inner: Mutex<Inner>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `delete_reservation` fail, to exercise the
    /// rollback-failure path.
    pub fn fail_deletes(&self, enabled: bool) {
        self.inner.lock().unwrap().fail_deletes = enabled;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn read_settings(&self) -> Result<ExcursionSettings, StoreError> {
        let mut inner = self.lock();
        Ok(inner
            .settings
            .get_or_insert_with(ExcursionSettings::default_row)
            .clone())
    }

    async fn update_settings(
        &self,
        patch: &SettingsPatch,
    ) -> Result<ExcursionSettings, StoreError> {
        let mut inner = self.lock();
        let settings = inner
            .settings
            .get_or_insert_with(ExcursionSettings::default_row);
        patch.apply_to(settings);
        Ok(settings.clone())
    }

    async fn occupied_seats(&self) -> Result<Vec<SeatAssignment>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .reservations
            .iter()
            .filter(|r| r.status != ReservationStatus::Cancelled)
            .flat_map(|r| r.passengers.iter())
            .map(|p| SeatAssignment {
                category: p.seat_category,
                seat_number: p.seat_number,
            })
            .collect())
    }

    async fn insert_reservation(
        &self,
        total_cents: i32,
        plan: PaymentPlan,
    ) -> Result<Uuid, StoreError> {
        let mut inner = self.lock();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            total_cents,
            payment_method: plan.method,
            installments: plan.installments,
            paid_installments: 0,
            status: ReservationStatus::Pending,
            passengers: Vec::new(),
        };
        let id = reservation.id;
        inner.reservations.push(reservation);
        Ok(id)
    }

    async fn insert_passengers(
        &self,
        reservation_id: Uuid,
        passengers: &[BoundPassenger],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();

        // Same guarantee the Postgres unique index provides, including
        // duplicates within the batch itself.
        let mut seen = std::collections::HashSet::new();
        for passenger in passengers {
            let duplicate_in_batch =
                !seen.insert((passenger.details.seat_category, passenger.seat_number));
            let taken = duplicate_in_batch
                || inner
                .reservations
                .iter()
                .filter(|r| r.status != ReservationStatus::Cancelled)
                .flat_map(|r| r.passengers.iter())
                .any(|p| {
                    p.seat_category == passenger.details.seat_category
                        && p.seat_number == passenger.seat_number
                });
            if taken {
                return Err(StoreError::SeatTaken {
                    category: passenger.details.seat_category,
                    seat_number: passenger.seat_number,
                });
            }
        }

        let reservation = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation_id)
            .ok_or(StoreError::NotFound(reservation_id))?;

        for passenger in passengers {
            reservation.passengers.push(ReservationPassenger {
                id: Uuid::new_v4(),
                reservation_id,
                name: passenger.details.name.clone(),
                document: passenger.details.document.clone(),
                city: passenger.details.city.clone(),
                group_name: passenger.details.group_name.clone(),
                contact: passenger.details.contact.clone(),
                seat_category: passenger.details.seat_category,
                seat_number: passenger.seat_number,
            });
        }
        Ok(())
    }

    async fn delete_reservation(&self, reservation_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_deletes {
            return Err(StoreError::Backend("simulated delete failure".to_string()));
        }
        let index = inner
            .reservations
            .iter()
            .position(|r| r.id == reservation_id)
            .ok_or(StoreError::NotFound(reservation_id))?;
        inner.reservations.remove(index);
        Ok(())
    }

    async fn update_reservation(
        &self,
        reservation_id: Uuid,
        paid_installments: i32,
        status: Option<ReservationStatus>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let reservation = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation_id)
            .ok_or(StoreError::NotFound(reservation_id))?;
        reservation.paid_installments = paid_installments;
        if let Some(status) = status {
            reservation.status = status;
        }
        Ok(())
    }

    async fn advance_installment(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError> {
        let mut inner = self.lock();
        let reservation = inner
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation_id)
            .ok_or(StoreError::NotFound(reservation_id))?;
        if reservation.status == ReservationStatus::Cancelled
            || reservation.paid_installments >= reservation.installments
        {
            return Ok(None);
        }
        if reservation.paid_installments == 0 {
            reservation.status = ReservationStatus::Confirmed;
        }
        reservation.paid_installments += 1;
        Ok(Some(reservation.clone()))
    }

    async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned())
    }

    async fn find_by_document(&self, document: &str) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.lock();
        let mut matches: Vec<Reservation> = inner
            .reservations
            .iter()
            .filter(|r| r.passengers.iter().any(|p| p.document == document))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.lock();
        let mut all = inner.reservations.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::{PassengerDetails, PaymentMethod, SeatCategory};

    fn bound(name: &str, category: SeatCategory, seat_number: i32) -> BoundPassenger {
        BoundPassenger {
            details: PassengerDetails {
                name: name.to_string(),
                document: "123.456.789-00".to_string(),
                city: "Imperatriz".to_string(),
                group_name: "Grupo Central".to_string(),
                contact: "+55 99 99999-0000".to_string(),
                seat_category: category,
            },
            seat_number,
        }
    }

    fn plan() -> PaymentPlan {
        PaymentPlan {
            method: PaymentMethod::Pix,
            installments: 3,
        }
    }

    #[tokio::test]
    async fn test_settings_default_row_is_created_once() {
        let store = MemoryReservationStore::new();
        let first = store.read_settings().await.unwrap();
        let second = store.read_settings().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.leito_price_cents, 18999);
    }

    #[tokio::test]
    async fn test_seat_uniqueness_is_enforced_at_insert() {
        let store = MemoryReservationStore::new();
        let first = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .insert_passengers(first, &[bound("Ana", SeatCategory::Leito, 3)])
            .await
            .unwrap();

        let second = store.insert_reservation(18999, plan()).await.unwrap();
        let err = store
            .insert_passengers(second, &[bound("Bruno", SeatCategory::Leito, 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SeatTaken { seat_number: 3, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_reservations_release_their_seats() {
        let store = MemoryReservationStore::new();
        let first = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .insert_passengers(first, &[bound("Ana", SeatCategory::Leito, 3)])
            .await
            .unwrap();
        store
            .update_reservation(first, 0, Some(ReservationStatus::Cancelled))
            .await
            .unwrap();

        assert!(store.occupied_seats().await.unwrap().is_empty());

        let second = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .insert_passengers(second, &[bound("Bruno", SeatCategory::Leito, 3)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_advance_installment_is_relative_and_bounded() {
        let store = MemoryReservationStore::new();
        let id = store.insert_reservation(18999, plan()).await.unwrap();

        let first = store.advance_installment(id).await.unwrap().unwrap();
        assert_eq!(first.paid_installments, 1);
        assert_eq!(first.status, ReservationStatus::Confirmed);

        store.advance_installment(id).await.unwrap().unwrap();
        let third = store.advance_installment(id).await.unwrap().unwrap();
        assert_eq!(third.paid_installments, 3);

        // Fully paid: no further increments.
        assert!(store.advance_installment(id).await.unwrap().is_none());

        let missing = store.advance_installment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));

        let cancelled = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .update_reservation(cancelled, 0, Some(ReservationStatus::Cancelled))
            .await
            .unwrap();
        assert!(store.advance_installment(cancelled).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_document_newest_first() {
        let store = MemoryReservationStore::new();
        let older = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .insert_passengers(older, &[bound("Ana", SeatCategory::Leito, 1)])
            .await
            .unwrap();
        let newer = store.insert_reservation(18999, plan()).await.unwrap();
        store
            .insert_passengers(newer, &[bound("Ana", SeatCategory::Leito, 2)])
            .await
            .unwrap();

        let found = store.find_by_document("123.456.789-00").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].created_at >= found[1].created_at);
        assert!(store.find_by_document("000").await.unwrap().is_empty());
    }
}
