use rota_booking::{
    can_issue_ticket, FinalizeError, InstallmentTracker, PassengerDraftSet, PricingResolver,
    ReservationFinalizer, SeatInventory, Ticket,
};
use rota_core::{
    PassengerDetails, PaymentMethod, PaymentPlan, ReservationStatus, ReservationStore,
    SeatCategory, SettingsPatch,
};
use rota_store::MemoryReservationStore;
use std::sync::Arc;

fn details(name: &str, document: &str, category: SeatCategory) -> PassengerDetails {
    PassengerDetails {
        name: name.to_string(),
        document: document.to_string(),
        city: "Imperatriz".to_string(),
        group_name: "Grupo Central".to_string(),
        contact: "+55 99 99999-0000".to_string(),
        seat_category: category,
    }
}

fn pix(installments: i32) -> PaymentPlan {
    PaymentPlan {
        method: PaymentMethod::Pix,
        installments,
    }
}

async fn loaded_pricing(store: &Arc<MemoryReservationStore>) -> PricingResolver {
    let settings = store.read_settings().await.unwrap();
    PricingResolver::with_settings(settings)
}

#[tokio::test]
async fn test_finalize_persists_reservation_with_all_passengers() {
    let store = Arc::new(MemoryReservationStore::new());
    // The spec scenario: leito 189.99 + semi-leito 119.99 = 309.98.
    store
        .update_settings(&SettingsPatch {
            leito_price_cents: Some(18999),
            semi_leito_price_cents: Some(11999),
            ..Default::default()
        })
        .await
        .unwrap();
    let pricing = loaded_pricing(&store).await;

    let inventory = SeatInventory::from_snapshot(store.occupied_seats().await.unwrap());
    let mut draft = PassengerDraftSet::new();
    let a = draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    let b = draft.add(details("Bruno", "222.222.222-22", SeatCategory::SemiLeito));
    inventory.claim_seat(&mut draft, a.id, 3).unwrap();
    inventory.claim_seat(&mut draft, b.id, 5).unwrap();

    let finalizer = ReservationFinalizer::new(store.clone());
    let reservation = finalizer.finalize(&draft, &pricing, pix(2)).await.unwrap();

    assert_eq!(reservation.total_cents, 30998);
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.paid_installments, 0);
    assert_eq!(reservation.installments, 2);
    assert_eq!(reservation.passengers.len(), 2);
    assert!(reservation.passengers.iter().all(|p| p.seat_number > 0));

    // Queryable by any subsequent lookup; the finalizer leaves the draft alone.
    assert!(store
        .get_reservation(reservation.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(draft.len(), 2);
}

#[tokio::test]
async fn test_finalize_rejects_missing_seat_without_store_writes() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;

    let mut draft = PassengerDraftSet::new();
    draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));

    let finalizer = ReservationFinalizer::new(store.clone());
    let err = finalizer.finalize(&draft, &pricing, pix(1)).await.unwrap_err();
    assert!(matches!(err, FinalizeError::MissingSeat { .. }));
    assert!(store.list_reservations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_finalize_rejects_empty_draft_and_unloaded_settings() {
    let store = Arc::new(MemoryReservationStore::new());
    let finalizer = ReservationFinalizer::new(store.clone());

    let empty = PassengerDraftSet::new();
    let loaded = loaded_pricing(&store).await;
    assert!(matches!(
        finalizer.finalize(&empty, &loaded, pix(1)).await.unwrap_err(),
        FinalizeError::EmptyDraft
    ));

    let mut draft = PassengerDraftSet::new();
    let a = draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    draft.set_seat(a.id, 3).unwrap();
    assert!(matches!(
        finalizer
            .finalize(&draft, &PricingResolver::new(), pix(1))
            .await
            .unwrap_err(),
        FinalizeError::SettingsNotLoaded
    ));
    assert!(store.list_reservations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seat_conflict_rolls_reservation_back() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;
    let finalizer = ReservationFinalizer::new(store.clone());

    let mut first = PassengerDraftSet::new();
    let a = first.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    first.set_seat(a.id, 3).unwrap();
    finalizer.finalize(&first, &pricing, pix(1)).await.unwrap();

    // A second session that never saw the first reservation races for the
    // same seat; the store constraint fires and the shell is rolled back.
    let mut second = PassengerDraftSet::new();
    let b = second.add(details("Bruno", "222.222.222-22", SeatCategory::Leito));
    second.set_seat(b.id, 3).unwrap();

    let err = finalizer.finalize(&second, &pricing, pix(1)).await.unwrap_err();
    assert!(matches!(err, FinalizeError::SeatConflict { seat_number: 3, .. }));
    assert_eq!(store.list_reservations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_rollback_is_surfaced_distinctly() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;
    let finalizer = ReservationFinalizer::new(store.clone());

    let mut first = PassengerDraftSet::new();
    let a = first.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    first.set_seat(a.id, 3).unwrap();
    finalizer.finalize(&first, &pricing, pix(1)).await.unwrap();

    store.fail_deletes(true);
    let mut second = PassengerDraftSet::new();
    let b = second.add(details("Bruno", "222.222.222-22", SeatCategory::Leito));
    second.set_seat(b.id, 3).unwrap();

    let err = finalizer.finalize(&second, &pricing, pix(1)).await.unwrap_err();
    let orphan_id = match err {
        FinalizeError::RollbackFailed { reservation_id, .. } => reservation_id,
        other => panic!("expected RollbackFailed, got {other:?}"),
    };

    // The orphaned shell is persisted garbage: visible, with no passengers.
    let orphan = store.get_reservation(orphan_id).await.unwrap().unwrap();
    assert!(orphan.passengers.is_empty());
}

#[tokio::test]
async fn test_installments_confirm_on_first_payment_then_noop_when_paid() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;
    let finalizer = ReservationFinalizer::new(store.clone());

    let mut draft = PassengerDraftSet::new();
    let a = draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    draft.set_seat(a.id, 3).unwrap();
    let reservation = finalizer.finalize(&draft, &pricing, pix(3)).await.unwrap();
    assert!(!can_issue_ticket(&reservation));

    let tracker = InstallmentTracker::new(store.clone());

    let paid_once = tracker.mark_installment_paid(&reservation).await.unwrap();
    assert_eq!(paid_once.paid_installments, 1);
    assert_eq!(paid_once.status, ReservationStatus::Confirmed);
    assert!(can_issue_ticket(&paid_once));

    let paid_twice = tracker.mark_installment_paid(&paid_once).await.unwrap();
    assert_eq!(paid_twice.paid_installments, 2);
    assert_eq!(paid_twice.status, ReservationStatus::Confirmed);

    let paid_thrice = tracker.mark_installment_paid(&paid_twice).await.unwrap();
    assert_eq!(paid_thrice.paid_installments, 3);

    // Fully paid: further calls are no-ops.
    let again = tracker.mark_installment_paid(&paid_thrice).await.unwrap();
    assert_eq!(again.paid_installments, 3);
    assert_eq!(again.status, ReservationStatus::Confirmed);

    // The persisted copy advanced with each confirmed write.
    let persisted = store.get_reservation(reservation.id).await.unwrap().unwrap();
    assert_eq!(persisted.paid_installments, 3);
    assert_eq!(persisted.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_concurrent_installment_payments_are_not_lost() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;
    let finalizer = ReservationFinalizer::new(store.clone());

    let mut draft = PassengerDraftSet::new();
    let a = draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    draft.set_seat(a.id, 3).unwrap();
    let reservation = finalizer.finalize(&draft, &pricing, pix(3)).await.unwrap();

    // Two admin sessions mark a payment against the same stale copy. Each
    // must land as its own installment, not overwrite the other.
    let first_session = InstallmentTracker::new(store.clone());
    let second_session = InstallmentTracker::new(store.clone());
    let (first, second) = tokio::join!(
        first_session.mark_installment_paid(&reservation),
        second_session.mark_installment_paid(&reservation)
    );
    first.unwrap();
    second.unwrap();

    let persisted = store.get_reservation(reservation.id).await.unwrap().unwrap();
    assert_eq!(persisted.paid_installments, 2);
    assert_eq!(persisted.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_tickets_only_for_confirmed_reservations() {
    let store = Arc::new(MemoryReservationStore::new());
    let pricing = loaded_pricing(&store).await;
    let settings = store.read_settings().await.unwrap();
    let finalizer = ReservationFinalizer::new(store.clone());

    let mut draft = PassengerDraftSet::new();
    let a = draft.add(details("Ana", "111.111.111-11", SeatCategory::Leito));
    draft.set_seat(a.id, 3).unwrap();
    let reservation = finalizer.finalize(&draft, &pricing, pix(2)).await.unwrap();

    assert!(Ticket::for_reservation(&reservation, &settings).is_err());

    let tracker = InstallmentTracker::new(store.clone());
    let confirmed = tracker.mark_installment_paid(&reservation).await.unwrap();

    let tickets = Ticket::for_reservation(&confirmed, &settings).unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].passenger_name, "Ana");
    assert_eq!(tickets[0].seat_number, 3);
    assert_eq!(tickets[0].reservation_code, confirmed.short_code());
    assert_eq!(tickets[0].trip_start, settings.trip_start);
}
