use crate::draft_set::PassengerDraftSet;
use rota_core::{SeatAssignment, SeatCategory};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Tracks which seats are taken per category: persisted seats from
/// non-cancelled reservations, combined at query time with seats already
/// claimed by other passengers in the active draft set.
///
/// The snapshot is refreshed whenever new persisted data is fetched. The
/// claim check here is advisory only; two sessions can still race each
/// other, and the store's unique constraint stays the final arbiter.
#[derive(Debug, Clone, Default)]
pub struct SeatInventory {
    persisted: HashMap<SeatCategory, BTreeSet<i32>>,
}

impl SeatInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the inventory from a store occupancy snapshot.
    pub fn from_snapshot(assignments: Vec<SeatAssignment>) -> Self {
        let mut inventory = Self::new();
        inventory.refresh(assignments);
        inventory
    }

    /// Replace the persisted view with a fresh snapshot.
    pub fn refresh(&mut self, assignments: Vec<SeatAssignment>) {
        self.persisted.clear();
        for assignment in assignments {
            self.persisted
                .entry(assignment.category)
                .or_default()
                .insert(assignment.seat_number);
        }
    }

    /// Union of persisted seats and seats claimed by draft passengers of the
    /// same category, excluding the passenger given in `for_passenger` so a
    /// passenger's own claim never blocks them.
    pub fn occupied_seats(
        &self,
        category: SeatCategory,
        draft: &PassengerDraftSet,
        for_passenger: Option<Uuid>,
    ) -> BTreeSet<i32> {
        let mut occupied: BTreeSet<i32> = self
            .persisted
            .get(&category)
            .cloned()
            .unwrap_or_default();

        for passenger in draft.iter() {
            if Some(passenger.id) == for_passenger {
                continue;
            }
            if passenger.category() == category {
                if let Some(seat) = passenger.seat_number {
                    occupied.insert(seat);
                }
            }
        }

        occupied
    }

    /// Claim a seat for a draft passenger. Rejects seats outside the
    /// category's fixed range and seats occupied at claim time; on success
    /// the seat is attached to the passenger.
    pub fn claim_seat(
        &self,
        draft: &mut PassengerDraftSet,
        passenger_id: Uuid,
        seat_number: i32,
    ) -> Result<(), SeatClaimError> {
        let category = draft
            .get(passenger_id)
            .ok_or(SeatClaimError::UnknownPassenger(passenger_id))?
            .category();

        if !category.contains(seat_number) {
            return Err(SeatClaimError::OutOfRange {
                category,
                seat_number,
            });
        }

        if self
            .occupied_seats(category, draft, Some(passenger_id))
            .contains(&seat_number)
        {
            return Err(SeatClaimError::AlreadyTaken {
                category,
                seat_number,
            });
        }

        draft
            .set_seat(passenger_id, seat_number)
            .map_err(|e| SeatClaimError::UnknownPassenger(e.0))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatClaimError {
    #[error("no draft passenger with id {0}")]
    UnknownPassenger(Uuid),

    #[error("seat {seat_number} does not exist in category {category}")]
    OutOfRange {
        category: SeatCategory,
        seat_number: i32,
    },

    #[error("seat {seat_number} ({category}) is already taken")]
    AlreadyTaken {
        category: SeatCategory,
        seat_number: i32,
    },
}
