use rota_core::{BoundPassenger, DraftPassenger, PassengerDetails};
use uuid::Uuid;

/// The ordered set of passengers being assembled for one checkout session.
///
/// Purely local state: populated across registration and seat-selection
/// round trips, consumed wholesale by the finalizer, cleared by the caller
/// after a successful checkout or on abandonment.
#[derive(Debug, Clone, Default)]
pub struct PassengerDraftSet {
    passengers: Vec<DraftPassenger>,
}

impl PassengerDraftSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a passenger; assigns a fresh identifier, seat unset.
    pub fn add(&mut self, details: PassengerDetails) -> DraftPassenger {
        let passenger = DraftPassenger::new(details);
        self.passengers.push(passenger.clone());
        passenger
    }

    /// Attach a seat number to a draft passenger. Range and occupancy checks
    /// belong to `SeatInventory::claim_seat`; this is the raw mutation.
    pub fn set_seat(&mut self, passenger_id: Uuid, seat_number: i32) -> Result<(), UnknownPassenger> {
        let passenger = self
            .passengers
            .iter_mut()
            .find(|p| p.id == passenger_id)
            .ok_or(UnknownPassenger(passenger_id))?;
        passenger.seat_number = Some(seat_number);
        Ok(())
    }

    pub fn remove(&mut self, passenger_id: Uuid) -> Result<(), UnknownPassenger> {
        let index = self
            .passengers
            .iter()
            .position(|p| p.id == passenger_id)
            .ok_or(UnknownPassenger(passenger_id))?;
        self.passengers.remove(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.passengers.clear();
    }

    pub fn get(&self, passenger_id: Uuid) -> Option<&DraftPassenger> {
        self.passengers.iter().find(|p| p.id == passenger_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftPassenger> {
        self.passengers.iter()
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    /// All passengers with their seats fixed, or the first passenger still
    /// missing one.
    pub fn bound_passengers(&self) -> Result<Vec<BoundPassenger>, &DraftPassenger> {
        self.passengers
            .iter()
            .map(|p| match p.seat_number {
                Some(seat_number) => Ok(BoundPassenger {
                    details: p.details.clone(),
                    seat_number,
                }),
                None => Err(p),
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("no draft passenger with id {0}")]
pub struct UnknownPassenger(pub Uuid);
