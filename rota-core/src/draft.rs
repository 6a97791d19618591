use crate::seat::SeatCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration-form data for one passenger, minus anything assigned later
/// (identifier, seat number).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassengerDetails {
    pub name: String,
    pub document: String,
    pub city: String,
    pub group_name: String,
    pub contact: String,
    pub seat_category: SeatCategory,
}

/// A passenger being assembled client-side during one checkout flow.
/// Lives only in memory until the draft set is finalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftPassenger {
    pub id: Uuid,
    pub details: PassengerDetails,
    /// None until the passenger picks a seat on the diagram.
    pub seat_number: Option<i32>,
}

impl DraftPassenger {
    pub fn new(details: PassengerDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            details,
            seat_number: None,
        }
    }

    pub fn category(&self) -> SeatCategory {
        self.details.seat_category
    }
}
