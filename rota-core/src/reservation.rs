use crate::draft::PassengerDetails;
use crate::seat::SeatCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::CreditCard => "credit_card",
        }
    }
}

/// The payment plan chosen at checkout: method plus how many equal
/// installments the total is split into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentPlan {
    pub method: PaymentMethod,
    pub installments: i32,
}

/// A draft passenger whose seat has been fixed, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundPassenger {
    pub details: PassengerDetails,
    pub seat_number: i32,
}

/// A passenger row bound to a persisted reservation. Immutable after
/// finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationPassenger {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub name: String,
    pub document: String,
    pub city: String,
    pub group_name: String,
    pub contact: String,
    pub seat_category: SeatCategory,
    pub seat_number: i32,
}

/// A persisted reservation with its bound passengers.
///
/// Invariant: the passenger list is never empty and every passenger carries
/// a seat number. The finalizer either persists the whole unit or rolls the
/// reservation back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_cents: i32,
    pub payment_method: PaymentMethod,
    pub installments: i32,
    pub paid_installments: i32,
    pub status: ReservationStatus,
    pub passengers: Vec<ReservationPassenger>,
}

impl Reservation {
    /// Human-readable identifier printed on tickets and the admin panel.
    pub fn short_code(&self) -> String {
        self.id.simple().to_string()[..8].to_uppercase()
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_installments >= self.installments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_code_is_eight_upper_hex() {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            total_cents: 0,
            payment_method: PaymentMethod::Pix,
            installments: 1,
            paid_installments: 0,
            status: ReservationStatus::Pending,
            passengers: vec![],
        };
        let code = reservation.short_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
