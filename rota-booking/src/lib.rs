pub mod draft_set;
pub mod finalizer;
pub mod installments;
pub mod inventory;
pub mod pricing;
pub mod ticket;

pub use draft_set::PassengerDraftSet;
pub use finalizer::{FinalizeError, ReservationFinalizer};
pub use installments::{InstallmentTracker, PaymentError};
pub use inventory::{SeatClaimError, SeatInventory};
pub use pricing::{PricingError, PricingResolver};
pub use ticket::{can_issue_ticket, Ticket, TicketError};
