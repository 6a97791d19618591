pub mod draft;
pub mod reservation;
pub mod seat;
pub mod settings;
pub mod store;

pub use draft::{DraftPassenger, PassengerDetails};
pub use reservation::{
    BoundPassenger, PaymentMethod, PaymentPlan, Reservation, ReservationPassenger,
    ReservationStatus,
};
pub use seat::SeatCategory;
pub use settings::{ExcursionSettings, SettingsPatch};
pub use store::{ReservationStore, SeatAssignment, StoreError};
