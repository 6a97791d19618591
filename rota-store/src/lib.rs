pub mod app_config;
pub mod database;
pub mod memory;
pub mod reservation_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use memory::MemoryReservationStore;
pub use reservation_repo::PgReservationStore;
