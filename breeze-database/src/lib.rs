pub mod audit;
pub mod database;
pub mod impls;
pub mod memory;
pub mod model;
pub mod store;

pub use audit::AuditLogger;
pub use database::{Database, MIGRATOR};
pub use memory::MemoryStore;
pub use store::{LogStore, SettingsStore};
