//! Profile persistence and deferred provisioning.

pub mod memory;
pub mod postgres;
pub mod provisioner;
pub mod store;

pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;
pub use provisioner::{ProfileProvisioner, ProvisionOutcome};
pub use store::ProfileStore;
