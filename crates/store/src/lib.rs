pub mod memory;
pub mod snapshot;

pub use memory::InMemoryCatalog;
pub use snapshot::{CatalogResource, CatalogSnapshot, SnapshotError};
