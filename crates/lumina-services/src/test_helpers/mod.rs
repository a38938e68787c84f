//! In-memory test doubles for the object store and the metadata store.
//!
//! Used by this crate's unit tests and by the API integration tests; both
//! support failure injection so saga compensation paths can be exercised.

mod mock_objects;
mod mock_records;

pub use mock_objects::{MockObjectStore, StoredObject};
pub use mock_records::MockRecordStore;
