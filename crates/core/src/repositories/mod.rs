//! [`BookingStore`] implementations.
//!
//! - [`memory::InMemoryBookingStore`] keeps records in process memory.
//! - [`file::FileBookingStore`] keeps one YAML document per record in sharded directories.

pub mod file;
pub(crate) mod helpers;
pub mod memory;

use crate::config::{CoreConfig, StoreBackend};
use crate::store::BookingStore;
use crate::BookingResult;
use std::sync::Arc;

/// Opens the store selected by `cfg.store_backend()`.
///
/// # Errors
///
/// Returns `BookingError::StorageDirCreation` if the file backend cannot create its data
/// directory.
pub fn open_store(cfg: Arc<CoreConfig>) -> BookingResult<Arc<dyn BookingStore>> {
    match cfg.store_backend() {
        StoreBackend::Memory => Ok(Arc::new(memory::InMemoryBookingStore::new())),
        StoreBackend::File => Ok(Arc::new(file::FileBookingStore::open(cfg)?)),
    }
}
