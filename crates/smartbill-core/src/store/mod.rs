//! Persistence for extracted bills.

mod csv_store;
mod memory;

pub use csv_store::CsvBillStore;
pub use memory::MemoryBillStore;

use crate::error::StoreError;
use crate::models::bill::BillRecord;

/// Column names of the tabular bill store, in order.
pub const COLUMNS: [&str; 4] = ["type", "amount", "due_date", "source_file_name"];

/// An append-only table of bills.
pub trait BillStore {
    /// Append one record as a new row.
    fn append(&mut self, record: &BillRecord) -> Result<(), StoreError>;

    /// Every stored record, in insertion order.
    fn list_all(&self) -> Result<Vec<BillRecord>, StoreError>;
}

impl<S: BillStore + ?Sized> BillStore for Box<S> {
    fn append(&mut self, record: &BillRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn list_all(&self) -> Result<Vec<BillRecord>, StoreError> {
        (**self).list_all()
    }
}
