use super::BillStore;
use crate::error::StoreError;
use crate::models::bill::BillRecord;

/// In-process store; contents are lost when it is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryBillStore {
    records: Vec<BillRecord>,
}

impl MemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<BillRecord>> for MemoryBillStore {
    fn from(records: Vec<BillRecord>) -> Self {
        Self { records }
    }
}

impl BillStore for MemoryBillStore {
    fn append(&mut self, record: &BillRecord) -> Result<(), StoreError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<BillRecord>, StoreError> {
        Ok(self.records.clone())
    }
}
