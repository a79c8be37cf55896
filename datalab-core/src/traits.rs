use async_trait::async_trait;

use crate::domain::Record;
use crate::error::Result;

/// Supplier of the records the query filter searches. The filter only ever
/// reads what this returns.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn records(&self) -> Result<Vec<Record>>;
}

/// Fixed, in-memory record collection.
#[derive(Debug, Clone, Default)]
pub struct StaticRecords {
    records: Vec<Record>,
}

impl StaticRecords {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for StaticRecords {
    async fn records(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}
