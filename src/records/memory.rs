//! In-memory record store.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{RecordStore, RecordStoreError, UserRecord};

/// DashMap-backed store keyed by lower-cased email.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, UserRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Insert or replace a record
    pub fn upsert(&self, record: UserRecord) {
        self.records.insert(normalize(&record.email), record);
    }

    pub fn remove(&self, email: &str) -> Option<UserRecord> {
        self.records.remove(&normalize(email)).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RecordStoreError> {
        Ok(self
            .records
            .get(&normalize(email))
            .map(|entry| entry.value().clone()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
