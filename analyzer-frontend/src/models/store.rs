//! In-memory session store that removes records once they expire.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

/// Session records keyed by id.
///
/// Expired records are dropped on load and by [`ExpiredDeletion::delete_expired`],
/// which `main` runs periodically.
#[derive(Debug, Clone, Default)]
pub struct IdleSessionStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl IdleSessionStore {
    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<Id, Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_live(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for IdleSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records();
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records().insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut records = self.records();
        let Some(record) = records.get(session_id).cloned() else {
            return Ok(None);
        };

        if is_live(&record) {
            Ok(Some(record))
        } else {
            records.remove(session_id);
            Ok(None)
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records().remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for IdleSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| is_live(record));

        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions deleted");
        }
        Ok(())
    }
}
