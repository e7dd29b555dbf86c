use crate::UnaryHandler;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::PoisonError;

/// Handlers keyed by `method_id_hash` of their method name.
pub type HandlerTable = HashMap<u64, UnaryHandler>;

/// Lock around a `HandlerTable`.
///
/// Lookups clone the handler out so the lock is never held across a
/// handler's await points.
#[async_trait::async_trait]
pub trait HandlerTableLock: Send + Sync {
    /// Adds `handler` under `method_id`. Returns `false`, leaving the table
    /// untouched, when the id is taken.
    async fn insert_handler(&self, method_id: u64, handler: UnaryHandler) -> bool;

    async fn find_handler(&self, method_id: u64) -> Option<UnaryHandler>;
}

fn insert_vacant(table: &mut HandlerTable, method_id: u64, handler: UnaryHandler) -> bool {
    match table.entry(method_id) {
        Entry::Occupied(_) => false,
        Entry::Vacant(entry) => {
            entry.insert(handler);
            true
        }
    }
}

#[cfg(feature = "tokio_support")]
#[async_trait::async_trait]
impl HandlerTableLock for tokio::sync::Mutex<HandlerTable> {
    async fn insert_handler(&self, method_id: u64, handler: UnaryHandler) -> bool {
        insert_vacant(&mut *self.lock().await, method_id, handler)
    }

    async fn find_handler(&self, method_id: u64) -> Option<UnaryHandler> {
        self.lock().await.get(&method_id).cloned()
    }
}

// Every write is a single map insert, so poisoning is ignored.
#[async_trait::async_trait]
impl HandlerTableLock for std::sync::Mutex<HandlerTable> {
    async fn insert_handler(&self, method_id: u64, handler: UnaryHandler) -> bool {
        let mut table = self.lock().unwrap_or_else(PoisonError::into_inner);
        insert_vacant(&mut table, method_id, handler)
    }

    async fn find_handler(&self, method_id: u64) -> Option<UnaryHandler> {
        let table = self.lock().unwrap_or_else(PoisonError::into_inner);
        table.get(&method_id).cloned()
    }
}
