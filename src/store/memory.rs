use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{Mutator, RecordStore, StoreError, StoredRecord, UpdateError};

/// In-memory [`RecordStore`] with per-record serialization.
///
/// The registry lock is held only long enough to resolve a record's cell;
/// mutations run under that record's own mutex. Contention is therefore
/// scoped to a single record id, and updates to different records never
/// queue behind each other.
pub struct MemoryStore<T: StoredRecord> {
    records: RwLock<HashMap<T::Id, Arc<Mutex<T>>>>,
}

impl<T: StoredRecord> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: StoredRecord> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: StoredRecord> RecordStore<T> for MemoryStore<T> {
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        let cell = self.records.read().await.get(id).cloned();
        match cell {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.id()) {
            return Err(StoreError::AlreadyExists(record.id().to_string()));
        }
        records.insert(record.id().clone(), Arc::new(Mutex::new(record)));
        Ok(())
    }

    async fn update_if_present(
        &self,
        id: &T::Id,
        mutate: Mutator<T>,
    ) -> Result<T, UpdateError<T::Rejection>> {
        let cell = self.records.read().await.get(id).cloned();
        let cell = match cell {
            Some(cell) => cell,
            None => return Err(UpdateError::NotFound(id.to_string())),
        };

        let mut current = cell.lock().await;
        let next = mutate(&current).map_err(UpdateError::Rejected)?;
        if next.id() != id {
            // Mutations replace a record in place; they never rekey it.
            return Err(UpdateError::Unavailable(format!(
                "mutation changed record id {}",
                id
            )));
        }
        *current = next.clone();
        Ok(next)
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let cells: Vec<Arc<Mutex<T>>> = self.records.read().await.values().cloned().collect();
        let mut records = Vec::with_capacity(cells.len());
        for cell in cells {
            records.push(cell.lock().await.clone());
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tally {
        id: String,
        value: u32,
    }

    impl StoredRecord for Tally {
        type Id = String;
        type Rejection = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    fn bump(by: u32) -> Mutator<Tally> {
        Box::new(move |tally: &Tally| {
            Ok(Tally {
                id: tally.id.clone(),
                value: tally.value + by,
            })
        })
    }

    #[tokio::test]
    async fn concurrent_updates_lose_nothing() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(Tally {
                id: "t1".to_string(),
                value: 0,
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..100 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_if_present(&"t1".to_string(), bump(1))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let tally = store.get(&"t1".to_string()).await.unwrap().unwrap();
        assert_eq!(tally.value, 100);
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_record_unchanged() {
        let store = MemoryStore::new();
        store
            .insert(Tally {
                id: "t1".to_string(),
                value: 7,
            })
            .await
            .unwrap();

        let result = store
            .update_if_present(
                &"t1".to_string(),
                Box::new(|_: &Tally| Err("not today".to_string())),
            )
            .await;
        assert_eq!(result, Err(UpdateError::Rejected("not today".to_string())));

        let tally = store.get(&"t1".to_string()).await.unwrap().unwrap();
        assert_eq!(tally.value, 7);
    }

    #[tokio::test]
    async fn update_on_missing_record_is_not_found() {
        let store: MemoryStore<Tally> = MemoryStore::new();
        let result = store.update_if_present(&"nope".to_string(), bump(1)).await;
        assert_eq!(result, Err(UpdateError::NotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn duplicate_insert_is_refused() {
        let store = MemoryStore::new();
        let tally = Tally {
            id: "t1".to_string(),
            value: 0,
        };
        store.insert(tally.clone()).await.unwrap();
        assert_eq!(
            store.insert(tally).await,
            Err(StoreError::AlreadyExists("t1".to_string()))
        );
    }

    #[tokio::test]
    async fn rekeying_mutation_is_refused() {
        let store = MemoryStore::new();
        store
            .insert(Tally {
                id: "t1".to_string(),
                value: 3,
            })
            .await
            .unwrap();

        let result = store
            .update_if_present(
                &"t1".to_string(),
                Box::new(|_: &Tally| {
                    Ok(Tally {
                        id: "t2".to_string(),
                        value: 3,
                    })
                }),
            )
            .await;
        assert!(matches!(result, Err(UpdateError::Unavailable(_))));
        // Record is untouched under its original id.
        let tally = store.get(&"t1".to_string()).await.unwrap().unwrap();
        assert_eq!(tally.value, 3);
    }
}
