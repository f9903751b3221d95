//! Common test utilities: a scriptable mock storage unit.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tierage::{Error, Orchestrator, Result, StorageUnit};
use tokio_util::sync::CancellationToken;

/// A mock unit over `String` keys and values. Records every call it
/// receives and can be scripted to fail each verb.
#[derive(Default)]
pub struct MockUnit {
    store: Mutex<HashMap<String, String>>,
    fail_save: AtomicBool,
    fail_get: AtomicBool,
    fail_delete: AtomicBool,
    saves: Mutex<Vec<String>>,
    gets: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl MockUnit {
    /// A unit to register plus a handle to the same instance for scripting
    /// and inspection.
    pub fn handle() -> (Arc<dyn StorageUnit<String, String>>, Arc<MockUnit>) {
        let unit = Arc::new(MockUnit::default());
        (
            Arc::clone(&unit) as Arc<dyn StorageUnit<String, String>>,
            unit,
        )
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn fail_gets(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn put(&self, query: &str, item: &str) {
        self.store
            .lock()
            .unwrap()
            .insert(query.to_string(), item.to_string());
    }

    pub fn value(&self, query: &str) -> Option<String> {
        self.store.lock().unwrap().get(query).cloned()
    }

    pub fn saved_queries(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn delete_queries(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

impl StorageUnit<String, String> for MockUnit {
    fn save<'a>(
        &'a self,
        _token: &'a CancellationToken,
        query: &'a String,
        item: &'a String,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.saves.lock().unwrap().push(query.clone());
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(Error::Generic("mock save failure".into()));
            }
            self.store.lock().unwrap().insert(query.clone(), item.clone());
            Ok(())
        })
    }

    fn get<'a>(
        &'a self,
        _token: &'a CancellationToken,
        query: &'a String,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.gets.lock().unwrap().push(query.clone());
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(Error::Generic("mock get failure".into()));
            }
            self.store
                .lock()
                .unwrap()
                .get(query)
                .cloned()
                .ok_or_else(|| Error::NotFound(query.clone()))
        })
    }

    fn delete<'a>(
        &'a self,
        _token: &'a CancellationToken,
        query: &'a String,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.deletes.lock().unwrap().push(query.clone());
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Error::Generic("mock delete failure".into()));
            }
            self.store.lock().unwrap().remove(query);
            Ok(())
        })
    }
}

/// An orchestrator with `mock1` and `mock2` registered (no standard order
/// set) plus the handles to both mocks.
pub fn two_mock_orchestrator() -> (Orchestrator<String, String>, Arc<MockUnit>, Arc<MockUnit>) {
    let orchestrator = Orchestrator::new();
    let (unit1, handle1) = MockUnit::handle();
    let (unit2, handle2) = MockUnit::handle();
    orchestrator.add_unit("mock1", unit1);
    orchestrator.add_unit("mock2", unit2);
    (orchestrator, handle1, handle2)
}
