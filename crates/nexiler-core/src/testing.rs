//! In-process fakes for the ports, shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::authoring::Draft;
use crate::domain::{Document, Record};
use crate::error::StoreError;
use crate::ports::{
    AuthError, AuthListener, AuthProvider, AuthUser, ContentStore, OrderBy, SnapshotListener,
    Subscription,
};

pub(crate) fn valid_draft() -> Draft {
    Draft {
        title: "Getting started with automation".to_string(),
        content: "Line one of the article body.\nLine two adds #bold# words for flavor.".to_string(),
        category: "AI Automation".to_string(),
        date: "2025-04-01".to_string(),
        time: "5 min read".to_string(),
        featured_image: None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Watcher {
    collection: String,
    order: OrderBy,
    listener: Arc<SnapshotListener>,
}

#[derive(Default)]
struct StoreState {
    collections: BTreeMap<String, BTreeMap<Uuid, Record>>,
    watchers: BTreeMap<u64, Watcher>,
    next_watcher: u64,
    writes: usize,
    failure: Option<String>,
    stalled: bool,
}

impl StoreState {
    fn snapshot(&self, collection: &str, order: &OrderBy) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(*id, fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        order.arrange(&mut docs);
        docs
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Query(message.clone())),
            None => Ok(()),
        }
    }
}

/// Content store that delivers snapshots synchronously on the writing task.
#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn document(&self, collection: &str, id: Uuid) -> Option<Document> {
        lock(&self.state)
            .collections
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .map(|fields| Document::new(id, fields.clone()))
    }

    /// Seed a document without counting it as a write.
    pub(crate) fn insert(&self, collection: &str, record: Record) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.state)
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        self.notify(collection);
        id
    }

    pub(crate) fn write_count(&self) -> usize {
        lock(&self.state).writes
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        lock(&self.state).watchers.len()
    }

    /// Make every later write fail with `message`.
    pub(crate) fn fail_writes(&self, message: &str) {
        lock(&self.state).failure = Some(message.to_string());
    }

    fn notify(&self, collection: &str) {
        let deliveries: Vec<(Arc<SnapshotListener>, Vec<Document>)> = {
            let state = lock(&self.state);
            state
                .watchers
                .values()
                .filter(|w| w.collection == collection)
                .map(|w| (w.listener.clone(), state.snapshot(collection, &w.order)))
                .collect()
        };
        for (listener, docs) in deliveries {
            listener(Ok(docs));
        }
    }

    /// Deliver a failed re-read to every watcher of `collection`.
    pub(crate) fn fail_snapshot(&self, collection: &str, message: &str) {
        let listeners: Vec<Arc<SnapshotListener>> = lock(&self.state)
            .watchers
            .values()
            .filter(|w| w.collection == collection)
            .map(|w| w.listener.clone())
            .collect();
        for listener in listeners {
            listener(Err(StoreError::Connection(message.to_string())));
        }
    }

    /// Park every later write until [`resume_writes`](Self::resume_writes).
    pub(crate) fn stall_writes(&self) {
        lock(&self.state).stalled = true;
    }

    pub(crate) fn resume_writes(&self) {
        lock(&self.state).stalled = false;
    }

    async fn wait_if_stalled(&self) {
        loop {
            let stalled = lock(&self.state).stalled;
            if !stalled {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn create(&self, collection: &str, record: Record) -> Result<Uuid, StoreError> {
        self.wait_if_stalled().await;
        let id = Uuid::new_v4();
        {
            let mut state = lock(&self.state);
            state.check_failure()?;
            state.writes += 1;
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id, record);
        }
        self.notify(collection);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.document(collection, id))
    }

    async fn update(&self, collection: &str, id: Uuid, partial: Record) -> Result<(), StoreError> {
        {
            let mut state = lock(&self.state);
            state.check_failure()?;
            let fields = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(&id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id,
                })?;
            fields.extend(partial);
            state.writes += 1;
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<(), StoreError> {
        {
            let mut state = lock(&self.state);
            state.check_failure()?;
            let removed = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(&id));
            if removed.is_none() {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id,
                });
            }
            state.writes += 1;
        }
        self.notify(collection);
        Ok(())
    }

    async fn subscribe_ordered(
        &self,
        collection: &str,
        order: OrderBy,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        order.validate()?;
        let listener = Arc::new(listener);
        let (key, initial) = {
            let mut state = lock(&self.state);
            let key = state.next_watcher;
            state.next_watcher += 1;
            let initial = state.snapshot(collection, &order);
            state.watchers.insert(
                key,
                Watcher {
                    collection: collection.to_string(),
                    order,
                    listener: listener.clone(),
                },
            );
            (key, initial)
        };
        listener(Ok(initial));

        let state = self.state.clone();
        Ok(Subscription::new(move || {
            lock(&state).watchers.remove(&key);
        }))
    }
}

#[derive(Default)]
struct AuthState {
    user: Option<AuthUser>,
    listeners: BTreeMap<u64, Arc<AuthListener>>,
    next_listener: u64,
}

/// Auth provider holding a fixed user; `sign_in` always fails.
#[derive(Clone, Default)]
pub(crate) struct FakeAuth {
    state: Arc<Mutex<AuthState>>,
}

impl FakeAuth {
    pub(crate) fn signed_in(email: &str) -> Self {
        let auth = Self::default();
        lock(&auth.state).user = Some(AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            token: "test-token".to_string(),
        });
        auth
    }

    pub(crate) fn signed_out() -> Self {
        Self::default()
    }

    pub(crate) fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    fn set_user(&self, user: Option<AuthUser>) {
        let listeners: Vec<Arc<AuthListener>> = {
            let mut state = lock(&self.state);
            state.user = user.clone();
            state.listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener(user.clone());
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::InvalidCredentials)
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let listener = Arc::new(listener);
        let (key, current) = {
            let mut state = lock(&self.state);
            let key = state.next_listener;
            state.next_listener += 1;
            state.listeners.insert(key, listener.clone());
            (key, state.user.clone())
        };
        listener(current);

        let state = self.state.clone();
        Subscription::new(move || {
            lock(&state).listeners.remove(&key);
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_user(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        lock(&self.state).user.clone()
    }
}
