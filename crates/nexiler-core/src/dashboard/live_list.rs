use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::Post;

#[derive(Debug, Default)]
struct ListState {
    posts: Vec<Post>,
    loaded: bool,
    revision: u64,
    failure: Option<String>,
}

/// Post list fed by store snapshots.
///
/// Each snapshot replaces the list wholesale, in the order it was delivered.
/// Clones share the same list, so one clone can live in a listener while the
/// view reads another.
#[derive(Debug, Clone, Default)]
pub struct LiveList {
    state: Arc<RwLock<ListState>>,
}

impl LiveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_snapshot(&self, posts: Vec<Post>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.posts = posts;
        state.loaded = true;
        state.revision += 1;
    }

    /// Keep the last snapshot and remember why the next one could not be read.
    pub fn record_failure(&self, message: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.failure = Some(message.into());
    }

    /// The last re-read failure, until cleared.
    pub fn failure(&self) -> Option<String> {
        self.read(|state| state.failure.clone())
    }

    pub fn clear_failure(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.failure = None;
    }

    pub fn posts(&self) -> Vec<Post> {
        self.read(|state| state.posts.clone())
    }

    pub fn get(&self, id: uuid::Uuid) -> Option<Post> {
        self.read(|state| state.posts.iter().find(|p| p.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.read(|state| state.posts.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True until the first snapshot arrives.
    pub fn is_loading(&self) -> bool {
        self.read(|state| !state.loaded)
    }

    /// Number of snapshots applied so far.
    pub fn revision(&self) -> u64 {
        self.read(|state| state.revision)
    }

    fn read<T>(&self, f: impl FnOnce(&ListState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}
