//! In-memory mirror of a server-side collection.
//!
//! Views mutate a [`Collection`] optimistically after a successful API call,
//! while a poller periodically replaces it with the server's list. To keep a
//! slow poll from reverting a newer local mutation, every poll carries a
//! [`FetchTicket`] and is only applied when nothing changed locally since the
//! ticket was issued.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// Entities with a field that is unique within their collection
pub trait Identified {
    fn identity(&self) -> &str;
}

/// Stamp taken when a fetch is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    epoch: u64,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The collection now mirrors the fetched list
    Applied,
    /// A local mutation happened after the fetch was issued
    StaleMutation,
    /// A newer fetch was applied first
    Superseded,
}

/// Observable contents of a collection
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    items: Vec<T>,
    epoch: u64,
    last_applied_seq: u64,
}

impl<T> CollectionState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of local mutations applied so far
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

pub struct Collection<T> {
    state: watch::Sender<CollectionState<T>>,
    next_seq: AtomicU64,
}

impl<T> Default for Collection<T>
where
    T: Identified + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Collection<T>
where
    T: Identified + Clone,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(CollectionState {
            items: Vec::new(),
            epoch: 0,
            last_applied_seq: 0,
        });
        Self {
            state,
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, identity: &str) -> Option<T> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| item.identity() == identity)
            .cloned()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.state
            .borrow()
            .items
            .iter()
            .any(|item| item.identity() == identity)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }

    /// Replace the whole collection unconditionally. Fetches already in
    /// flight are invalidated
    pub fn set(&self, items: Vec<T>) {
        self.state.send_modify(|state| {
            state.items = items;
            state.epoch += 1;
        });
    }

    /// Append, preserving insertion order. Duplicates are not detected
    pub fn add(&self, item: T) {
        self.state.send_modify(|state| {
            state.items.push(item);
            state.epoch += 1;
        });
    }

    /// Drop every entry with this identity. Returns whether anything was removed
    pub fn remove(&self, identity: &str) -> bool {
        let mut removed = false;
        self.state.send_if_modified(|state| {
            let before = state.items.len();
            state.items.retain(|item| item.identity() != identity);
            removed = state.items.len() != before;
            if removed {
                state.epoch += 1;
            }
            removed
        });
        removed
    }

    /// Modify the entry with this identity in place
    pub fn update<F>(&self, identity: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut updated = false;
        self.state.send_if_modified(|state| {
            if let Some(item) = state
                .items
                .iter_mut()
                .find(|item| item.identity() == identity)
            {
                f(item);
                state.epoch += 1;
                updated = true;
            }
            updated
        });
        updated
    }

    /// Stamp a fetch that is about to be issued
    pub fn begin_fetch(&self) -> FetchTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let epoch = self.state.borrow().epoch;
        FetchTicket { seq, epoch }
    }

    /// Apply a fetched list, unless it was overtaken by a local mutation or
    /// by a newer fetch
    pub fn apply_fetch(&self, ticket: FetchTicket, items: Vec<T>) -> FetchOutcome {
        let mut outcome = FetchOutcome::Applied;
        let mut items = Some(items);

        self.state.send_if_modified(|state| {
            if ticket.seq <= state.last_applied_seq {
                outcome = FetchOutcome::Superseded;
                return false;
            }
            if ticket.epoch != state.epoch {
                outcome = FetchOutcome::StaleMutation;
                return false;
            }
            state.items = items.take().unwrap_or_default();
            state.last_applied_seq = ticket.seq;
            true
        });

        if outcome != FetchOutcome::Applied {
            debug!(seq = ticket.seq, ?outcome, "Discarded fetched list");
        }
        outcome
    }
}
