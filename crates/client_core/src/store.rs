//! Single-writer state cell with snapshot reads and ordered subscribers.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;
type ListenerList<S> = Arc<Mutex<Vec<(u64, Listener<S>)>>>;

/// Holds exactly one snapshot of `S`. Every write replaces the whole value and
/// synchronously notifies current subscribers in subscription order.
///
/// A listener may write to the store. Such a nested write replaces the
/// snapshot at once, but its notification is queued behind the one in
/// progress, so every listener sees snapshots in write order and ends on the
/// latest one.
pub struct StateStore<S> {
    state: RwLock<S>,
    listeners: ListenerList<S>,
    next_listener_id: AtomicU64,
    // Serializes write + notify across threads. Reentrant because a listener
    // may itself dispatch.
    write_gate: ReentrantMutex<()>,
    // Both only touched with `write_gate` held.
    pending: Mutex<VecDeque<S>>,
    notifying: AtomicBool,
}

impl<S> StateStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        Self {
            state: RwLock::new(initial),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
            write_gate: ReentrantMutex::new(()),
            pending: Mutex::new(VecDeque::new()),
            notifying: AtomicBool::new(false),
        }
    }

    /// A copy of the current snapshot.
    pub fn state(&self) -> S {
        self.state.read().clone()
    }

    /// Replaces the snapshot and notifies subscribers before returning.
    pub fn set_state(&self, next: S) {
        let _gate = self.write_gate.lock();
        self.commit(next);
    }

    /// Builds the next snapshot from the current one and stores it. The read
    /// and the write happen under the same gate, so no other writer can slip
    /// in between. Returns the stored snapshot.
    pub fn update<F>(&self, f: F) -> S
    where
        F: FnOnce(&S) -> S,
    {
        let _gate = self.write_gate.lock();
        let next = {
            let current = self.state.read();
            f(&current)
        };
        self.commit(next.clone());
        next
    }

    /// Registers `listener` for every subsequent snapshot. The listener stays
    /// registered until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));

        let listeners = Arc::downgrade(&self.listeners);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.lock().retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Stores `next` and delivers it, along with any snapshot written by a
    /// listener meanwhile, in write order. Callers hold `write_gate`.
    fn commit(&self, next: S) {
        *self.state.write() = next.clone();
        self.pending.lock().push_back(next);
        if self.notifying.swap(true, Ordering::AcqRel) {
            // Nested write from a listener; the outer commit delivers it.
            return;
        }

        let _reset = NotifyingReset(&self.notifying);
        loop {
            let Some(snapshot) = self.pending.lock().pop_front() else {
                break;
            };
            self.notify(&snapshot);
        }
    }

    fn notify(&self, snapshot: &S) {
        // Listeners run outside the list lock so they may subscribe or
        // unsubscribe while being notified.
        let listeners: Vec<Listener<S>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Clears the notifying flag even if a listener panics, so the store keeps
/// delivering afterwards.
struct NotifyingReset<'a>(&'a AtomicBool);

impl Drop for NotifyingReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S> Default for StateStore<S>
where
    S: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Handle returned by [`StateStore::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
