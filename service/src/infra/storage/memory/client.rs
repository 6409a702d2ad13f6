//! In-memory storage clients.

use std::sync::{Arc, Mutex as SyncMutex, MutexGuard};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{state::State, Error};

/// Client executing operations outside a transaction.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] behind the global lock.
    state: Arc<Mutex<State>>,
}

impl NonTx {
    /// Returns a shared handle onto the guarded [`State`].
    pub(super) fn share(&self) -> Arc<Mutex<State>> {
        Arc::clone(&self.state)
    }

    /// Runs the provided closure over a read snapshot of the [`State`].
    pub(super) async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }
}

/// Client executing operations inside a transaction.
///
/// Holds the global lock for the whole transaction, making transactions
/// serializable by construction. Mutations land in a working copy that
/// [`commit`](Tx::commit) writes back; dropping the transaction discards
/// it.
#[derive(Debug)]
pub struct Tx {
    /// Guarded transaction internals.
    inner: SyncMutex<TxInner>,
}

/// Internals of a [`Tx`].
#[derive(Debug)]
struct TxInner {
    /// Held global lock over the shared [`State`].
    guard: OwnedMutexGuard<State>,

    /// Working copy the transaction mutates.
    working: State,
}

impl Tx {
    /// Creates a new [`Tx`] over the provided held lock.
    pub(super) fn new(guard: OwnedMutexGuard<State>) -> Self {
        let working = State::clone(&guard);
        Self {
            inner: SyncMutex::new(TxInner { guard, working }),
        }
    }

    /// Runs the provided closure over the working copy.
    pub(super) async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let inner = self.lock();
        f(&inner.working)
    }

    /// Runs the provided closure mutably over the working copy.
    pub(super) fn mutate<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut inner = self.lock();
        f(&mut inner.working)
    }

    /// Runs the provided fallible closure mutably over the working copy.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error; the working copy keeps whatever the
    /// closure did before failing, so closures must check before writing.
    pub(super) fn try_mutate<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let mut inner = self.lock();
        f(&mut inner.working)
    }

    /// Publishes the working copy into the shared [`State`].
    pub(super) fn commit(&self) {
        let mut inner = self.lock();
        let working = inner.working.clone();
        *inner.guard = working;
    }

    /// Locks the internals, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, TxInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
