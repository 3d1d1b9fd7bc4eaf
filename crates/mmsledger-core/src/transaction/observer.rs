//! Completion observers.

use std::sync::Arc;

use super::state::TransactionState;

/// Receives the final state of a transaction.
///
/// The retry scheduler is one of these; it decides on its own whether a
/// failed notification gets another attempt.
pub trait TransactionObserver: Send + Sync {
    /// Called once, after the transaction reached a terminal state.
    fn update(&self, state: &TransactionState);
}

impl<F> TransactionObserver for F
where
    F: Fn(&TransactionState) + Send + Sync,
{
    fn update(&self, state: &TransactionState) {
        self(state);
    }
}

/// Registration list of observers.
#[derive(Default, Clone)]
pub struct Observable {
    observers: Vec<Arc<dyn TransactionObserver>>,
}

impl Observable {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn attach(&mut self, observer: Arc<dyn TransactionObserver>) {
        self.observers.push(observer);
    }

    /// Remove a previously registered observer.
    pub fn detach(&mut self, observer: &Arc<dyn TransactionObserver>) {
        self.observers.retain(|known| !Arc::ptr_eq(known, observer));
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns true if nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Hand `state` to every observer in registration order.
    pub fn notify(&self, state: &TransactionState) {
        for observer in &self.observers {
            observer.update(state);
        }
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observers.len())
            .finish()
    }
}
