use crate::domain::CustomerId;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per customer, created on first use.
///
/// Ledger transactions hold the guard for their whole lifetime so two
/// allocations for the same customer never read the same invoice state.
#[derive(Default, Clone)]
pub struct CustomerLocks {
    locks: Arc<Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>>,
}

impl CustomerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, customer_id: CustomerId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(customer_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Guards for every distinct id, taken in ascending id order.
    pub async fn acquire_all(
        &self,
        customer_ids: impl IntoIterator<Item = CustomerId>,
    ) -> Vec<OwnedMutexGuard<()>> {
        let ids: BTreeSet<CustomerId> = customer_ids.into_iter().collect();
        let mut guards = Vec::with_capacity(ids.len());
        for customer_id in ids {
            guards.push(self.acquire(customer_id).await);
        }
        guards
    }
}
