use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt};
use uuid::Uuid;

/// Proof of having entered a critical section.
#[derive(Debug, Clone, PartialEq)]
pub struct LockTicket {
    pub id: Uuid,
    pub description: String,
}

impl LockTicket {
    fn new(description: &str) -> Self {
        LockTicket {
            id: Uuid::new_v4(),
            description: description.to_string(),
        }
    }
}

type Waiter = oneshot::Sender<LockTicket>;

/// Named critical sections. A section exists while somebody holds it; its
/// queue holds everybody waiting to enter next.
#[derive(Default)]
pub struct LockManager {
    sections: Mutex<HashMap<String, VecDeque<Waiter>>>,
}

impl LockManager {
    pub fn new() -> Self {
        LockManager {
            sections: Mutex::new(HashMap::new()),
        }
    }

    fn sections(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Waiter>>> {
        self.sections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_locked(&self, description: &str) -> bool {
        self.sections().contains_key(description)
    }

    /// Number of callers waiting for `description`.
    pub fn waiting(&self, description: &str) -> usize {
        self.sections()
            .get(description)
            .map(|queue| queue.len())
            .unwrap_or(0)
    }

    /// Enters the section immediately when it is free, otherwise resolves
    /// once every earlier waiter has released it.
    pub fn acquire(&self, description: &str) -> BoxFuture<'static, LockTicket> {
        let mut sections = self.sections();
        match sections.get_mut(description) {
            Some(queue) => {
                let (sender, receiver) = oneshot::channel();
                queue.push_back(sender);
                debug!(
                    "Lock \"{}\" is taken, queued at position {}",
                    description,
                    queue.len()
                );
                let description = description.to_string();
                receiver
                    .map(move |ticket| ticket.unwrap_or_else(|_| LockTicket::new(&description)))
                    .boxed()
            }
            None => {
                sections.insert(description.to_string(), VecDeque::new());
                let ticket = LockTicket::new(description);
                trace!("Lock \"{}\" acquired ({})", description, ticket.id);
                future::ready(ticket).boxed()
            }
        }
    }

    /// Hands the section to the next waiter or frees it. Returns whether the
    /// section was held.
    pub fn release(&self, description: &str) -> bool {
        let mut sections = self.sections();
        let queue = match sections.get_mut(description) {
            Some(queue) => queue,
            None => return false,
        };
        while let Some(waiter) = queue.pop_front() {
            let ticket = LockTicket::new(description);
            let id = ticket.id;
            if waiter.send(ticket).is_ok() {
                debug!("Lock \"{}\" handed over ({})", description, id);
                return true;
            }
        }
        sections.remove(description);
        trace!("Lock \"{}\" released", description);
        true
    }

    /// Runs `callback` inside the section. With `auto_release` the section
    /// is left once the callback's future completed, otherwise the caller
    /// has to `release` it.
    pub async fn acquire_lock<F, Fut, T>(&self, description: &str, callback: F, auto_release: bool) -> T
    where
        F: FnOnce(LockTicket) -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.acquire(description).await;
        let result = callback(ticket).await;
        if auto_release {
            self.release(description);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_free_section_is_entered_immediately() {
        let locks = LockManager::new();
        let ticket = block_on(locks.acquire("a"));
        assert_eq!(ticket.description, "a");
        assert!(locks.is_locked("a"));
        assert!(locks.release("a"));
        assert!(!locks.is_locked("a"));
        assert!(!locks.release("a"));
    }

    #[test]
    fn test_waiters_are_served_in_order() {
        let locks = LockManager::new();
        block_on(locks.acquire("a"));
        let mut first = locks.acquire("a");
        let mut second = locks.acquire("a");
        assert_eq!(locks.waiting("a"), 2);
        assert!((&mut first).now_or_never().is_none());

        locks.release("a");
        assert!((&mut first).now_or_never().is_some());
        assert!((&mut second).now_or_never().is_none());

        locks.release("a");
        assert!(second.now_or_never().is_some());
        locks.release("a");
        assert!(!locks.is_locked("a"));
    }
}
