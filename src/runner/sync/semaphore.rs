use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt};

pub const DEFAULT_NUMBER_OF_RESOURCES: usize = 2;

struct SemaphoreState {
    number_of_free_resources: usize,
    queue: VecDeque<oneshot::Sender<usize>>,
}

/// Counting semaphore over a fixed number of resources.
pub struct Semaphore {
    number_of_resources: usize,
    state: Mutex<SemaphoreState>,
}

impl Default for Semaphore {
    fn default() -> Self {
        Semaphore::new(DEFAULT_NUMBER_OF_RESOURCES)
    }
}

impl Semaphore {
    pub fn new(number_of_resources: usize) -> Self {
        Semaphore {
            number_of_resources,
            state: Mutex::new(SemaphoreState {
                number_of_free_resources: number_of_resources,
                queue: VecDeque::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SemaphoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn number_of_resources(&self) -> usize {
        self.number_of_resources
    }

    pub fn number_of_free_resources(&self) -> usize {
        self.state().number_of_free_resources
    }

    pub fn waiting(&self) -> usize {
        self.state().queue.len()
    }

    /// Takes a resource. Resolves with the number of resources still free
    /// once one was handed to the caller.
    pub fn acquire(&self) -> BoxFuture<'static, usize> {
        let mut state = self.state();
        if state.number_of_free_resources == 0 {
            let (sender, receiver) = oneshot::channel();
            state.queue.push_back(sender);
            debug!("Semaphore exhausted, {} waiting", state.queue.len());
            receiver.map(|free| free.unwrap_or(0)).boxed()
        } else {
            state.number_of_free_resources -= 1;
            future::ready(state.number_of_free_resources).boxed()
        }
    }

    /// Returns a resource, passing it straight to the longest waiting caller
    /// if there is one.
    pub fn release(&self) {
        let mut state = self.state();
        while let Some(waiter) = state.queue.pop_front() {
            let free = state.number_of_free_resources;
            if waiter.send(free).is_ok() {
                trace!("Semaphore resource handed over");
                return;
            }
        }
        if state.number_of_free_resources < self.number_of_resources {
            state.number_of_free_resources += 1;
        }
    }
}
