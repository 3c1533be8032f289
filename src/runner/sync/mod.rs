//! Mutual exclusion for named critical sections and a counting semaphore.
//!
//! Both hand out futures which resolve once the caller may proceed. Waiters
//! are served in the order they queued up. Neither knows about timeouts.

pub mod lock;
pub mod semaphore;

pub use lock::{LockManager, LockTicket};
pub use semaphore::Semaphore;
