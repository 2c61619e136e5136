pub mod backoff;
pub mod poller;

pub use backoff::Backoff;
pub use poller::{ListSource, ListState, PollPolicy, Poller};
