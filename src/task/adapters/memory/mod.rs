//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and single-process embedding without database dependencies.

mod access;
mod changes;
mod task;

pub use access::InMemoryProjectDirectory;
pub use changes::{NoopChangeSink, RecordingChangeSink};
pub use task::InMemoryTaskRepository;
