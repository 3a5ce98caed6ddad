//! Concurrent, cache-backed aggregation of every configured platform.

mod orchestrator;
mod result;

pub use orchestrator::{AggregateResult, Orchestrator};
pub use result::{FetchResult, QueryError};
