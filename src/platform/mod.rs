//! Platform adapters: request construction and response normalization for
//! each supported balance/usage API.

pub mod adapter;
pub mod parse;
pub mod providers;
pub mod request;
pub mod transport;
pub mod types;

pub use adapter::{Adapter, ConfigurationError};
pub use request::{AuthStyle, HttpMethod, RawResponse, Request};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    BalanceRecord, NormalizedRecord, ParseError, QueryKind, SubscriptionRecord, UsageRecord,
};
