//! Order domain
//!
//! [`status`] encodes the lifecycle state machine, [`engine`] runs the
//! transactional placement and transition logic on top of it.

pub mod engine;
pub mod status;

pub use engine::{CancelReason, OrderEngine, OrderError};
pub use status::OrderStatus;
