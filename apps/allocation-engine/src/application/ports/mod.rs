//! Application Ports (Driven)
//!
//! Ports define interfaces for the external systems the engine drives:
//! the execution venue, the account, the volatility source and event
//! subscribers.

mod account_port;
mod event_publisher_port;
mod execution_port;
mod volatility_port;

pub use account_port::{AccountError, AccountPort};
pub use event_publisher_port::{
    EventPublishError, EventPublisherPort, NoOpEventPublisher, RecordingEventPublisher,
};
pub use execution_port::{ExecutionError, ExecutionPort, PlacementRequest};
pub use volatility_port::{VolatilityError, VolatilityPort};

#[cfg(test)]
pub use account_port::MockAccountPort;
#[cfg(test)]
pub use execution_port::MockExecutionPort;
#[cfg(test)]
pub use volatility_port::MockVolatilityPort;
