//! Order Lifecycle Bounded Context
//!
//! Status model and transition rules for live orders, the notifications
//! received from the execution collaborator, and the events the engine emits.

mod errors;
mod events;
mod state_machine;
mod status;

pub use errors::OrderLifecycleError;
pub use events::{EngineEvent, OrderEvent, OrderEventKind, SafetyNetScope};
pub use state_machine::OrderStateMachine;
pub use status::OrderStatus;
