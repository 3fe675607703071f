//! Application Layer
//!
//! The application layer orchestrates domain logic. It defines:
//!
//! - **Ports**: Interfaces for interacting with external systems
//! - **Engine**: The allocation engine service driving the domain

pub mod engine;
pub mod ports;

pub use engine::{AdmissionReport, AllocationEngine, EngineError, EnginePorts, EngineSettings};
pub use ports::*;
