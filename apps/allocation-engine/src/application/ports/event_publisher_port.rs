//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing engine events to external systems.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::order_lifecycle::EngineEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError {
        /// Error details.
        message: String,
    },
}

/// Port for publishing engine events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish engine events.
    async fn publish_events(&self, events: Vec<EngineEvent>) -> Result<(), EventPublishError>;

    /// Publish a single engine event.
    async fn publish_event(&self, event: EngineEvent) -> Result<(), EventPublishError> {
        self.publish_events(vec![event]).await
    }
}

/// No-op event publisher.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_events(&self, _events: Vec<EngineEvent>) -> Result<(), EventPublishError> {
        Ok(())
    }
}

/// Publisher that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Published events of the given type.
    #[must_use]
    pub fn events_of_type(&self, event_type: &str) -> Vec<EngineEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisherPort for RecordingEventPublisher {
    async fn publish_events(&self, events: Vec<EngineEvent>) -> Result<(), EventPublishError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(events);
        Ok(())
    }
}
