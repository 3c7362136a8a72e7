//! Wizard events and broadcast bus
//!
//! Events are broadcast via [`EventBus`] and serialized for SSE transmission.

use crate::step::WizardStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Which record a kept photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    Pseudo,
    Fridge,
}

/// Capture wizard events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WizardEvent {
    /// Wizard moved to a different step
    StepChanged {
        session_id: Uuid,
        old_step: WizardStep,
        new_step: WizardStep,
        timestamp: DateTime<Utc>,
    },

    /// A preview was accepted
    PhotoKept {
        session_id: Uuid,
        kind: PhotoKind,
        /// Photos of this kind held after the keep
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Camera acquisition or capture failed
    CameraFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Backend accepted the report
    SubmissionCompleted {
        session_id: Uuid,
        outlet_code: String,
        pseudo_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Submission ended in a soft or hard failure
    SubmissionFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl WizardEvent {
    /// SSE event name
    pub fn event_type(&self) -> &str {
        match self {
            WizardEvent::StepChanged { .. } => "StepChanged",
            WizardEvent::PhotoKept { .. } => "PhotoKept",
            WizardEvent::CameraFailed { .. } => "CameraFailed",
            WizardEvent::SubmissionCompleted { .. } => "SubmissionCompleted",
            WizardEvent::SubmissionFailed { .. } => "SubmissionFailed",
        }
    }
}

/// Broadcast bus for [`WizardEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WizardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WizardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
