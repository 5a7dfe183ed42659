//! Auslieferung der Draw-Events an einen externen Empfänger.

use crate::shared::DrawEvent;

/// Externer Event-Empfänger (Host-Anwendung).
pub trait EventSink {
    fn emit(&mut self, event: &DrawEvent);
}

/// Verwirft alle Events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&mut self, _event: &DrawEvent) {}
}

/// Protokolliert Events über `log` (Debug-Level).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&mut self, event: &DrawEvent) {
        match event {
            DrawEvent::Update { action, features } => log::debug!(
                "Event: {} ({}, {} Features)",
                event.name(),
                action.as_str(),
                features.len()
            ),
            _ => log::debug!("Event: {}", event.name()),
        }
    }
}
