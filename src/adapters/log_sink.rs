//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (USB-CDC / UART in production).

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Armed(mode) => {
                info!("ARM   | mode={}", mode);
            }
            AppEvent::PhaseStarted {
                index,
                total,
                title,
            } => {
                info!("PHASE | {}/{} {}", index, total, title);
            }
            AppEvent::Adjusted { touches } => {
                info!("ADJ   | touches={}", touches);
            }
            AppEvent::SweepFinished { attempts } => {
                info!("SWEEP | attempts={}", attempts);
            }
            AppEvent::Completed { mode, elapsed_ms } => {
                info!("DONE  | mode={} elapsed={}ms", mode, elapsed_ms);
            }
            AppEvent::Halted(code) => {
                error!("HALT  | {}", code);
            }
        }
    }
}
