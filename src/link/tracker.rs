//! Device liveness and tuner activity tracking
//!
//! Two independent timers, both evaluated lazily from the clock value passed
//! in by the caller. Nothing here runs on its own; the poll loop drives it.

use crate::protocol::constants::{LIVENESS_TIMEOUT_MS, TUNER_TIMEOUT_MS};

/// Edge of the liveness state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Connected,
    Disconnected,
}

/// Connection and tuner state of one device session
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    confirmed: bool,
    tuner_on: bool,
    last_vendor_ms: u64,
    last_tuner_ms: u64,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a vendor message was seen and the device hasn't gone quiet since
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn is_tuner_on(&self) -> bool {
        self.tuner_on
    }

    /// Expire both timers
    ///
    /// Returns `Disconnected` on the tick where the liveness timeout is
    /// first exceeded.
    pub fn check_timeouts(&mut self, now_ms: u64) -> Option<Transition> {
        if self.tuner_on && now_ms.saturating_sub(self.last_tuner_ms) > TUNER_TIMEOUT_MS {
            self.tuner_on = false;
        }

        if self.confirmed && now_ms.saturating_sub(self.last_vendor_ms) > LIVENESS_TIMEOUT_MS {
            self.confirmed = false;
            return Some(Transition::Disconnected);
        }

        None
    }

    /// Record a vendor message; returns `Connected` on the first one after
    /// start or after a disconnect
    pub fn vendor_seen(&mut self, now_ms: u64) -> Option<Transition> {
        self.last_vendor_ms = now_ms;

        if self.confirmed {
            None
        } else {
            self.confirmed = true;
            Some(Transition::Connected)
        }
    }

    /// Record a realtime tuner message
    pub fn tuner_seen(&mut self, now_ms: u64) {
        self.last_tuner_ms = now_ms;
        self.tuner_on = true;
    }
}
