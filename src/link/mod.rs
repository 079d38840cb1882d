//! Device link engine
//!
//! [`AxeLink`] owns one device session: the transport, a clock, the
//! connection tracker, the handler slots and the session settings (model
//! generation and MIDI channel). The host calls [`AxeLink::poll`] once per
//! tick and uses the command methods (see `commands.rs`) whenever it wants
//! to talk to the device.

mod clock;
mod commands;
mod handlers;
mod tracker;


use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::midi::format_hex;
use crate::protocol::constants::{
    sub_type, DEFAULT_MODEL, LIVENESS_TIMEOUT_MS, MODEL_OFFSET, SUB_TYPE_OFFSET,
};
use crate::protocol::{classify, decode, has_manufacturer_id, Inbound, VendorEvent, WireProfile};
use crate::transport::Transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use handlers::{
    Handlers, LinkCallback, LinkWarning, RawSysExCallback, VendorSysExCallback, WarningCallback,
};
pub use tracker::{ConnectionTracker, Transition};

/// Rejected outbound commands
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid preset number {0} (must be 1-16384)")]
    InvalidPreset(u16),

    #[error("Invalid MIDI channel {0} (must be 1-16)")]
    InvalidChannel(u8),
}

/// One device session over a transport
pub struct AxeLink<T: Transport, C: Clock = SystemClock> {
    transport: T,
    clock: C,
    tracker: ConnectionTracker,
    handlers: Handlers,

    /// Model byte reported by the device (or configured)
    model: u8,

    /// Derived from `model`, never set on its own
    profile: WireProfile,

    /// MIDI channel, 1-16
    channel: u8,

    has_message: bool,
}

impl<T: Transport> AxeLink<T, SystemClock> {
    /// Create a link timed by the system clock
    pub fn with_system_clock(transport: T) -> Self {
        Self::new(transport, SystemClock::new())
    }
}

impl<T: Transport, C: Clock> AxeLink<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            tracker: ConnectionTracker::new(),
            handlers: Handlers::new(),
            model: DEFAULT_MODEL,
            profile: WireProfile::for_model(DEFAULT_MODEL),
            channel: 1,
            has_message: false,
        }
    }

    pub fn model(&self) -> u8 {
        self.model
    }

    /// Override the model generation, switching the wire profile with it
    pub fn set_model(&mut self, model: u8) {
        self.model = model;
        self.profile = WireProfile::for_model(model);
    }

    pub fn profile(&self) -> WireProfile {
        self.profile
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Set the MIDI channel (1-16) used for control and program changes
    pub fn set_channel(&mut self, channel: u8) -> Result<(), CommandError> {
        if !(1..=16).contains(&channel) {
            return Err(CommandError::InvalidChannel(channel));
        }
        self.channel = channel;
        Ok(())
    }

    /// Whether the device has sent vendor SysEx within the liveness window
    pub fn is_connected(&self) -> bool {
        self.tracker.is_confirmed()
    }

    pub fn is_tuner_active(&self) -> bool {
        self.tracker.is_tuner_on()
    }

    /// Whether the last poll took a message from the transport
    pub fn has_message(&self) -> bool {
        self.has_message
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn on_raw_sysex(&mut self, callback: impl FnMut(&[u8]) + Send + 'static) {
        self.handlers.set_raw_sysex(Box::new(callback));
    }

    pub fn on_vendor_sysex(&mut self, callback: impl FnMut(&VendorEvent, &[u8]) + Send + 'static) {
        self.handlers.set_vendor_sysex(Box::new(callback));
    }

    pub fn on_connected(&mut self, callback: impl FnMut() + Send + 'static) {
        self.handlers.set_connected(Box::new(callback));
    }

    pub fn on_disconnected(&mut self, callback: impl FnMut() + Send + 'static) {
        self.handlers.set_disconnected(Box::new(callback));
    }

    pub fn on_warning(&mut self, callback: impl FnMut(LinkWarning) + Send + 'static) {
        self.handlers.set_warning(Box::new(callback));
    }

    /// Run one tick: expire timers, then handle at most one inbound message
    ///
    /// Call this once per loop iteration. The liveness check runs before the
    /// read so a silent device is still reported as gone. Returns whether a
    /// message was taken from the transport.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();

        if let Some(Transition::Disconnected) = self.tracker.check_timeouts(now) {
            info!("Axe-Fx disconnected (no SysEx for {} ms)", LIVENESS_TIMEOUT_MS);
            self.handlers.disconnected();
        }

        let Some(raw) = self.transport.try_read_sysex() else {
            self.has_message = false;
            return false;
        };

        self.has_message = true;
        self.handle_sysex(now, &raw);
        true
    }

    fn handle_sysex(&mut self, now: u64, raw: &[u8]) {
        trace!("SysEx {}", format_hex(raw));

        match classify(raw) {
            Inbound::ThruLoop => {
                warn!("Received our own loopback probe, MIDI thru is enabled on the device");
                self.handlers.warning(LinkWarning::ThruLoopDetected);
                // Vendor-tagged echoes are never decoded
                if !has_manufacturer_id(raw) {
                    self.handlers.raw_sysex(raw);
                }
            }
            Inbound::Malformed => {
                trace!("Dropping short vendor message ({} bytes)", raw.len());
            }
            Inbound::Raw => self.handlers.raw_sysex(raw),
            Inbound::Vendor => self.handle_vendor(now, raw),
        }
    }

    fn handle_vendor(&mut self, now: u64, raw: &[u8]) {
        if let Some(Transition::Connected) = self.tracker.vendor_seen(now) {
            self.set_model(raw[MODEL_OFFSET]);
            info!("Axe-Fx connected (model {}, {:?} wire format)", self.model, self.profile);
            self.handlers.connected();
        }

        if raw[SUB_TYPE_OFFSET] == sub_type::REALTIME_TUNER {
            self.tracker.tuner_seen(now);
        }

        let Some(event) = decode(self.profile, raw) else {
            return;
        };

        if let VendorEvent::ParameterSet { .. } = event {
            debug!("{}", event);
        }

        self.handlers.vendor_sysex(&event, raw);
    }
}

impl<T: Transport, C: Clock> std::fmt::Debug for AxeLink<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxeLink")
            .field("model", &self.model)
            .field("profile", &self.profile)
            .field("channel", &self.channel)
            .field("tracker", &self.tracker)
            .field("handlers", &self.handlers)
            .finish()
    }
}
