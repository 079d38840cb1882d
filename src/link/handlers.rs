//! Handler slots for link events
//!
//! One slot per event kind. Registering replaces whatever was there; an
//! empty slot swallows the event. Handlers run inline on the poll call, so
//! they must return quickly.

use std::fmt;

use crate::protocol::VendorEvent;

/// Called with a non-vendor SysEx message (F0 ... F7)
pub type RawSysExCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Called with a decoded vendor message and its raw bytes
pub type VendorSysExCallback = Box<dyn FnMut(&VendorEvent, &[u8]) + Send>;

/// Called on a connect or disconnect edge
pub type LinkCallback = Box<dyn FnMut() + Send>;

/// Called when the link detects a setup problem the user has to fix
pub type WarningCallback = Box<dyn FnMut(LinkWarning) + Send>;

/// Setup problems reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkWarning {
    /// The device echoes our output back (MIDI thru enabled)
    ThruLoopDetected,
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkWarning::ThruLoopDetected => {
                write!(f, "Device is echoing MIDI back, disable MIDI thru on the Axe-Fx")
            }
        }
    }
}

#[derive(Default)]
pub struct Handlers {
    raw_sysex: Option<RawSysExCallback>,
    vendor_sysex: Option<VendorSysExCallback>,
    connected: Option<LinkCallback>,
    disconnected: Option<LinkCallback>,
    warning: Option<WarningCallback>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw_sysex(&mut self, callback: RawSysExCallback) {
        self.raw_sysex = Some(callback);
    }

    pub fn set_vendor_sysex(&mut self, callback: VendorSysExCallback) {
        self.vendor_sysex = Some(callback);
    }

    pub fn set_connected(&mut self, callback: LinkCallback) {
        self.connected = Some(callback);
    }

    pub fn set_disconnected(&mut self, callback: LinkCallback) {
        self.disconnected = Some(callback);
    }

    pub fn set_warning(&mut self, callback: WarningCallback) {
        self.warning = Some(callback);
    }

    pub(crate) fn raw_sysex(&mut self, raw: &[u8]) {
        if let Some(callback) = self.raw_sysex.as_mut() {
            callback(raw);
        }
    }

    pub(crate) fn vendor_sysex(&mut self, event: &VendorEvent, raw: &[u8]) {
        if let Some(callback) = self.vendor_sysex.as_mut() {
            callback(event, raw);
        }
    }

    pub(crate) fn connected(&mut self) {
        if let Some(callback) = self.connected.as_mut() {
            callback();
        }
    }

    pub(crate) fn disconnected(&mut self) {
        if let Some(callback) = self.disconnected.as_mut() {
            callback();
        }
    }

    pub(crate) fn warning(&mut self, warning: LinkWarning) {
        if let Some(callback) = self.warning.as_mut() {
            callback(warning);
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("raw_sysex", &self.raw_sysex.is_some())
            .field("vendor_sysex", &self.vendor_sysex.is_some())
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("warning", &self.warning.is_some())
            .finish()
    }
}
