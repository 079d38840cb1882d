//! Outbound commands
//!
//! Vendor messages are built without the F0/F7 boundaries and always end
//! with an empty checksum slot; [`encode`] fills or drops it depending on
//! the session's wire profile.

use tracing::{debug, warn};

use super::{AxeLink, Clock, CommandError};
use crate::midi::{format_hex, MidiMessage};
use crate::protocol::constants::{
    cc, sub_type, EMPTY_BYTE, MANUFACTURER_ID, MAX_BANK, PRESETS_PER_BANK, SUB_TYPE_OFFSET,
};
use crate::protocol::encode;
use crate::transport::Transport;

/// Sub-type position in an outbound body (no leading F0)
const OUTBOUND_SUB_TYPE: usize = SUB_TYPE_OFFSET - 1;

impl<T: Transport, C: Clock> AxeLink<T, C> {
    /// Seal and send a vendor message body
    ///
    /// While the device is unconfirmed, any message other than the version
    /// request or the loopback probe is preceded by both of them. The last
    /// byte of `message` is the checksum slot.
    pub fn send_sysex(&mut self, mut message: Vec<u8>) {
        let sub = message.get(OUTBOUND_SUB_TYPE).copied();
        if !self.tracker.is_confirmed()
            && sub != Some(sub_type::FIRMWARE_VERSION)
            && sub != Some(sub_type::LOOPBACK_CHECK)
        {
            self.send_loopback_and_version_check();
        }

        let frame = encode(self.profile, &mut message);
        debug!("Sending SysEx: {}", format_hex(frame));

        if let Err(e) = self.transport.send_sysex(frame) {
            warn!("Failed to send SysEx: {}", e);
        }
    }

    /// Send a bogus probe followed by a firmware version request
    ///
    /// A device that answers the request confirms the link. If the probe
    /// itself comes back, the device is echoing our output.
    pub fn send_loopback_and_version_check(&mut self) {
        let mut probe = vec![sub_type::LOOPBACK_CHECK; 5];
        probe.push(EMPTY_BYTE);
        self.send_sysex(probe);

        let request = self.vendor_message(sub_type::FIRMWARE_VERSION, &[0, 0]);
        self.send_sysex(request);
    }

    /// Ask for the name of the active preset
    pub fn request_preset_name(&mut self) {
        let message = self.vendor_message(sub_type::PRESET_NAME, &[]);
        self.send_sysex(message);
    }

    /// Ask for the number of the active preset
    pub fn request_preset_number(&mut self) {
        let message = self.vendor_message(sub_type::PRESET_CHANGE, &[]);
        self.send_sysex(message);
    }

    /// Ask for the effect blocks and bypass states of the active preset
    pub fn request_bypass_states(&mut self) {
        let message = self.vendor_message(sub_type::GET_PRESET_BLOCKS_AND_BYPASS, &[]);
        self.send_sysex(message);
    }

    /// Subscribe to (or stop) looper status updates
    pub fn request_looper_updates(&mut self, enable: bool) {
        let message = self.vendor_message(sub_type::LOOPER_STATUS, &[enable as u8]);
        self.send_sysex(message);
    }

    /// Get or set an effect parameter
    ///
    /// Ids and value are packed with the field width of the session's wire
    /// profile; bits beyond it are dropped. The reply arrives later as a
    /// `ParameterSet` event.
    pub fn request_effect_parameter(&mut self, effect_id: u16, param_id: u16, value: u32, query: u8) {
        let profile = self.profile;
        let mut payload = profile.pack(effect_id as u32, 2);
        payload.extend(profile.pack(param_id as u32, 2));
        payload.extend(profile.pack(value, profile.value_width()));
        payload.push(query);

        let message = self.vendor_message(sub_type::SET_PARAMETER, &payload);
        self.send_sysex(message);
    }

    /// Switch to a preset (1-based)
    ///
    /// Sends bank select (CC 0) first; the device ignores program changes
    /// past the first bank without it. Presets beyond bank 127 cannot be
    /// addressed and are rejected.
    pub fn send_preset_change(&mut self, preset: u16) -> Result<(), CommandError> {
        if preset == 0 {
            return Err(CommandError::InvalidPreset(preset));
        }

        let index = preset - 1;
        let bank = index / PRESETS_PER_BANK;
        if bank > MAX_BANK {
            return Err(CommandError::InvalidPreset(preset));
        }

        self.send_control_change(cc::BANK_SELECT, bank as u8);
        self.send_program_change(index);
        Ok(())
    }

    /// Switch amp 1 between its X (off) and Y (on) settings
    pub fn send_toggle_xy(&mut self, y_mode: bool) {
        self.send_control_change(cc::AMP_1_XY, if y_mode { 127 } else { 0 });
    }

    /// Send a control change on the session channel
    pub fn send_control_change(&mut self, cc: u8, value: u8) {
        self.send_channel_message(MidiMessage::ControlChange {
            channel: self.channel - 1,
            cc,
            value,
        });
    }

    /// Send a program change on the session channel; only the low 7 bits
    /// reach the wire
    pub fn send_program_change(&mut self, program: u16) {
        self.send_channel_message(MidiMessage::ProgramChange {
            channel: self.channel - 1,
            program: (program & 0x7F) as u8,
        });
    }

    fn send_channel_message(&mut self, message: MidiMessage) {
        debug!("Sending {}", message);
        if let Err(e) = self.transport.send_message(&message) {
            warn!("Failed to send {}: {}", message, e);
        }
    }

    /// Manufacturer id, model, sub-type, payload and an empty checksum slot
    fn vendor_message(&self, sub: u8, payload: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(MANUFACTURER_ID.len() + payload.len() + 3);
        message.extend_from_slice(&MANUFACTURER_ID);
        message.push(self.model);
        message.push(sub);
        message.extend_from_slice(payload);
        message.push(EMPTY_BYTE);
        message
    }
}
