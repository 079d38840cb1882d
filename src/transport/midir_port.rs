//! midir backed transport
//!
//! Inbound messages arrive on the midir callback thread and are queued on a
//! bounded channel; `try_read_sysex` drains that queue one message per call.

use crossbeam::channel::{self, Receiver, Sender};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, info, trace, warn};

use super::{Transport, TransportError};
use crate::midi::{format_hex, is_sysex, MidiMessage, SYSEX_END};

const CLIENT_NAME: &str = "Axe-Link";

/// Inbound queue depth, in complete messages
const INBOUND_QUEUE_LEN: usize = 256;

/// Largest SysEx message the assembler will buffer
const MAX_SYSEX_LEN: usize = 4096;

/// Transport over a pair of OS MIDI ports
pub struct MidirTransport {
    /// Kept alive for the callback; dropping it closes the port
    _input_conn: MidiInputConnection<()>,
    output_conn: MidiOutputConnection,
    inbound_rx: Receiver<Vec<u8>>,
    input_port_name: String,
    output_port_name: String,
}

impl MidirTransport {
    /// Open the first input and output ports whose names contain the patterns
    /// (case-insensitive)
    pub fn connect(input_pattern: &str, output_pattern: &str) -> Result<Self, TransportError> {
        info!("Connecting - Input: '{}', Output: '{}'", input_pattern, output_pattern);

        let mut midi_in = MidiInput::new(&format!("{}-Input", CLIENT_NAME))?;
        midi_in.ignore(Ignore::None);

        debug!("Found {} MIDI input ports", midi_in.port_count());

        let (in_port, input_port_name) = find_port(&midi_in, input_pattern)
            .ok_or_else(|| TransportError::PortNotFound(input_pattern.to_string()))?;

        info!("Connecting to input port: {}", input_port_name);

        let (inbound_tx, inbound_rx) = channel::bounded(INBOUND_QUEUE_LEN);
        let mut assembler = SysExAssembler::new(inbound_tx);

        let input_conn = midi_in
            .connect(
                &in_port,
                CLIENT_NAME,
                move |_timestamp, data, _| assembler.push(data),
                (),
            )
            .map_err(|e| TransportError::Connect {
                port: input_port_name.clone(),
                reason: e.to_string(),
            })?;

        let midi_out = MidiOutput::new(&format!("{}-Output", CLIENT_NAME))?;

        debug!("Found {} MIDI output ports", midi_out.port_count());

        let (out_port, output_port_name) = find_port(&midi_out, output_pattern)
            .ok_or_else(|| TransportError::PortNotFound(output_pattern.to_string()))?;

        info!("Connecting to output port: {}", output_port_name);

        let output_conn = midi_out
            .connect(&out_port, CLIENT_NAME)
            .map_err(|e| TransportError::Connect {
                port: output_port_name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            _input_conn: input_conn,
            output_conn,
            inbound_rx,
            input_port_name,
            output_port_name,
        })
    }

    pub fn input_port_name(&self) -> &str {
        &self.input_port_name
    }

    pub fn output_port_name(&self) -> &str {
        &self.output_port_name
    }

    /// List available MIDI input ports
    pub fn list_input_ports() -> Result<Vec<String>, TransportError> {
        let midi_in = MidiInput::new(&format!("{}-Scanner", CLIENT_NAME))?;
        Ok(port_names(&midi_in))
    }

    /// List available MIDI output ports
    pub fn list_output_ports() -> Result<Vec<String>, TransportError> {
        let midi_out = MidiOutput::new(&format!("{}-Scanner", CLIENT_NAME))?;
        Ok(port_names(&midi_out))
    }
}

impl Transport for MidirTransport {
    fn try_read_sysex(&mut self) -> Option<Vec<u8>> {
        self.inbound_rx.try_recv().ok()
    }

    fn send_bytes(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.output_conn.send(data)?;
        trace!("Sent raw: {}", format_hex(data));
        Ok(())
    }
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

/// Find a port by case-insensitive substring match
fn find_port<T: MidiIO>(io: &T, pattern: &str) -> Option<(T::Port, String)> {
    let pattern = pattern.to_lowercase();
    for port in io.ports() {
        if let Ok(name) = io.port_name(&port) {
            if name.to_lowercase().contains(&pattern) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                return Some((port, name));
            }
        }
    }
    None
}

/// Rebuilds SysEx messages that some backends deliver in several chunks
struct SysExAssembler {
    pending: Vec<u8>,
    tx: Sender<Vec<u8>>,
}

impl SysExAssembler {
    fn new(tx: Sender<Vec<u8>>) -> Self {
        Self { pending: Vec::new(), tx }
    }

    fn push(&mut self, data: &[u8]) {
        if is_sysex(data) {
            self.pending.clear();
            self.pending.extend_from_slice(data);
        } else if !self.pending.is_empty() && data.first().is_some_and(|&b| b < 0x80) {
            self.pending.extend_from_slice(data);
        } else {
            match MidiMessage::parse(data) {
                Some(message) => trace!("Ignoring {} | {}", format_hex(data), message),
                None => trace!("Ignoring unparsable MIDI: {}", format_hex(data)),
            }
            return;
        }

        if self.pending.len() > MAX_SYSEX_LEN {
            warn!(
                "Unterminated SysEx exceeded {} bytes, discarding {} bytes",
                MAX_SYSEX_LEN,
                self.pending.len()
            );
            self.pending.clear();
            return;
        }

        if self.pending.last() == Some(&SYSEX_END) {
            let message = std::mem::take(&mut self.pending);
            // Never block the backend thread
            if self.tx.try_send(message).is_err() {
                warn!("Inbound SysEx queue full, dropping message");
            }
        }
    }
}
