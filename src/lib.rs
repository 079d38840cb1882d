//! Axe Link - device-link engine for Fractal Audio Axe-Fx units
//!
//! Sits between a MIDI transport and the Axe-Fx SysEx extension: recognises
//! and decodes vendor messages, tracks whether the device is alive, and
//! builds correctly framed and checksummed outbound commands for both the
//! legacy and current device generations.
//!
//! ```no_run
//! use axe_link::link::AxeLink;
//! use axe_link::transport::MidirTransport;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MidirTransport::connect("Axe-Fx", "Axe-Fx")?;
//! let mut link = AxeLink::with_system_clock(transport);
//! link.on_connected(|| println!("connected"));
//! link.request_preset_name();
//! loop {
//!     link.poll();
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod link;
pub mod midi;
pub mod protocol;
pub mod transport;

pub use link::{AxeLink, CommandError, LinkWarning};
pub use protocol::{VendorEvent, WireProfile};
pub use transport::{Transport, TransportError};
