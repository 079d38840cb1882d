//! Axe-Fx SysEx protocol
//!
//! Wire format of a vendor message as it arrives from the transport:
//!
//! ```text
//! F0 | 00 01 74 | model | sub-type | payload ... | [checksum] | F7
//! ```
//!
//! Outbound messages are built without the F0/F7 boundaries (the transport
//! adds them), so every outbound offset is one less than its inbound twin.
//! The trailing checksum only exists for the current device generation,
//! see [`WireProfile`].

pub mod codec;
pub mod constants;
mod events;
mod profile;

pub use codec::{checksum, classify, decode, encode, has_manufacturer_id, Inbound};
pub use events::{LooperStatus, VendorEvent};
pub use profile::WireProfile;
