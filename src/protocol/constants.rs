//! Protocol constants for the Fractal Audio SysEx extension

/// Fractal Audio manufacturer id
pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x01, 0x74];

/// Model byte of the newest supported generation (Axe-Fx II)
pub const DEFAULT_MODEL: u8 = 3;

/// First model byte that uses the current (7-bit, checksummed) wire format
pub const FIRST_CURRENT_MODEL: u8 = 3;

/// Filler for unused and checksum placeholder bytes
pub const EMPTY_BYTE: u8 = 0x00;

/// Seed of the running XOR checksum (the SysEx start byte)
pub const CHECKSUM_SEED: u8 = 0xF0;

// Inbound offsets, counted from the F0 start byte
pub const MODEL_OFFSET: usize = 4;
pub const SUB_TYPE_OFFSET: usize = 5;
pub const PAYLOAD_OFFSET: usize = 6;

/// Shortest inbound vendor message that can be decoded
pub const MIN_VENDOR_LEN: usize = 6;

/// Sub-type bytes
pub mod sub_type {
    pub const SET_PARAMETER: u8 = 0x02;
    pub const FIRMWARE_VERSION: u8 = 0x08;
    pub const REALTIME_TUNER: u8 = 0x0D;
    pub const GET_PRESET_BLOCKS_AND_BYPASS: u8 = 0x0E;
    pub const PRESET_NAME: u8 = 0x0F;
    pub const REALTIME_TEMPO: u8 = 0x10;
    pub const PRESET_CHANGE: u8 = 0x14;
    pub const LOOPER_STATUS: u8 = 0x23;
    /// Reserved probe value; never sent by a device, only echoed back by a thru loop
    pub const LOOPBACK_CHECK: u8 = 0x7D;
}

/// Control change numbers
pub mod cc {
    pub const BANK_SELECT: u8 = 0;
    pub const AMP_1_XY: u8 = 100;
}

/// Connection is considered lost after this much vendor silence
pub const LIVENESS_TIMEOUT_MS: u64 = 3000;

/// Tuner is considered off after this much tuner silence
pub const TUNER_TIMEOUT_MS: u64 = 500;

/// Presets per bank, for the bank-select + program-change pair
pub const PRESETS_PER_BANK: u16 = 128;

/// Bank select carries a 7-bit bank number
pub const MAX_BANK: u16 = 127;

/// Tuner note names, index 0 is A
pub const NOTE_NAMES: [&str; 12] = [
    "A ", "A#", "B ", "C ", "C#", "D ", "D#", "E ", "F ", "F#", "G ", "G#",
];
