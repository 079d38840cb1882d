//! Wire-format profile per device generation

use super::constants::FIRST_CURRENT_MODEL;

/// Field packing and framing rules for one device generation
///
/// Legacy units (Axe-Fx Standard/Ultra) split numeric fields into 4-bit
/// nibbles and send no checksum. Current units (Axe-Fx II and later) use
/// 7-bit groups and end every message with an XOR checksum byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WireProfile {
    Legacy,
    #[default]
    Current,
}

impl WireProfile {
    /// Select the profile for a model byte
    pub fn for_model(model: u8) -> Self {
        if model >= FIRST_CURRENT_MODEL {
            WireProfile::Current
        } else {
            WireProfile::Legacy
        }
    }

    /// Bits carried by each packed field byte
    pub fn field_bits(self) -> u32 {
        match self {
            WireProfile::Legacy => 4,
            WireProfile::Current => 7,
        }
    }

    /// Weight of the next field byte
    pub fn radix(self) -> u32 {
        1 << self.field_bits()
    }

    fn field_mask(self) -> u32 {
        self.radix() - 1
    }

    /// Whether outbound messages end with a checksum byte
    pub fn has_checksum(self) -> bool {
        self == WireProfile::Current
    }

    /// Number of field bytes used for a parameter value
    pub fn value_width(self) -> usize {
        match self {
            WireProfile::Legacy => 2,
            WireProfile::Current => 3,
        }
    }

    /// Largest id (effect or parameter) representable in two field bytes
    pub fn max_id(self) -> u16 {
        (self.radix() * self.radix() - 1) as u16
    }

    /// Split `value` into `width` little-endian field bytes
    pub fn pack(self, value: u32, width: usize) -> Vec<u8> {
        (0..width)
            .map(|i| ((value >> (self.field_bits() * i as u32)) & self.field_mask()) as u8)
            .collect()
    }

    /// Join little-endian field bytes back into a number
    pub fn unpack(self, fields: &[u8]) -> u32 {
        fields
            .iter()
            .rev()
            .fold(0, |acc, &b| acc * self.radix() + b as u32)
    }
}
