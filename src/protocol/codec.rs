//! Frame sealing, inbound classification and vendor payload decoding

use super::constants::{
    sub_type, CHECKSUM_SEED, MANUFACTURER_ID, MIN_VENDOR_LEN, PAYLOAD_OFFSET, SUB_TYPE_OFFSET,
};
use super::events::{LooperStatus, VendorEvent};
use super::profile::WireProfile;
use crate::midi::SYSEX_END;

/// Classification of one inbound SysEx message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Our own loopback probe came back: the device is echoing our output.
    /// Check [`has_manufacturer_id`] before passing it on.
    ThruLoop,
    /// Vendor message long enough to decode
    Vendor,
    /// Vendor message too short to carry a sub-type
    Malformed,
    /// Some other SysEx
    Raw,
}

/// Running XOR checksum over `bytes`, seeded with the SysEx start byte
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(CHECKSUM_SEED, |sum, &b| sum ^ b) & 0x7F
}

/// Seal an outbound message for transmission
///
/// The last byte of `message` is the checksum slot. Current-generation
/// frames get the checksum written into it; legacy frames drop it. The
/// returned slice is what goes on the wire between F0 and F7.
pub fn encode(profile: WireProfile, message: &mut [u8]) -> &[u8] {
    let len = message.len();
    if len == 0 {
        return message;
    }

    if profile.has_checksum() {
        message[len - 1] = checksum(&message[..len - 1]);
        message
    } else {
        &message[..len - 1]
    }
}

/// Classify a raw inbound SysEx message (F0 ... F7)
pub fn classify(raw: &[u8]) -> Inbound {
    if raw.get(SUB_TYPE_OFFSET) == Some(&sub_type::LOOPBACK_CHECK) {
        return Inbound::ThruLoop;
    }

    if has_manufacturer_id(raw) {
        if raw.len() < MIN_VENDOR_LEN {
            Inbound::Malformed
        } else {
            Inbound::Vendor
        }
    } else {
        Inbound::Raw
    }
}

/// Whether `raw` carries the Fractal manufacturer id
pub fn has_manufacturer_id(raw: &[u8]) -> bool {
    raw.len() > 4 && raw[1..4] == MANUFACTURER_ID
}

/// Decode a vendor message
///
/// Returns `None` for messages shorter than [`MIN_VENDOR_LEN`]. Known
/// sub-types whose payload is too short for their fields degrade to
/// [`VendorEvent::Other`].
pub fn decode(profile: WireProfile, raw: &[u8]) -> Option<VendorEvent> {
    if raw.len() < MIN_VENDOR_LEN {
        return None;
    }

    let sub = raw[SUB_TYPE_OFFSET];
    let p = payload(profile, raw);

    let event = match sub {
        sub_type::FIRMWARE_VERSION if p.len() >= 2 => VendorEvent::FirmwareVersion {
            major: p[0],
            minor: p[1],
        },
        sub_type::PRESET_NAME => VendorEvent::PresetName { name: text(p) },
        sub_type::PRESET_CHANGE if p.len() >= 2 => VendorEvent::PresetNumber {
            number: WireProfile::Current.unpack(&p[..2]) as u16,
        },
        sub_type::REALTIME_TUNER if p.len() >= 3 => VendorEvent::TunerRealtime {
            note: p[0],
            string: p[1],
            fine: p[2],
        },
        sub_type::REALTIME_TEMPO => VendorEvent::TempoRealtime,
        sub_type::LOOPER_STATUS if !p.is_empty() => VendorEvent::LooperStatus(LooperStatus(p[0])),
        sub_type::GET_PRESET_BLOCKS_AND_BYPASS => VendorEvent::BypassStates { raw: p.to_vec() },
        sub_type::SET_PARAMETER => decode_parameter(profile, p).unwrap_or(VendorEvent::Other { sub_type: sub }),
        _ => VendorEvent::Other { sub_type: sub },
    };

    Some(event)
}

/// effect id (2 fields), param id (2 fields), value (2 or 3 fields), label
fn decode_parameter(profile: WireProfile, p: &[u8]) -> Option<VendorEvent> {
    let value_end = 4 + profile.value_width();
    if p.len() < value_end {
        return None;
    }

    Some(VendorEvent::ParameterSet {
        effect_id: profile.unpack(&p[0..2]) as u16,
        param_id: profile.unpack(&p[2..4]) as u16,
        value: profile.unpack(&p[4..value_end]),
        label: text(&p[value_end..]),
    })
}

/// Bytes after the sub-type, without the checksum and end byte
fn payload(profile: WireProfile, raw: &[u8]) -> &[u8] {
    let mut end = raw.len();
    if raw.last() == Some(&SYSEX_END) {
        end -= 1;
    }
    if profile.has_checksum() {
        end = end.saturating_sub(1);
    }
    raw.get(PAYLOAD_OFFSET..end.max(PAYLOAD_OFFSET)).unwrap_or(&[])
}

/// Zero-terminated ASCII
fn text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::EMPTY_BYTE;
    use proptest::prelude::*;

    /// Wrap an outbound body the way the transport does and seal it
    fn frame(profile: WireProfile, mut body: Vec<u8>) -> Vec<u8> {
        let mut raw = vec![0xF0];
        raw.extend_from_slice(encode(profile, &mut body));
        raw.push(0xF7);
        raw
    }

    #[test]
    fn test_checksum_matches_documented_looper_request() {
        // F0 00 01 74 03 23 01 24 F7
        let mut body = vec![0x00, 0x01, 0x74, 0x03, 0x23, 0x01, EMPTY_BYTE];
        let sealed = encode(WireProfile::Current, &mut body);
        assert_eq!(sealed, &[0x00, 0x01, 0x74, 0x03, 0x23, 0x01, 0x24]);
        assert_eq!(body[6], 0x24);
    }

    #[test]
    fn test_legacy_encode_drops_checksum_slot() {
        let mut body = vec![0x00, 0x01, 0x74, 0x01, 0x0F, 0x55];
        let sealed = encode(WireProfile::Legacy, &mut body);
        assert_eq!(sealed, &[0x00, 0x01, 0x74, 0x01, 0x0F]);
        // Buffer itself is untouched
        assert_eq!(body[5], 0x55);
    }

    #[test]
    fn test_encode_empty_buffer() {
        let mut body: Vec<u8> = Vec::new();
        assert!(encode(WireProfile::Current, &mut body).is_empty());
        assert!(encode(WireProfile::Legacy, &mut body).is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&[0xF0, 0x00, 0x01, 0x74, 0x03, 0x10, 0x00, 0xF7]), Inbound::Vendor);
        assert_eq!(classify(&[0xF0, 0x00, 0x01, 0x74, 0x03]), Inbound::Malformed);
        assert_eq!(classify(&[0xF0, 0x00, 0x01, 0x74]), Inbound::Raw);
        assert_eq!(classify(&[0xF0, 0x43, 0x10, 0x4C, 0x00, 0x00, 0xF7]), Inbound::Raw);
        assert_eq!(classify(&[]), Inbound::Raw);
        assert_eq!(
            classify(&[0xF0, 0x7D, 0x7D, 0x7D, 0x7D, 0x7D, 0x02, 0xF7]),
            Inbound::ThruLoop
        );
    }

    #[test]
    fn test_loopback_wins_over_vendor_decoding() {
        let raw = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::LOOPBACK_CHECK, 0x00, 0xF7];
        assert_eq!(classify(&raw), Inbound::ThruLoop);
    }

    #[test]
    fn test_decode_rejects_short_messages() {
        assert_eq!(decode(WireProfile::Current, &[0xF0, 0x00, 0x01, 0x74, 0x03]), None);
    }

    #[test]
    fn test_decode_current_parameter() {
        // effect 106, param 3, value 1 + 2*128 + 3*16384, label "Hi"
        let raw = [
            0xF0, 0x00, 0x01, 0x74, 0x03, 0x02,
            106, 0, 3, 0, 1, 2, 3,
            b'H', b'i', 0x00,
            0x11, 0xF7,
        ];
        let event = decode(WireProfile::Current, &raw).unwrap();
        assert_eq!(event, VendorEvent::ParameterSet {
            effect_id: 106,
            param_id: 3,
            value: 1 + 2 * 128 + 3 * 16384,
            label: "Hi".to_string(),
        });
    }

    #[test]
    fn test_decode_legacy_parameter() {
        let raw = [
            0xF0, 0x00, 0x01, 0x74, 0x01, 0x02,
            0x0A, 0x06, 0x03, 0x01, 0x0F, 0x02,
            0xF7,
        ];
        let event = decode(WireProfile::Legacy, &raw).unwrap();
        assert_eq!(event, VendorEvent::ParameterSet {
            effect_id: 0x6A,
            param_id: 0x13,
            value: 0x2F,
            label: String::new(),
        });
    }

    #[test]
    fn test_truncated_parameter_degrades_to_other() {
        let raw = [0xF0, 0x00, 0x01, 0x74, 0x03, 0x02, 106, 0, 0x11, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &raw),
            Some(VendorEvent::Other { sub_type: sub_type::SET_PARAMETER })
        );
    }

    #[test]
    fn test_decode_preset_name_and_number() {
        let mut name = vec![0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::PRESET_NAME];
        name.extend_from_slice(b"Clean Ch  ");
        name.extend_from_slice(&[0x00, 0x3C, 0xF7]);
        assert_eq!(
            decode(WireProfile::Current, &name),
            Some(VendorEvent::PresetName { name: "Clean Ch".to_string() })
        );

        let number = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::PRESET_CHANGE, 0x01, 0x01, 0x66, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &number),
            Some(VendorEvent::PresetNumber { number: 129 })
        );
    }

    #[test]
    fn test_decode_realtime_and_looper() {
        let tuner = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::REALTIME_TUNER, 7, 6, 63, 0x00, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &tuner),
            Some(VendorEvent::TunerRealtime { note: 7, string: 6, fine: 63 })
        );

        let tempo = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::REALTIME_TEMPO, 0x7A, 0xF7];
        assert_eq!(decode(WireProfile::Current, &tempo), Some(VendorEvent::TempoRealtime));

        let looper = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::LOOPER_STATUS, 0x03, 0x00, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &looper),
            Some(VendorEvent::LooperStatus(LooperStatus(0x03)))
        );
    }

    #[test]
    fn test_decode_unknown_sub_type() {
        let raw = [0xF0, 0x00, 0x01, 0x74, 0x03, 0x42, 0x00, 0xF7];
        assert_eq!(decode(WireProfile::Current, &raw), Some(VendorEvent::Other { sub_type: 0x42 }));
    }

    #[test]
    fn test_decode_firmware_version() {
        let raw = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::FIRMWARE_VERSION, 10, 3, 0x00, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &raw),
            Some(VendorEvent::FirmwareVersion { major: 10, minor: 3 })
        );

        // Legacy: no checksum, so bytes 6 and 7 are still the version
        let legacy = [0xF0, 0x00, 0x01, 0x74, 0x01, sub_type::FIRMWARE_VERSION, 9, 4, 0xF7];
        assert_eq!(
            decode(WireProfile::Legacy, &legacy),
            Some(VendorEvent::FirmwareVersion { major: 9, minor: 4 })
        );
    }

    #[test]
    fn test_short_firmware_reply_degrades_to_other() {
        let raw = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::FIRMWARE_VERSION, 10, 0x00, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &raw),
            Some(VendorEvent::Other { sub_type: sub_type::FIRMWARE_VERSION })
        );
    }

    #[test]
    fn test_decode_bypass_dump_strips_trailer() {
        let raw = [
            0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::GET_PRESET_BLOCKS_AND_BYPASS,
            0x46, 0x06, 0x10, 0x01, 0x2A,
            0x5C, 0xF7,
        ];
        assert_eq!(
            decode(WireProfile::Current, &raw),
            Some(VendorEvent::BypassStates { raw: vec![0x46, 0x06, 0x10, 0x01, 0x2A] })
        );

        let empty = [0xF0, 0x00, 0x01, 0x74, 0x03, sub_type::GET_PRESET_BLOCKS_AND_BYPASS, 0x00, 0xF7];
        assert_eq!(
            decode(WireProfile::Current, &empty),
            Some(VendorEvent::BypassStates { raw: Vec::new() })
        );
    }

    #[test]
    fn test_manufacturer_id_check() {
        assert!(has_manufacturer_id(&[0xF0, 0x00, 0x01, 0x74, 0x03]));
        assert!(!has_manufacturer_id(&[0xF0, 0x00, 0x01, 0x74]));
        assert!(!has_manufacturer_id(&[0xF0, 0x7D, 0x7D, 0x7D, 0x7D, 0x7D, 0xF7]));
    }

    proptest! {
        #[test]
        fn prop_checksum_byte_is_xor_fold(body in prop::collection::vec(0u8..0x80, 2..64)) {
            let mut message = body.clone();
            let sealed = encode(WireProfile::Current, &mut message).to_vec();
            let expected = body[..body.len() - 1]
                .iter()
                .fold(0xF0u8, |sum, b| sum ^ b) & 0x7F;

            prop_assert_eq!(sealed.len(), body.len());
            prop_assert_eq!(sealed[sealed.len() - 1], expected);
            prop_assert_eq!(&sealed[..sealed.len() - 1], &body[..body.len() - 1]);
        }

        #[test]
        fn prop_legacy_frames_are_one_byte_shorter(body in prop::collection::vec(0u8..0x80, 1..64)) {
            let mut message = body.clone();
            let sealed = encode(WireProfile::Legacy, &mut message);
            prop_assert_eq!(sealed, &body[..body.len() - 1]);
        }

        #[test]
        fn prop_framed_parameter_decodes(effect in 0u16..256, param in 0u16..256, value in 0u32..256) {
            for profile in [WireProfile::Legacy, WireProfile::Current] {
                let mut body = MANUFACTURER_ID.to_vec();
                body.push(3);
                body.push(sub_type::SET_PARAMETER);
                body.extend(profile.pack(effect as u32, 2));
                body.extend(profile.pack(param as u32, 2));
                body.extend(profile.pack(value, profile.value_width()));
                body.push(0);
                body.push(EMPTY_BYTE);

                let raw = frame(profile, body);
                match decode(profile, &raw) {
                    Some(VendorEvent::ParameterSet { effect_id, param_id, value: v, .. }) => {
                        prop_assert_eq!(effect_id, effect);
                        prop_assert_eq!(param_id, param);
                        prop_assert_eq!(v, value);
                    }
                    other => prop_assert!(false, "unexpected {:?}", other),
                }
            }
        }
    }
}
