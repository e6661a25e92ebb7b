//! Property tests over the versioned enumeration tables.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rust_ofp_codec::bitmap::{self, Bitmapped};
use rust_ofp_codec::code::{self, CodeBased};
use rust_ofp_codec::openflow::*;
use rust_ofp_codec::ProtocolVersion;

fn any_version() -> impl Strategy<Value = ProtocolVersion> {
    prop::sample::select(ProtocolVersion::ALL.to_vec())
}

/// Flags of `E` that own a bit at `pv`.
fn legal_flags<E: Bitmapped>(pv: ProtocolVersion) -> Vec<E> {
    E::ALL.iter().cloned().filter(|&e| bitmap::encode_bitmap(&[e], pv).is_ok()).collect()
}

fn bitmap_round_trip<E: Bitmapped>(pv: ProtocolVersion, picks: &[bool]) -> Result<(), TestCaseError> {
    let flags: BTreeSet<E> = legal_flags::<E>(pv)
        .into_iter()
        .zip(picks.iter())
        .filter(|&(_, &pick)| pick)
        .map(|(e, _)| e)
        .collect();
    let encoded = bitmap::encode_bitmap(&flags, pv).unwrap();
    prop_assert_eq!(encoded & !E::MASKS[pv.ordinal()], 0);
    prop_assert_eq!(bitmap::decode_bitmap::<E>(encoded, pv).unwrap(), flags);
    Ok(())
}

fn bitmap_decode_is_exact<E: Bitmapped>(pv: ProtocolVersion, raw: u64) -> Result<(), TestCaseError> {
    match bitmap::decode_bitmap::<E>(raw, pv) {
        Ok(flags) => prop_assert_eq!(bitmap::encode_bitmap(&flags, pv).unwrap(), raw),
        Err(e) => {
            prop_assert!(e.is_version_mismatch());
            prop_assert_ne!(raw & !E::MASKS[pv.ordinal()], 0);
        }
    }
    Ok(())
}

fn code_round_trip<E: CodeBased>(pv: ProtocolVersion) {
    for &e in E::ALL {
        if let Ok(code) = code::encode(e, pv) {
            assert_eq!(code::decode::<E>(u32::from(code), pv).unwrap(), e);
        }
    }
}

#[test]
fn tables_are_consistent() {
    assert_eq!(code::check_table::<MessageType>(), Ok(()));
    assert_eq!(code::check_table::<ErrorType>(), Ok(()));
    assert_eq!(code::check_table::<FlowModCommand>(), Ok(()));
    assert_eq!(code::check_table::<GroupModCommand>(), Ok(()));
    assert_eq!(code::check_table::<GroupType>(), Ok(()));
    assert_eq!(code::check_table::<MeterModCommand>(), Ok(()));
    assert_eq!(code::check_table::<ControllerRole>(), Ok(()));
    assert_eq!(code::check_table::<PacketInReason>(), Ok(()));
    assert_eq!(code::check_table::<FlowRemovedReason>(), Ok(()));
    assert_eq!(code::check_table::<PortReason>(), Ok(()));
    assert_eq!(code::check_table::<MultipartType>(), Ok(()));
    assert_eq!(code::check_table::<ActionType>(), Ok(()));
    assert_eq!(code::check_table::<TableMiss>(), Ok(()));

    assert_eq!(bitmap::check_table::<FlowModFlag>(), Ok(()));
    assert_eq!(bitmap::check_table::<GroupCapability>(), Ok(()));
    assert_eq!(bitmap::check_table::<Capability>(), Ok(()));
    assert_eq!(bitmap::check_table::<ConfigFlag>(), Ok(()));
    assert_eq!(bitmap::check_table::<MeterFlag>(), Ok(()));
    assert_eq!(bitmap::check_table::<PortConfig>(), Ok(()));
}

#[test]
fn codes_decode_to_what_they_encode() {
    for &pv in ProtocolVersion::ALL.iter() {
        code_round_trip::<MessageType>(pv);
        code_round_trip::<ErrorType>(pv);
        code_round_trip::<FlowModCommand>(pv);
        code_round_trip::<GroupType>(pv);
        code_round_trip::<ControllerRole>(pv);
        code_round_trip::<PacketInReason>(pv);
        code_round_trip::<FlowRemovedReason>(pv);
        code_round_trip::<MultipartType>(pv);
        code_round_trip::<ActionType>(pv);
    }
}

#[test]
fn message_types_move_between_1_0_and_1_1() {
    use rust_ofp_codec::ProtocolVersion::*;
    assert_eq!(MessageType::PortMod.encode(V1_0), Ok(15));
    assert_eq!(MessageType::PortMod.encode(V1_1), Ok(16));
    assert_eq!(MessageType::decode(15, V1_1), Ok(MessageType::GroupMod));
    assert_eq!(MessageType::decode(18, V1_0), Ok(MessageType::BarrierRequest));
    assert!(MessageType::decode(30, V1_3).is_err());
    assert!(MessageType::MeterMod.encode(V1_2).unwrap_err().is_version_mismatch());
}

proptest! {
    #[test]
    fn legal_flag_sets_round_trip(pv in any_version(), picks in prop::collection::vec(any::<bool>(), 16)) {
        bitmap_round_trip::<FlowModFlag>(pv, &picks)?;
        bitmap_round_trip::<GroupCapability>(pv, &picks)?;
        bitmap_round_trip::<Capability>(pv, &picks)?;
        bitmap_round_trip::<ConfigFlag>(pv, &picks)?;
        bitmap_round_trip::<MeterFlag>(pv, &picks)?;
        bitmap_round_trip::<PortConfig>(pv, &picks)?;
    }

    #[test]
    fn decoded_bitmaps_re_encode_exactly(pv in any_version(), raw in 0u64..0x400) {
        bitmap_decode_is_exact::<FlowModFlag>(pv, raw)?;
        bitmap_decode_is_exact::<GroupCapability>(pv, raw)?;
        bitmap_decode_is_exact::<Capability>(pv, raw)?;
        bitmap_decode_is_exact::<ConfigFlag>(pv, raw)?;
        bitmap_decode_is_exact::<MeterFlag>(pv, raw)?;
        bitmap_decode_is_exact::<PortConfig>(pv, raw)?;
    }

    #[test]
    fn message_type_codes_never_panic(pv in any_version(), raw in any::<u8>()) {
        if let Ok(t) = MessageType::decode(u32::from(raw), pv) {
            prop_assert_eq!(t.encode(pv), Ok(u16::from(raw)));
        }
    }
}
