//! Every table refuses enumerants outside their versions and rejects codes
//! and bits nothing defines.

use rust_ofp_codec::bitmap::{self, Bitmapped};
use rust_ofp_codec::code::{self, CodeBased};
use rust_ofp_codec::error::Mismatch;
use rust_ofp_codec::openflow::*;
use rust_ofp_codec::{OfpError, ProtocolVersion};

fn owner_of<E: CodeBased>(code: u16, pv: ProtocolVersion) -> Option<E> {
    E::ALL.iter().cloned().find(|&o| o.versioned_code().code_at(pv) == Some(code))
}

fn codes_are_gated<E: CodeBased>() {
    for &e in E::ALL {
        let vc = e.versioned_code();
        let since = match vc.since_version() {
            Some(since) => since,
            None => {
                for &pv in ProtocolVersion::ALL.iter() {
                    assert!(code::encode(e, pv).unwrap_err().is_version_mismatch(), "{:?}", e);
                }
                continue;
            }
        };
        let first = vc.code_at(since).unwrap();
        for &pv in ProtocolVersion::ALL.iter() {
            if vc.code_at(pv).is_some() {
                continue;
            }
            let err = code::encode(e, pv).unwrap_err();
            if pv.lt(since) {
                assert_eq!(err,
                           OfpError::VersionMismatch {
                               what: E::NAME,
                               version: pv,
                               reason: Mismatch::NotSupportedBefore(since),
                           });
            } else {
                assert!(err.is_version_mismatch(), "{:?} at {}", e, pv);
            }
            match owner_of::<E>(first, pv) {
                Some(owner) => assert_eq!(code::decode::<E>(u32::from(first), pv), Ok(owner)),
                None => {
                    assert!(code::decode::<E>(u32::from(first), pv).unwrap_err().is_version_mismatch(),
                            "{} {} at {}",
                            E::NAME,
                            first,
                            pv)
                }
            }
        }
    }
}

fn unknown_codes_are_rejected<E: CodeBased>() {
    let highest = E::ALL
        .iter()
        .flat_map(|&e| ProtocolVersion::ALL.iter().filter_map(move |&pv| e.versioned_code().code_at(pv)))
        .max()
        .map_or(0, u32::from);
    let unused = highest + 1;
    for &pv in ProtocolVersion::ALL.iter() {
        match E::unknown() {
            Some(u) => assert_eq!(code::decode::<E>(unused, pv), Ok(u)),
            None => {
                assert_eq!(code::decode::<E>(unused, pv),
                           Err(OfpError::Decode {
                               what: E::NAME,
                               code: u64::from(unused),
                               version: pv,
                           }))
            }
        }
    }
}

fn all_codes<E: CodeBased>() {
    assert_eq!(code::check_table::<E>(), Ok(()));
    codes_are_gated::<E>();
    unknown_codes_are_rejected::<E>();
}

/// Bit `e` may use at `pv`, computed from the raw table.
fn usable_bit<E: Bitmapped>(e: E, pv: ProtocolVersion) -> Option<u64> {
    let raw = e.bits()[pv.ordinal()];
    if raw < 0 {
        return None;
    }
    match raw as u64 & E::MASKS[pv.ordinal()] {
        0 => None,
        bit => Some(bit),
    }
}

fn bits_are_gated<E: Bitmapped>() {
    for &e in E::ALL {
        let first = ProtocolVersion::ALL.iter().filter_map(|&pv| usable_bit(e, pv)).next();
        for &pv in ProtocolVersion::ALL.iter() {
            if usable_bit(e, pv).is_some() {
                continue;
            }
            assert!(bitmap::encode_bitmap(&[e], pv).unwrap_err().is_version_mismatch(),
                    "{:?} at {}",
                    e,
                    pv);
            let bit = match first {
                Some(bit) => bit,
                None => continue,
            };
            let owner = E::ALL.iter().cloned().find(|&o| usable_bit(o, pv) == Some(bit));
            let decoded = bitmap::decode_bitmap::<E>(bit, pv);
            match owner {
                Some(o) => assert_eq!(decoded.map(|set| set.into_iter().collect::<Vec<_>>()), Ok(vec![o])),
                None => assert!(decoded.unwrap_err().is_version_mismatch(), "{:?} at {}", e, pv),
            }
        }
    }
}

fn undefined_bits_are_rejected<E: Bitmapped>() {
    let outside = !E::MASKS.iter().fold(0u64, |acc, &m| acc | m);
    let bit = outside & outside.wrapping_neg();
    for &pv in ProtocolVersion::ALL.iter() {
        assert_eq!(bitmap::decode_bitmap::<E>(bit, pv),
                   Err(OfpError::VersionMismatch {
                       what: E::NAME,
                       version: pv,
                       reason: Mismatch::UndefinedBits(bit),
                   }));
    }
}

fn all_bits<E: Bitmapped>() {
    assert_eq!(bitmap::check_table::<E>(), Ok(()));
    bits_are_gated::<E>();
    undefined_bits_are_rejected::<E>();
}

#[test]
fn code_tables() {
    all_codes::<MessageType>();
    all_codes::<ErrorType>();
    all_codes::<FlowModCommand>();
    all_codes::<GroupModCommand>();
    all_codes::<GroupType>();
    all_codes::<MeterModCommand>();
    all_codes::<ControllerRole>();
    all_codes::<PacketInReason>();
    all_codes::<FlowRemovedReason>();
    all_codes::<PortReason>();
    all_codes::<MultipartType>();
    all_codes::<ActionType>();
    all_codes::<TableMiss>();
    all_codes::<HelloElementType>();
}

#[test]
fn bitmap_tables() {
    all_bits::<FlowModFlag>();
    all_bits::<GroupCapability>();
    all_bits::<Capability>();
    all_bits::<ConfigFlag>();
    all_bits::<MeterFlag>();
    all_bits::<PortConfig>();
}

#[test]
fn hello_element_types_fall_back_to_unknown() {
    use rust_ofp_codec::ProtocolVersion::*;
    assert_eq!(HelloElementType::decode(1, V1_3), Ok(HelloElementType::VersionBitmap));
    assert_eq!(HelloElementType::decode(7, V1_3), Ok(HelloElementType::Unknown));
    assert!(HelloElementType::decode(1, V1_2).unwrap_err().is_version_mismatch());
    assert!(HelloElementType::Unknown.encode(V1_3).unwrap_err().is_version_mismatch());
}
