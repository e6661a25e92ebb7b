//! Bitmap-backed enumerations.
//!
//! Each enumerant owns a single bit per version, or `NA`. Each enumeration
//! also carries a per-version mask of the bits that version defines. A bit
//! outside the mask is not applicable at that version even if the
//! enumerant lists it.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Mismatch, OfpError, Result};
use crate::version::ProtocolVersion;

/// Marker for "no bit at this version".
pub const NA: i64 = -1;

/// An enumeration whose wire form is a set of bits in one integer.
pub trait Bitmapped: Copy + Ord + fmt::Debug + 'static {
    const NAME: &'static str;
    const ALL: &'static [Self];
    /// Legal bits per version, indexed by version ordinal.
    const MASKS: [u64; 4];

    /// Raw bit per version; `NA` when not applicable.
    fn bits(self) -> [i64; 4];
}

/// The bit `e` owns at `pv`, if any.
///
/// The `NA` sentinel is rejected before any mask arithmetic: as an unsigned
/// value it is all ones and would otherwise claim every bit in the mask.
fn legal_bit<E: Bitmapped>(e: E, pv: ProtocolVersion) -> Option<u64> {
    let raw = e.bits()[pv.ordinal()];
    if raw < 0 {
        return None;
    }
    let bit = raw as u64 & E::MASKS[pv.ordinal()];
    if bit == 0 { None } else { Some(bit) }
}

fn availability<E: Bitmapped>(e: E, pv: ProtocolVersion) -> std::result::Result<u64, Mismatch> {
    if let Some(bit) = legal_bit(e, pv) {
        return Ok(bit);
    }
    let present: Vec<ProtocolVersion> = ProtocolVersion::ALL
        .iter()
        .cloned()
        .filter(|&v| legal_bit(e, v).is_some())
        .collect();
    match present.first() {
        None => Err(Mismatch::NotEncodable),
        Some(&since) if pv.lt(since) => Err(Mismatch::NotSupportedBefore(since)),
        Some(&since) => {
            let gone = ProtocolVersion::ALL
                .iter()
                .cloned()
                .find(|&v| v.gt(since) && legal_bit(e, v).is_none());
            Err(gone.map_or(Mismatch::NotEncodable, Mismatch::DeprecatedSince))
        }
    }
}

/// Decode `bitmap` at version `pv` into the set of enumerants it names.
///
/// Any set bit that no enumerant legally owns at `pv` is a version mismatch.
pub fn decode_bitmap<E: Bitmapped>(bitmap: u64, pv: ProtocolVersion) -> Result<BTreeSet<E>> {
    let mut set = BTreeSet::new();
    let mut claimed = 0u64;
    for &e in E::ALL {
        if let Some(bit) = legal_bit(e, pv) {
            claimed |= bit;
            if bitmap & bit != 0 {
                set.insert(e);
            }
        }
    }
    let stray = bitmap & !claimed;
    if stray != 0 {
        return Err(OfpError::mismatch(E::NAME, pv, Mismatch::UndefinedBits(stray)));
    }
    Ok(set)
}

/// Encode `flags` at version `pv`. An empty set encodes to zero.
pub fn encode_bitmap<'a, E, I>(flags: I, pv: ProtocolVersion) -> Result<u64>
    where E: Bitmapped,
          I: IntoIterator<Item = &'a E>
{
    let mut bitmap = 0u64;
    for &e in flags {
        match availability(e, pv) {
            Ok(bit) => bitmap |= bit,
            Err(reason) => return Err(OfpError::mismatch(E::NAME, pv, reason)),
        }
    }
    Ok(bitmap)
}

/// Verifies that every legal bit is a single bit inside the mask and that no
/// two enumerants share a bit within one version.
pub fn check_table<E: Bitmapped>() -> std::result::Result<(), String> {
    for &pv in ProtocolVersion::ALL.iter() {
        let mut owned = 0u64;
        for &e in E::ALL {
            let raw = e.bits()[pv.ordinal()];
            if raw == NA {
                continue;
            }
            let bit = raw as u64;
            if !crate::bits::is_single_bit(bit) {
                return Err(format!("{}: {:?} has multi-bit value {:#x}", E::NAME, e, bit));
            }
            if bit & E::MASKS[pv.ordinal()] == 0 {
                return Err(format!("{}: {:?} bit {:#x} outside mask at {}", E::NAME, e, bit, pv));
            }
            if owned & bit != 0 {
                return Err(format!("{}: bit {:#x} owned twice at {}", E::NAME, bit, pv));
            }
            owned |= bit;
        }
        if owned != E::MASKS[pv.ordinal()] {
            return Err(format!("{}: mask at {} does not match owned bits {:#x}", E::NAME, pv, owned));
        }
    }
    Ok(())
}

/// Declares a bitmap-backed enumeration, its per-version masks and bits.
macro_rules! bitmap_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $what:literal, masks = $masks:expr ;
        {
            $( $(#[$vmeta:meta])* $variant:ident ($text:literal) => $bits:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::bitmap::Bitmapped for $name {
            const NAME: &'static str = $what;
            const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];
            const MASKS: [u64; 4] = $masks;

            fn bits(self) -> [i64; 4] {
                match self {
                    $( $name::$variant => $bits ),+
                }
            }
        }

        impl $name {
            pub fn decode_bitmap(bitmap: u64,
                                 pv: $crate::version::ProtocolVersion)
                                 -> $crate::error::Result<::std::collections::BTreeSet<$name>> {
                $crate::bitmap::decode_bitmap(bitmap, pv)
            }

            pub fn encode_bitmap<'a, I>(flags: I,
                                        pv: $crate::version::ProtocolVersion)
                                        -> $crate::error::Result<u64>
                where I: IntoIterator<Item = &'a $name>
            {
                $crate::bitmap::encode_bitmap(flags, pv)
            }

            /// The protocol's name for this flag.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
