//! Code-based enumerations.
//!
//! Each enumerant owns one wire code per protocol version. A code may stay
//! the same everywhere, move between versions, appear at some version, or
//! disappear (be deprecated) at a later one. `NA` marks "not applicable"
//! at a version. Tables are plain constants; there is no per-enum codec
//! object.

use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

use crate::bits;

use crate::error::{Mismatch, OfpError, Result};
use crate::version::ProtocolVersion;

/// Marker for "no code at this version".
pub const NA: i32 = -1;

/// Per-version wire codes of one enumerant, indexed by version ordinal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VersionedCode([i32; 4]);

/// Same code at every version.
pub const fn fixed(code: u16) -> VersionedCode {
    VersionedCode([code as i32; 4])
}

/// `code` from version `pv` onwards, absent before it.
pub const fn since(code: u16, pv: ProtocolVersion) -> VersionedCode {
    let mut codes = [NA; 4];
    let mut i = pv.ordinal();
    while i < 4 {
        codes[i] = code as i32;
        i += 1;
    }
    VersionedCode(codes)
}

/// Explicit code per version; `NA` where the enumerant does not exist.
pub const fn per_version(codes: [i32; 4]) -> VersionedCode {
    VersionedCode(codes)
}

/// No code at any version; used by catch-all enumerants.
pub const fn never() -> VersionedCode {
    VersionedCode([NA; 4])
}

impl VersionedCode {
    /// The code at `pv`. Table entries outside `0..=0xffff` never yield a
    /// code; `check_table` reports them.
    pub fn code_at(self, pv: ProtocolVersion) -> Option<u16> {
        u16::try_from(self.0[pv.ordinal()]).ok()
    }

    /// First version at which a code exists.
    pub fn since_version(self) -> Option<ProtocolVersion> {
        ProtocolVersion::ALL.iter().cloned().find(|&pv| self.code_at(pv).is_some())
    }

    /// First version after `since_version` at which the code is gone again.
    pub fn deprecated_at(self) -> Option<ProtocolVersion> {
        let since = self.since_version()?;
        ProtocolVersion::ALL
            .iter()
            .cloned()
            .find(|&pv| pv.gt(since) && self.code_at(pv).is_none())
    }

    /// True if `code` is this enumerant's code at any version.
    fn claims(self, code: u32) -> bool {
        ProtocolVersion::ALL.iter().any(|&pv| self.code_at(pv).map(u32::from) == Some(code))
    }

    /// The code at `pv`, or the reason there is none.
    pub fn availability(self, pv: ProtocolVersion) -> std::result::Result<u16, Mismatch> {
        if let Some(code) = self.code_at(pv) {
            return Ok(code);
        }
        match self.since_version() {
            None => Err(Mismatch::NotEncodable),
            Some(since) if pv.lt(since) => Err(Mismatch::NotSupportedBefore(since)),
            Some(_) => match self.deprecated_at() {
                Some(dep) => Err(Mismatch::DeprecatedSince(dep)),
                None => Err(Mismatch::NotEncodable),
            },
        }
    }
}

/// An enumeration whose wire form is a small integer code.
pub trait CodeBased: Copy + Eq + fmt::Debug + 'static {
    /// Human name of the enumeration, used in failures.
    const NAME: &'static str;
    /// Every enumerant, in declaration order.
    const ALL: &'static [Self];

    fn versioned_code(self) -> VersionedCode;

    /// The catch-all enumerant unrecognized codes decode to, if the
    /// enumeration is a forward-compatible extension point.
    fn unknown() -> Option<Self> {
        None
    }
}

/// Decode a wire `code` at version `pv`.
///
/// Fails with a version mismatch when the code names an enumerant that does
/// not exist at `pv` (too new, or already deprecated), and with a decode
/// failure when no enumerant ever used the code. Enumerations with an
/// `unknown()` catch-all return it instead of the decode failure.
pub fn decode<E: CodeBased>(code: u32, pv: ProtocolVersion) -> Result<E> {
    let found = E::ALL
        .iter()
        .cloned()
        .find(|e| e.versioned_code().code_at(pv).map(u32::from) == Some(code));
    if let Some(e) = found {
        return Ok(e);
    }
    for e in E::ALL {
        let vc = e.versioned_code();
        if vc.claims(code) {
            if let Err(reason) = vc.availability(pv) {
                return Err(OfpError::mismatch(E::NAME, pv, reason));
            }
        }
    }
    if let Some(unknown) = E::unknown() {
        trace!(what = E::NAME, code, version = %pv, "unrecognized code mapped to catch-all");
        return Ok(unknown);
    }
    Err(OfpError::Decode {
        what: E::NAME,
        code: u64::from(code),
        version: pv,
    })
}

/// Encode `e` for version `pv`.
pub fn encode<E: CodeBased>(e: E, pv: ProtocolVersion) -> Result<u16> {
    e.versioned_code()
        .availability(pv)
        .map_err(|reason| OfpError::mismatch(E::NAME, pv, reason))
}

/// Decode a 32-bit mask in which bit `n` stands for the enumerant whose code
/// at `pv` is `n`. Async configuration masks use this form.
pub fn decode_mask<E: CodeBased + Ord>(mask: u32, pv: ProtocolVersion) -> Result<BTreeSet<E>> {
    let mut set = BTreeSet::new();
    for b in bits::set_bits(u64::from(mask)) {
        set.insert(decode::<E>(b as u32, pv)?);
    }
    Ok(set)
}

/// Inverse of `decode_mask`. Enumerants whose code does not fit in 32 bits
/// cannot be expressed.
pub fn encode_mask<'a, E, I>(items: I, pv: ProtocolVersion) -> Result<u32>
    where E: CodeBased,
          I: IntoIterator<Item = &'a E>
{
    let mut mask = 0u64;
    for &e in items {
        let code = u64::from(encode(e, pv)?);
        if code >= 32 {
            return Err(OfpError::ValueOutOfRange {
                field: E::NAME,
                value: code,
                bits: 5,
            });
        }
        mask = bits::bit(code, mask, true);
    }
    Ok(mask as u32)
}

/// Verifies that every table entry is `NA` or a 16-bit code, and that codes
/// are pairwise distinct within every version.
pub fn check_table<E: CodeBased>() -> std::result::Result<(), String> {
    for &e in E::ALL {
        let VersionedCode(raw) = e.versioned_code();
        if let Some(&bad) = raw.iter().find(|&&c| c != NA && u16::try_from(c).is_err()) {
            return Err(format!("{}: {:?} has code {} outside 16 bits", E::NAME, e, bad));
        }
    }
    for &pv in ProtocolVersion::ALL.iter() {
        let mut seen = std::collections::BTreeMap::new();
        for &e in E::ALL {
            if let Some(code) = e.versioned_code().code_at(pv) {
                if let Some(prev) = seen.insert(code, e) {
                    return Err(format!("{}: {:?} and {:?} share code {} at {}",
                                       E::NAME, prev, e, code, pv));
                }
            }
        }
    }
    Ok(())
}

/// Declares a code-based enumeration and its static version table.
///
/// ```ignore
/// code_enum! {
///     pub enum PortReason: "port reason" {
///         Add("ADD") => fixed(0),
///     }
/// }
/// ```
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident ($text:literal) => $code:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::code::CodeBased for $name {
            const NAME: &'static str = $what;
            const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            fn versioned_code(self) -> $crate::code::VersionedCode {
                match self {
                    $( $name::$variant => $code ),+
                }
            }
        }

        impl $name {
            pub fn decode(code: u32,
                          pv: $crate::version::ProtocolVersion)
                          -> $crate::error::Result<$name> {
                $crate::code::decode(code, pv)
            }

            pub fn encode(self, pv: $crate::version::ProtocolVersion) -> $crate::error::Result<u16> {
                $crate::code::encode(self, pv)
            }

            /// The protocol's name for this enumerant.
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
