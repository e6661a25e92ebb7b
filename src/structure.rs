//! Structures embedded in message bodies.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::bits;
use crate::error::{OfpError, Result};
use crate::mutable::{Editor, Latch};
use crate::ofp_utils::pad_to_8;
use crate::openflow::{HelloElementType, MessageType};
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// One element of a 1.3 `HELLO`.
///
/// Built standalone through `MessageFactory::create_structure`, which hands
/// out a writable `MutableStructure`, or read off the wire by `parse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HelloElement {
    /// Versions the sender is willing to speak.
    VersionBitmap(BTreeSet<ProtocolVersion>),
    /// An element type this crate does not interpret, kept verbatim.
    Unknown { type_code: u16, data: Vec<u8> },
}

const ELEMENT_HEADER_LEN: usize = 4;

impl HelloElement {
    /// Elements only exist from 1.3 on.
    pub const VERSION: ProtocolVersion = ProtocolVersion::V1_3;

    pub fn version_bitmap(versions: &[ProtocolVersion]) -> HelloElement {
        HelloElement::VersionBitmap(versions.iter().cloned().collect())
    }

    pub fn element_type(&self) -> HelloElementType {
        match *self {
            HelloElement::VersionBitmap(_) => HelloElementType::VersionBitmap,
            HelloElement::Unknown { .. } => HelloElementType::Unknown,
        }
    }

    fn payload_len(&self) -> usize {
        match *self {
            // one 32-bit word covers every version byte we know
            HelloElement::VersionBitmap(_) => 4,
            HelloElement::Unknown { ref data, .. } => data.len(),
        }
    }

    /// Encoded size, padding included.
    pub fn size_of(&self) -> usize {
        let len = ELEMENT_HEADER_LEN + self.payload_len();
        len + pad_to_8(len)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            HelloElement::VersionBitmap(ref versions) if versions.is_empty() => {
                Err(OfpError::Incomplete(MessageType::Hello, "version bitmap"))
            }
            _ => Ok(()),
        }
    }

    pub fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<HelloElement> {
        version::ver_min_13(pv, "hello element")?;
        let type_code = bytes.read_u16()?;
        let len = bytes.read_u16()? as usize;
        if len < ELEMENT_HEADER_LEN {
            return Err(OfpError::Malformed(format!("hello element length {}", len)));
        }
        let payload = bytes.read_bytes(len - ELEMENT_HEADER_LEN)?;
        bytes.skip(pad_to_8(len))?;

        match HelloElementType::decode(u32::from(type_code), pv)? {
            HelloElementType::VersionBitmap => {
                if payload.len() % 4 != 0 {
                    return Err(OfpError::Malformed(format!("version bitmap of {} bytes",
                                                           payload.len())));
                }
                let mut versions = BTreeSet::new();
                for (i, word) in payload.chunks(4).enumerate() {
                    let word = word.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
                    for b in bits::set_bits(word) {
                        let code = i as u64 * 32 + b;
                        let decoded = u8::try_from(code)
                            .ok()
                            .and_then(|c| ProtocolVersion::decode(c).ok());
                        match decoded {
                            Some(v) => {
                                versions.insert(v);
                            }
                            None => debug!(code, "ignoring unknown version in hello bitmap"),
                        }
                    }
                }
                Ok(HelloElement::VersionBitmap(versions))
            }
            HelloElementType::Unknown => {
                Ok(HelloElement::Unknown {
                    type_code: type_code,
                    data: payload,
                })
            }
        }
    }

    pub fn marshal<W: PacketWriter>(&self, bytes: &mut W) -> Result<()> {
        let len = ELEMENT_HEADER_LEN + self.payload_len();
        match *self {
            HelloElement::VersionBitmap(ref versions) => {
                bytes.write_u16(HelloElementType::VersionBitmap.encode(HelloElement::VERSION)?)?;
                bytes.write_u16(len as u16)?;
                let word = versions.iter()
                    .fold(0u64, |acc, v| bits::bit(u64::from(v.code()), acc, true));
                bytes.write_u32(word as u32)?;
            }
            HelloElement::Unknown { type_code, ref data } => {
                if len > u16::max_value() as usize {
                    return Err(OfpError::ValueOutOfRange {
                        field: "hello element length",
                        value: len as u64,
                        bits: 16,
                    });
                }
                bytes.write_u16(type_code)?;
                bytes.write_u16(len as u16)?;
                bytes.write_bytes(data)?;
            }
        }
        bytes.write_zeros(pad_to_8(len))
    }
}

impl fmt::Display for HelloElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HelloElement::VersionBitmap(ref versions) => {
                let names: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}:[{}]}}", self.element_type(), names.join(","))
            }
            HelloElement::Unknown { type_code, ref data } => {
                write!(f, "{{{}:type={:#06x},len={}}}", self.element_type(), type_code, data.len())
            }
        }
    }
}

/// Flow match in its encoded form for one protocol version.
///
/// Field-level match construction is outside this crate; a `Match` frames
/// and carries the bytes so flow mods survive a decode/encode cycle intact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Match {
    version: ProtocolVersion,
    bytes: Vec<u8>,
}

const MATCH_LEN_1_0: usize = 40;
const MATCH_LEN_1_1: usize = 88;
const OFPMT_STANDARD: u16 = 0;
const OFPMT_OXM: u16 = 1;

impl Match {
    /// The match that wildcards every field.
    pub fn all(pv: ProtocolVersion) -> Match {
        let mut bytes: Vec<u8> = Vec::new();
        match pv {
            ProtocolVersion::V1_0 => {
                // OFPFW_ALL, then every field zeroed
                bytes.extend_from_slice(&[0x00, 0x3f, 0xff, 0xff]);
                bytes.resize(MATCH_LEN_1_0, 0);
            }
            ProtocolVersion::V1_1 => {
                bytes.extend_from_slice(&[0, OFPMT_STANDARD as u8, 0, MATCH_LEN_1_1 as u8]);
                bytes.extend_from_slice(&[0; 4]); // in_port
                bytes.extend_from_slice(&[0x00, 0x00, 0x03, 0xff]); // OFPFW_ALL
                for _ in 0..2 {
                    bytes.extend_from_slice(&[0; 6]); // dl address
                    bytes.extend_from_slice(&[0xff; 6]); // its mask
                }
                bytes.extend_from_slice(&[0; 8]); // vlan, pcp, pad, dl_type, tos, proto
                for _ in 0..2 {
                    bytes.extend_from_slice(&[0; 4]); // nw address
                    bytes.extend_from_slice(&[0xff; 4]); // its mask
                }
                bytes.extend_from_slice(&[0; 12]); // tp ports, mpls label, tc, pad
                bytes.extend_from_slice(&[0; 8]); // metadata
                bytes.extend_from_slice(&[0xff; 8]); // metadata mask
            }
            _ => {
                bytes.extend_from_slice(&[0, OFPMT_OXM as u8, 0, 4]);
                bytes.extend_from_slice(&[0; 4]);
            }
        }
        Match {
            version: pv,
            bytes: bytes,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// The encoded match, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_of(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_match_all(&self) -> bool {
        *self == Match::all(self.version)
    }

    /// Frames an encoded match read at `pv`.
    pub fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<Match> {
        let raw = match pv {
            ProtocolVersion::V1_0 => bytes.read_bytes(MATCH_LEN_1_0)?,
            ProtocolVersion::V1_1 => {
                let match_type = bytes.read_u16()?;
                let len = bytes.read_u16()? as usize;
                if match_type != OFPMT_STANDARD || len != MATCH_LEN_1_1 {
                    return Err(OfpError::Malformed(format!("standard match type {} length {}",
                                                           match_type,
                                                           len)));
                }
                let mut raw = vec![0, OFPMT_STANDARD as u8, 0, MATCH_LEN_1_1 as u8];
                raw.extend(bytes.read_bytes(len - 4)?);
                raw
            }
            _ => {
                let match_type = bytes.read_u16()?;
                let len = bytes.read_u16()? as usize;
                if match_type != OFPMT_OXM || len < 4 {
                    return Err(OfpError::Malformed(format!("oxm match type {} length {}",
                                                           match_type,
                                                           len)));
                }
                let mut raw = Vec::with_capacity(len + pad_to_8(len));
                raw.extend_from_slice(&match_type.to_be_bytes());
                raw.extend_from_slice(&(len as u16).to_be_bytes());
                raw.extend(bytes.read_bytes(len - 4 + pad_to_8(len))?);
                raw
            }
        };
        Ok(Match {
            version: pv,
            bytes: raw,
        })
    }

    pub fn marshal<W: PacketWriter>(&self, bytes: &mut W) -> Result<()> {
        bytes.write_bytes(&self.bytes)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_match_all() {
            write!(f, "{{match({}):*}}", self.version)
        } else {
            write!(f, "{{match({}):{}b}}", self.version, self.bytes.len())
        }
    }
}

/// Kinds of structure a message body can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructureType {
    HelloElement,
    Match,
    Action,
    Instruction,
    Bucket,
    MeterBand,
    Port,
    Queue,
    TableFeature,
}

impl StructureType {
    pub const ALL: &'static [StructureType] = &[StructureType::HelloElement,
                                                StructureType::Match,
                                                StructureType::Action,
                                                StructureType::Instruction,
                                                StructureType::Bucket,
                                                StructureType::MeterBand,
                                                StructureType::Port,
                                                StructureType::Queue,
                                                StructureType::TableFeature];

    pub fn name(self) -> &'static str {
        match self {
            StructureType::HelloElement => "HELLO_ELEMENT",
            StructureType::Match => "MATCH",
            StructureType::Action => "ACTION",
            StructureType::Instruction => "INSTRUCTION",
            StructureType::Bucket => "BUCKET",
            StructureType::MeterBand => "METER_BAND",
            StructureType::Port => "PORT",
            StructureType::Queue => "QUEUE",
            StructureType::TableFeature => "TABLE_FEATURE",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structure of one of the kinds this crate builds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Structure {
    HelloElement(HelloElement),
    Match(Match),
}

impl Structure {
    /// The blank structure of kind `st` at `pv`.
    pub(crate) fn zeroed(st: StructureType, pv: ProtocolVersion) -> Result<Structure> {
        match st {
            StructureType::HelloElement => {
                version::ver_min_13(pv, "hello element")?;
                Ok(Structure::HelloElement(HelloElement::VersionBitmap(BTreeSet::new())))
            }
            StructureType::Match => Ok(Structure::Match(Match::all(pv))),
            other => Err(OfpError::NotYetImplemented(format!("{} structure", other))),
        }
    }

    pub fn structure_type(&self) -> StructureType {
        match *self {
            Structure::HelloElement(_) => StructureType::HelloElement,
            Structure::Match(_) => StructureType::Match,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match *self {
            Structure::HelloElement(_) => HelloElement::VERSION,
            Structure::Match(ref m) => m.version(),
        }
    }

    pub fn size_of(&self) -> usize {
        match *self {
            Structure::HelloElement(ref e) => e.size_of(),
            Structure::Match(ref m) => m.size_of(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Structure::HelloElement(ref e) => e.validate(),
            Structure::Match(_) => Ok(()),
        }
    }

    pub fn marshal<W: PacketWriter>(&self, bytes: &mut W) -> Result<()> {
        match *self {
            Structure::HelloElement(ref e) => e.marshal(bytes),
            Structure::Match(ref m) => m.marshal(bytes),
        }
    }

    /// Downcast to one kind.
    pub fn as_kind<S: StructureKind>(&self) -> Option<&S> {
        S::from_structure(self)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Structure::HelloElement(ref e) => fmt::Display::fmt(e, f),
            Structure::Match(ref m) => fmt::Display::fmt(m, f),
        }
    }
}

/// A structure type that `MutableStructure::edit` can hand out.
pub trait StructureKind: Sized {
    const NAME: &'static str;

    fn from_structure(s: &Structure) -> Option<&Self>;
    fn from_structure_mut(s: &mut Structure) -> Option<&mut Self>;
}

impl StructureKind for HelloElement {
    const NAME: &'static str = "HELLO_ELEMENT";

    fn from_structure(s: &Structure) -> Option<&HelloElement> {
        match *s {
            Structure::HelloElement(ref e) => Some(e),
            _ => None,
        }
    }

    fn from_structure_mut(s: &mut Structure) -> Option<&mut HelloElement> {
        match *s {
            Structure::HelloElement(ref mut e) => Some(e),
            _ => None,
        }
    }
}

impl StructureKind for Match {
    const NAME: &'static str = "MATCH";

    fn from_structure(s: &Structure) -> Option<&Match> {
        match *s {
            Structure::Match(ref m) => Some(m),
            _ => None,
        }
    }

    fn from_structure_mut(s: &mut Structure) -> Option<&mut Match> {
        match *s {
            Structure::Match(ref mut m) => Some(m),
            _ => None,
        }
    }
}

/// A writable structure.
///
/// Same lifecycle as `MutableMessage`: edits go through `edit`, and after
/// the one successful `freeze` every edit or freeze fails with
/// `InvalidMutable`.
#[derive(Debug)]
pub struct MutableStructure {
    structure: Structure,
    latch: Latch,
}

impl MutableStructure {
    pub(crate) fn new(structure: Structure) -> MutableStructure {
        MutableStructure {
            structure: structure,
            latch: Latch::new(),
        }
    }

    pub fn structure_type(&self) -> StructureType {
        self.structure.structure_type()
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn writable(&self) -> bool {
        self.latch.writable()
    }

    fn owner(&self) -> String {
        format!("{} structure", self.structure.structure_type())
    }

    /// Typed write access. Fails with `InvalidMutable` once frozen and with
    /// `WrongStructureType` if the structure is not of kind `S`.
    pub fn edit<S: StructureKind>(&mut self) -> Result<Editor<'_, S>> {
        self.latch.check_writable(&self.owner())?;
        let version = self.structure.version();
        let found = self.structure.structure_type();
        match S::from_structure_mut(&mut self.structure) {
            Some(s) => Ok(Editor::new(version, s)),
            None => {
                Err(OfpError::WrongStructureType {
                    expected: S::NAME,
                    found: found,
                })
            }
        }
    }

    /// Snapshot the structure and freeze this one. Succeeds exactly once.
    pub fn freeze(&mut self) -> Result<Structure> {
        self.latch.invalidate(&self.owner())?;
        debug!(structure = %self.structure, "froze mutable structure");
        Ok(self.structure.clone())
    }

    pub fn into_immutable(mut self) -> Result<Structure> {
        self.freeze()
    }
}

impl fmt::Display for MutableStructure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.latch.tag_string(&self.structure.to_string()))
    }
}

impl<'a> Editor<'a, HelloElement> {
    /// Replaces the element with a version bitmap naming `versions`.
    pub fn versions(&mut self, versions: &[ProtocolVersion]) -> Result<&mut Self> {
        if versions.is_empty() {
            return Err(OfpError::Incomplete(MessageType::Hello, "version bitmap"));
        }
        *self.body_mut() = HelloElement::version_bitmap(versions);
        Ok(self)
    }

    /// Adds one version, turning an unknown element into a version bitmap.
    pub fn add_version(&mut self, pv: ProtocolVersion) -> &mut Self {
        match *self.body_mut() {
            HelloElement::VersionBitmap(ref mut versions) => {
                versions.insert(pv);
            }
            ref mut other => *other = HelloElement::version_bitmap(&[pv]),
        }
        self
    }
}

impl<'a> Editor<'a, Match> {
    /// Resets the match to wildcard every field.
    pub fn match_all(&mut self) -> &mut Self {
        let pv = self.version();
        *self.body_mut() = Match::all(pv);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion::*;
    use std::io::Cursor;

    #[test]
    fn version_bitmap_element_encoding() {
        let elem = HelloElement::version_bitmap(&[V1_0, V1_3]);
        let mut bytes = vec![];
        elem.marshal(&mut bytes).unwrap();
        // type 1, length 8, bits 1 and 4
        assert_eq!(bytes, vec![0, 1, 0, 8, 0, 0, 0, 0x12]);
        assert_eq!(elem.size_of(), 8);
        let parsed = HelloElement::parse(&mut Cursor::new(bytes), V1_3).unwrap();
        assert_eq!(parsed, elem);
    }

    #[test]
    fn unknown_elements_are_kept_and_padded() {
        let bytes = vec![0, 9, 0, 6, 0xaa, 0xbb, 0, 0];
        let mut r = Cursor::new(bytes.clone());
        let elem = HelloElement::parse(&mut r, V1_3).unwrap();
        assert_eq!(elem, HelloElement::Unknown { type_code: 9, data: vec![0xaa, 0xbb] });
        assert_eq!(r.readable_bytes(), 0);
        let mut out = vec![];
        elem.marshal(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn newer_versions_in_bitmap_are_ignored() {
        // bit 5 would be a 1.4 speaker
        let bytes = vec![0, 1, 0, 8, 0, 0, 0, 0x30];
        let elem = HelloElement::parse(&mut Cursor::new(bytes), V1_3).unwrap();
        assert_eq!(elem, HelloElement::version_bitmap(&[V1_3]));
    }

    #[test]
    fn elements_need_1_3() {
        let bytes = vec![0, 1, 0, 8, 0, 0, 0, 0x10];
        assert!(HelloElement::parse(&mut Cursor::new(bytes), V1_0).unwrap_err().is_version_mismatch());
        assert!(HelloElement::VersionBitmap(BTreeSet::new()).validate().is_err());
    }

    #[test]
    fn match_all_sizes() {
        assert_eq!(Match::all(V1_0).size_of(), 40);
        assert_eq!(Match::all(V1_1).size_of(), 88);
        assert_eq!(Match::all(V1_2).size_of(), 8);
        assert_eq!(Match::all(V1_3).as_bytes(), &[0, 1, 0, 4, 0, 0, 0, 0]);
        assert!(Match::all(V1_3).is_match_all());
    }

    #[test]
    fn matches_frame_per_version() {
        for &pv in ProtocolVersion::ALL.iter() {
            let all = Match::all(pv);
            let mut r = Cursor::new(all.as_bytes().to_vec());
            assert_eq!(Match::parse(&mut r, pv), Ok(all));
            assert_eq!(r.readable_bytes(), 0);
        }
        // oxm match with one 8-byte field: length 12, padded to 16
        let mut raw = vec![0, 1, 0, 12, 0x80, 0, 0, 4, 0, 0, 0, 1];
        raw.extend_from_slice(&[0; 4]);
        let m = Match::parse(&mut Cursor::new(raw.clone()), V1_3).unwrap();
        assert_eq!(m.size_of(), 16);
        assert!(!m.is_match_all());
        assert!(Match::parse(&mut Cursor::new(vec![0, 0, 0, 4]), V1_3).is_err());
    }

    #[test]
    fn blank_structures_per_kind() {
        let hello = Structure::zeroed(StructureType::HelloElement, V1_3).unwrap();
        assert_eq!(hello.structure_type(), StructureType::HelloElement);
        assert!(matches!(hello.validate(), Err(OfpError::Incomplete(MessageType::Hello, _))));
        assert!(Structure::zeroed(StructureType::HelloElement, V1_2)
            .unwrap_err()
            .is_version_mismatch());
        assert_eq!(Structure::zeroed(StructureType::Match, V1_0),
                   Ok(Structure::Match(Match::all(V1_0))));
        assert!(matches!(Structure::zeroed(StructureType::Bucket, V1_3),
                         Err(OfpError::NotYetImplemented(_))));
    }

    #[test]
    fn editing_a_hello_element() {
        let mut ms = MutableStructure::new(Structure::zeroed(StructureType::HelloElement, V1_3)
            .unwrap());
        {
            let mut elem = ms.edit::<HelloElement>().unwrap();
            assert_eq!(elem.version(), V1_3);
            assert!(elem.versions(&[]).is_err());
            elem.versions(&[V1_0]).unwrap().add_version(V1_3);
        }
        assert!(matches!(ms.edit::<Match>(),
                         Err(OfpError::WrongStructureType { found: StructureType::HelloElement, .. })));
        assert_eq!(ms.to_string(),
                   format!("{} [mutable]", HelloElement::version_bitmap(&[V1_0, V1_3])));

        let frozen = ms.freeze().unwrap();
        assert_eq!(frozen.as_kind::<HelloElement>(), Some(&HelloElement::version_bitmap(&[V1_0, V1_3])));
        assert!(frozen.validate().is_ok());
        assert!(matches!(ms.freeze(), Err(OfpError::InvalidMutable(_))));
        assert!(matches!(ms.edit::<HelloElement>(), Err(OfpError::InvalidMutable(_))));
        assert!(ms.to_string().ends_with("[frozen]"));
    }

    #[test]
    fn match_editor_resets_to_wildcard() {
        let mut raw = vec![0, 1, 0, 12, 0x80, 0, 0, 4, 0, 0, 0, 1];
        raw.extend_from_slice(&[0; 4]);
        let narrow = Match::parse(&mut Cursor::new(raw), V1_3).unwrap();
        let mut ms = MutableStructure::new(Structure::Match(narrow));
        ms.edit::<Match>().unwrap().match_all();
        let frozen = ms.into_immutable().unwrap();
        assert_eq!(frozen.as_kind::<Match>().map(Match::is_match_all), Some(true));
        assert_eq!(frozen.size_of(), 8);
    }
}
