use std::collections::BTreeSet;

use crate::error::{OfpError, Result};
use crate::msg::OfpBody;
use crate::mutable::Editor;
use crate::ofp_utils::{buffer_of_int, int_of_buffer, PseudoPort, Timeout, GROUP_ANY};
use crate::openflow::{FlowModCommand, FlowModFlag, MessageType};
use crate::structure::Match;
use crate::version::{self, ProtocolVersion};
use crate::wire::{PacketReader, PacketWriter};

/// Represents modifications to a flow table from the controller.
///
/// 1.0 places the match first and carries actions; 1.1+ moves the match
/// after the fixed fields and carries instructions. Actions and
/// instructions are kept in their encoded form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowMod {
    cookie: u64,
    cookie_mask: u64,
    table_id: u8,
    command: Option<FlowModCommand>,
    idle_timeout: Timeout,
    hard_timeout: Timeout,
    priority: u16,
    buffer_id: Option<u32>,
    out_port: Option<PseudoPort>,
    out_group: u32,
    flags: BTreeSet<FlowModFlag>,
    pattern: Match,
    actions: Vec<u8>,
    instructions: Vec<u8>,
}

/// Reserved cookie value.
pub const COOKIE_RESERVED: u64 = 0xffff_ffff_ffff_ffff;

const FIXED_LEN_1_0: usize = 24;
const FIXED_LEN_1_1: usize = 40;

impl FlowMod {
    /// An all-wildcard flow mod with no command set.
    pub fn new(pv: ProtocolVersion) -> FlowMod {
        FlowMod {
            cookie: 0,
            cookie_mask: 0,
            table_id: 0,
            command: None,
            idle_timeout: Timeout::Permanent,
            hard_timeout: Timeout::Permanent,
            priority: 0,
            buffer_id: None,
            out_port: None,
            out_group: GROUP_ANY,
            flags: BTreeSet::new(),
            pattern: Match::all(pv),
            actions: vec![],
            instructions: vec![],
        }
    }

    pub fn cookie(&self) -> u64 {
        self.cookie
    }

    pub fn cookie_mask(&self) -> u64 {
        self.cookie_mask
    }

    pub fn table_id(&self) -> u8 {
        self.table_id
    }

    pub fn command(&self) -> Option<FlowModCommand> {
        self.command
    }

    pub fn idle_timeout(&self) -> Timeout {
        self.idle_timeout
    }

    pub fn hard_timeout(&self) -> Timeout {
        self.hard_timeout
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Buffered packet to apply the flow to, if any.
    pub fn buffer_id(&self) -> Option<u32> {
        self.buffer_id
    }

    pub fn out_port(&self) -> Option<PseudoPort> {
        self.out_port
    }

    pub fn out_group(&self) -> u32 {
        self.out_group
    }

    pub fn flags(&self) -> &BTreeSet<FlowModFlag> {
        &self.flags
    }

    pub fn pattern(&self) -> &Match {
        &self.pattern
    }

    pub fn actions(&self) -> &[u8] {
        &self.actions
    }

    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    pub(crate) fn set_command(&mut self, pv: ProtocolVersion, command: FlowModCommand) -> Result<()> {
        command.encode(pv)?;
        self.command = Some(command);
        Ok(())
    }

    fn tail(&self, pv: ProtocolVersion) -> &[u8] {
        if pv == ProtocolVersion::V1_0 {
            &self.actions
        } else {
            &self.instructions
        }
    }
}

fn check_aligned(what: &str, bytes: &[u8]) -> Result<()> {
    if bytes.len() % 8 != 0 {
        return Err(OfpError::Malformed(format!("{} of {} bytes is not 8-byte aligned",
                                               what,
                                               bytes.len())));
    }
    Ok(())
}

impl OfpBody for FlowMod {
    fn size_of(&self, pv: ProtocolVersion) -> usize {
        let fixed = if pv == ProtocolVersion::V1_0 {
            FIXED_LEN_1_0
        } else {
            FIXED_LEN_1_1
        };
        fixed + self.pattern.size_of() + self.tail(pv).len()
    }

    fn parse<R: PacketReader>(bytes: &mut R, pv: ProtocolVersion) -> Result<FlowMod> {
        let mut fm = FlowMod::new(pv);
        if pv == ProtocolVersion::V1_0 {
            fm.pattern = Match::parse(bytes, pv)?;
            fm.cookie = bytes.read_u64()?;
            fm.command = Some(FlowModCommand::decode(u32::from(bytes.read_u16()?), pv)?);
        } else {
            fm.cookie = bytes.read_u64()?;
            fm.cookie_mask = bytes.read_u64()?;
            fm.table_id = bytes.read_u8()?;
            fm.command = Some(FlowModCommand::decode(u32::from(bytes.read_u8()?), pv)?);
        }
        fm.idle_timeout = Timeout::of_int(bytes.read_u16()?);
        fm.hard_timeout = Timeout::of_int(bytes.read_u16()?);
        fm.priority = bytes.read_u16()?;
        fm.buffer_id = buffer_of_int(bytes.read_u32()?);
        fm.out_port = PseudoPort::parse(bytes, pv)?;
        if pv != ProtocolVersion::V1_0 {
            fm.out_group = bytes.read_u32()?;
        }
        fm.flags = FlowModFlag::decode_bitmap(u64::from(bytes.read_u16()?), pv)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.skip(2)?;
            fm.pattern = Match::parse(bytes, pv)?;
        }
        let rest = bytes.readable_bytes();
        let tail = bytes.read_bytes(rest)?;
        if pv == ProtocolVersion::V1_0 {
            fm.actions = tail;
        } else {
            fm.instructions = tail;
        }
        Ok(fm)
    }

    fn marshal<W: PacketWriter>(&self, pv: ProtocolVersion, bytes: &mut W) -> Result<()> {
        let command = self.command
            .ok_or(OfpError::Incomplete(MessageType::FlowMod, "command"))?
            .encode(pv)?;
        if pv == ProtocolVersion::V1_0 {
            self.pattern.marshal(bytes)?;
            bytes.write_u64(self.cookie)?;
            bytes.write_u16(command)?;
        } else {
            bytes.write_u64(self.cookie)?;
            bytes.write_u64(self.cookie_mask)?;
            bytes.write_u8(self.table_id)?;
            bytes.write_u8(command as u8)?;
        }
        bytes.write_u16(Timeout::to_int(self.idle_timeout))?;
        bytes.write_u16(Timeout::to_int(self.hard_timeout))?;
        bytes.write_u16(self.priority)?;
        bytes.write_u32(int_of_buffer(self.buffer_id))?;
        PseudoPort::marshal(self.out_port, pv, bytes)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.write_u32(self.out_group)?;
        }
        bytes.write_u16(FlowModFlag::encode_bitmap(&self.flags, pv)? as u16)?;
        if pv != ProtocolVersion::V1_0 {
            bytes.write_zeros(2)?;
            self.pattern.marshal(bytes)?;
        }
        bytes.write_bytes(self.tail(pv))
    }

    fn validate(&self, pv: ProtocolVersion) -> Result<()> {
        if self.command.is_none() {
            return Err(OfpError::Incomplete(MessageType::FlowMod, "command"));
        }
        version::same_version(&[pv, self.pattern.version()], "flow match")
    }

    fn summary(&self) -> String {
        let cmd = self.command.map_or("?", FlowModCommand::name);
        format!("cmd={},prio={},cookie={:#x},{}", cmd, self.priority, self.cookie, self.pattern)
    }
}

impl<'a> Editor<'a, FlowMod> {
    pub fn command(&mut self, command: FlowModCommand) -> Result<&mut Self> {
        let pv = self.version();
        self.body_mut().set_command(pv, command)?;
        Ok(self)
    }

    /// All-ones is reserved.
    pub fn cookie(&mut self, cookie: u64) -> Result<&mut Self> {
        if cookie == COOKIE_RESERVED {
            return Err(OfpError::Reserved {
                field: "cookie",
                value: cookie,
            });
        }
        self.body_mut().cookie = cookie;
        Ok(self)
    }

    /// 1.1+.
    pub fn cookie_mask(&mut self, mask: u64) -> Result<&mut Self> {
        version::ver_min_11(self.version(), "cookie mask")?;
        self.body_mut().cookie_mask = mask;
        Ok(self)
    }

    /// 1.1+.
    pub fn table_id(&mut self, table_id: u8) -> Result<&mut Self> {
        version::ver_min_11(self.version(), "table id")?;
        self.body_mut().table_id = table_id;
        Ok(self)
    }

    pub fn idle_timeout(&mut self, timeout: Timeout) -> &mut Self {
        self.body_mut().idle_timeout = timeout;
        self
    }

    pub fn hard_timeout(&mut self, timeout: Timeout) -> &mut Self {
        self.body_mut().hard_timeout = timeout;
        self
    }

    pub fn priority(&mut self, priority: u16) -> &mut Self {
        self.body_mut().priority = priority;
        self
    }

    pub fn buffer_id(&mut self, buffer_id: Option<u32>) -> &mut Self {
        self.body_mut().buffer_id = buffer_id;
        self
    }

    /// Restricts delete commands to flows that output to `port`.
    pub fn out_port(&mut self, port: Option<PseudoPort>) -> Result<&mut Self> {
        PseudoPort::to_int(port, self.version())?;
        self.body_mut().out_port = port;
        Ok(self)
    }

    /// 1.1+.
    pub fn out_group(&mut self, group: u32) -> Result<&mut Self> {
        version::ver_min_11(self.version(), "out group")?;
        self.body_mut().out_group = group;
        Ok(self)
    }

    pub fn flags(&mut self, flags: &[FlowModFlag]) -> Result<&mut Self> {
        FlowModFlag::encode_bitmap(flags, self.version())?;
        self.body_mut().flags = flags.iter().cloned().collect();
        Ok(self)
    }

    /// The match must be built for the flow mod's version.
    pub fn pattern(&mut self, pattern: Match) -> Result<&mut Self> {
        version::same_version(&[self.version(), pattern.version()], "flow match")?;
        self.body_mut().pattern = pattern;
        Ok(self)
    }

    /// Encoded action list; 1.0 only.
    pub fn actions(&mut self, actions: Vec<u8>) -> Result<&mut Self> {
        version::ver_exactly(self.version(), ProtocolVersion::V1_0, "flow mod actions")?;
        check_aligned("action list", &actions)?;
        self.body_mut().actions = actions;
        Ok(self)
    }

    /// Encoded instruction list; 1.1+.
    pub fn instructions(&mut self, instructions: Vec<u8>) -> Result<&mut Self> {
        version::ver_min_11(self.version(), "flow mod instructions")?;
        check_aligned("instruction list", &instructions)?;
        self.body_mut().instructions = instructions;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Mismatch;
    use crate::version::ProtocolVersion::*;
    use std::io::Cursor;

    fn add_flow(pv: ProtocolVersion) -> FlowMod {
        let mut fm = FlowMod::new(pv);
        Editor::new(pv, &mut fm)
            .command(FlowModCommand::Add)
            .unwrap()
            .priority(100)
            .idle_timeout(Timeout::ExpiresAfter(30))
            .cookie(0xbeef)
            .unwrap()
            .flags(&[FlowModFlag::SendFlowRem])
            .unwrap();
        fm
    }

    #[test]
    fn layout_1_0() {
        let fm = add_flow(V1_0);
        let mut bytes = vec![];
        fm.marshal(V1_0, &mut bytes).unwrap();
        assert_eq!(bytes.len(), fm.size_of(V1_0));
        assert_eq!(bytes.len(), 64);
        // match first, then cookie and command
        assert_eq!(&bytes[0..4], &[0x00, 0x3f, 0xff, 0xff]);
        assert_eq!(&bytes[40..50], &[0, 0, 0, 0, 0, 0, 0xbe, 0xef, 0, 0]);
        // buffer none, out port none, flags
        assert_eq!(&bytes[56..64], &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 1]);
        assert_eq!(FlowMod::parse(&mut Cursor::new(bytes), V1_0), Ok(fm));
    }

    #[test]
    fn layout_1_3() {
        let mut fm = add_flow(V1_3);
        Editor::new(V1_3, &mut fm)
            .table_id(2)
            .unwrap()
            .instructions(vec![0, 1, 0, 8, 3, 0, 0, 0])
            .unwrap();
        let mut bytes = vec![];
        fm.marshal(V1_3, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 40 + 8 + 8);
        assert_eq!(bytes[16], 2);
        assert_eq!(bytes[17], 0);
        // out port any, out group any
        assert_eq!(&bytes[28..36], &[0xff; 8]);
        assert_eq!(&bytes[40..44], &[0, 1, 0, 4]);
        assert_eq!(FlowMod::parse(&mut Cursor::new(bytes), V1_3), Ok(fm));
    }

    #[test]
    fn version_gated_setters() {
        let mut fm = FlowMod::new(V1_0);
        let mut ed = Editor::new(V1_0, &mut fm);
        assert!(ed.table_id(1).unwrap_err().is_version_mismatch());
        assert!(ed.cookie_mask(1).is_err());
        assert!(ed.out_group(1).is_err());
        assert!(ed.instructions(vec![]).is_err());
        assert!(ed.flags(&[FlowModFlag::ResetCounts]).is_err());
        assert!(ed.out_port(Some(PseudoPort::PhysicalPort(0x10000))).is_err());
        ed.flags(&[FlowModFlag::Emerg]).unwrap();
        assert!(ed.actions(vec![0; 7]).is_err());
        ed.actions(vec![0; 8]).unwrap();
        assert_eq!(fm.actions().len(), 8);
        assert_eq!(fm.table_id(), 0);
    }

    #[test]
    fn reserved_cookie_and_mixed_match() {
        let mut fm = FlowMod::new(V1_3);
        let mut ed = Editor::new(V1_3, &mut fm);
        assert_eq!(ed.cookie(COOKIE_RESERVED).unwrap_err(),
                   OfpError::Reserved { field: "cookie", value: COOKIE_RESERVED });
        assert_eq!(ed.pattern(Match::all(V1_0)).unwrap_err(),
                   OfpError::mismatch("flow match", V1_0, Mismatch::Mixed(V1_3, V1_0)));
        ed.pattern(Match::all(V1_3)).unwrap();
    }

    #[test]
    fn command_is_required() {
        let fm = FlowMod::new(V1_2);
        assert_eq!(fm.validate(V1_2),
                   Err(OfpError::Incomplete(MessageType::FlowMod, "command")));
        assert!(fm.marshal(V1_2, &mut vec![]).is_err());
    }
}
