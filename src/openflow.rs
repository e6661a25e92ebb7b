//! OpenFlow enumerations for versions 1.0 through 1.3.
//!
//! Code-based tables map each enumerant to its per-version wire code;
//! bitmap tables map each flag to its per-version bit and carry the mask of
//! bits each version defines.

use std::fmt;

use crate::bitmap::NA as NO_BIT;
use crate::code::{self, fixed, never, per_version, since, CodeBased, VersionedCode, NA};
use crate::error::Result;
use crate::version::ProtocolVersion::{self, V1_1, V1_2, V1_3};

code_enum! {
    /// OpenFlow message type codes, used by headers to identify meaning of the rest of a message.
    ///
    /// 1.0 numbers everything after `PacketOut` differently from 1.1+.
    pub enum MessageType: "message type" {
        Hello("HELLO") => fixed(0),
        Error("ERROR") => fixed(1),
        EchoRequest("ECHO_REQUEST") => fixed(2),
        EchoReply("ECHO_REPLY") => fixed(3),
        /// `VENDOR` in 1.0.
        Experimenter("EXPERIMENTER") => fixed(4),
        FeaturesRequest("FEATURES_REQUEST") => fixed(5),
        FeaturesReply("FEATURES_REPLY") => fixed(6),
        GetConfigRequest("GET_CONFIG_REQUEST") => fixed(7),
        GetConfigReply("GET_CONFIG_REPLY") => fixed(8),
        SetConfig("SET_CONFIG") => fixed(9),
        PacketIn("PACKET_IN") => fixed(10),
        FlowRemoved("FLOW_REMOVED") => fixed(11),
        PortStatus("PORT_STATUS") => fixed(12),
        PacketOut("PACKET_OUT") => fixed(13),
        FlowMod("FLOW_MOD") => fixed(14),
        GroupMod("GROUP_MOD") => since(15, V1_1),
        PortMod("PORT_MOD") => per_version([15, 16, 16, 16]),
        TableMod("TABLE_MOD") => since(17, V1_1),
        /// `STATS_REQUEST` in 1.0 and 1.1.
        MultipartRequest("MULTIPART_REQUEST") => per_version([16, 18, 18, 18]),
        /// `STATS_REPLY` in 1.0 and 1.1.
        MultipartReply("MULTIPART_REPLY") => per_version([17, 19, 19, 19]),
        BarrierRequest("BARRIER_REQUEST") => per_version([18, 20, 20, 20]),
        BarrierReply("BARRIER_REPLY") => per_version([19, 21, 21, 21]),
        QueueGetConfigRequest("QUEUE_GET_CONFIG_REQUEST") => per_version([20, 22, 22, 22]),
        QueueGetConfigReply("QUEUE_GET_CONFIG_REPLY") => per_version([21, 23, 23, 23]),
        RoleRequest("ROLE_REQUEST") => since(24, V1_2),
        RoleReply("ROLE_REPLY") => since(25, V1_2),
        GetAsyncRequest("GET_ASYNC_REQUEST") => since(26, V1_3),
        GetAsyncReply("GET_ASYNC_REPLY") => since(27, V1_3),
        SetAsync("SET_ASYNC") => since(28, V1_3),
        MeterMod("METER_MOD") => since(29, V1_3),
    }
}

impl MessageType {
    /// First version that defines this message type.
    pub fn since(self) -> ProtocolVersion {
        self.versioned_code().since_version().unwrap_or(ProtocolVersion::V1_0)
    }
}

code_enum! {
    /// Type of an error message.
    pub enum ErrorType: "error type" {
        HelloFailed("HELLO_FAILED") => fixed(0),
        BadRequest("BAD_REQUEST") => fixed(1),
        BadAction("BAD_ACTION") => fixed(2),
        BadInstruction("BAD_INSTRUCTION") => since(3, V1_1),
        BadMatch("BAD_MATCH") => since(4, V1_1),
        FlowModFailed("FLOW_MOD_FAILED") => per_version([3, 5, 5, 5]),
        GroupModFailed("GROUP_MOD_FAILED") => since(6, V1_1),
        PortModFailed("PORT_MOD_FAILED") => per_version([4, 7, 7, 7]),
        TableModFailed("TABLE_MOD_FAILED") => since(8, V1_1),
        QueueOpFailed("QUEUE_OP_FAILED") => per_version([5, 9, 9, 9]),
        SwitchConfigFailed("SWITCH_CONFIG_FAILED") => since(10, V1_1),
        RoleRequestFailed("ROLE_REQUEST_FAILED") => since(11, V1_2),
        MeterModFailed("METER_MOD_FAILED") => since(12, V1_3),
        TableFeaturesFailed("TABLE_FEATURES_FAILED") => since(13, V1_3),
        Experimenter("EXPERIMENTER") => since(0xffff, V1_2),
    }
}

code_enum! {
    /// Type of modification to perform on a flow table.
    pub enum FlowModCommand: "flow mod command" {
        Add("ADD") => fixed(0),
        Modify("MODIFY") => fixed(1),
        ModifyStrict("MODIFY_STRICT") => fixed(2),
        Delete("DELETE") => fixed(3),
        DeleteStrict("DELETE_STRICT") => fixed(4),
    }
}

code_enum! {
    /// Type of modification to perform on the group table.
    pub enum GroupModCommand: "group mod command" {
        Add("ADD") => since(0, V1_1),
        Modify("MODIFY") => since(1, V1_1),
        Delete("DELETE") => since(2, V1_1),
    }
}

code_enum! {
    /// Group semantics.
    pub enum GroupType: "group type" {
        All("ALL") => since(0, V1_1),
        Select("SELECT") => since(1, V1_1),
        Indirect("INDIRECT") => since(2, V1_1),
        FastFailover("FF") => since(3, V1_1),
    }
}

code_enum! {
    /// Type of modification to perform on the meter table.
    pub enum MeterModCommand: "meter mod command" {
        Add("ADD") => since(0, V1_3),
        Modify("MODIFY") => since(1, V1_3),
        Delete("DELETE") => since(2, V1_3),
    }
}

code_enum! {
    /// Role of a controller on a datapath.
    pub enum ControllerRole: "controller role" {
        NoChange("NO_CHANGE") => since(0, V1_2),
        Equal("EQUAL") => since(1, V1_2),
        Master("MASTER") => since(2, V1_2),
        Slave("SLAVE") => since(3, V1_2),
    }
}

code_enum! {
    /// The reason a packet arrives at the controller.
    pub enum PacketInReason: "packet-in reason" {
        NoMatch("NO_MATCH") => fixed(0),
        Action("ACTION") => fixed(1),
        InvalidTtl("INVALID_TTL") => since(2, V1_2),
    }
}

code_enum! {
    /// The reason a flow was removed.
    pub enum FlowRemovedReason: "flow-removed reason" {
        IdleTimeout("IDLE_TIMEOUT") => fixed(0),
        HardTimeout("HARD_TIMEOUT") => fixed(1),
        Delete("DELETE") => fixed(2),
        GroupDelete("GROUP_DELETE") => since(3, V1_1),
        MeterDelete("METER_DELETE") => since(4, V1_3),
    }
}

code_enum! {
    /// What changed about a physical port.
    pub enum PortReason: "port reason" {
        Add("ADD") => fixed(0),
        Delete("DELETE") => fixed(1),
        Modify("MODIFY") => fixed(2),
    }
}

code_enum! {
    /// Body type of a multipart (1.0/1.1 "stats") request or reply.
    pub enum MultipartType: "multipart type" {
        Desc("DESC") => fixed(0),
        Flow("FLOW") => fixed(1),
        Aggregate("AGGREGATE") => fixed(2),
        Table("TABLE") => fixed(3),
        PortStats("PORT_STATS") => fixed(4),
        Queue("QUEUE") => fixed(5),
        Group("GROUP") => since(6, V1_1),
        GroupDesc("GROUP_DESC") => since(7, V1_1),
        GroupFeatures("GROUP_FEATURES") => since(8, V1_2),
        Meter("METER") => since(9, V1_3),
        MeterConfig("METER_CONFIG") => since(10, V1_3),
        MeterFeatures("METER_FEATURES") => since(11, V1_3),
        TableFeatures("TABLE_FEATURES") => since(12, V1_3),
        PortDesc("PORT_DESC") => since(13, V1_3),
        /// `VENDOR` in 1.0.
        Experimenter("EXPERIMENTER") => fixed(0xffff),
    }
}

code_enum! {
    /// Action types. The 1.0/1.1 "set field" actions are renumbered in 1.1
    /// and dropped at 1.2 in favour of `SET_FIELD`.
    pub enum ActionType: "action type" {
        Output("OUTPUT") => fixed(0),
        SetVlanVid("SET_VLAN_VID") => per_version([1, 1, NA, NA]),
        SetVlanPcp("SET_VLAN_PCP") => per_version([2, 2, NA, NA]),
        StripVlan("STRIP_VLAN") => per_version([3, NA, NA, NA]),
        SetDlSrc("SET_DL_SRC") => per_version([4, 3, NA, NA]),
        SetDlDst("SET_DL_DST") => per_version([5, 4, NA, NA]),
        SetNwSrc("SET_NW_SRC") => per_version([6, 5, NA, NA]),
        SetNwDst("SET_NW_DST") => per_version([7, 6, NA, NA]),
        SetNwTos("SET_NW_TOS") => per_version([8, 7, NA, NA]),
        SetNwEcn("SET_NW_ECN") => per_version([NA, 8, NA, NA]),
        SetTpSrc("SET_TP_SRC") => per_version([9, 9, NA, NA]),
        SetTpDst("SET_TP_DST") => per_version([10, 10, NA, NA]),
        Enqueue("ENQUEUE") => per_version([11, NA, NA, NA]),
        CopyTtlOut("COPY_TTL_OUT") => since(11, V1_1),
        CopyTtlIn("COPY_TTL_IN") => since(12, V1_1),
        SetMplsLabel("SET_MPLS_LABEL") => per_version([NA, 13, NA, NA]),
        SetMplsTc("SET_MPLS_TC") => per_version([NA, 14, NA, NA]),
        SetMplsTtl("SET_MPLS_TTL") => since(15, V1_1),
        DecMplsTtl("DEC_MPLS_TTL") => since(16, V1_1),
        PushVlan("PUSH_VLAN") => since(17, V1_1),
        PopVlan("POP_VLAN") => since(18, V1_1),
        PushMpls("PUSH_MPLS") => since(19, V1_1),
        PopMpls("POP_MPLS") => since(20, V1_1),
        SetQueue("SET_QUEUE") => since(21, V1_1),
        Group("GROUP") => since(22, V1_1),
        SetNwTtl("SET_NW_TTL") => since(23, V1_1),
        DecNwTtl("DEC_NW_TTL") => since(24, V1_1),
        SetField("SET_FIELD") => since(25, V1_2),
        PushPbb("PUSH_PBB") => since(26, V1_3),
        PopPbb("POP_PBB") => since(27, V1_3),
        /// `VENDOR` in 1.0.
        Experimenter("EXPERIMENTER") => fixed(0xffff),
    }
}

code_enum! {
    /// Table-miss behaviour carried in a 1.1/1.2 table config. 1.3 moved
    /// miss handling into table-miss flow entries.
    pub enum TableMiss: "table miss" {
        Controller("CONTROLLER") => per_version([NA, 0, 0, NA]),
        Continue("CONTINUE") => per_version([NA, 1, 1, NA]),
        Drop("DROP") => per_version([NA, 2, 2, NA]),
    }
}

/// Type of a hello element.
///
/// Hello elements are an extension point: element types this crate does not
/// know decode to `Unknown` rather than failing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HelloElementType {
    VersionBitmap,
    Unknown,
}

impl CodeBased for HelloElementType {
    const NAME: &'static str = "hello element type";
    const ALL: &'static [HelloElementType] =
        &[HelloElementType::VersionBitmap, HelloElementType::Unknown];

    fn versioned_code(self) -> VersionedCode {
        match self {
            HelloElementType::VersionBitmap => since(1, V1_3),
            HelloElementType::Unknown => never(),
        }
    }

    fn unknown() -> Option<HelloElementType> {
        Some(HelloElementType::Unknown)
    }
}

impl HelloElementType {
    pub fn decode(code: u32, pv: ProtocolVersion) -> Result<HelloElementType> {
        code::decode(code, pv)
    }

    pub fn encode(self, pv: ProtocolVersion) -> Result<u16> {
        code::encode(self, pv)
    }
}

impl fmt::Display for HelloElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HelloElementType::VersionBitmap => f.write_str("VERSION_BITMAP"),
            HelloElementType::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

bitmap_enum! {
    /// Flow mod flags.
    pub enum FlowModFlag: "flow mod flag", masks = [0x07, 0x03, 0x07, 0x1f];
    {
        SendFlowRem("SEND_FLOW_REM") => [0x1, 0x1, 0x1, 0x1],
        CheckOverlap("CHECK_OVERLAP") => [0x2, 0x2, 0x2, 0x2],
        /// Emergency flow cache; 1.0 only.
        Emerg("EMERG") => [0x4, NO_BIT, NO_BIT, NO_BIT],
        ResetCounts("RESET_COUNTS") => [NO_BIT, NO_BIT, 0x4, 0x4],
        NoPacketCounts("NO_PKT_COUNTS") => [NO_BIT, NO_BIT, NO_BIT, 0x8],
        NoByteCounts("NO_BYT_COUNTS") => [NO_BIT, NO_BIT, NO_BIT, 0x10],
    }
}

bitmap_enum! {
    /// Group capabilities advertised in group features; 1.2+.
    pub enum GroupCapability: "group capability", masks = [0x0, 0x0, 0xf, 0xf];
    {
        SelectWeight("SELECT_WEIGHT") => [NO_BIT, NO_BIT, 0x1, 0x1],
        SelectLiveness("SELECT_LIVENESS") => [NO_BIT, NO_BIT, 0x2, 0x2],
        Chaining("CHAINING") => [NO_BIT, NO_BIT, 0x4, 0x4],
        ChainingChecks("CHAINING_CHECKS") => [NO_BIT, NO_BIT, 0x8, 0x8],
    }
}

bitmap_enum! {
    /// Capabilities supported by the datapath.
    pub enum Capability: "capability", masks = [0xef, 0xef, 0x16f, 0x16f];
    {
        FlowStats("FLOW_STATS") => [0x1, 0x1, 0x1, 0x1],
        TableStats("TABLE_STATS") => [0x2, 0x2, 0x2, 0x2],
        PortStats("PORT_STATS") => [0x4, 0x4, 0x4, 0x4],
        Stp("STP") => [0x8, NO_BIT, NO_BIT, NO_BIT],
        GroupStats("GROUP_STATS") => [NO_BIT, 0x8, 0x8, 0x8],
        IpReasm("IP_REASM") => [0x20, 0x20, 0x20, 0x20],
        QueueStats("QUEUE_STATS") => [0x40, 0x40, 0x40, 0x40],
        ArpMatchIp("ARP_MATCH_IP") => [0x80, 0x80, NO_BIT, NO_BIT],
        PortBlocked("PORT_BLOCKED") => [NO_BIT, NO_BIT, 0x100, 0x100],
    }
}

bitmap_enum! {
    /// Switch configuration flags. An empty set is "normal" fragment handling.
    pub enum ConfigFlag: "config flag", masks = [0x3, 0x7, 0x7, 0x3];
    {
        FragDrop("FRAG_DROP") => [0x1, 0x1, 0x1, 0x1],
        FragReasm("FRAG_REASM") => [0x2, 0x2, 0x2, 0x2],
        InvalidTtlToController("INVALID_TTL_TO_CONTROLLER") => [NO_BIT, 0x4, 0x4, NO_BIT],
    }
}

bitmap_enum! {
    /// Meter configuration flags; 1.3.
    pub enum MeterFlag: "meter flag", masks = [0x0, 0x0, 0x0, 0xf];
    {
        Kbps("KBPS") => [NO_BIT, NO_BIT, NO_BIT, 0x1],
        Pktps("PKTPS") => [NO_BIT, NO_BIT, NO_BIT, 0x2],
        Burst("BURST") => [NO_BIT, NO_BIT, NO_BIT, 0x4],
        Stats("STATS") => [NO_BIT, NO_BIT, NO_BIT, 0x8],
    }
}

bitmap_enum! {
    /// Flags to indicate behavior of the physical port.
    ///
    /// These flags are used both to describe the current configuration of a physical port,
    /// and to configure a port's behavior.
    pub enum PortConfig: "port config", masks = [0x7f, 0x65, 0x65, 0x65];
    {
        PortDown("PORT_DOWN") => [0x1, 0x1, 0x1, 0x1],
        NoStp("NO_STP") => [0x2, NO_BIT, NO_BIT, NO_BIT],
        NoRecv("NO_RECV") => [0x4, 0x4, 0x4, 0x4],
        NoRecvStp("NO_RECV_STP") => [0x8, NO_BIT, NO_BIT, NO_BIT],
        NoFlood("NO_FLOOD") => [0x10, NO_BIT, NO_BIT, NO_BIT],
        NoFwd("NO_FWD") => [0x20, 0x20, 0x20, 0x20],
        NoPacketIn("NO_PACKET_IN") => [0x40, 0x40, 0x40, 0x40],
    }
}
