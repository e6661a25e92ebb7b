//! Versioned OpenFlow 1.0 - 1.3 message codec.
//!
//! Messages are created writable through a `MessageFactory`, edited through
//! typed editors, then frozen into immutable `Message`s for encoding. Parsed
//! messages are immutable from the start.

#[macro_use]
pub mod code;
#[macro_use]
pub mod bitmap;

mod bits;
pub mod config;
pub mod error;
pub mod factory;
pub mod msg;
pub mod mutable;
pub mod ofp_header;
pub mod ofp_message;
pub mod ofp_utils;
pub mod openflow;
pub mod structure;
pub mod subtype;
pub mod version;
pub mod wire;

pub use crate::config::FactoryConfig;
pub use crate::error::{OfpError, Result};
pub use crate::factory::{CopyKind, Entity, MessageFactory, StructureEntity, Variant};
pub use crate::msg::MessageBody;
pub use crate::ofp_header::Header;
pub use crate::ofp_message::{Message, MutableMessage, OfpEntity};
pub use crate::openflow::MessageType;
pub use crate::structure::{MutableStructure, Structure, StructureType};
pub use crate::subtype::Subtype;
pub use crate::version::ProtocolVersion;
