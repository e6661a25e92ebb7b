//! Creation, editing, freezing, and copying of messages through the factory.

use rust_ofp_codec::msg::{AsyncConfig, AsyncRole, Echo, ErrorMsg, FlowMod, Hello, Role};
use rust_ofp_codec::openflow::{ControllerRole, ErrorType, FlowModCommand, FlowModFlag,
                               GroupModCommand, MessageType, PacketInReason};
use rust_ofp_codec::structure::{HelloElement, Match};
use rust_ofp_codec::ProtocolVersion::*;
use rust_ofp_codec::{CopyKind, Entity, FactoryConfig, MessageFactory, OfpEntity, OfpError,
                     StructureEntity, StructureType, Variant};

#[test]
fn hello_freezes_exactly_once() {
    let factory = MessageFactory::default();
    let mut mm = factory.create(V1_3, MessageType::Hello).unwrap();
    mm.edit::<Hello>()
        .unwrap()
        .add_element(HelloElement::version_bitmap(&[V1_0, V1_3]))
        .unwrap();
    let hello = mm.freeze().unwrap();
    assert_eq!(hello.length(), 16);
    assert!(matches!(mm.freeze(), Err(OfpError::InvalidMutable(_))));
    assert!(matches!(mm.edit::<Hello>(), Err(OfpError::InvalidMutable(_))));
    assert_eq!(hello.body_as::<Hello>().map(|h| h.elements().len()), Some(1));
}

#[test]
fn edits_after_freeze_do_not_reach_the_snapshot() {
    let factory = MessageFactory::default();
    let mut mm = factory.create(V1_0, MessageType::EchoRequest).unwrap();
    mm.edit::<Echo>().unwrap().data(b"ping".to_vec());
    let frozen = mm.freeze().unwrap();

    let mut again = factory.exact_mutable_copy(&frozen);
    again.edit::<Echo>().unwrap().data(b"pong!".to_vec());
    let second = again.freeze().unwrap();

    assert_eq!(frozen.body_as::<Echo>().unwrap().data(), b"ping");
    assert_eq!(second.body_as::<Echo>().unwrap().data(), b"pong!");
    assert_eq!(frozen.length(), 12);
    assert_eq!(second.length(), 13);
    assert_eq!(frozen.xid(), second.xid());
}

#[test]
fn editing_the_wrong_kind_fails() {
    let factory = MessageFactory::default();
    let mut mm = factory.create(V1_3, MessageType::SetAsync).unwrap();
    assert!(matches!(mm.edit::<FlowMod>(),
                     Err(OfpError::WrongMessageType { found: MessageType::SetAsync, .. })));
    mm.edit::<AsyncConfig>()
        .unwrap()
        .packet_in_mask(AsyncRole::Slave, &[PacketInReason::InvalidTtl])
        .unwrap();
    assert!(mm.freeze().is_ok());
}

#[test]
fn setters_check_the_message_version() {
    let factory = MessageFactory::default();
    let mut mm = factory.create(V1_0, MessageType::FlowMod).unwrap();
    {
        let mut fm = mm.edit::<FlowMod>().unwrap();
        assert!(fm.flags(&[FlowModFlag::NoByteCounts]).unwrap_err().is_version_mismatch());
        assert!(fm.table_id(1).unwrap_err().is_version_mismatch());
        fm.flags(&[FlowModFlag::SendFlowRem, FlowModFlag::Emerg]).unwrap();
        fm.command(FlowModCommand::ModifyStrict).unwrap();
    }
    let msg = mm.freeze().unwrap();
    assert_eq!(msg.length(), 72);
    assert_eq!(msg.body_as::<FlowMod>().unwrap().flags().len(), 2);
}

#[test]
fn subtypes_preset_the_body() {
    let factory = MessageFactory::default();

    let mut err = factory.create_with_subtype(V1_0, MessageType::Error, ErrorType::BadRequest)
        .unwrap();
    err.edit::<ErrorMsg>().unwrap().code(5);
    let err = err.freeze().unwrap();
    assert_eq!(err.body_as::<ErrorMsg>().unwrap().error_type(), Some(ErrorType::BadRequest));
    assert_eq!(err.to_bytes().unwrap().len(), 12);

    let role = factory.create_with_subtype(V1_2, MessageType::RoleRequest, ControllerRole::Master)
        .unwrap()
        .into_immutable()
        .unwrap();
    assert_eq!(role.body_as::<Role>().unwrap().role(), Some(ControllerRole::Master));

    assert!(matches!(factory.create_with_subtype(V1_3, MessageType::Hello, GroupModCommand::Add),
                     Err(OfpError::IllegalCombination { .. })));
    assert!(factory.create_with_subtype(V1_0, MessageType::Error, ErrorType::MeterModFailed)
        .unwrap_err()
        .is_version_mismatch());
}

#[test]
fn replies_share_the_request_xid() {
    let factory = MessageFactory::default();
    let request = factory.create(V1_3, MessageType::EchoRequest).unwrap().into_immutable().unwrap();
    let reply = factory.create_reply(&request, MessageType::EchoReply).unwrap();
    assert_eq!(reply.xid(), request.xid());
    assert_eq!(reply.version(), V1_3);

    let mut other = factory.create(V1_3, MessageType::BarrierRequest).unwrap();
    MessageFactory::copy_xid(&request, &mut other).unwrap();
    assert_eq!(other.xid(), request.xid());
    factory.assign_xid(&mut other).unwrap();
    assert_ne!(other.xid(), request.xid());
    other.clear_xid().unwrap();
    assert_eq!(other.xid(), 0);
}

#[test]
fn every_copy_kind() {
    let factory = MessageFactory::default();
    let msg = factory.create(V1_1, MessageType::BarrierReply).unwrap().into_immutable().unwrap();

    let kinds = [(CopyKind::Immutable, false, false),
                 (CopyKind::ImmutableExact, false, true),
                 (CopyKind::Mutable, true, false),
                 (CopyKind::MutableExact, true, true)];
    for &(kind, mutable, exact) in kinds.iter() {
        let copy = factory.copy(&msg, kind);
        assert_eq!(copy.is_mutable(), mutable, "{:?}", kind);
        assert_eq!(copy.xid() == msg.xid(), exact, "{:?}", kind);
        assert_eq!(copy.msg_type(), MessageType::BarrierReply);
    }
    assert_eq!(factory.exact_copy(&msg), msg);
    assert_ne!(factory.copy_message(&msg).xid(), msg.xid());
}

#[test]
fn entities_in_either_form() {
    let factory = MessageFactory::default();
    match factory.create_entity(V1_3, MessageType::GetAsyncRequest, Variant::Immutable).unwrap() {
        Entity::Immutable(m) => assert_eq!(m.length(), 8),
        Entity::Mutable(_) => panic!("asked for an immutable entity"),
    }
    let entity = factory.create_entity(V1_3, MessageType::FeaturesRequest, Variant::Mutable)
        .unwrap();
    assert!(entity.into_mutable().map_or(false, |m| m.writable()));
}

#[test]
fn unsupported_versions_are_refused() {
    let config = FactoryConfig::default().with_versions(&[V1_0]);
    let factory = MessageFactory::new(config).unwrap();
    assert_eq!(factory.create(V1_3, MessageType::FlowMod).unwrap_err(),
               OfpError::VersionNotSupported(V1_3));
    assert!(factory.create(V1_3, MessageType::Hello).is_ok());
    assert!(MessageFactory::new(FactoryConfig::default().with_versions(&[])).is_err());
}

#[test]
fn debug_string_lists_fields() {
    let factory = MessageFactory::default();
    let mut mm = factory.create(V1_3, MessageType::RoleReply).unwrap();
    assert!(mm.validate().is_err());
    mm.edit::<Role>().unwrap().role(ControllerRole::Slave).unwrap().generation_id(9);
    let msg = mm.freeze().unwrap();
    assert!(msg.to_debug_string().contains("generation_id: 9"));
    assert!(msg.to_string().starts_with("{ofm:[1.3,ROLE_REPLY,24,"));
}

#[test]
fn shared_bodies_name_the_actual_message() {
    let factory = MessageFactory::default();
    let reply = factory.create(V1_3, MessageType::RoleReply).unwrap();
    assert_eq!(reply.validate(), Err(OfpError::Incomplete(MessageType::RoleReply, "role")));
    let request = factory.create(V1_3, MessageType::RoleRequest).unwrap();
    assert_eq!(request.validate(), Err(OfpError::Incomplete(MessageType::RoleRequest, "role")));

    let frozen = factory.create(V1_2, MessageType::RoleReply).unwrap().into_immutable().unwrap();
    assert_eq!(frozen.to_bytes(), Err(OfpError::Incomplete(MessageType::RoleReply, "role")));
}

#[test]
fn structures_freeze_exactly_once() {
    let factory = MessageFactory::default();
    let mut elem = factory.create_structure(V1_3, StructureType::HelloElement).unwrap();
    assert!(elem.validate().is_err());
    elem.edit::<HelloElement>().unwrap().versions(&[V1_2, V1_3]).unwrap();
    let frozen = elem.freeze().unwrap();
    assert_eq!(frozen.as_kind::<HelloElement>(), Some(&HelloElement::version_bitmap(&[V1_2, V1_3])));
    assert!(matches!(elem.freeze(), Err(OfpError::InvalidMutable(_))));
    assert!(matches!(elem.edit::<HelloElement>(), Err(OfpError::InvalidMutable(_))));

    let mut again = factory.mutable_structure_copy(&frozen);
    again.edit::<HelloElement>().unwrap().add_version(V1_0);
    let second = again.freeze().unwrap();
    assert_eq!(frozen.size_of(), second.size_of());
    assert_ne!(frozen, second);
}

#[test]
fn structures_respect_version_and_kind() {
    let factory = MessageFactory::new(FactoryConfig::default().with_versions(&[V1_0, V1_3]))
        .unwrap();
    assert_eq!(factory.create_structure(V1_1, StructureType::Match).unwrap_err(),
               OfpError::VersionNotSupported(V1_1));
    assert!(factory.create_structure(V1_0, StructureType::HelloElement)
        .unwrap_err()
        .is_version_mismatch());
    assert!(matches!(factory.create_structure(V1_3, StructureType::Action),
                     Err(OfpError::NotYetImplemented(_))));

    let mut m = factory.create_structure(V1_0, StructureType::Match).unwrap();
    assert!(matches!(m.edit::<HelloElement>(),
                     Err(OfpError::WrongStructureType { expected: "HELLO_ELEMENT", .. })));
    assert_eq!(m.edit::<Match>().unwrap().version(), V1_0);
}

#[test]
fn structure_entities_in_either_form() {
    let factory = MessageFactory::default();
    match factory.create_structure_entity(V1_2, StructureType::Match, Variant::Immutable).unwrap() {
        StructureEntity::Immutable(s) => assert_eq!(s.as_kind::<Match>(), Some(&Match::all(V1_2))),
        StructureEntity::Mutable(_) => panic!("asked for an immutable structure"),
    }
    let entity = factory.create_structure_entity(V1_3, StructureType::HelloElement, Variant::Mutable)
        .unwrap();
    assert!(entity.is_mutable());
    assert_eq!(entity.structure_type(), StructureType::HelloElement);
    assert!(entity.into_mutable().map_or(false, |s| s.writable()));
}
