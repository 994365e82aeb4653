#[path = "../common/mod.rs"]
mod common;

use rfidr::reader::ReaderState;
use rfidr::transport::{HostField, RadioReply};
use rfidr::types::Session;
use rfidr::ReaderFault;

#[test]
fn empty_field_inventory() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    common::helpers::command_state(&host, &mut reader, ReaderState::Inventorying)?;
    assert_eq!(host.states(), vec![5, 1]);
    assert_eq!(host.messages().last().map(String::as_str), Some("InventryFnd 000Tags"));
    assert!(host.pushed(HostField::PrimaryData).is_empty());
    assert!(!radio.model().pa_on);
    Ok(())
}

#[test]
fn inventoried_tag_becomes_search_target() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    radio.push_reply(RadioReply::Tag {
        epc: common::fixtures::sample_epc_bytes(),
        main: 400,
        alt: 40,
    });
    common::helpers::command_state(&host, &mut reader, ReaderState::Inventorying)?;
    assert_eq!(reader.context().last_inventoried, common::fixtures::sample_epc());
    assert_eq!(host.messages().last().map(String::as_str), Some("InventryFnd 001Tags"));

    let primary = host.pushed(HostField::PrimaryData);
    assert_eq!(primary.len(), 1);
    assert_eq!(hex::encode(&primary[0][..12]), "300833b2ddd9014000000001");
    assert_eq!(host.pushed(HostField::SupplementData).len(), 1);
    Ok(())
}

#[test]
fn too_many_tags_is_reported_as_fault() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    radio.model().default_reply = RadioReply::Tag {
        epc: [0x11; 12],
        main: 1,
        alt: 1,
    };
    common::helpers::command_state(&host, &mut reader, ReaderState::Inventorying)?;
    assert_eq!(host.states(), vec![5, 1]);
    assert_eq!(host.pushed(HostField::PrimaryData).len(), 51);
    let diagnostic = host.messages().pop().unwrap_or_default();
    assert!(diagnostic.contains("51"), "{}", diagnostic);
    assert!(diagnostic.ends_with(": 13"), "{}", diagnostic);
    Ok(())
}

#[test]
fn direct_inventory_respects_limit_argument() -> anyhow::Result<()> {
    let (radio, _host, mut reader) = common::helpers::initialized_reader()?;
    radio.push_replies([RadioReply::Silent, RadioReply::Tag { epc: [2; 12], main: 1, alt: 1 }]);
    let found = reader.inventory_core(Session::S3, "0", 4, &rfidr::Epc::ZERO)?;
    assert_eq!(found, 1);
    Ok(())
}

#[test]
fn tag_limit_is_inclusive() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    let tag = RadioReply::Tag { epc: [3; 12], main: 1, alt: 1 };
    radio.push_replies([tag.clone(), tag.clone()]);
    assert_eq!(reader.inventory_core(Session::S2, "1", 2, &rfidr::Epc::ZERO)?, 2);
    assert_eq!(host.pushed(HostField::PrimaryData).len(), 2);
    host.clear();

    radio.push_replies([tag.clone(), tag.clone(), tag]);
    let err = reader
        .inventory_core(Session::S2, "1", 2, &rfidr::Epc::ZERO)
        .expect_err("third tag is over the limit");
    assert!(matches!(err, ReaderFault::TooManyTags { max: 2 }));
    assert_eq!(host.pushed(HostField::PrimaryData).len(), 2);
    assert_eq!(host.pushed(HostField::SupplementData).len(), 2);
    Ok(())
}
