#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;

use rfidr::constants::{TX_FLAG_ONE_SHOT, TX_FLAG_SWAP, TX_HEADER_LEN};
use rfidr::protocol::{default_image, SelectSlot, TxCommand};
use rfidr::types::{PacketParams, SelectAction, Session};

#[test]
fn query_and_adjust_flags() {
    let params = PacketParams::bulk(Session::S2);
    let swap = TxCommand::Query {
        params,
        flag_swap: true,
    }
    .encode()
    .expect("query fits");
    assert_eq!(swap.bits, 17);
    assert_eq!(swap.flags, TX_FLAG_SWAP);

    let adjust = TxCommand::QueryAdjust {
        session: Session::S2,
        up: true,
    }
    .encode()
    .expect("adjust fits");
    assert_eq!(adjust.flags, TX_FLAG_ONE_SHOT);
    assert_eq!(adjust.bits, 9);
}

#[test]
fn program_packet_carries_whole_epc() {
    let packet = TxCommand::ProgramEpc(common::fixtures::sample_epc())
        .encode()
        .expect("write fits");
    // command(8) membank(2) pointer(8) count(8) then six words
    assert_eq!(packet.bits, 26 + 96);
    let region = packet.to_region_bytes();
    assert_eq!(region.len(), TX_HEADER_LEN + packet.payload.len());
    assert_eq!(region[0], packet.bits);
}

#[test]
fn kill_packet_length() {
    let packet = TxCommand::Kill(0xDEAD_BEEF).encode().expect("kill fits");
    assert_eq!(packet.bits, 43);
    assert_eq!(packet.payload[1..5], [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn select_slots_use_separate_regions() {
    let params = PacketParams::single_tag(Session::S0);
    let first = TxCommand::Select {
        slot: SelectSlot::First,
        target: params.select_target,
        action: SelectAction::A0,
        mask: common::fixtures::sample_epc(),
    };
    let second = TxCommand::Select {
        slot: SelectSlot::Second,
        target: params.select_target,
        action: SelectAction::A0,
        mask: common::fixtures::sample_epc(),
    };
    let a = first.encode().expect("select fits");
    let b = second.encode().expect("select fits");
    assert_ne!(a.base_address(), b.base_address());
    assert_eq!(a.payload, b.payload);
}

#[test]
fn default_image_fills_every_region_once() {
    let image = default_image();
    let regions: HashSet<u16> = image.iter().map(TxCommand::region).collect();
    assert_eq!(regions.len(), image.len());
    for command in &image {
        command.encode().expect("default packet fits");
    }
}
