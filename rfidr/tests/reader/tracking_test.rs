#[path = "../common/mod.rs"]
mod common;

use rfidr::reader::{tracking_schedule, ReaderState};
use rfidr::transport::{HostCommand, HostField, RadioReply};

#[test]
fn tracking_runs_until_toggled_off() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    // Inventory to learn a tag, then track it until the second poll toggles it off.
    radio.push_reply(RadioReply::Tag {
        epc: common::fixtures::sample_epc_bytes(),
        main: 400,
        alt: 40,
    });
    common::helpers::command_state(&host, &mut reader, ReaderState::Inventorying)?;
    host.clear();
    let ends_before = radio.model().end_runs;

    host.queue_command(HostCommand::WriteState(ReaderState::TrackLastInventoried.code()));
    host.queue_command_after(2, HostCommand::WriteState(ReaderState::TrackLastInventoried.code()));
    radio.model().default_reply = RadioReply::Tag {
        epc: common::fixtures::sample_epc_bytes(),
        main: 900,
        alt: 90,
    };
    reader.service()?;

    assert_eq!(host.states(), vec![14, 1]);
    assert!(!reader.context().tracking);
    let messages = host.messages();
    let loops: Vec<&String> = messages.iter().filter(|m| m.starts_with("NumTrackLoop-")).collect();
    assert_eq!(loops.len(), 2);
    assert_eq!(loops[1], "NumTrackLoop-001");
    assert!(messages.last().unwrap().starts_with("Fnd "));
    assert!(!host.pushed(HostField::SupplementData).is_empty());
    assert_eq!(radio.model().end_runs - ends_before, 2);
    Ok(())
}

#[test]
fn tracking_without_population_faults() -> anyhow::Result<()> {
    let (_radio, host, mut reader) = common::helpers::initialized_reader()?;
    common::helpers::command_state(&host, &mut reader, ReaderState::TrackAppTarget)?;
    assert_eq!(host.states(), vec![13, 1]);
    assert!(!reader.context().tracking);
    let diagnostic = host.messages().pop().unwrap_or_default();
    assert!(diagnostic.starts_with("Error at tracking: "), "{}", diagnostic);
    Ok(())
}

#[test]
fn schedules_cover_every_population() {
    let mut last_flip = 0;
    for n in 1..=64 {
        let s = tracking_schedule(n).expect("population has a schedule");
        assert!(s.flip_limit >= last_flip);
        assert!(s.rounds.chars().all(|c| c.is_ascii_digit()));
        last_flip = s.flip_limit;
    }
    assert!(tracking_schedule(0).is_none());
}
