#[path = "../common/mod.rs"]
mod common;

use rfidr::reader::{guard, ReaderState};
use rfidr::test_support::mock_reader;
use rfidr::transport::{HostCommand, HostField};

#[test]
fn boot_request_for_work_is_refused() -> anyhow::Result<()> {
    let (radio, host, mut reader) = mock_reader();
    common::helpers::command_state(&host, &mut reader, ReaderState::Inventorying)?;
    assert_eq!(host.states(), vec![0]);
    assert_eq!(radio.model().runs, 0);
    Ok(())
}

#[test]
fn initialization_announces_both_bookends() -> anyhow::Result<()> {
    common::helpers::init_logger();
    let (radio, host, mut reader) = mock_reader();
    common::helpers::command_state(&host, &mut reader, ReaderState::Initializing)?;
    assert_eq!(host.states(), vec![2, 1]);
    let messages = host.messages();
    assert_eq!(messages.last().map(String::as_str), Some("Initialization function complete!"));
    assert!(radio.model().clk36_running);
    Ok(())
}

#[test]
fn second_initialization_is_refused() -> anyhow::Result<()> {
    let (_radio, host, mut reader) = common::helpers::initialized_reader()?;
    common::helpers::command_state(&host, &mut reader, ReaderState::Initializing)?;
    assert_eq!(host.states(), vec![1]);
    assert_eq!(host.messages(), vec!["Got here".to_string()]);
    Ok(())
}

#[test]
fn unknown_state_code_is_ignored() -> anyhow::Result<()> {
    let (_radio, host, mut reader) = common::helpers::initialized_reader()?;
    host.queue_command(HostCommand::WriteState(0x7F));
    reader.service()?;
    assert_eq!(reader.state(), ReaderState::IdleConfigured);
    assert_eq!(host.states(), vec![1]);
    Ok(())
}

#[test]
fn guard_table_matches_state_machine() {
    use ReaderState::*;
    let operational = [
        SearchAppTarget,
        SearchLastInventoried,
        Inventorying,
        TestingDtc,
        ProgramAppTarget,
        ProgramLastInventoried,
        RecoverWaveform,
        KillTag,
        ProgramKillPassword,
        TrackAppTarget,
        TrackLastInventoried,
    ];
    for s in operational {
        assert_eq!(guard(IdleConfigured, s).next, s, "{}", s);
        assert_eq!(guard(IdleUnconfigured, s).next, IdleUnconfigured, "{}", s);
        assert_eq!(guard(Initializing, s).next, Initializing, "{}", s);
    }
    assert_eq!(guard(Inventorying, ResetRadio).next, Inventorying);
    assert_eq!(guard(IdleUnconfigured, ResetRadio).next, ResetRadio);
}

#[test]
fn waveform_capture_reaches_host() -> anyhow::Result<()> {
    let (_radio, host, mut reader) = common::helpers::initialized_reader()?;
    common::helpers::command_state(&host, &mut reader, ReaderState::RecoverWaveform)?;
    let data: Vec<u8> = host
        .pushed(HostField::WaveformData)
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(data.len(), 8192);
    assert_eq!(hex::encode(&data[250..258]), "fafbfcfdfeff0001");
    assert_eq!(host.states(), vec![9, 1]);
    Ok(())
}

#[test]
fn lost_ack_forces_configured_idle() -> anyhow::Result<()> {
    let (_radio, host, mut reader) = common::helpers::initialized_reader()?;
    host.set_auto_ack(false);
    host.queue_command(HostCommand::WriteState(ReaderState::Inventorying.code()));
    assert!(reader.service().is_err());
    assert_eq!(reader.state(), ReaderState::IdleConfigured);
    let diagnostic = host.messages().pop().unwrap_or_default();
    assert!(diagnostic.starts_with("Error at inventorying: "), "{}", diagnostic);
    Ok(())
}
