#[path = "../common/mod.rs"]
mod common;

use rfidr::constants::{TEST_USE_KILL, USER_REG_TEST};
use rfidr::reader::ReaderState;
use rfidr::transport::{HostCommand, RadioReply};
use rfidr::ReaderFault;

fn script_program(radio: &rfidr::transport::MockRadio, read_back: [u8; 12]) {
    radio.push_replies(common::fixtures::sample_tag_pass());
    radio.push_reply(RadioReply::Written {
        read_back,
        write_counter: 6,
    });
}

#[test]
fn program_app_target_with_new_epc() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    host.queue_command(HostCommand::TargetEpc(common::fixtures::sample_epc_bytes().to_vec()));
    host.queue_command(HostCommand::ProgramEpc(common::fixtures::replacement_epc_bytes().to_vec()));
    script_program(&radio, common::fixtures::replacement_epc_bytes());
    common::helpers::command_state(&host, &mut reader, ReaderState::ProgramAppTarget)?;

    assert_eq!(host.states(), vec![7, 1]);
    assert!(host.messages().contains(&"Prog.Pass!!!".to_string()));
    assert!(reader.context().last_fault.is_none());
    Ok(())
}

#[test]
fn read_back_mismatch_reports_code_09() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    host.queue_command(HostCommand::ProgramEpc(common::fixtures::replacement_epc_bytes().to_vec()));
    script_program(&radio, [0xFF; 12]);
    common::helpers::command_state(&host, &mut reader, ReaderState::ProgramLastInventoried)?;

    assert_eq!(host.states(), vec![8, 1]);
    let diagnostic = host.messages().pop().unwrap_or_default();
    assert!(diagnostic.starts_with("Error at programming: "), "{}", diagnostic);
    assert!(diagnostic.ends_with(": 09"), "{}", diagnostic);
    assert!(matches!(
        reader.context().last_fault.as_ref().map(ReaderFault::root),
        Some(ReaderFault::ReadCheck)
    ));
    Ok(())
}

#[test]
fn kill_leaves_kill_bit_clear() -> anyhow::Result<()> {
    let (radio, host, mut reader) = common::helpers::initialized_reader()?;
    host.queue_command(HostCommand::KillPassword(0x1234_5678));
    radio.push_replies(common::fixtures::sample_tag_pass());
    radio.push_reply(RadioReply::Exit { code: 0, write_counter: 0 });
    common::helpers::command_state(&host, &mut reader, ReaderState::KillTag)?;
    assert_eq!(host.states(), vec![11, 1]);
    assert_eq!(radio.model().user[usize::from(USER_REG_TEST)] & TEST_USE_KILL, 0);
    Ok(())
}
