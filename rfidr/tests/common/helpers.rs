// helpers.rs: reader setup shared by the integration tests

use rfidr::reader::{Reader, ReaderState};
use rfidr::test_support::mock_reader;
use rfidr::transport::{HostCommand, MockHost, MockRadio};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A reader taken through its initialization state by host command, with
/// the host record cleared afterwards.
pub fn initialized_reader() -> anyhow::Result<(MockRadio, MockHost, Reader)> {
    init_logger();
    let (radio, host, mut reader) = mock_reader();
    command_state(&host, &mut reader, ReaderState::Initializing)?;
    anyhow::ensure!(
        reader.state() == ReaderState::IdleConfigured,
        "initialization ended in {}",
        reader.state()
    );
    host.clear();
    Ok((radio, host, reader))
}

/// Send a state request the way the host does and service it once.
pub fn command_state(host: &MockHost, reader: &mut Reader, state: ReaderState) -> anyhow::Result<()> {
    host.queue_command(HostCommand::WriteState(state.code()));
    reader.service()?;
    Ok(())
}
