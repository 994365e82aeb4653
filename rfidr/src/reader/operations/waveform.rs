// rfidr-rs/rfidr/src/reader/operations/waveform.rs

use log::info;

use crate::constants::WAVEFORM_DEPTH;
use crate::reader::Reader;
use crate::types::MemorySpace;
use crate::{ReaderFault, Result};

impl Reader {
    /// Read the whole capture memory and stream it to the host.
    pub(crate) fn recover_waveform(&mut self) -> Result<()> {
        let mut capture = vec![0u8; usize::from(WAVEFORM_DEPTH)];
        self.radio
            .read_block(MemorySpace::Waveform, 0, &mut capture)
            .map_err(|e| ReaderFault::WaveformMemory(e.to_string()))?;
        self.push_waveform(&capture)?;
        info!("waveform capture of {} bytes sent", capture.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::reader::ReaderState;
    use crate::test_support::configured_reader;
    use crate::transport::HostField;

    #[test]
    fn capture_is_streamed_in_link_chunks() {
        let (_radio, host, mut reader) = configured_reader();
        reader.request_transition(ReaderState::RecoverWaveform);
        reader.run().unwrap();
        let chunks = host.pushed(HostField::WaveformData);
        assert_eq!(chunks.len(), 410);
        assert_eq!(chunks[0], (0u8..20).collect::<Vec<_>>());
        assert_eq!(chunks[409].len(), 12);
        let total: usize = chunks.iter().map(Vec::len).sum();
        assert_eq!(total, 8192);
        assert_eq!(host.states(), vec![9, 1]);
    }
}
