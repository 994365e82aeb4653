// rfidr-rs/rfidr/src/reader/builder.rs

use crate::config::ReaderConfig;
use crate::device::{create_calibrator, Radio, TxCalibrator};
use crate::reader::Reader;
use crate::transport::{Board, HostLink, RegisterBus};
use crate::{ReaderFault, Result};

/// Helper to assemble a [`Reader`] from its collaborators.
#[derive(Default)]
pub struct ReaderBuilder {
    bus: Option<Box<dyn RegisterBus>>,
    board: Option<Box<dyn Board>>,
    host: Option<Box<dyn HostLink>>,
    config: ReaderConfig,
    calibrator: Option<Box<dyn TxCalibrator>>,
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(mut self, bus: Box<dyn RegisterBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_board(mut self, board: Box<dyn Board>) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_host(mut self, host: Box<dyn HostLink>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the calibrator the configured strategy would pick.
    pub fn with_calibrator(mut self, calibrator: Box<dyn TxCalibrator>) -> Self {
        self.calibrator = Some(calibrator);
        self
    }

    /// Consume the builder. The bus, board and host link are required.
    pub fn build(self) -> Result<Reader> {
        let bus = self.bus.ok_or(ReaderFault::MissingComponent("register bus"))?;
        let board = self.board.ok_or(ReaderFault::MissingComponent("board"))?;
        let host = self.host.ok_or(ReaderFault::MissingComponent("host link"))?;
        let calibrator = self
            .calibrator
            .unwrap_or_else(|| create_calibrator(self.config.calibration.strategy));
        let radio = Radio::new(bus, board, self.config.event_timeout());
        Ok(Reader::new(radio, host, self.config, calibrator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::calibration::Gradient;
    use crate::reader::ReaderState;
    use crate::transport::{MockHost, MockRadio};

    #[test]
    fn builder_with_mocks() {
        let radio = MockRadio::new();
        let reader = ReaderBuilder::new()
            .with_bus(Box::new(radio.clone()))
            .with_board(Box::new(radio))
            .with_host(Box::new(MockHost::new()))
            .build()
            .unwrap();
        assert_eq!(reader.state(), ReaderState::IdleUnconfigured);
        assert_eq!(reader.context().app_epc.padded()[0], 0x01);
    }

    #[test]
    fn missing_host_is_reported() {
        let radio = MockRadio::new();
        let err = ReaderBuilder::new()
            .with_bus(Box::new(radio.clone()))
            .with_board(Box::new(radio))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ReaderFault::MissingComponent("host link")));
    }

    #[test]
    fn explicit_calibrator_wins_over_strategy() {
        let radio = MockRadio::new();
        let host = MockHost::new();
        let mut reader = ReaderBuilder::new()
            .with_bus(Box::new(radio.clone()))
            .with_board(Box::new(radio))
            .with_host(Box::new(host.clone()))
            .with_calibrator(Box::new(Gradient::new()))
            .build()
            .unwrap();
        reader.initialize().unwrap();
        let messages = host.messages();
        assert!(messages[messages.len() - 2].starts_with("S:"));
    }
}
