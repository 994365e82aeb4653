// rfidr-rs/rfidr/src/reader/machine.rs
//! Command intake, state dispatch and the single fault handler.

use log::{debug, error, warn};

use crate::constants::HOST_EPC_FILL;
use crate::reader::state::{guard, ReaderState, Transition};
use crate::reader::Reader;
use crate::transport::HostCommand;
use crate::types::{Epc, ProgramContent, SearchTarget};
use crate::{ReaderFault, Result};

impl Reader {
    /// Stage `requested` through the guard. Nothing runs until the next
    /// [`run`](Self::run).
    pub fn request_transition(&mut self, requested: ReaderState) -> Transition {
        let t = guard(self.ctx.current, requested);
        if let Some(on) = t.tracking {
            self.ctx.tracking = on;
        }
        if t.next == requested {
            debug!("{} -> {} staged", self.ctx.current, t.next);
        } else {
            debug!("request for {} refused in {}", requested, self.ctx.current);
        }
        self.ctx.next = t.next;
        t
    }

    /// Apply one host write. Returns the transition for state requests.
    pub fn receive_command(&mut self, command: HostCommand) -> Option<Transition> {
        match command {
            HostCommand::WriteState(code) => {
                Some(self.request_transition(ReaderState::from_code(code)))
            }
            HostCommand::TargetEpc(bytes) => {
                self.ctx.app_epc = Epc::overlay(HOST_EPC_FILL, &bytes);
                debug!("target epc {}", self.ctx.app_epc.to_hex());
                None
            }
            HostCommand::ProgramEpc(bytes) => {
                let epc = Epc::overlay(HOST_EPC_FILL, &bytes);
                self.ctx.program_epc = Epc::from_bytes(*epc.padded());
                debug!("program epc {}", self.ctx.program_epc.to_hex());
                None
            }
            HostCommand::KillPassword(password) => {
                self.ctx.kill_password = password;
                None
            }
        }
    }

    /// Drain pending host commands. True if any of them was a state request.
    pub(crate) fn poll_host(&mut self) -> bool {
        let mut requested = false;
        while let Some(command) = self.host.poll_command() {
            requested |= self.receive_command(command).is_some();
        }
        requested
    }

    /// Poll the host and run once if a state was requested or one is still
    /// staged. Returns whether a run happened.
    pub fn service(&mut self) -> Result<bool> {
        let requested = self.poll_host();
        if requested || self.ctx.next != self.ctx.current {
            self.run()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Enter the staged state and do its work. Operation faults are
    /// handled here; only a failure to report the fault itself is returned.
    pub fn run(&mut self) -> Result<()> {
        self.ctx.current = self.ctx.next;
        let state = self.ctx.current;
        match self.dispatch(state) {
            Ok(()) => Ok(()),
            Err(fault) => self.handle_fault(state, fault),
        }
    }

    fn dispatch(&mut self, state: ReaderState) -> Result<()> {
        use ReaderState::*;

        match state {
            IdleUnconfigured => self.bookend(),
            IdleConfigured => {
                self.send_message("Got here");
                self.bookend()
            }
            Initializing => self.operate(Reader::initialize),
            SearchAppTarget => self.operate(|r| r.pdoa_search(SearchTarget::AppSpecified)),
            SearchLastInventoried => self.operate(|r| r.pdoa_search(SearchTarget::LastInventoried)),
            Inventorying => self.operate(Reader::inventory),
            TestingDtc => {
                self.bookend()?;
                self.toggle_dtc()?;
                self.bookend()
            }
            ProgramAppTarget => self.operate(|r| {
                r.program_state(SearchTarget::AppSpecified, ProgramContent::NewEpc)
            }),
            ProgramLastInventoried => self.operate(|r| {
                r.program_state(SearchTarget::LastInventoried, ProgramContent::NewEpc)
            }),
            KillTag => self.operate(|r| {
                r.program_state(SearchTarget::AppSpecified, ProgramContent::KillCommand)
            }),
            ProgramKillPassword => self.operate(|r| {
                r.program_state(SearchTarget::AppSpecified, ProgramContent::KillPassword)
            }),
            RecoverWaveform => self.operate(Reader::recover_waveform),
            ResetRadio => self.operate(Reader::reset_radio),
            TrackAppTarget => self.operate(|r| r.track(SearchTarget::AppSpecified)),
            TrackLastInventoried => self.operate(|r| r.track(SearchTarget::LastInventoried)),
        }
    }

    /// Announce, work, settle in configured idle, announce again. A request
    /// staged while the work ran survives it.
    fn operate(&mut self, work: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let ran = self.ctx.current;
        self.bookend()?;
        work(self)?;
        self.ctx.current = ReaderState::IdleConfigured;
        if self.ctx.next == ran {
            self.ctx.next = ReaderState::IdleConfigured;
        }
        self.bookend()
    }

    fn handle_fault(&mut self, state: ReaderState, fault: ReaderFault) -> Result<()> {
        if let Err(e) = self.radio.board().set_pa(false) {
            warn!("amplifier still keyed after fault: {}", e);
        }
        let diagnostic = format!("Error at {}: {}: {:02}", state.activity(), fault, fault.code());
        error!("{}", diagnostic);
        self.send_message(&diagnostic);

        self.ctx.tracking = false;
        self.ctx.dtc = false;
        let safe = match state {
            ReaderState::IdleUnconfigured | ReaderState::Initializing => {
                ReaderState::IdleUnconfigured
            }
            _ => ReaderState::IdleConfigured,
        };
        self.ctx.current = safe;
        self.ctx.next = safe;
        self.ctx.last_fault = Some(fault);
        self.bookend()
    }
}
