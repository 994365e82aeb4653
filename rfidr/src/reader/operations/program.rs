// rfidr-rs/rfidr/src/reader/operations/program.rs
//! Writing to a tag: a new EPC, the kill password, or the kill command.

use log::{info, warn};

use crate::error::StepExt;
use crate::protocol::{SelectSlot, TxCommand};
use crate::reader::Reader;
use crate::types::{
    Channel, Epc, PacketParams, ProgramContent, RadioMode, ReadFields, SearchTarget, SelectAction,
    Session, TagReadResult,
};
use crate::{ReaderFault, Result};

/// How a program operation ended when it did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramOutcome {
    /// The tag acknowledged the write; new EPCs are read back and checked.
    Programmed,
    /// Every retry failed and the loop-ending run closed the exchange.
    Abandoned { write_counter: u8 },
}

/// Receive channel for programming, from a search result: the passing
/// channel, switched to the other one when its alternate integrator saw
/// the stronger signal.
pub fn program_channel(found: &TagReadResult) -> Option<Channel> {
    if found.i.pass {
        Some(if found.i.main_mag > found.i.alt_mag {
            Channel::I
        } else {
            Channel::Q
        })
    } else if found.q.pass {
        Some(if found.q.main_mag > found.q.alt_mag {
            Channel::Q
        } else {
            Channel::I
        })
    } else {
        None
    }
}

impl Reader {
    /// The program and kill states: find the tag, then write to it.
    pub(crate) fn program_state(
        &mut self,
        target: SearchTarget,
        content: ProgramContent,
    ) -> Result<()> {
        self.hop()?;
        let found = self
            .search(Session::S0, target, ReadFields::MAGNITUDES)
            .step("searching tag to program")?;
        if !found.any_pass() {
            return Err(ReaderFault::NoPassingChannel).step("searching tag to program");
        }
        self.program(target, content, &found).map(|_| ())
    }

    /// Write `content` to the tag `target` names, using the channel a prior
    /// search found it on.
    pub fn program(
        &mut self,
        target: SearchTarget,
        content: ProgramContent,
        found: &TagReadResult,
    ) -> Result<ProgramOutcome> {
        let channel = match program_channel(found) {
            Some(c) => c,
            None => return Err(ReaderFault::NoPassingChannel).step("choosing channel"),
        };
        let params = PacketParams::single_tag(Session::S0);
        let mask = match target {
            SearchTarget::LastInventoried => self.ctx.last_inventoried,
            _ => self.ctx.app_epc,
        };

        self.radio.use_channel(channel).step("selecting channel")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::First,
                target: params.select_target,
                action: SelectAction::A0,
                mask: Epc::from_bytes(*mask.padded()),
            })
            .step("loading select packet 1")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::Second,
                target: params.select_target,
                action: SelectAction::A1,
                mask: Epc::ZERO,
            })
            .step("loading select packet 2")?;
        self.radio
            .load_tx(&TxCommand::Query {
                params,
                flag_swap: false,
            })
            .step("loading query")?;
        self.radio.set_mode(RadioMode::Program).step("setting program mode")?;
        self.radio.set_use_select().step("setting select")?;

        let packet = match content {
            ProgramContent::NewEpc => {
                TxCommand::ProgramEpc(Epc::from_bytes(*self.ctx.program_epc.padded()))
            }
            ProgramContent::KillPassword => TxCommand::KillPassword(self.ctx.kill_password),
            ProgramContent::KillCommand => TxCommand::Kill(self.ctx.kill_password),
        };
        self.radio.load_tx(&packet).step("loading write packet")?;
        let kill = content == ProgramContent::KillCommand;
        if kill {
            self.radio.set_use_kill(true).step("setting kill")?;
        }
        self.radio.board().set_pa(true).step("enabling amplifier")?;
        self.radio.set_lna_gain(self.config.lna_gain).step("setting LNA gain")?;

        let outcome = self.program_attempts(content);
        let cleanup = self.finish_program(kill);
        let outcome = outcome?;
        cleanup?;
        Ok(outcome)
    }

    fn program_attempts(&mut self, content: ProgramContent) -> Result<ProgramOutcome> {
        let retries = self.config.program_retries;
        for attempt in 0..=retries + 1 {
            let exit = self.radio.run_once().step("running program")?;
            let write_counter = self.radio.write_counter().step("reading write counter")?;
            if exit != 0 && attempt < retries {
                warn!("program attempt {} failed at word {}", attempt + 1, write_counter);
                self.send_message(&format!("Prg.FailAt{}-Retry", write_counter));
            } else if exit != 0 && attempt == retries {
                self.send_message(&format!("Prg.FailAt{:03}-End", write_counter));
                self.radio.set_end_loop().step("setting program end")?;
            } else if exit != 0 {
                return Err(ReaderFault::ProgramUndefined);
            } else if attempt >= retries {
                self.send_message(&format!("Prg.FailAt{:03}-Exit", write_counter));
                return Ok(ProgramOutcome::Abandoned { write_counter });
            } else {
                self.send_message("Prog.Pass!!!");
                if content == ProgramContent::NewEpc {
                    let read = self.radio.read_back_epc().step("pulling read data")?;
                    if read != *self.ctx.program_epc.padded() {
                        return Err(ReaderFault::ReadCheck).step("checking read-back epc");
                    }
                }
                info!("programmed after {} attempts", attempt + 1);
                return Ok(ProgramOutcome::Programmed);
            }
        }
        Err(ReaderFault::ProgramUndefined)
    }

    fn finish_program(&mut self, kill: bool) -> Result<()> {
        self.radio.board().set_pa(false).step("disabling amplifier")?;
        if kill {
            self.radio.set_use_kill(false).step("clearing kill")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TEST_USE_KILL, TX_REGION_WRITE, USER_REG_TEST};
    use crate::test_support::{configured_reader, tag_reply};
    use crate::transport::RadioReply;
    use crate::types::ChannelRead;

    fn found_on_i(main: i32, alt: i32) -> TagReadResult {
        TagReadResult {
            i: ChannelRead {
                pass: true,
                main_mag: main,
                alt_mag: alt,
                ..ChannelRead::default()
            },
            ..TagReadResult::default()
        }
    }

    #[test]
    fn channel_follows_stronger_integrator() {
        assert_eq!(program_channel(&found_on_i(10, 5)), Some(Channel::I));
        assert_eq!(program_channel(&found_on_i(5, 10)), Some(Channel::Q));
        let mut q_only = TagReadResult::new();
        q_only.q.pass = true;
        q_only.q.main_mag = 1;
        assert_eq!(program_channel(&q_only), Some(Channel::I));
        q_only.q.main_mag = 2;
        q_only.q.alt_mag = 1;
        assert_eq!(program_channel(&q_only), Some(Channel::Q));
        assert_eq!(program_channel(&TagReadResult::new()), None);
    }

    #[test]
    fn new_epc_is_written_and_verified() {
        let (radio, host, mut reader) = configured_reader();
        reader.ctx.program_epc = Epc::from_bytes([0x5C; 12]);
        radio.push_reply(RadioReply::Written {
            read_back: [0x5C; 12],
            write_counter: 6,
        });
        let outcome = reader
            .program(SearchTarget::AppSpecified, ProgramContent::NewEpc, &found_on_i(10, 5))
            .unwrap();
        assert_eq!(outcome, ProgramOutcome::Programmed);
        assert_eq!(host.messages(), vec!["Prog.Pass!!!".to_string()]);
        let expected = TxCommand::ProgramEpc(Epc::from_bytes([0x5C; 12]))
            .encode()
            .unwrap()
            .to_region_bytes();
        let m = radio.model();
        assert_eq!(&m.tx_region(TX_REGION_WRITE)[..expected.len()], &expected[..]);
        assert!(!m.pa_on);
    }

    #[test]
    fn read_back_mismatch_is_read_check() {
        let (radio, _host, mut reader) = configured_reader();
        reader.ctx.program_epc = Epc::from_bytes([0x5C; 12]);
        radio.push_reply(RadioReply::Written {
            read_back: [0x5D; 12],
            write_counter: 6,
        });
        let err = reader
            .program(SearchTarget::LastInventoried, ProgramContent::NewEpc, &found_on_i(10, 5))
            .unwrap_err();
        assert!(matches!(err.root(), ReaderFault::ReadCheck));
        assert_eq!(err.code(), 9);
        assert!(!radio.model().pa_on);
    }

    #[test]
    fn retries_then_ends_the_exchange() {
        let (radio, host, mut reader) = configured_reader();
        reader.config.program_retries = 2;
        radio.push_replies([
            RadioReply::Exit { code: 2, write_counter: 1 },
            RadioReply::Exit { code: 2, write_counter: 3 },
            RadioReply::Exit { code: 2, write_counter: 4 },
        ]);
        let outcome = reader
            .program(SearchTarget::AppSpecified, ProgramContent::KillPassword, &found_on_i(10, 5))
            .unwrap();
        assert_eq!(outcome, ProgramOutcome::Abandoned { write_counter: 4 });
        assert_eq!(
            host.messages(),
            vec!["Prg.FailAt1-Retry", "Prg.FailAt3-Retry", "Prg.FailAt004-End", "Prg.FailAt004-Exit"]
        );
        assert_eq!(radio.model().end_runs, 1);
    }

    #[test]
    fn kill_sets_and_clears_kill_bit() {
        let (radio, _host, mut reader) = configured_reader();
        radio.push_reply(RadioReply::Exit { code: 0, write_counter: 0 });
        reader
            .program(SearchTarget::AppSpecified, ProgramContent::KillCommand, &found_on_i(10, 5))
            .unwrap();
        assert_eq!(radio.model().user[usize::from(USER_REG_TEST)] & TEST_USE_KILL, 0);
    }

    #[test]
    fn program_state_needs_the_tag() {
        let (radio, _host, mut reader) = configured_reader();
        radio.push_replies([RadioReply::Silent, RadioReply::Silent]);
        let err = reader
            .program_state(SearchTarget::AppSpecified, ProgramContent::NewEpc)
            .unwrap_err();
        assert!(matches!(err.root(), ReaderFault::NoPassingChannel));

        radio.push_replies([tag_reply(0x01, 9, 1), RadioReply::Silent]);
        radio.push_reply(RadioReply::Exit { code: 0, write_counter: 0 });
        reader
            .program_state(SearchTarget::AppSpecified, ProgramContent::KillPassword)
            .unwrap();
    }
}
