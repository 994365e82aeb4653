// rfidr-rs/rfidr/src/reader/operations/search.rs
//! Single-tag search and the two-frequency PDOA search built on it.

use log::{info, warn};

use crate::constants::{FIRST_OBSERVATION, MAX_EPC_LEN};
use crate::device::pdoa_candidates;
use crate::error::StepExt;
use crate::protocol::{SelectSlot, TxCommand};
use crate::reader::Reader;
use crate::types::{
    Channel, Epc, PacketParams, RadioMode, ReadFields, SearchTarget, SelectAction, Session,
    TagReadResult,
};
use crate::{ReaderFault, Result};

impl Reader {
    /// Full 12-byte mask singling out `target`.
    fn search_mask(&self, target: SearchTarget) -> Epc {
        match target {
            SearchTarget::AppSpecified => Epc::from_bytes(*self.ctx.app_epc.padded()),
            SearchTarget::LastInventoried => Epc::from_bytes(*self.ctx.last_inventoried.padded()),
            SearchTarget::Calibration => {
                Epc::from_bytes(*self.config.calibration.calibration_epc.padded())
            }
            SearchTarget::PllCheck => Epc::ZERO,
        }
    }

    /// Select one tag, query it with Q=0 and listen on each channel in
    /// turn. `fields` says what to read back from a passing channel.
    pub fn search(
        &mut self,
        session: Session,
        target: SearchTarget,
        fields: ReadFields,
    ) -> Result<TagReadResult> {
        let pll_check = target == SearchTarget::PllCheck;
        let params = PacketParams::single_tag(session);
        let mut result = TagReadResult::new();

        self.radio.set_pll_check(pll_check).step("setting pll check")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::First,
                target: params.select_target,
                action: SelectAction::A0,
                mask: self.search_mask(target),
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
        self.radio.set_mode(RadioMode::Search).step("setting search mode")?;

        for channel in Channel::BOTH {
            self.radio.board().set_pa(true).step("enabling amplifier")?;
            self.radio.use_channel(channel).step("selecting channel")?;
            self.radio.set_use_select().step("setting select")?;
            self.radio.set_lna_gain(self.config.lna_gain).step("setting LNA gain")?;
            let exit = self.radio.run_once().step("running search")?;
            self.radio.board().set_pa(false).step("disabling amplifier")?;

            if pll_check || exit == 0 {
                self.send_message(&format!("Search {} Pass", channel));
                self.read_fields(channel, fields, pll_check, &mut result)?;
            } else {
                warn!("search on {} failed with exit {}", channel, exit);
                self.send_message(&format!("Search {} Fail", channel));
            }
        }

        if pll_check {
            self.radio.set_pll_check(false).step("clearing pll check")?;
        }
        Ok(result)
    }

    fn read_fields(
        &mut self,
        channel: Channel,
        fields: ReadFields,
        pll_check: bool,
        result: &mut TagReadResult,
    ) -> Result<()> {
        let read = result.channel_mut(channel);
        read.pass = true;
        if fields.epc {
            // No tag answered a PLL check; reply RAM holds a stale EPC.
            read.epc = if pll_check {
                [0; MAX_EPC_LEN]
            } else {
                self.radio.read_reply_epc().step("checking epc")?
            };
        }
        if fields.magnitudes {
            read.main_mag = self.radio.read_main_magnitude().step("reading magnitude")?;
            read.alt_mag = self.radio.read_alt_magnitude().step("reading magnitude")?;
            #[cfg(feature = "diagnostics")]
            {
                let (mi, mq) = match channel {
                    Channel::I => (read.main_mag, read.alt_mag),
                    Channel::Q => (read.alt_mag, read.main_mag),
                };
                self.send_message(&format!("MI({}): {:10}", channel, mi));
                self.send_message(&format!("MQ({}): {:10}", channel, mq));
            }
        }
        if fields.lna_gain {
            read.lna_gain = self.radio.lna_gain().step("reading LNA gain")?;
        }
        Ok(())
    }

    /// Search the calibration tag, then `target`, at the current hop and
    /// again at a skip channel; report each passing pair with the hop
    /// nonce so the host can compute a phase difference.
    pub(crate) fn pdoa_search(&mut self, target: SearchTarget) -> Result<()> {
        let slot = self.hop()?;
        let cal = self
            .search(Session::S0, SearchTarget::Calibration, ReadFields::MAGNITUDES)
            .step("first calibration search")?;
        if !cal.any_pass() {
            return Err(ReaderFault::NoPassingChannel).step("first calibration search");
        }
        let tag = self
            .search(Session::S0, target, ReadFields::EPC_AND_MAGNITUDES)
            .step("first tag search")?;
        if !tag.any_pass() {
            return Err(ReaderFault::NoPassingChannel).step("first tag search");
        }
        self.send_message(&format!("FreqSlot1: {:3}", slot));
        self.push_report(&tag, &cal, slot, FIRST_OBSERVATION, true)?;

        let mut second = None;
        for (attempt, channel) in pdoa_candidates(slot, self.config.skip_offset)
            .into_iter()
            .enumerate()
        {
            self.radio.set_frequency(channel).step("tuning skip channel")?;
            self.send_message(&format!("Cal2Srch: {:3}", channel));
            let cal = self
                .search(Session::S0, SearchTarget::Calibration, ReadFields::MAGNITUDES)
                .step("second calibration search")?;
            if !cal.any_pass() {
                continue;
            }
            self.send_message(&format!("Ant2Srch: {:3}", channel));
            let tag = self
                .search(Session::S0, target, ReadFields::EPC_AND_MAGNITUDES)
                .step("second tag search")?;
            if tag.any_pass() {
                second = Some((attempt, channel, tag, cal));
                break;
            }
        }

        match second {
            Some((attempt, channel, tag, cal)) => {
                info!("pdoa pair at channels {} and {}", slot, channel);
                self.send_message(&format!("FreqSlot2: {:3}", channel));
                self.push_report(&tag, &cal, channel, attempt as u8, true)
            }
            None => {
                self.send_message("PDOA srch2 fail");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TEST_PLL_CHECK, TX_REGION_SELECT_1, USER_REG_TEST};
    use crate::test_support::{configured_reader, tag_reply};
    use crate::transport::{HostField, RadioReply};

    #[test]
    fn search_reads_requested_fields_on_pass() {
        let (radio, host, mut reader) = configured_reader();
        radio.push_replies([tag_reply(0x42, 900, -5), RadioReply::Silent]);
        let res = reader
            .search(Session::S0, SearchTarget::AppSpecified, ReadFields::EPC_AND_MAGNITUDES)
            .unwrap();
        assert!(res.i.pass);
        assert!(!res.q.pass);
        assert_eq!(res.i.epc, [0x42; 12]);
        assert_eq!((res.i.main_mag, res.i.alt_mag), (900, -5));
        assert_eq!(res.i.lna_gain, 0xD4);
        let messages = host.messages();
        assert!(messages.contains(&"Search I Pass".to_string()));
        assert!(messages.contains(&"Search Q Fail".to_string()));
        assert!(!radio.model().pa_on);
    }

    #[test]
    fn search_select_carries_full_app_mask() {
        let (radio, _host, mut reader) = configured_reader();
        reader.ctx.app_epc = Epc::overlay([0xEE; 12], &[0x01]);
        reader
            .search(Session::S0, SearchTarget::AppSpecified, ReadFields::NONE)
            .unwrap();
        let expected = TxCommand::Select {
            slot: SelectSlot::First,
            target: PacketParams::single_tag(Session::S0).select_target,
            action: SelectAction::A0,
            mask: Epc::from_bytes(*reader.ctx.app_epc.padded()),
        }
        .encode()
        .unwrap()
        .to_region_bytes();
        let m = radio.model();
        assert_eq!(&m.tx_region(TX_REGION_SELECT_1)[..expected.len()], &expected[..]);
    }

    #[test]
    fn pll_check_always_passes_and_is_cleared() {
        let (radio, _host, mut reader) = configured_reader();
        radio.push_replies([RadioReply::Silent, RadioReply::Silent]);
        let res = reader
            .search(Session::S0, SearchTarget::PllCheck, ReadFields::NONE)
            .unwrap();
        assert!(res.i.pass && res.q.pass);
        let m = radio.model();
        assert_eq!(m.user[usize::from(USER_REG_TEST)] & TEST_PLL_CHECK, 0);
        assert_eq!(m.replies.len(), 2);
    }

    #[test]
    fn pll_check_reports_blank_epc() {
        let (radio, _host, mut reader) = configured_reader();
        radio.push_replies([tag_reply(0x42, 900, 5), tag_reply(0x42, 900, 5)]);
        let res = reader
            .search(Session::S0, SearchTarget::AppSpecified, ReadFields::EPC_AND_MAGNITUDES)
            .unwrap();
        assert_eq!(res.q.epc, [0x42; 12]);

        let res = reader
            .search(Session::S0, SearchTarget::PllCheck, ReadFields::EPC_AND_MAGNITUDES)
            .unwrap();
        assert!(res.i.pass && res.q.pass);
        assert_eq!(res.i.epc, [0; 12]);
        assert_eq!(res.q.epc, [0; 12]);
        assert_eq!(res.i.main_mag, 900);
    }

    #[test]
    fn pdoa_reports_both_observations() {
        let (radio, host, mut reader) = configured_reader();
        // hop lands on 19: cal, tag, then the first skip channel (22).
        radio.push_replies([
            tag_reply(0x00, 10, 1),
            RadioReply::Silent,
            tag_reply(0x42, 20, 2),
            RadioReply::Silent,
            tag_reply(0x00, 30, 3),
            RadioReply::Silent,
            tag_reply(0x42, 40, 4),
            RadioReply::Silent,
        ]);
        reader.pdoa_search(SearchTarget::AppSpecified).unwrap();

        let primary = host.pushed(HostField::PrimaryData);
        let supplement = host.pushed(HostField::SupplementData);
        assert_eq!(primary.len(), 2);
        assert_eq!(supplement.len(), 2);
        assert_eq!(primary[0][12] & 0x7F, 19);
        assert_eq!(primary[1][12] & 0x7F, 22);
        assert_eq!(supplement[0][12], 255);
        assert_eq!(supplement[1][12], 0);
        assert_eq!(supplement[1][14], reader.context().nonce);
        let messages = host.messages();
        assert!(messages.contains(&"FreqSlot1:  19".to_string()));
        assert!(messages.contains(&"FreqSlot2:  22".to_string()));
    }

    #[test]
    fn pdoa_without_second_pair_reports_once() {
        let (radio, host, mut reader) = configured_reader();
        radio.push_replies([
            tag_reply(0x00, 10, 1),
            RadioReply::Silent,
            tag_reply(0x42, 20, 2),
            RadioReply::Silent,
        ]);
        reader.pdoa_search(SearchTarget::LastInventoried).unwrap();
        assert_eq!(host.pushed(HostField::PrimaryData).len(), 1);
        assert_eq!(host.messages().last().unwrap(), "PDOA srch2 fail");
    }

    #[test]
    fn pdoa_needs_calibration_tag() {
        let (_radio, _host, mut reader) = configured_reader();
        let err = reader.pdoa_search(SearchTarget::AppSpecified).unwrap_err();
        assert!(matches!(err.root(), ReaderFault::NoPassingChannel));
        assert_eq!(err.step_name(), Some("first calibration search"));
    }
}
