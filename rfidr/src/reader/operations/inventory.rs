// rfidr-rs/rfidr/src/reader/operations/inventory.rs
//! Bulk inventory: rounds of slotted queries sized by a schedule string.

use log::{info, warn};

use crate::constants::{FIRST_OBSERVATION, INVENTORY_MAX_Q};
use crate::error::StepExt;
use crate::protocol::{SelectSlot, TxCommand};
use crate::reader::operations::query_sizes;
use crate::reader::Reader;
use crate::types::{Channel, Epc, PacketParams, RadioMode, SelectAction, SelectTarget, Session};
use crate::{ReaderFault, Result};

impl Reader {
    /// The inventory state: one bulk inventory with the configured session,
    /// schedule, tag limit and filter.
    pub(crate) fn inventory(&mut self) -> Result<()> {
        let cfg = self.config.inventory.clone();
        self.inventory_core(cfg.session, &cfg.schedule, cfg.max_tags, &cfg.filter)
            .map(|_| ())
    }

    /// Inventory the population selected by the app EPC and `filter`.
    /// Every decoded tag is reported; returns how many were found.
    pub fn inventory_core(
        &mut self,
        session: Session,
        schedule: &str,
        max_tags: usize,
        filter: &Epc,
    ) -> Result<usize> {
        self.ctx.inventory_count = 0;
        if let Err(fault) = self.inventory_rounds(session, schedule, max_tags, filter) {
            if let Err(e) = self.end_inventory() {
                warn!("inventory loop not closed: {}", e);
            }
            return Err(fault);
        }
        self.end_inventory().step("ending inventory")?;

        let found = self.ctx.inventory_count;
        info!("inventory found {} tags", found);
        self.send_message(&format!("InventryFnd {:03}Tags", found & 0xFF));
        Ok(found)
    }

    fn inventory_rounds(
        &mut self,
        session: Session,
        schedule: &str,
        max_tags: usize,
        filter: &Epc,
    ) -> Result<()> {
        let mut params = PacketParams::bulk(session);
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::First,
                target: params.select_target,
                action: SelectAction::A0,
                mask: self.ctx.app_epc,
            })
            .step("loading select packet 1")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::Second,
                target: SelectTarget::Sl,
                action: SelectAction::A0,
                mask: *filter,
            })
            .step("loading select packet 2")?;
        self.radio.set_mode(RadioMode::Inventory).step("setting inventory mode")?;
        self.radio
            .load_tx(&TxCommand::QueryAdjust { session, up: true })
            .step("loading query adjust")?;
        let mut adjust_pending = true;
        self.radio.set_use_select().step("setting select")?;
        self.radio.set_lna_gain(self.config.lna_gain).step("setting LNA gain")?;

        let rounds: Vec<u8> =
            query_sizes(schedule, self.config.inventory.round_limit, INVENTORY_MAX_Q).collect();
        for q in rounds {
            params.q = q;
            let slot = self.hop()?;
            self.radio
                .load_tx(&TxCommand::Query {
                    params,
                    flag_swap: false,
                })
                .step("loading query")?;
            self.radio.board().set_pa(true).step("enabling amplifier")?;
            for channel in Channel::BOTH {
                self.radio.use_channel(channel).step("selecting channel")?;
                self.radio.set_alt_loop().step("setting alt loop")?;
                for iteration in 0..=(1usize << q) {
                    let exit = self.radio.run_once().step("running inventory")?;
                    if exit == 0 {
                        self.ctx.inventory_count += 1;
                        if self.ctx.inventory_count > max_tags {
                            return Err(ReaderFault::TooManyTags { max: max_tags });
                        }
                        let tag = self.read_tag(channel)?;
                        self.ctx.last_inventoried = Epc::from_bytes(tag.channel(channel).epc);
                        self.push_report(&tag, &tag, slot, FIRST_OBSERVATION, true)?;
                    }
                    if adjust_pending && iteration > 0 {
                        self.radio
                            .load_tx(&TxCommand::QueryRep { session })
                            .step("loading query rep")?;
                        adjust_pending = false;
                    }
                }
            }
            self.radio.board().set_pa(false).step("disabling amplifier")?;
        }
        Ok(())
    }
}
