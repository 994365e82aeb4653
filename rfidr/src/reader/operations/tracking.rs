// rfidr-rs/rfidr/src/reader/operations/tracking.rs
//! Continuous tracking: alternate hop and skip channels, calibrate on each,
//! and run short inventories of the tracked population until the host
//! toggles tracking off.

use log::{info, warn};

use crate::constants::{FIRST_OBSERVATION, TRACKING_MAX_Q, TRACKING_ROUND_LIMIT};
use crate::device::skip_channel;
use crate::error::StepExt;
use crate::protocol::{SelectSlot, TxCommand};
use crate::reader::operations::query_sizes;
use crate::reader::Reader;
use crate::types::{
    Channel, Epc, PacketParams, RadioMode, ReadFields, SearchTarget, SelectAction, SelectTarget,
    Session, TagReadResult,
};
use crate::{ReaderFault, Result};

/// Round sizes for tracking a population, and how many finds flip the
/// inventoried flag the queries target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingSchedule {
    pub rounds: &'static str,
    pub flip_limit: usize,
}

/// Schedule for a population of `tags`. `None` when there is nothing to
/// track.
pub fn tracking_schedule(tags: usize) -> Option<TrackingSchedule> {
    let (rounds, flip_limit) = match tags {
        0 => return None,
        1 => ("0000000000000000", 1),
        2 => ("3211111111111111", 2),
        3..=4 => ("33222222", 3),
        5..=8 => ("4433", 7),
        9..=16 => ("55", 14),
        _ => ("6", 30),
    };
    Some(TrackingSchedule { rounds, flip_limit })
}

/// Where one tracking pass took its calibration reading.
struct Calibrated {
    cal: TagReadResult,
    slot: u8,
    failed_runs: u8,
}

struct TrackingRun {
    schedule: TrackingSchedule,
    mask: Epc,
    /// Next pass uses a skip channel instead of hopping.
    skip: bool,
    hop_slot: u8,
    since_flip: usize,
    total: u32,
}

impl Reader {
    /// The tracking states: size the population, then loop until the
    /// tracking flag is cleared.
    pub(crate) fn track(&mut self, target: SearchTarget) -> Result<()> {
        self.radio.board().select_antenna(0).step("selecting antenna")?;
        let (schedule, mask) = match target {
            SearchTarget::LastInventoried => (
                tracking_schedule(1),
                Epc::from_bytes(*self.ctx.last_inventoried.padded()),
            ),
            _ => {
                let session = self.config.tracking.inventory_session;
                let max_tags = self.config.tracking.inventory_max_tags;
                let rounds = self.config.inventory.schedule.clone();
                let found = self
                    .inventory_core(session, &rounds, max_tags, &Epc::ZERO)
                    .step("sizing tracked population")?;
                (tracking_schedule(found), self.ctx.app_epc)
            }
        };
        let schedule = match schedule {
            Some(s) => s,
            None => return Err(ReaderFault::NoTagsFound).step("sizing tracked population"),
        };

        let mut run = TrackingRun {
            schedule,
            mask,
            skip: false,
            hop_slot: self.radio.channel(),
            since_flip: 0,
            total: 0,
        };
        let mut loops: u8 = 0;
        while self.ctx.tracking {
            self.send_message(&format!("NumTrackLoop-{:03}", loops));
            loops = loops.wrapping_add(1);
            if let Err(fault) = self.tracking_pass(&mut run) {
                if let Err(e) = self.end_inventory() {
                    warn!("tracking loop not closed: {}", e);
                }
                return Err(fault);
            }
            self.poll_host();
        }

        info!("tracking stopped after {} tags", run.total);
        self.send_message(&format!("Fnd {:08} Tags", run.total & 0x00FF_FFFF));
        Ok(())
    }

    /// Find the calibration tag, hopping or skipping as the run alternates.
    fn tracking_calibration(&mut self, run: &mut TrackingRun) -> Result<Calibrated> {
        let outer_retries = self.config.tracking.cal_outer_retries;
        let inner_retries = self.config.tracking.cal_inner_retries;
        for outer in 0..outer_retries {
            let slot = if run.skip {
                let channel = skip_channel(run.hop_slot, self.config.skip_offset, outer);
                self.radio.set_frequency(channel).step("tuning skip channel")?;
                channel
            } else {
                let channel = self.hop()?;
                run.hop_slot = channel;
                channel
            };
            for inner in 0..inner_retries {
                let cal = self
                    .search(Session::S0, SearchTarget::Calibration, ReadFields::MAGNITUDES)
                    .step("tracking calibration search")?;
                if cal.any_pass() {
                    let failed_runs = if run.skip {
                        outer as u8
                    } else {
                        FIRST_OBSERVATION
                    };
                    return Ok(Calibrated {
                        cal,
                        slot,
                        failed_runs,
                    });
                }
                self.send_message(&format!("TrackCalFailInner{}", inner));
            }
            self.send_message(&format!("TrackCalFailOuter{}", outer));
        }
        Err(ReaderFault::CalibrationExhausted)
    }

    fn tracking_pass(&mut self, run: &mut TrackingRun) -> Result<()> {
        let calibrated = self.tracking_calibration(run)?;
        run.skip = !run.skip;

        let session = self.config.tracking.session;
        let mut params = PacketParams::bulk(session);
        params.q = 0;
        self.radio
            .load_tx(&TxCommand::Query {
                params,
                flag_swap: false,
            })
            .step("loading query")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::First,
                target: params.select_target,
                action: SelectAction::A0,
                mask: run.mask,
            })
            .step("loading select packet 1")?;
        self.radio
            .load_tx(&TxCommand::Select {
                slot: SelectSlot::Second,
                target: SelectTarget::Sl,
                action: SelectAction::A0,
                mask: run.mask,
            })
            .step("loading select packet 2")?;
        self.radio.set_mode(RadioMode::Inventory).step("setting inventory mode")?;
        self.radio
            .load_tx(&TxCommand::QueryRep { session })
            .step("loading query rep")?;
        self.radio.set_use_select().step("setting select")?;
        self.radio.set_lna_gain(self.config.lna_gain).step("setting LNA gain")?;

        let rounds: Vec<u8> =
            query_sizes(run.schedule.rounds, TRACKING_ROUND_LIMIT, TRACKING_MAX_Q).collect();
        for q in rounds {
            params.q = q;
            self.radio.board().set_pa(true).step("enabling amplifier")?;
            for channel in Channel::BOTH {
                self.radio.use_channel(channel).step("selecting channel")?;
                self.radio
                    .load_tx(&TxCommand::Query {
                        params,
                        flag_swap: true,
                    })
                    .step("loading query")?;
                self.radio.set_alt_loop().step("setting alt loop")?;
                for _ in 0..=(1usize << q) {
                    if self.radio.run_once().step("running tracking inventory")? == 0 {
                        run.since_flip += 1;
                        run.total = run.total.wrapping_add(1);
                        let tag = self.read_tag(channel)?;
                        self.push_report(
                            &tag,
                            &calibrated.cal,
                            calibrated.slot,
                            calibrated.failed_runs,
                            true,
                        )?;
                    }
                }
                if run.since_flip >= run.schedule.flip_limit {
                    run.since_flip = 0;
                    params.query_target = params.query_target.flipped();
                }
            }
            self.radio.board().set_pa(false).step("disabling amplifier")?;
        }
        self.end_inventory().step("ending tracking inventory")
    }
}
