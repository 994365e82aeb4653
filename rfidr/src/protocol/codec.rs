// rfidr-rs/rfidr/src/protocol/codec.rs
//! Host link payloads: tag report packets and chunked log messages.

use crate::constants::{
    LOG_CHUNK_LEN, LOG_MESSAGE_MAX_LEN, MAX_EPC_LEN, NO_CHANNEL,
    PRIMARY_PACKET_LEN, SUPPLEMENT_PACKET_LEN,
};
use crate::types::{Channel, TagReadResult};

/// The magnitude pair reported for a channel choice, as (I, Q).
///
/// The main integrator follows the chosen channel; the alternate integrator
/// sees the other one.
fn reported_magnitudes(result: &TagReadResult, choice: Option<Channel>) -> (u32, u32) {
    match choice {
        Some(Channel::I) => (result.i.main_mag as u32, result.i.alt_mag as u32),
        Some(Channel::Q) => (result.q.alt_mag as u32, result.q.main_mag as u32),
        None => (0, 0),
    }
}

fn choice_code(choice: Option<Channel>) -> u8 {
    match choice {
        Some(Channel::I) => 1,
        Some(Channel::Q) => 0,
        None => NO_CHANNEL,
    }
}

/// Primary packet: EPC, frequency slot, upper three bytes of both
/// magnitudes and a rolling data id.
///
/// ```text
/// [0..12]  EPC of the reported channel
/// [12]     slot (7 bits) | supplement follows (bit 7)
/// [13..16] I magnitude bits 31..8
/// [16..19] Q magnitude bits 31..8
/// [19]     data id
/// ```
pub fn encode_primary(
    result: &TagReadResult,
    slot: u8,
    supplement: bool,
    data_id: u8,
) -> [u8; PRIMARY_PACKET_LEN] {
    let mut out = [0u8; PRIMARY_PACKET_LEN];
    let choice = result.reported_channel();
    if let Some(ch) = choice {
        out[..MAX_EPC_LEN].copy_from_slice(&result.channel(ch).epc);
    }
    out[MAX_EPC_LEN] = (slot & 0x7F) | (u8::from(supplement) << 7);
    let (i_mag, q_mag) = reported_magnitudes(result, choice);
    out[13..16].copy_from_slice(&i_mag.to_be_bytes()[..3]);
    out[16..19].copy_from_slice(&q_mag.to_be_bytes()[..3]);
    out[19] = data_id;
    out
}

/// Supplement packet: channel choices, magnitude low bytes, calibration tag
/// magnitudes, pass bits and the hop/skip nonce.
///
/// ```text
/// [0]      tag channel choice (1 = I, 0 = Q, 255 = none)
/// [1..3]   I / Q magnitude bits 7..0
/// [3]      calibration channel choice
/// [4..8]   calibration I magnitude, big-endian
/// [8..12]  calibration Q magnitude, big-endian
/// [12]     failed runs, 255 on a first observation
/// [13]     cal I pass | cal Q pass | tag I pass | tag Q pass
/// [14]     hop/skip nonce
/// [15]     data id
/// ```
pub fn encode_supplement(
    tag: &TagReadResult,
    cal: &TagReadResult,
    failed_runs: u8,
    nonce: u8,
    data_id: u8,
) -> [u8; SUPPLEMENT_PACKET_LEN] {
    let mut out = [0u8; SUPPLEMENT_PACKET_LEN];
    let tag_choice = tag.reported_channel();
    let cal_choice = cal.reported_channel();
    let (i_mag, q_mag) = reported_magnitudes(tag, tag_choice);
    let (cal_i, cal_q) = reported_magnitudes(cal, cal_choice);

    out[0] = choice_code(tag_choice);
    out[1] = i_mag.to_be_bytes()[3];
    out[2] = q_mag.to_be_bytes()[3];
    out[3] = choice_code(cal_choice);
    out[4..8].copy_from_slice(&cal_i.to_be_bytes());
    out[8..12].copy_from_slice(&cal_q.to_be_bytes());
    out[12] = failed_runs;
    out[13] = (u8::from(cal.i.pass) << 3)
        | (u8::from(cal.q.pass) << 2)
        | (u8::from(tag.i.pass) << 1)
        | u8::from(tag.q.pass);
    out[14] = nonce;
    out[15] = data_id;
    out
}

/// Split a log message into link-sized chunks. The message is truncated to
/// its maximum length and terminated with a NUL, which always travels in
/// the final chunk.
pub fn log_chunks(message: &str) -> Vec<Vec<u8>> {
    let mut bytes: Vec<u8> = message
        .bytes()
        .take_while(|b| *b != 0)
        .take(LOG_MESSAGE_MAX_LEN)
        .collect();
    bytes.push(0);
    bytes.chunks(LOG_CHUNK_LEN).map(<[u8]>::to_vec).collect()
}

/// The two notices sent once the link recovers after dropped chunks.
pub fn recovery_notice(failed_attempts: u32) -> [Vec<u8>; 2] {
    let mut first = b"Rcvrd. BT ops after".to_vec();
    first.resize(LOG_CHUNK_LEN, 0);
    let mut second = format!("{:010} tries", failed_attempts).into_bytes();
    second.push(0);
    [first, second]
}
