// rfidr-rs/rfidr/src/constants.rs
//! Protocol constants shared across the crate: peripheral memory map,
//! control register bits, RAM layouts and host link payload sizes.

/// Longest EPC the reader selects on, reads or programs (96 bits).
pub const MAX_EPC_LEN: usize = 12;

/// Size of one peripheral transaction in bytes.
pub const TRANSACTION_LEN: usize = 4;

// Transaction selector bits, before the final `<< 9` shift.
pub const SEL_WRITE_BIT: u32 = 1 << 22;
pub const SEL_WAVEFORM_BIT: u32 = 1 << 21;
pub const SEL_RADIO_BIT: u32 = 1 << 20;
pub const SEL_USER_BIT: u32 = 1 << 18;
pub const SEL_RX_HALF_BIT: u32 = 1 << 17;
pub const SEL_ADDR_SHIFT: u32 = 8;
pub const SEL_FINAL_SHIFT: u32 = 9;

/// Address widths per memory space.
pub const WAVEFORM_ADDR_BITS: u32 = 13;
pub const RADIO_ADDR_BITS: u32 = 9;
pub const USER_ADDR_BITS: u32 = 3;

/// Attempts made by a verified write before giving up.
pub const WRITE_VERIFY_ATTEMPTS: usize = 3;

// User (control) register addresses.
pub const USER_REG_CONTROL: u8 = 0;
pub const USER_REG_LOOP: u8 = 1;
pub const USER_REG_STATUS: u8 = 2;
pub const USER_REG_WAVEFORM_OFFSET: u8 = 3;
pub const USER_REG_BRIDGE_ADDR: u8 = 4;
/// Written with the bridge payload, read back with the bridge return value.
pub const USER_REG_BRIDGE_DATA: u8 = 5;
pub const USER_REG_TEST: u8 = 6;
pub const USER_REG_TX_OFFSET: u8 = 7;

// Register 0, write side.
pub const CTRL_GO_RADIO: u8 = 1 << 0;
pub const CTRL_IRQ_ACK: u8 = 1 << 1;
// Register 0, read side.
pub const CTRL_CLK36_RUNNING: u8 = 1 << 0;
pub const CTRL_CLK36_VALID: u8 = 1 << 1;
// Register 0, both sides.
pub const CTRL_MODE_SHIFT: u8 = 2;
pub const CTRL_MODE_MASK: u8 = 0x0C;
pub const CTRL_USE_I: u8 = 1 << 4;
pub const CTRL_EXIT_SHIFT: u8 = 5;
/// Bits kept by a read-modify-write of register 0 (everything but the
/// clock status bits).
pub const CTRL_KEEP_MASK: u8 = 0xFC;

// Register 1.
pub const LOOP_END_FSM: u8 = 1 << 4;
pub const LOOP_ALT_FSM: u8 = 1 << 5;
pub const LOOP_USE_SELECT: u8 = 1 << 6;

// Register 2, write side.
pub const STATUS_BRIDGE_GO: u8 = 2;
pub const STATUS_CLK36_ONESHOT: u8 = 1 << 7;
// Register 2, read side.
pub const STATUS_WRITE_COUNTER_MASK: u8 = 0x07;
pub const STATUS_BRIDGE_DONE: u8 = 1 << 5;
pub const STATUS_BRIDGE_PENDING: u8 = 1 << 6;

// Register 6.
pub const TEST_DTC_MODE: u8 = 1 << 3;
pub const TEST_PLL_CHECK: u8 = 1 << 4;
pub const TEST_USE_KILL: u8 = 1 << 5;
/// Bits kept when entering or leaving DTC test mode.
pub const TEST_STICKY_MASK: u8 = 0xF0;

// SDR register bridge.
pub const BRIDGE_WRITE_FLAG: u8 = 0x80;
pub const BRIDGE_ADDR_MASK: u8 = 0x7F;
/// Status polls tolerated before a bridge phase is declared timed out.
pub const BRIDGE_POLL_LIMIT: usize = 3;
pub const BRIDGE_ATTEMPTS: usize = 3;

// RX RAM: one 16-byte region per reply kind. Byte 0 of each region holds
// the number of reply bits the peripheral should capture.
pub const RX_REGION_SHIFT: u16 = 4;
pub const RX_REGION_RN16: u16 = 0;
pub const RX_REGION_RN16_INITIAL: u16 = 1;
pub const RX_REGION_HANDLE: u16 = 2;
pub const RX_REGION_WRITE: u16 = 3;
pub const RX_REGION_LOCK: u16 = 4;
pub const RX_REGION_READ: u16 = 5;
pub const RX_REGION_PCEPC: u16 = 7;

pub const RX_BITS_RN16: u8 = 32;
pub const RX_BITS_RN16_INITIAL: u8 = 16;
pub const RX_BITS_HANDLE: u8 = 32;
pub const RX_BITS_WRITE: u8 = 41;
pub const RX_BITS_LOCK: u8 = 41;
pub const RX_BITS_READ: u8 = 129;
pub const RX_BITS_PCEPC: u8 = 128;

/// Offset of the EPC inside the PC+EPC region (after the bit count and PC).
pub const PCEPC_EPC_OFFSET: u16 = 3;
/// Offsets of the little-endian magnitudes inside the PC+EPC region.
pub const PCEPC_MAIN_MAG_OFFSET: u16 = 18;
pub const PCEPC_ALT_MAG_OFFSET: u16 = 22;
/// Offset of the first captured bit of a read reply.
pub const READ_DATA_OFFSET: u16 = 1;

// TX RAM: one 32-byte region per packet kind. Byte 0 holds the packet
// length in bits, byte 1 holds region flags, the packet follows MSB first.
pub const TX_REGION_SHIFT: u16 = 5;
pub const TX_REGION_SELECT_1: u16 = 0;
pub const TX_REGION_SELECT_2: u16 = 1;
pub const TX_REGION_QUERY: u16 = 2;
/// Shared by query-rep and query-adjust.
pub const TX_REGION_QUERY_REP: u16 = 3;
pub const TX_REGION_REQ_RN: u16 = 4;
/// Shared by EPC writes, kill password writes and kill commands.
pub const TX_REGION_WRITE: u16 = 5;
pub const TX_REGION_READ: u16 = 6;
pub const TX_REGION_LEN: usize = 32;
pub const TX_HEADER_LEN: usize = 2;
/// Swap the query target flag after this query.
pub const TX_FLAG_SWAP: u8 = 1 << 7;
/// Send this packet once, then fall back to a plain query-rep.
pub const TX_FLAG_ONE_SHOT: u8 = 1 << 6;

// Air protocol command codes.
pub const CMD_QUERY_REP: u8 = 0b00;
pub const CMD_QUERY: u8 = 0b1000;
pub const CMD_QUERY_ADJUST: u8 = 0b1001;
pub const CMD_SELECT: u8 = 0b1010;
pub const CMD_REQ_RN: u8 = 0xC1;
pub const CMD_READ: u8 = 0xC2;
pub const CMD_WRITE: u8 = 0xC3;
pub const CMD_KILL: u8 = 0xC4;

pub const MEMBANK_RESERVED: u8 = 0b00;
pub const MEMBANK_EPC: u8 = 0b01;
/// Bit pointer of the EPC inside the EPC bank (after CRC and PC).
pub const SELECT_EPC_POINTER: u8 = 0x20;
/// Word pointer of the EPC inside the EPC bank.
pub const EPC_WORD_POINTER: u8 = 2;
pub const KILL_PASSWORD_WORD_POINTER: u8 = 0;

/// Default receiver gain: the lowest useful LNA setting.
pub const LNA_GAIN_LOW: u8 = 0xD4;
pub const LNA_GAIN_MEDIUM: u8 = 0x94;
pub const LNA_GAIN_HIGH: u8 = 0x34;

// SDR register addresses.
pub const SDR_REG_MODE: u8 = 0x00;
pub const SDR_REG_RX_FREQ: u8 = 0x01;
pub const SDR_REG_TX_FREQ: u8 = 0x04;
pub const SDR_REG_TX_GAIN: u8 = 0x08;
pub const SDR_REG_TX_BW: u8 = 0x0A;
pub const SDR_REG_TX_DAC_BW: u8 = 0x0B;
pub const SDR_REG_RX_ANA_GAIN: u8 = 0x0C;
pub const SDR_REG_RX_BW: u8 = 0x0D;
pub const SDR_REG_RX_PLL_BW: u8 = 0x0E;
pub const SDR_REG_CLK_SELECT: u8 = 0x10;
pub const SDR_REG_PLL_LOCK: u8 = 0x11;

pub const TX_GAIN_LOW: u8 = 0x34;
pub const TX_GAIN_MEDIUM: u8 = 0x34;
pub const TX_GAIN_HIGH: u8 = 0x36;

/// Number of hop channels.
pub const CHANNEL_COUNT: u8 = 25;
/// Additive hop step; coprime with `CHANNEL_COUNT`.
pub const HOP_STEP: u8 = 7;
/// Power-on channel (915 MHz).
pub const DEFAULT_CHANNEL: u8 = 12;
pub const FREQUENCY_CODE_BASE: u32 = 0x00CB_5555;

/// SDR frequency codes, one per channel, roughly 1 MHz apart.
pub const FREQUENCY_TABLE: [u32; CHANNEL_COUNT as usize] = [
    FREQUENCY_CODE_BASE - 0x0002_AAAA,
    FREQUENCY_CODE_BASE - 0x0002_71C7,
    FREQUENCY_CODE_BASE - 0x0002_38E3,
    FREQUENCY_CODE_BASE - 0x0002_0000,
    FREQUENCY_CODE_BASE - 0x0001_C71C,
    FREQUENCY_CODE_BASE - 0x0001_8E38,
    FREQUENCY_CODE_BASE - 0x0001_5555,
    FREQUENCY_CODE_BASE - 0x0001_1C71,
    FREQUENCY_CODE_BASE - 0x0000_E38E,
    FREQUENCY_CODE_BASE - 0x0000_AAAA,
    FREQUENCY_CODE_BASE - 0x0000_71C7,
    FREQUENCY_CODE_BASE - 0x0000_38E3,
    FREQUENCY_CODE_BASE,
    FREQUENCY_CODE_BASE + 0x0000_38E3,
    FREQUENCY_CODE_BASE + 0x0000_71C7,
    FREQUENCY_CODE_BASE + 0x0000_AAAA,
    FREQUENCY_CODE_BASE + 0x0000_E38E,
    FREQUENCY_CODE_BASE + 0x0001_1C71,
    FREQUENCY_CODE_BASE + 0x0001_5555,
    FREQUENCY_CODE_BASE + 0x0001_8E38,
    FREQUENCY_CODE_BASE + 0x0001_C71C,
    FREQUENCY_CODE_BASE + 0x0002_0000,
    FREQUENCY_CODE_BASE + 0x0002_38E3,
    FREQUENCY_CODE_BASE + 0x0002_71C7,
    FREQUENCY_CODE_BASE + 0x0002_AAAA,
];

/// Channel offset between the two observations of a PDOA pair.
pub const SKIP_OFFSET: u8 = 3;

// TX offset calibration.
/// Each offset is a 4-bit value.
pub const OFFSET_STEPS: u8 = 16;
/// Sample value no real conversion reaches.
pub const NO_SAMPLE: u16 = 9999;
pub const BRUTE_FORCE_FALLBACK: (u8, u8) = (8, 8);
pub const GRADIENT_START: (u8, u8) = (10, 10);
pub const GRADIENT_MAX_ITERATIONS: usize = 96;

// Bulk rounds.
/// Rounds taken from a query-size schedule at most.
pub const INVENTORY_ROUND_LIMIT: usize = 36;
pub const INVENTORY_MAX_Q: u8 = 6;
pub const TRACKING_MAX_Q: u8 = 5;
/// Rounds per tracking pass, before the next hop or skip.
pub const TRACKING_ROUND_LIMIT: usize = 16;

// Retry bounds.
pub const TRACK_CAL_OUTER_RETRIES: usize = 3;
pub const TRACK_CAL_INNER_RETRIES: usize = 5;
/// Program runs retried in place before the loop is ended.
pub const PROGRAM_RETRIES: usize = 5;

/// Waveform capture memory depth.
pub const WAVEFORM_DEPTH: u16 = 8192;

// Host link payload sizes.
pub const PRIMARY_PACKET_LEN: usize = 20;
pub const SUPPLEMENT_PACKET_LEN: usize = 16;
pub const LOG_CHUNK_LEN: usize = 20;
pub const WAVEFORM_CHUNK_LEN: usize = 20;
/// Longest diagnostic message sent; longer text is truncated.
pub const LOG_MESSAGE_MAX_LEN: usize = 240;

/// Marker carried in place of a failed-run count on a first observation.
pub const FIRST_OBSERVATION: u8 = 255;
/// Channel choice reported when neither I nor Q passed.
pub const NO_CHANNEL: u8 = 255;

// Host-supplied EPCs shorter than 12 bytes keep the tail of this pattern.
pub const HOST_EPC_FILL: [u8; MAX_EPC_LEN] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x89, 0xAB, 0xCD, 0xEF,
];
