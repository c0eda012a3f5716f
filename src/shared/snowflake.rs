//! Snowflake ID Generator
//!
//! Time-ordered 63-bit identifiers for users and messages.
//!
//! Layout: 41 bits of milliseconds since [`CHAT_EPOCH_MS`], 10 bits of
//! machine id, 12 bits of per-millisecond sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// 2024-01-01T00:00:00.000Z
pub const CHAT_EPOCH_MS: u64 = 1_704_067_200_000;

const MACHINE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
/// Largest machine id that fits in the id layout.
pub const MAX_MACHINE_ID: u16 = (1 << MACHINE_BITS) - 1;

/// Snowflake ID generator
///
/// Lock-free: the last issued (timestamp, sequence) pair lives in one atomic.
/// When a millisecond's sequence space is exhausted, ids borrow the next
/// millisecond instead of waiting, so ids stay strictly increasing.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    machine_id: u64,
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator. Machine ids wrap to 10 bits.
    pub fn new(machine_id: u16) -> Self {
        Self {
            machine_id: u64::from(machine_id & MAX_MACHINE_ID),
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let now = current_offset_ms();
        let mut prev = self.state.load(Ordering::Acquire);
        loop {
            let prev_ts = prev >> SEQUENCE_BITS;
            let prev_seq = prev & MAX_SEQUENCE;

            let (ts, seq) = if now > prev_ts {
                (now, 0)
            } else if prev_seq < MAX_SEQUENCE {
                (prev_ts, prev_seq + 1)
            } else {
                (prev_ts + 1, 0)
            };

            let next = (ts << SEQUENCE_BITS) | seq;
            match self
                .state
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let id = (ts << (MACHINE_BITS + SEQUENCE_BITS))
                        | (self.machine_id << SEQUENCE_BITS)
                        | seq;
                    return id as i64;
                }
                Err(actual) => prev = actual,
            }
        }
    }
}

fn current_offset_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(CHAT_EPOCH_MS);
    now.saturating_sub(CHAT_EPOCH_MS)
}

/// Extract the Unix timestamp in milliseconds from a snowflake ID
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> (MACHINE_BITS + SEQUENCE_BITS)) + CHAT_EPOCH_MS
}
