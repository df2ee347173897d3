//! Per-symbol signal cooldown.
//!
//! One signal per symbol per candle bucket: once a symbol emits, further
//! attempts are rejected until a full bucket width has elapsed since the
//! recorded emission. State is held in a [`DashMap`] so concurrent
//! generators for different symbols never contend, and the check-and-set
//! for a single symbol is atomic under its shard lock.

use dashmap::DashMap;

use crate::services::scheduler::BUCKET_SECONDS;

#[derive(Debug, Default)]
pub struct DebounceGate {
    last_emitted: DashMap<String, i64>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to claim an emission slot for `symbol` at `now`.
    ///
    /// On success the emission time is recorded and `Ok(())` returned.
    /// Inside the cooldown window the claim fails with the remaining
    /// seconds; state is recorded at claim time, not delivery time, so a
    /// later delivery failure still burns the slot.
    pub fn acquire(&self, symbol: &str, now: i64) -> Result<(), i64> {
        match self.last_emitted.entry(symbol.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                let elapsed = now - *occupied.get();
                if elapsed < BUCKET_SECONDS {
                    Err(BUCKET_SECONDS - elapsed)
                } else {
                    occupied.insert(now);
                    Ok(())
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(now);
                Ok(())
            }
        }
    }

    /// Remaining cooldown for `symbol` at `now`, if any.
    pub fn remaining(&self, symbol: &str, now: i64) -> Option<i64> {
        self.last_emitted.get(symbol).and_then(|last| {
            let elapsed = now - *last;
            if elapsed < BUCKET_SECONDS {
                Some(BUCKET_SECONDS - elapsed)
            } else {
                None
            }
        })
    }
}
