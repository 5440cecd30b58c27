//! Local budget for outbound calls.
//!
//! A token bucket sized to the remote hourly quota. Tokens refill
//! continuously at `capacity` per hour, so a caller arriving half-way
//! through the hour sees half the bucket replenished. Consumption is a
//! single check-and-subtract under a lock: concurrent callers can never
//! spend more than the bucket holds.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::source::RateSnapshot;

/// Time for an empty bucket to refill completely.
pub const REFILL_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Shared budget of outbound calls.
///
/// Owned explicitly and passed to whoever needs it (wrap it in an `Arc` to
/// share), so tests can run independent budgets with arbitrary capacities.
#[derive(Debug)]
pub struct RateBudget {
    capacity: u32,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, capacity: f64, per_sec: f64) {
        let elapsed = now.saturating_duration_since(self.updated);
        if elapsed.is_zero() {
            return;
        }
        self.tokens = (self.tokens + elapsed.as_secs_f64() * per_sec).min(capacity);
        self.updated = now;
    }
}

impl RateBudget {
    /// A full bucket of `capacity` tokens.
    pub fn new(capacity: u32) -> Self {
        Self::with_remaining(capacity, capacity)
    }

    /// A bucket of `capacity` tokens of which only `remaining` are
    /// currently available.
    pub fn with_remaining(capacity: u32, remaining: u32) -> Self {
        Self {
            capacity,
            refill_per_sec: f64::from(capacity) / REFILL_PERIOD.as_secs_f64(),
            bucket: Mutex::new(Bucket {
                tokens: f64::from(remaining.min(capacity)),
                updated: Instant::now(),
            }),
        }
    }

    /// Seed the budget from the remote quota so the local view starts in
    /// line with the server.
    ///
    /// There is no reconciliation afterwards: calls made with the same
    /// credentials by other processes are invisible here, so the local
    /// view can drift over a long-running process.
    pub fn from_snapshot(snapshot: &RateSnapshot) -> Self {
        Self::with_remaining(snapshot.limit, snapshot.remaining)
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn burst(&self) -> u32 {
        self.capacity
    }

    /// Consume one token if available.
    pub fn allow(&self) -> bool {
        self.allow_n(1)
    }

    /// Consume `n` tokens if all of them are available, otherwise consume
    /// nothing.
    pub fn allow_n(&self, n: u32) -> bool {
        self.allow_n_at(Instant::now(), n)
    }

    /// [`allow_n`](Self::allow_n) as of `now`.
    pub fn allow_n_at(&self, now: Instant, n: u32) -> bool {
        if n == 0 {
            return true;
        }
        if n > self.capacity {
            return false;
        }

        let mut bucket = self.bucket.lock();
        bucket.refill(now, f64::from(self.capacity), self.refill_per_sec);

        let wanted = f64::from(n);
        if bucket.tokens < wanted {
            return false;
        }
        bucket.tokens -= wanted;
        true
    }

    /// Whole tokens available right now.
    pub fn available(&self) -> u32 {
        self.available_at(Instant::now())
    }

    pub fn available_at(&self, now: Instant) -> u32 {
        let mut bucket = self.bucket.lock();
        bucket.refill(now, f64::from(self.capacity), self.refill_per_sec);
        bucket.tokens.floor() as u32
    }
}
