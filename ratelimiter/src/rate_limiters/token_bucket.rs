use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

use super::config::{BucketConfig, InvalidConfig, RefillPolicy};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A token bucket whose refill is computed lazily on every admission check.
///
/// Cloning a `TokenBucket` yields another handle to the same bucket.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    config: BucketConfig,
    data: Arc<Mutex<TokenBucketData>>,
}

#[derive(Debug, Clone, Copy)]
struct TokenBucketData {
    num_of_tokens: usize,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: usize, refill_rate: usize) -> Result<Self, InvalidConfig> {
        BucketConfig::new(capacity, refill_rate).map(Self::from_config)
    }

    /// Creates a full bucket.
    pub fn from_config(config: BucketConfig) -> Self {
        let data = TokenBucketData {
            num_of_tokens: config.capacity(),
            last_refill: Instant::now(),
        };
        TokenBucket {
            config,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Refills the bucket for the time elapsed since the previous call, then consumes
    /// one token if there is any. Returns whether the request is admitted.
    pub fn allow(&self) -> bool {
        let mut data = self.lock();
        data.refill(&self.config, Instant::now());
        if data.num_of_tokens > 0 {
            data.num_of_tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Tokens left as of the last call to [`TokenBucket::allow`]. Does not refill.
    pub fn available_tokens(&self) -> usize {
        self.lock().num_of_tokens
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn refill_rate(&self) -> usize {
        self.config.refill_rate()
    }

    pub fn refill_policy(&self) -> RefillPolicy {
        self.config.refill_policy()
    }

    /// Returns true when both handles point at the same bucket.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.data, &other.data)
    }

    fn lock(&self) -> MutexGuard<'_, TokenBucketData> {
        // The guarded data is plain integers that are never left half-updated.
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenBucketData {
    fn refill(&mut self, config: &BucketConfig, now: Instant) {
        let capacity = config.capacity();
        let refill_rate = config.refill_rate() as u128;
        let elapsed = now.saturating_duration_since(self.last_refill);

        let earned = elapsed.as_nanos() * refill_rate / NANOS_PER_SEC;
        let missing = (capacity - self.num_of_tokens) as u128;
        let tokens_to_add = earned.min(missing);
        self.num_of_tokens += tokens_to_add as usize;

        match config.refill_policy() {
            RefillPolicy::Discard => self.last_refill = now,
            // A full bucket keeps no leftover time, so it cannot bank idle periods.
            RefillPolicy::Carry if earned >= missing => self.last_refill = now,
            RefillPolicy::Carry => {
                // Still short of capacity: every earned token was added, so the time
                // paid for them is never more than `elapsed`.
                let paid_nanos = tokens_to_add * NANOS_PER_SEC / refill_rate;
                let paid = Duration::from_nanos(u64::try_from(paid_nanos).unwrap_or(u64::MAX));
                self.last_refill = self.last_refill.checked_add(paid).unwrap_or(now).min(now);
            }
        }
    }
}
