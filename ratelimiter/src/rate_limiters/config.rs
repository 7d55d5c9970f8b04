use std::num::NonZeroUsize;

use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum InvalidConfig {
    #[display(fmt = "bucket capacity must be greater than zero")]
    ZeroCapacity,

    #[display(fmt = "bucket refill rate must be greater than zero")]
    ZeroRefillRate,
}

impl std::error::Error for InvalidConfig {}

/// What happens to the part of the elapsed time that did not add up to a whole token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefillPolicy {
    /// The remainder is dropped on every call. A bucket polled more often than once
    /// every `1 / refill_rate` seconds never refills.
    #[default]
    Discard,
    /// The remainder is carried into the next call, so refill tracks the true rate
    /// regardless of how often the bucket is polled.
    Carry,
}

/// Capacity and refill settings shared by every bucket a registry creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketConfig {
    capacity: NonZeroUsize,
    refill_rate: NonZeroUsize,
    refill_policy: RefillPolicy,
}

impl BucketConfig {
    pub fn new(capacity: usize, refill_rate: usize) -> Result<Self, InvalidConfig> {
        let capacity = NonZeroUsize::new(capacity).ok_or(InvalidConfig::ZeroCapacity)?;
        let refill_rate = NonZeroUsize::new(refill_rate).ok_or(InvalidConfig::ZeroRefillRate)?;
        Ok(Self {
            capacity,
            refill_rate,
            refill_policy: RefillPolicy::default(),
        })
    }

    pub fn with_refill_policy(self, refill_policy: RefillPolicy) -> Self {
        Self {
            refill_policy,
            ..self
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Tokens added per second.
    pub fn refill_rate(&self) -> usize {
        self.refill_rate.get()
    }

    pub fn refill_policy(&self) -> RefillPolicy {
        self.refill_policy
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{BucketConfig, InvalidConfig, RefillPolicy};

    #[rstest]
    #[case(0, 1, InvalidConfig::ZeroCapacity)]
    #[case(1, 0, InvalidConfig::ZeroRefillRate)]
    #[case(0, 0, InvalidConfig::ZeroCapacity)]
    fn test_config_rejects_zero_values(
        #[case] capacity: usize,
        #[case] refill_rate: usize,
        #[case] expected: InvalidConfig,
    ) {
        assert_eq!(BucketConfig::new(capacity, refill_rate), Err(expected));
    }

    #[test]
    fn test_config_defaults_to_discarding_the_remainder() {
        let config = BucketConfig::new(10, 5).unwrap();
        assert_eq!(config.capacity(), 10);
        assert_eq!(config.refill_rate(), 5);
        assert_eq!(config.refill_policy(), RefillPolicy::Discard);

        let config = config.with_refill_policy(RefillPolicy::Carry);
        assert_eq!(config.refill_policy(), RefillPolicy::Carry);
        assert_eq!(config.capacity(), 10);
    }

    #[test]
    fn test_invalid_config_message() {
        assert_eq!(
            InvalidConfig::ZeroRefillRate.to_string(),
            "bucket refill rate must be greater than zero"
        );
    }
}
