use clap::Parser;

use crate::rate_limiters::{BucketConfig, InvalidConfig, RefillPolicy};

/// Every flag can also be set through the environment variable named next to it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum number of tokens a client can hold, i.e. its burst size.
    #[arg(long, env = "RATE_LIMIT_CAPACITY", default_value_t = 5)]
    pub capacity: usize,

    /// Tokens given back to every client per second.
    #[arg(long, env = "RATE_LIMIT_REFILL_RATE", default_value_t = 5)]
    pub refill_rate: usize,

    /// Keep partial tokens between requests instead of dropping them.
    #[arg(long, env = "RATE_LIMIT_CARRY_REMAINDER")]
    pub carry_remainder: bool,
}

impl Args {
    pub fn bucket_config(&self) -> Result<BucketConfig, InvalidConfig> {
        let refill_policy = if self.carry_remainder {
            RefillPolicy::Carry
        } else {
            RefillPolicy::Discard
        };
        BucketConfig::new(self.capacity, self.refill_rate)
            .map(|config| config.with_refill_policy(refill_policy))
    }

    pub fn binding_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::rate_limiters::{InvalidConfig, RefillPolicy};

    #[test]
    fn test_flags_build_the_bucket_config() {
        let args = Args::try_parse_from([
            "bucket-ratelimiter",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--capacity",
            "50",
            "--refill-rate",
            "10",
            "--carry-remainder",
        ])
        .unwrap();

        assert_eq!(args.binding_address(), "0.0.0.0:9000");
        let config = args.bucket_config().unwrap();
        assert_eq!(config.capacity(), 50);
        assert_eq!(config.refill_rate(), 10);
        assert_eq!(config.refill_policy(), RefillPolicy::Carry);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let args = Args::try_parse_from(["bucket-ratelimiter", "--capacity", "0"]).unwrap();
        assert_eq!(args.bucket_config(), Err(InvalidConfig::ZeroCapacity));
    }

    #[test]
    fn test_negative_refill_rate_does_not_parse() {
        assert!(Args::try_parse_from(["bucket-ratelimiter", "--refill-rate", "-1"]).is_err());
    }
}
