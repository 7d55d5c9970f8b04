use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use log::debug;

use super::{
    config::{BucketConfig, InvalidConfig},
    token_bucket::TokenBucket,
    Key,
};

/// Maps every key to its own [`TokenBucket`], creating buckets on first sight.
///
/// Cloning the registry yields another handle to the same set of buckets.
#[derive(Debug, Clone)]
pub struct BucketRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    config: BucketConfig,
    buckets: RwLock<HashMap<Key, TokenBucket>>,
}

impl BucketRegistry {
    pub fn new(capacity: usize, refill_rate: usize) -> Result<Self, InvalidConfig> {
        BucketConfig::new(capacity, refill_rate).map(Self::from_config)
    }

    pub fn from_config(config: BucketConfig) -> Self {
        let inner = RegistryInner {
            config,
            buckets: RwLock::new(HashMap::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the bucket for `key`, creating it if this is the first time the key is seen.
    ///
    /// Lookups only take the shared lock. Creation takes the exclusive lock and checks
    /// again, so racing callers for a new key all end up with the same bucket.
    pub fn get_or_create(&self, key: &str) -> TokenBucket {
        {
            let buckets = self
                .inner
                .buckets
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(bucket) = buckets.get(key) {
                return bucket.clone();
            }
        }

        let mut buckets = self
            .inner
            .buckets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket) = buckets.get(key) {
            return bucket.clone();
        }

        let bucket = TokenBucket::from_config(self.inner.config);
        buckets.insert(key.to_owned(), bucket.clone());
        debug!(
            "Created bucket for {key} ({} buckets tracked)",
            buckets.len()
        );
        bucket
    }

    pub fn allow(&self, key: &str) -> bool {
        self.get_or_create(key).allow()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_buckets(|buckets| buckets.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.read_buckets(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &BucketConfig {
        &self.inner.config
    }

    fn read_buckets<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&HashMap<Key, TokenBucket>) -> T,
    {
        let buckets = self
            .inner
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&buckets)
    }
}
