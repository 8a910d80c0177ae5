use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

struct Entry<V> {
    value: Arc<V>,
    inserted: Instant,
}

/// Time-to-live cache of aggregated calendars. Every insert schedules its
/// own eviction; a later insert under the same key outlives the earlier timer.
pub struct Cache<K, V> {
    enabled: bool,
    inner: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Debug + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    pub fn disabled() -> Arc<Self> {
        Self::new(Config {
            enabled: false,
            ttl: Duration::ZERO,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn insert(self: &Arc<Self>, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if !self.enabled {
            return value;
        }

        let inserted = Instant::now();
        self.inner.write().await.insert(
            key.clone(),
            Entry {
                value: Arc::clone(&value),
                inserted,
            },
        );

        let cache = Arc::clone(self);
        task::spawn(async move {
            sleep(cache.ttl).await;

            let mut inner = cache.inner.write().await;
            if inner.get(&key).is_some_and(|entry| entry.inserted == inserted) {
                inner.remove(&key);
                debug!("Evicted cached calendar for {key:?}");
            }
        });

        value
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }

        self.inner
            .read()
            .await
            .get(key)
            .map(|entry| Arc::clone(&entry.value))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
