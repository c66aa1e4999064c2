//! Integer-keyed map split into independently locked buckets.
//!
//! Used to merge per-thread relevance contributions without one global lock.
//! Keys are routed to bucket `key mod N`; operations on different buckets never
//! contend.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

mod sealed {
    pub trait Sealed {}
}

/// Keys accepted by [`ShardedMap`]. Implemented for the primitive integers only.
pub trait ShardKey: sealed::Sealed + Copy + Ord {
    fn shard(self, buckets: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl ShardKey for $t {
            #[inline]
            fn shard(self, buckets: usize) -> usize {
                // negative keys wrap, matching an unsigned cast
                ((self as u64) % buckets as u64) as usize
            }
        }
    )*};
}

impl_shard_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

pub struct ShardedMap<K, V> {
    buckets: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ShardedMap<K, V> {
    /// Creates a map with `bucket_count` shards (at least one).
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1))
            .map(|_| Mutex::new(BTreeMap::new()))
            .collect();
        Self { buckets }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        &self.buckets[key.shard(self.buckets.len())]
    }

    /// Locks the bucket owning `key` and returns its entry, inserting
    /// `V::default()` if absent. The bucket stays locked until the guard drops,
    /// so a read-modify-write through the guard is atomic.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        let guard = self.bucket(key).lock();
        MutexGuard::map(guard, |map| map.entry(key).or_default())
    }

    /// Removes `key` from its bucket, returning the old value.
    pub fn erase(&self, key: K) -> Option<V> {
        self.bucket(key).lock().remove(&key)
    }

    /// Copies every bucket into one ordinary map.
    ///
    /// Buckets are locked one after another, so under concurrent writers the
    /// result is consistent per bucket but not across buckets.
    pub fn snapshot(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut total = BTreeMap::new();
        for bucket in &self.buckets {
            let guard = bucket.lock();
            total.extend(guard.iter().map(|(k, v)| (*k, v.clone())));
        }
        total
    }

    /// Consumes the map without locking; ownership proves there are no writers.
    pub fn into_map(self) -> BTreeMap<K, V> {
        let mut total = BTreeMap::new();
        for bucket in self.buckets {
            total.append(&mut bucket.into_inner());
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_inserts_default_and_accumulates() {
        let map: ShardedMap<i32, f64> = ShardedMap::new(4);
        *map.access(7) += 1.5;
        *map.access(7) += 0.5;
        *map.access(3) += 2.0;
        let snap = map.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[&7], 2.0);
        assert_eq!(snap[&3], 2.0);
    }

    #[test]
    fn erase_removes_only_that_key() {
        let map: ShardedMap<u64, i32> = ShardedMap::new(3);
        *map.access(1) = 10;
        *map.access(4) = 40; // same bucket as 1
        assert_eq!(map.erase(1), Some(10));
        assert_eq!(map.erase(1), None);
        assert_eq!(map.snapshot().into_iter().collect::<Vec<_>>(), vec![(4, 40)]);
    }

    #[test]
    fn zero_buckets_is_clamped() {
        let map: ShardedMap<i32, i32> = ShardedMap::new(0);
        assert_eq!(map.bucket_count(), 1);
        *map.access(-5) += 1;
        assert_eq!(map.into_map()[&-5], 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let map: ShardedMap<i32, u64> = ShardedMap::new(8);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for i in 0..1000 {
                        *map.access(i % 50) += 1;
                    }
                });
            }
        });
        let snap = map.snapshot();
        assert_eq!(snap.len(), 50);
        assert!(snap.values().all(|&v| v == 8 * 20));
    }
}
