// [libs/infra/kvs/src/memory.rs]
//! `MemoryStore`: DashMap-backed reference implementation of
//! [`KeyValueStore`], with a background reaper that evicts expired keys.
//! Not meant for production fan-out across processes — it is the contract's
//! executable specification and the backbone of every test in this
//! workspace that needs KVS semantics.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pattern::glob_match;
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
enum StoredValue {
    Bytes(Vec<u8>),
    Set(HashSet<String>),
    SortedSet(Vec<(String, f64)>),
    List(VecDeque<Vec<u8>>),
}

struct Entry {
    value: StoredValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|deadline| deadline <= now).unwrap_or(false)
    }
}

pub struct MemoryStore {
    data: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    /// Spawns the background TTL reaper. Must be called from within a
    /// Tokio runtime.
    pub fn new() -> Self {
        let data: Arc<DashMap<String, Entry>> = Arc::new(DashMap::new());
        let reaper_data = data.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(30));
            loop {
                tick.tick().await;
                let now = Instant::now();
                reaper_data.retain(|_, entry| !entry.is_expired(now));
            }
        });
        Self { data }
    }

    fn get_live<'a>(&'a self, key: &str) -> Option<dashmap::mapref::one::Ref<'a, String, Entry>> {
        let now = Instant::now();
        match self.data.get(key) {
            Some(entry) if entry.is_expired(now) => {
                drop(entry);
                self.data.remove(key);
                None
            }
            other => other,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.get_live(key)?.value {
            StoredValue::Bytes(ref bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.data.insert(key.to_string(), Entry { value: StoredValue::Bytes(value), expires_at });
    }

    /// Single `entry()` call, so the occupied/vacant decision and the write
    /// happen under one shard lock — the race a separate read-then-write
    /// would otherwise open between two callers racing for the same lease.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>, ttl: Duration) -> bool {
        let now = Instant::now();
        match self.data.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) if occupied.get().is_expired(now) => {
                occupied.insert(Entry { value: StoredValue::Bytes(value), expires_at: Some(now + ttl) });
                true
            }
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Entry { value: StoredValue::Bytes(value), expires_at: Some(now + ttl) });
                true
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    async fn incr_by(&self, key: &str, delta: i64) -> i64 {
        let now = Instant::now();
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Entry {
            value: StoredValue::Bytes(0i64.to_be_bytes().to_vec()),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = StoredValue::Bytes(0i64.to_be_bytes().to_vec());
            entry.expires_at = None;
        }
        let current = match &entry.value {
            StoredValue::Bytes(bytes) if bytes.len() == 8 => i64::from_be_bytes(bytes.as_slice().try_into().unwrap()),
            _ => 0,
        };
        let next = current + delta;
        entry.value = StoredValue::Bytes(next.to_be_bytes().to_vec());
        next
    }

    /// Single `entry()` call again, for the same reason as `set_if_absent`:
    /// the comparison and the write must happen under one shard lock or
    /// two racing callers could both observe a match and both win.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Vec<u8>>,
        new: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), Option<Vec<u8>>> {
        let now = Instant::now();
        let expires_at = ttl.map(|d| now + d);
        match self.data.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let current = match &occupied.get().value {
                    StoredValue::Bytes(bytes) => Some(bytes.clone()),
                    _ => None,
                };
                if current == expected {
                    occupied.insert(Entry { value: StoredValue::Bytes(new), expires_at });
                    Ok(())
                } else {
                    Err(current)
                }
            }
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                // expired: treated as absent.
                if expected.is_none() {
                    occupied.insert(Entry { value: StoredValue::Bytes(new), expires_at });
                    Ok(())
                } else {
                    Err(None)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                if expected.is_none() {
                    vacant.insert(Entry { value: StoredValue::Bytes(new), expires_at });
                    Ok(())
                } else {
                    Err(None)
                }
            }
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> bool {
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Entry { value: StoredValue::Set(HashSet::new()), expires_at: None });
        match &mut entry.value {
            StoredValue::Set(set) => set.insert(member.to_string()),
            _ => false,
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> bool {
        if let Some(mut entry) = self.data.get_mut(key) {
            if let StoredValue::Set(set) = &mut entry.value {
                return set.remove(member);
            }
        }
        false
    }

    async fn set_members(&self, key: &str) -> Vec<String> {
        match self.get_live(key) {
            Some(entry) => match &entry.value {
                StoredValue::Set(set) => set.iter().cloned().collect(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    async fn set_cardinality(&self, key: &str) -> usize {
        match self.get_live(key) {
            Some(entry) => match &entry.value {
                StoredValue::Set(set) => set.len(),
                _ => 0,
            },
            None => 0,
        }
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) {
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Entry { value: StoredValue::SortedSet(Vec::new()), expires_at: None });
        if let StoredValue::SortedSet(members) = &mut entry.value {
            members.retain(|(existing, _)| existing != member);
            members.push((member.to_string(), score));
        }
    }

    async fn zrem(&self, key: &str, member: &str) -> bool {
        if let Some(mut entry) = self.data.get_mut(key) {
            if let StoredValue::SortedSet(members) = &mut entry.value {
                let before = members.len();
                members.retain(|(existing, _)| existing != member);
                return members.len() != before;
            }
        }
        false
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Vec<(String, f64)> {
        match self.get_live(key) {
            Some(entry) => match &entry.value {
                StoredValue::SortedSet(members) => {
                    let mut in_range: Vec<(String, f64)> =
                        members.iter().filter(|(_, score)| *score >= min && *score <= max).cloned().collect();
                    in_range.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
                    in_range
                }
                _ => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    async fn lpush(&self, key: &str, value: Vec<u8>) {
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Entry { value: StoredValue::List(VecDeque::new()), expires_at: None });
        if let StoredValue::List(list) = &mut entry.value {
            list.push_front(value);
        }
    }

    async fn rpop(&self, key: &str) -> Option<Vec<u8>> {
        let mut entry = self.data.get_mut(key)?;
        if let StoredValue::List(list) = &mut entry.value {
            list.pop_back()
        } else {
            None
        }
    }

    async fn scan_by_pattern(&self, pattern: &str) -> Vec<String> {
        let now = Instant::now();
        self.data
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .filter(|key| glob_match(pattern, key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", b"v".to_vec(), None).await;
        assert_eq!(store.get("k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn set_if_absent_is_exclusive() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("lease", b"worker-a".to_vec(), Duration::from_secs(30)).await);
        assert!(!store.set_if_absent("lease", b"worker-b".to_vec(), Duration::from_secs(30)).await);
        assert_eq!(store.get("lease").await, Some(b"worker-a".to_vec()));
    }

    #[tokio::test]
    async fn ttl_expiry_makes_key_absent_to_readers() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", b"v".to_vec(), Some(Duration::from_millis(5))).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn incr_by_accumulates() {
        let store = MemoryStore::new();
        assert_eq!(store.incr_by("counter", 3).await, 3);
        assert_eq!(store.incr_by("counter", 4).await, 7);
        assert_eq!(store.incr_by("counter", -2).await, 5);
    }

    #[tokio::test]
    async fn compare_and_swap_only_succeeds_against_the_expected_value() {
        let store = MemoryStore::new();
        assert!(store.compare_and_swap("tokens", None, b"10".to_vec(), None).await.is_ok());
        let stale = store.compare_and_swap("tokens", Some(b"9".to_vec()), b"8".to_vec(), None).await;
        assert_eq!(stale, Err(Some(b"10".to_vec())));
        assert!(store.compare_and_swap("tokens", Some(b"10".to_vec()), b"9".to_vec(), None).await.is_ok());
        assert_eq!(store.get("tokens").await, Some(b"9".to_vec()));
    }

    #[tokio::test]
    async fn compare_and_swap_treats_expired_key_as_absent() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", b"old".to_vec(), Some(Duration::from_millis(5))).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.compare_and_swap("k", None, b"new".to_vec(), None).await.is_ok());
        assert_eq!(store.get("k").await, Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn set_membership_operations() {
        let store = MemoryStore::new();
        assert!(store.set_add("s", "a").await);
        assert!(!store.set_add("s", "a").await);
        assert!(store.set_add("s", "b").await);
        assert_eq!(store.set_cardinality("s").await, 2);
        assert!(store.set_remove("s", "a").await);
        assert_eq!(store.set_members("s").await, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn sorted_set_range_by_score() {
        let store = MemoryStore::new();
        store.zadd("z", "low", 1.0).await;
        store.zadd("z", "mid", 5.0).await;
        store.zadd("z", "high", 10.0).await;
        let range = store.zrange_by_score("z", 2.0, 10.0).await;
        assert_eq!(range, vec![("mid".to_string(), 5.0), ("high".to_string(), 10.0)]);
    }

    #[tokio::test]
    async fn list_push_pop_is_fifo() {
        let store = MemoryStore::new();
        store.lpush("list", b"first".to_vec()).await;
        store.lpush("list", b"second".to_vec()).await;
        assert_eq!(store.rpop("list").await, Some(b"first".to_vec()));
        assert_eq!(store.rpop("list").await, Some(b"second".to_vec()));
        assert_eq!(store.rpop("list").await, None);
    }

    #[tokio::test]
    async fn scan_by_pattern_finds_matching_keys_only() {
        let store = MemoryStore::new();
        store.set_with_ttl("scheduler:lease:morning_sparks:t1", b"w".to_vec(), None).await;
        store.set_with_ttl("scheduler:next_due:morning_sparks", b"t2".to_vec(), None).await;
        let matches = store.scan_by_pattern("scheduler:lease:*").await;
        assert_eq!(matches, vec!["scheduler:lease:morning_sparks:t1".to_string()]);
    }
}
