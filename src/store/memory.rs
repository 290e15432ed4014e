//! In-memory store
//!
//! One `RwLock`-guarded map per data type. Reads take the read lock, so
//! lookups from different connections proceed concurrently; writes on one
//! type never block another type.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use parking_lot::RwLock;

use crate::config::Config;

use super::{Store, StoreError, StoreLimits, StoreResult};

type Key = Vec<u8>;

/// Store that keeps everything in process memory
#[derive(Default)]
pub struct MemStore {
    limits: StoreLimits,
    strings: RwLock<HashMap<Key, Vec<u8>>>,
    hashes: RwLock<HashMap<Key, BTreeMap<Vec<u8>, Vec<u8>>>>,
    lists: RwLock<HashMap<Key, VecDeque<Vec<u8>>>>,
    sets: RwLock<HashMap<Key, BTreeSet<Vec<u8>>>>,
    zsets: RwLock<HashMap<Key, HashMap<Vec<u8>, f64>>>,
}

impl MemStore {
    /// Create an empty store with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with explicit limits
    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Create an empty store using the limits of a server profile
    pub fn from_config(config: &Config) -> Self {
        Self::with_limits(StoreLimits {
            max_key_size: config.max_key_size,
            max_value_size: config.max_value_size,
        })
    }

    fn check_key(&self, key: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("key must not be empty".into()));
        }
        if key.len() > self.limits.max_key_size {
            return Err(StoreError::KeyTooLarge {
                len: key.len(),
                max: self.limits.max_key_size,
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &[u8]) -> StoreResult<()> {
        if value.len() > self.limits.max_value_size {
            return Err(StoreError::ValueTooLarge {
                len: value.len(),
                max: self.limits.max_value_size,
            });
        }
        Ok(())
    }

    fn check_pairs(&self, pairs: &[(&[u8], &[u8])]) -> StoreResult<()> {
        for (key, value) in pairs {
            self.check_key(key)?;
            self.check_value(value)?;
        }
        Ok(())
    }

    fn check_values(&self, values: &[&[u8]]) -> StoreResult<()> {
        values.iter().try_for_each(|v| self.check_value(v))
    }
}

/// Resolve a possibly negative index against a length
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

fn sorted_pairs(members: &HashMap<Vec<u8>, f64>) -> Vec<(Vec<u8>, f64)> {
    let mut pairs: Vec<(Vec<u8>, f64)> = members
        .iter()
        .map(|(m, s)| (m.clone(), *s))
        .collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

impl Store for MemStore {
    // =========================================================================
    // String
    // =========================================================================

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(value)?;
        self.strings.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn mset(&self, pairs: &[(&[u8], &[u8])]) -> StoreResult<()> {
        self.check_pairs(pairs)?;
        let mut strings = self.strings.write();
        for (key, value) in pairs {
            strings.insert(key.to_vec(), value.to_vec());
        }
        Ok(())
    }

    fn setnx(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(value)?;
        let mut strings = self.strings.write();
        if strings.contains_key(key) {
            return Err(StoreError::KeyExists);
        }
        strings.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn msetnx(&self, pairs: &[(&[u8], &[u8])]) -> StoreResult<()> {
        self.check_pairs(pairs)?;
        let mut strings = self.strings.write();
        if pairs.iter().any(|(key, _)| strings.contains_key(*key)) {
            return Err(StoreError::KeyExists);
        }
        for (key, value) in pairs {
            strings.insert(key.to_vec(), value.to_vec());
        }
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.strings.read().get(key).cloned())
    }

    fn mget(&self, keys: &[&[u8]]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        let strings = self.strings.read();
        Ok(keys.iter().map(|k| strings.get(*k).cloned()).collect())
    }

    fn getset(&self, key: &[u8], value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.check_key(key)?;
        self.check_value(value)?;
        Ok(self.strings.write().insert(key.to_vec(), value.to_vec()))
    }

    fn remove(&self, key: &[u8]) -> StoreResult<()> {
        self.strings
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or(StoreError::KeyNotFound)
    }

    fn str_len(&self) -> usize {
        self.strings.read().len()
    }

    // =========================================================================
    // Hash
    // =========================================================================

    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(field)?;
        self.check_value(value)?;
        self.hashes
            .write()
            .entry(key.to_vec())
            .or_default()
            .insert(field.to_vec(), value.to_vec());
        Ok(())
    }

    fn hsetnx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(field)?;
        self.check_value(value)?;
        let mut hashes = self.hashes.write();
        let hash = hashes.entry(key.to_vec()).or_default();
        if hash.contains_key(field) {
            return Err(StoreError::FieldExists);
        }
        hash.insert(field.to_vec(), value.to_vec());
        Ok(())
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .hashes
            .read()
            .get(key)
            .and_then(|h| h.get(field))
            .cloned())
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        let hashes = self.hashes.read();
        let Some(hash) = hashes.get(key) else {
            return Ok(Vec::new());
        };
        Ok(hash
            .iter()
            .flat_map(|(f, v)| [f.clone(), v.clone()])
            .collect())
    }

    fn hdel(&self, key: &[u8], field: &[u8]) -> StoreResult<()> {
        let mut hashes = self.hashes.write();
        let hash = hashes.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        hash.remove(field).ok_or(StoreError::FieldNotFound)?;
        if hash.is_empty() {
            hashes.remove(key);
        }
        Ok(())
    }

    fn hlen(&self, key: &[u8]) -> usize {
        self.hashes.read().get(key).map_or(0, |h| h.len())
    }

    fn hexist(&self, key: &[u8], field: &[u8]) -> bool {
        self.hashes
            .read()
            .get(key)
            .is_some_and(|h| h.contains_key(field))
    }

    // =========================================================================
    // List
    // =========================================================================

    fn lpush(&self, key: &[u8], values: &[&[u8]]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_values(values)?;
        let mut lists = self.lists.write();
        let list = lists.entry(key.to_vec()).or_default();
        for value in values {
            list.push_front(value.to_vec());
        }
        Ok(())
    }

    fn rpush(&self, key: &[u8], values: &[&[u8]]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_values(values)?;
        let mut lists = self.lists.write();
        let list = lists.entry(key.to_vec()).or_default();
        for value in values {
            list.push_back(value.to_vec());
        }
        Ok(())
    }

    fn lpop(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let mut lists = self.lists.write();
        let Some(list) = lists.get_mut(key) else {
            return Ok(None);
        };
        let value = list.pop_front();
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(value)
    }

    fn rpop(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let mut lists = self.lists.write();
        let Some(list) = lists.get_mut(key) else {
            return Ok(None);
        };
        let value = list.pop_back();
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(value)
    }

    fn linsert(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()> {
        self.check_value(value)?;
        let mut lists = self.lists.write();
        let list = lists.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        let pos = usize::try_from(index)
            .ok()
            .filter(|p| *p <= list.len())
            .ok_or(StoreError::IndexOutOfRange)?;
        list.insert(pos, value.to_vec());
        Ok(())
    }

    fn rinsert(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()> {
        self.check_value(value)?;
        let mut lists = self.lists.write();
        let list = lists.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        let from_tail = usize::try_from(index)
            .ok()
            .filter(|p| *p <= list.len())
            .ok_or(StoreError::IndexOutOfRange)?;
        let pos = list.len() - from_tail;
        list.insert(pos, value.to_vec());
        Ok(())
    }

    fn lset(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()> {
        self.check_value(value)?;
        let mut lists = self.lists.write();
        let list = lists.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        let pos = resolve_index(index, list.len()).ok_or(StoreError::IndexOutOfRange)?;
        list[pos] = value.to_vec();
        Ok(())
    }

    fn lrem(&self, key: &[u8], value: &[u8], count: i64) -> StoreResult<usize> {
        let mut lists = self.lists.write();
        let Some(list) = lists.get_mut(key) else {
            return Ok(0);
        };

        let limit = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs() as usize
        };
        let mut removed = 0;
        if count >= 0 {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        if list.is_empty() {
            lists.remove(key);
        }
        Ok(removed)
    }

    fn llen(&self, key: &[u8]) -> usize {
        self.lists.read().get(key).map_or(0, |l| l.len())
    }

    fn lindex(&self, key: &[u8], index: i64) -> StoreResult<Option<Vec<u8>>> {
        let lists = self.lists.read();
        Ok(lists
            .get(key)
            .and_then(|l| resolve_index(index, l.len()).map(|i| l[i].clone())))
    }

    fn lrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>> {
        let lists = self.lists.read();
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(list
            .range(start as usize..=stop as usize)
            .cloned()
            .collect())
    }

    fn lexist(&self, key: &[u8], value: &[u8]) -> bool {
        self.lists
            .read()
            .get(key)
            .is_some_and(|l| l.iter().any(|v| v == value))
    }

    // =========================================================================
    // Set
    // =========================================================================

    fn sadd(&self, key: &[u8], members: &[&[u8]]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_values(members)?;
        let mut sets = self.sets.write();
        let set = sets.entry(key.to_vec()).or_default();
        for member in members {
            set.insert(member.to_vec());
        }
        Ok(())
    }

    fn srem(&self, key: &[u8], member: &[u8]) -> StoreResult<()> {
        let mut sets = self.sets.write();
        let set = sets.get_mut(key).ok_or(StoreError::MemberNotFound)?;
        if !set.remove(member) {
            return Err(StoreError::MemberNotFound);
        }
        if set.is_empty() {
            sets.remove(key);
        }
        Ok(())
    }

    fn smove(&self, src: &[u8], dst: &[u8], member: &[u8]) -> StoreResult<()> {
        self.check_key(dst)?;
        let mut sets = self.sets.write();
        let source = sets.get_mut(src).ok_or(StoreError::MemberNotFound)?;
        if !source.remove(member) {
            return Err(StoreError::MemberNotFound);
        }
        if source.is_empty() {
            sets.remove(src);
        }
        sets.entry(dst.to_vec()).or_default().insert(member.to_vec());
        Ok(())
    }

    fn sunion(&self, keys: &[&[u8]]) -> StoreResult<Vec<Vec<u8>>> {
        let sets = self.sets.read();
        let union: BTreeSet<&Vec<u8>> = keys
            .iter()
            .filter_map(|k| sets.get(*k))
            .flatten()
            .collect();
        Ok(union.into_iter().cloned().collect())
    }

    fn sdiff(&self, keys: &[&[u8]]) -> StoreResult<Vec<Vec<u8>>> {
        let sets = self.sets.read();
        let Some((first, rest)) = keys.split_first() else {
            return Ok(Vec::new());
        };
        let Some(base) = sets.get(*first) else {
            return Ok(Vec::new());
        };
        let others: Vec<&BTreeSet<Vec<u8>>> = rest.iter().filter_map(|k| sets.get(*k)).collect();
        Ok(base
            .iter()
            .filter(|m| !others.iter().any(|o| o.contains(*m)))
            .cloned()
            .collect())
    }

    fn sscan(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        Ok(self
            .sets
            .read()
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn scard(&self, key: &[u8]) -> usize {
        self.sets.read().get(key).map_or(0, |s| s.len())
    }

    fn sismember(&self, key: &[u8], member: &[u8]) -> bool {
        self.sets
            .read()
            .get(key)
            .is_some_and(|s| s.contains(member))
    }

    // =========================================================================
    // Sorted Set
    // =========================================================================

    fn zadd(&self, key: &[u8], score: f64, member: &[u8]) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(member)?;
        if score.is_nan() {
            return Err(StoreError::InvalidArgument("score is not a number".into()));
        }
        self.zsets
            .write()
            .entry(key.to_vec())
            .or_default()
            .insert(member.to_vec(), score);
        Ok(())
    }

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<()> {
        let mut zsets = self.zsets.write();
        let zset = zsets.get_mut(key).ok_or(StoreError::MemberNotFound)?;
        zset.remove(member).ok_or(StoreError::MemberNotFound)?;
        if zset.is_empty() {
            zsets.remove(key);
        }
        Ok(())
    }

    fn zscore_range(&self, key: &[u8], from: f64, to: f64) -> StoreResult<Vec<(Vec<u8>, f64)>> {
        let zsets = self.zsets.read();
        let Some(zset) = zsets.get(key) else {
            return Ok(Vec::new());
        };
        Ok(sorted_pairs(zset)
            .into_iter()
            .filter(|(_, s)| *s >= from && *s <= to)
            .collect())
    }

    fn zscore(&self, key: &[u8], member: &[u8]) -> Option<f64> {
        self.zsets.read().get(key).and_then(|z| z.get(member)).copied()
    }

    fn zcard(&self, key: &[u8]) -> usize {
        self.zsets.read().get(key).map_or(0, |z| z.len())
    }

    fn zismember(&self, key: &[u8], member: &[u8]) -> bool {
        self.zsets
            .read()
            .get(key)
            .is_some_and(|z| z.contains_key(member))
    }

    fn ztop(&self, key: &[u8], n: usize) -> StoreResult<Vec<(Vec<u8>, f64)>> {
        let zsets = self.zsets.read();
        let Some(zset) = zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut pairs = sorted_pairs(zset);
        pairs.reverse();
        pairs.truncate(n);
        Ok(pairs)
    }
}
