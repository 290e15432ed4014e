//! Store Module
//!
//! The storage engine as seen by the dispatcher: one operation per command.
//!
//! ## Responsibilities
//! - Own all shared key/value state
//! - Guard its own concurrency (handlers call it from many workers)
//! - Report application failures as [`StoreError`]; the dispatcher turns
//!   their display text into an error reply
//!
//! Strings, hashes, lists, sets and sorted sets live in separate keyspaces:
//! `get k` and `hget k f` never see each other's data.

mod memory;

pub use memory::MemStore;

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Application errors reported by a store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("key not found")]
    KeyNotFound,

    #[error("key already exists")]
    KeyExists,

    #[error("field not found")]
    FieldNotFound,

    #[error("field already exists")]
    FieldExists,

    #[error("member not found")]
    MemberNotFound,

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("key is too large: {len} bytes (max {max})")]
    KeyTooLarge { len: usize, max: usize },

    #[error("value is too large: {len} bytes (max {max})")]
    ValueTooLarge { len: usize, max: usize },

    #[error("{0}")]
    InvalidArgument(String),
}

/// Size limits applied to every write
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub max_key_size: usize,
    pub max_value_size: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_key_size: 1024,
            max_value_size: 8 * 1024,
        }
    }
}

/// Storage engine capability set
///
/// Keys, fields, values and members are raw bytes. List indices may be
/// negative (counted from the tail) where noted.
pub trait Store: Send + Sync {
    // -------------------------------------------------------------------------
    // String
    // -------------------------------------------------------------------------
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    fn mset(&self, pairs: &[(&[u8], &[u8])]) -> StoreResult<()>;

    /// Fails with `KeyExists` if the key is present
    fn setnx(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Writes nothing unless every key is absent
    fn msetnx(&self, pairs: &[(&[u8], &[u8])]) -> StoreResult<()>;

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn mget(&self, keys: &[&[u8]]) -> StoreResult<Vec<Option<Vec<u8>>>>;

    /// Sets the new value and returns the previous one
    fn getset(&self, key: &[u8], value: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Fails with `KeyNotFound` if the key is absent
    fn remove(&self, key: &[u8]) -> StoreResult<()>;

    /// Number of string keys
    fn str_len(&self) -> usize;

    // -------------------------------------------------------------------------
    // Hash
    // -------------------------------------------------------------------------
    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<()>;

    fn hsetnx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<()>;

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Alternating field, value, sorted by field
    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>>;

    fn hdel(&self, key: &[u8], field: &[u8]) -> StoreResult<()>;

    fn hlen(&self, key: &[u8]) -> usize;

    fn hexist(&self, key: &[u8], field: &[u8]) -> bool;

    // -------------------------------------------------------------------------
    // List
    // -------------------------------------------------------------------------
    /// Pushes each value at the head, in argument order
    fn lpush(&self, key: &[u8], values: &[&[u8]]) -> StoreResult<()>;

    /// Pushes each value at the tail, in argument order
    fn rpush(&self, key: &[u8], values: &[&[u8]]) -> StoreResult<()>;

    fn lpop(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn rpop(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Inserts so that `value` ends up `index` elements from the head
    fn linsert(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()>;

    /// Inserts so that `value` ends up `index` elements from the tail
    fn rinsert(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()>;

    fn lset(&self, key: &[u8], value: &[u8], index: i64) -> StoreResult<()>;

    /// Removes `count` occurrences: from the head if positive, from the tail
    /// if negative, all of them if zero. Returns how many were removed.
    fn lrem(&self, key: &[u8], value: &[u8], count: i64) -> StoreResult<usize>;

    fn llen(&self, key: &[u8]) -> usize;

    fn lindex(&self, key: &[u8], index: i64) -> StoreResult<Option<Vec<u8>>>;

    /// Inclusive range; negative bounds count from the tail
    fn lrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>>;

    fn lexist(&self, key: &[u8], value: &[u8]) -> bool;

    // -------------------------------------------------------------------------
    // Set
    // -------------------------------------------------------------------------
    fn sadd(&self, key: &[u8], members: &[&[u8]]) -> StoreResult<()>;

    fn srem(&self, key: &[u8], member: &[u8]) -> StoreResult<()>;

    fn smove(&self, src: &[u8], dst: &[u8], member: &[u8]) -> StoreResult<()>;

    fn sunion(&self, keys: &[&[u8]]) -> StoreResult<Vec<Vec<u8>>>;

    /// Members of the first set absent from all others
    fn sdiff(&self, keys: &[&[u8]]) -> StoreResult<Vec<Vec<u8>>>;

    fn sscan(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>>;

    fn scard(&self, key: &[u8]) -> usize;

    fn sismember(&self, key: &[u8], member: &[u8]) -> bool;

    // -------------------------------------------------------------------------
    // Sorted Set
    // -------------------------------------------------------------------------
    fn zadd(&self, key: &[u8], score: f64, member: &[u8]) -> StoreResult<()>;

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<()>;

    /// Members with `from <= score <= to`, ascending
    fn zscore_range(&self, key: &[u8], from: f64, to: f64) -> StoreResult<Vec<(Vec<u8>, f64)>>;

    fn zscore(&self, key: &[u8], member: &[u8]) -> Option<f64>;

    fn zcard(&self, key: &[u8]) -> usize;

    fn zismember(&self, key: &[u8], member: &[u8]) -> bool;

    /// Highest `n` members, descending
    fn ztop(&self, key: &[u8], n: usize) -> StoreResult<Vec<(Vec<u8>, f64)>>;
}
