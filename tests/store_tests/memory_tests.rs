//! MemStore Tests
//!
//! Tests verify:
//! - String, hash, list, set and sorted set operations
//! - Error kinds reported for missing keys, fields and members
//! - Size limits
//! - Concurrent access

use std::sync::Arc;
use std::thread;

use caskkv::store::{MemStore, Store, StoreError, StoreLimits};

fn b(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

// =============================================================================
// String Tests
// =============================================================================

#[test]
fn test_set_and_get() {
    let store = MemStore::new();

    store.set(b"foo", b"bar").unwrap();
    assert_eq!(store.get(b"foo").unwrap(), Some(b("bar")));
    assert_eq!(store.get(b"missing").unwrap(), None);
}

#[test]
fn test_set_overwrites() {
    let store = MemStore::new();

    store.set(b"foo", b"one").unwrap();
    store.set(b"foo", b"two").unwrap();
    assert_eq!(store.get(b"foo").unwrap(), Some(b("two")));
    assert_eq!(store.str_len(), 1);
}

#[test]
fn test_setnx_refuses_existing_key() {
    let store = MemStore::new();

    store.setnx(b"k", b"v1").unwrap();
    assert_eq!(store.setnx(b"k", b"v2"), Err(StoreError::KeyExists));
    assert_eq!(store.get(b"k").unwrap(), Some(b("v1")));
}

#[test]
fn test_mset_and_mget() {
    let store = MemStore::new();

    store
        .mset(&[(b"a".as_slice(), b"1".as_slice()), (b"c".as_slice(), b"3".as_slice())])
        .unwrap();

    let values = store
        .mget(&[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()])
        .unwrap();
    assert_eq!(values, vec![Some(b("1")), None, Some(b("3"))]);
}

#[test]
fn test_msetnx_is_all_or_nothing() {
    let store = MemStore::new();
    store.set(b"b", b"old").unwrap();

    let result = store.msetnx(&[(b"a".as_slice(), b"1".as_slice()), (b"b".as_slice(), b"2".as_slice())]);
    assert_eq!(result, Err(StoreError::KeyExists));
    assert_eq!(store.get(b"a").unwrap(), None);
    assert_eq!(store.get(b"b").unwrap(), Some(b("old")));
}

#[test]
fn test_getset_returns_previous() {
    let store = MemStore::new();

    assert_eq!(store.getset(b"k", b"first").unwrap(), None);
    assert_eq!(store.getset(b"k", b"second").unwrap(), Some(b("first")));
    assert_eq!(store.get(b"k").unwrap(), Some(b("second")));
}

#[test]
fn test_remove_twice() {
    let store = MemStore::new();
    store.set(b"k", b"v").unwrap();

    store.remove(b"k").unwrap();
    assert_eq!(store.remove(b"k"), Err(StoreError::KeyNotFound));
    assert_eq!(store.str_len(), 0);
}

#[test]
fn test_empty_key_rejected() {
    let store = MemStore::new();
    assert!(matches!(
        store.set(b"", b"v"),
        Err(StoreError::InvalidArgument(_))
    ));
}

#[test]
fn test_size_limits() {
    let store = MemStore::with_limits(StoreLimits {
        max_key_size: 4,
        max_value_size: 8,
    });

    assert_eq!(
        store.set(b"toolong", b"v"),
        Err(StoreError::KeyTooLarge { len: 7, max: 4 })
    );
    assert_eq!(
        store.set(b"k", b"123456789"),
        Err(StoreError::ValueTooLarge { len: 9, max: 8 })
    );
    store.set(b"kkkk", b"12345678").unwrap();
}

#[test]
fn test_keyspaces_are_separate() {
    let store = MemStore::new();

    store.set(b"k", b"string").unwrap();
    store.hset(b"k", b"f", b"hash").unwrap();

    assert_eq!(store.get(b"k").unwrap(), Some(b("string")));
    assert_eq!(store.hget(b"k", b"f").unwrap(), Some(b("hash")));
    assert_eq!(store.llen(b"k"), 0);
}

// =============================================================================
// Hash Tests
// =============================================================================

#[test]
fn test_hash_operations() {
    let store = MemStore::new();

    store.hset(b"h", b"f1", b"v1").unwrap();
    store.hset(b"h", b"f2", b"v2").unwrap();

    assert_eq!(store.hget(b"h", b"f1").unwrap(), Some(b("v1")));
    assert_eq!(store.hget(b"h", b"nope").unwrap(), None);
    assert_eq!(store.hlen(b"h"), 2);
    assert!(store.hexist(b"h", b"f2"));
    assert!(!store.hexist(b"h", b"f3"));

    assert_eq!(
        store.hgetall(b"h").unwrap(),
        vec![b("f1"), b("v1"), b("f2"), b("v2")]
    );
}

#[test]
fn test_hsetnx() {
    let store = MemStore::new();

    store.hsetnx(b"h", b"f", b"one").unwrap();
    assert_eq!(store.hsetnx(b"h", b"f", b"two"), Err(StoreError::FieldExists));
    assert_eq!(store.hget(b"h", b"f").unwrap(), Some(b("one")));
}

#[test]
fn test_hdel_errors_and_cleanup() {
    let store = MemStore::new();

    assert_eq!(store.hdel(b"h", b"f"), Err(StoreError::KeyNotFound));

    store.hset(b"h", b"f", b"v").unwrap();
    assert_eq!(store.hdel(b"h", b"other"), Err(StoreError::FieldNotFound));

    store.hdel(b"h", b"f").unwrap();
    assert_eq!(store.hlen(b"h"), 0);
    assert!(store.hgetall(b"h").unwrap().is_empty());
}

// =============================================================================
// List Tests
// =============================================================================

#[test]
fn test_push_and_pop() {
    let store = MemStore::new();

    store.lpush(b"l", &[b"a".as_slice(), b"b".as_slice()]).unwrap();
    store.rpush(b"l", &[b"c".as_slice()]).unwrap();
    // b a c
    assert_eq!(store.llen(b"l"), 3);

    assert_eq!(store.lpop(b"l").unwrap(), Some(b("b")));
    assert_eq!(store.rpop(b"l").unwrap(), Some(b("c")));
    assert_eq!(store.rpop(b"l").unwrap(), Some(b("a")));
    assert_eq!(store.lpop(b"l").unwrap(), None);
    assert_eq!(store.llen(b"l"), 0);
}

#[test]
fn test_lrange_bounds() {
    let store = MemStore::new();
    store
        .rpush(b"l", &[b"a".as_slice(), b"b".as_slice(), b"c".as_slice(), b"d".as_slice()])
        .unwrap();

    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("b"), b("c"), b("d")]);
    assert_eq!(store.lrange(b"l", 1, 2).unwrap(), vec![b("b"), b("c")]);
    assert_eq!(store.lrange(b"l", -2, -1).unwrap(), vec![b("c"), b("d")]);
    assert_eq!(store.lrange(b"l", 2, 100).unwrap(), vec![b("c"), b("d")]);
    assert!(store.lrange(b"l", 3, 1).unwrap().is_empty());
    assert!(store.lrange(b"l", 10, 20).unwrap().is_empty());
    assert!(store.lrange(b"missing", 0, -1).unwrap().is_empty());
}

#[test]
fn test_lindex() {
    let store = MemStore::new();
    store.rpush(b"l", &[b"a".as_slice(), b"b".as_slice()]).unwrap();

    assert_eq!(store.lindex(b"l", 0).unwrap(), Some(b("a")));
    assert_eq!(store.lindex(b"l", -1).unwrap(), Some(b("b")));
    assert_eq!(store.lindex(b"l", 2).unwrap(), None);
    assert_eq!(store.lindex(b"missing", 0).unwrap(), None);
}

#[test]
fn test_linsert_from_head_and_tail() {
    let store = MemStore::new();
    store.rpush(b"l", &[b"a".as_slice(), b"c".as_slice()]).unwrap();

    store.linsert(b"l", b"b", 1).unwrap();
    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("b"), b("c")]);

    // Zero from the tail appends
    store.rinsert(b"l", b"d", 0).unwrap();
    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("b"), b("c"), b("d")]);

    store.rinsert(b"l", b"x", 4).unwrap();
    assert_eq!(store.lindex(b"l", 0).unwrap(), Some(b("x")));
}

#[test]
fn test_linsert_errors() {
    let store = MemStore::new();

    assert_eq!(store.linsert(b"l", b"v", 0), Err(StoreError::KeyNotFound));
    assert_eq!(store.rinsert(b"l", b"v", 0), Err(StoreError::KeyNotFound));

    store.rpush(b"l", &[b"a".as_slice()]).unwrap();
    assert_eq!(store.linsert(b"l", b"v", 5), Err(StoreError::IndexOutOfRange));
    assert_eq!(store.linsert(b"l", b"v", -1), Err(StoreError::IndexOutOfRange));
    assert_eq!(store.rinsert(b"l", b"v", 2), Err(StoreError::IndexOutOfRange));
}

#[test]
fn test_lset() {
    let store = MemStore::new();

    assert_eq!(store.lset(b"l", b"v", 0), Err(StoreError::KeyNotFound));

    store.rpush(b"l", &[b"a".as_slice(), b"b".as_slice()]).unwrap();
    store.lset(b"l", b"z", -1).unwrap();
    assert_eq!(store.lindex(b"l", 1).unwrap(), Some(b("z")));
    assert_eq!(store.lset(b"l", b"v", 2), Err(StoreError::IndexOutOfRange));
}

#[test]
fn test_lrem_directions() {
    let store = MemStore::new();
    let items = [b"x".as_slice(), b"a".as_slice(), b"x".as_slice(), b"b".as_slice(), b"x".as_slice()];

    store.rpush(b"l", &items).unwrap();
    assert_eq!(store.lrem(b"l", b"x", 1).unwrap(), 1);
    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("x"), b("b"), b("x")]);

    assert_eq!(store.lrem(b"l", b"x", -1).unwrap(), 1);
    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("x"), b("b")]);

    store.rpush(b"l", &[b"x".as_slice()]).unwrap();
    assert_eq!(store.lrem(b"l", b"x", 0).unwrap(), 2);
    assert_eq!(store.lrange(b"l", 0, -1).unwrap(), vec![b("a"), b("b")]);

    assert_eq!(store.lrem(b"missing", b"x", 0).unwrap(), 0);
}

#[test]
fn test_lexist() {
    let store = MemStore::new();
    store.rpush(b"l", &[b"a".as_slice()]).unwrap();

    assert!(store.lexist(b"l", b"a"));
    assert!(!store.lexist(b"l", b"b"));
    assert!(!store.lexist(b"missing", b"a"));
}

// =============================================================================
// Set Tests
// =============================================================================

#[test]
fn test_set_membership() {
    let store = MemStore::new();

    store
        .sadd(b"s", &[b"b".as_slice(), b"a".as_slice(), b"b".as_slice()])
        .unwrap();
    assert_eq!(store.scard(b"s"), 2);
    assert!(store.sismember(b"s", b"a"));
    assert!(!store.sismember(b"s", b"c"));
    assert_eq!(store.sscan(b"s").unwrap(), vec![b("a"), b("b")]);
}

#[test]
fn test_srem() {
    let store = MemStore::new();

    assert_eq!(store.srem(b"s", b"a"), Err(StoreError::MemberNotFound));

    store.sadd(b"s", &[b"a".as_slice()]).unwrap();
    assert_eq!(store.srem(b"s", b"b"), Err(StoreError::MemberNotFound));
    store.srem(b"s", b"a").unwrap();
    assert_eq!(store.scard(b"s"), 0);
}

#[test]
fn test_smove() {
    let store = MemStore::new();
    store.sadd(b"src", &[b"m".as_slice()]).unwrap();

    store.smove(b"src", b"dst", b"m").unwrap();
    assert!(!store.sismember(b"src", b"m"));
    assert!(store.sismember(b"dst", b"m"));

    assert_eq!(store.smove(b"src", b"dst", b"m"), Err(StoreError::MemberNotFound));
}

#[test]
fn test_sunion_and_sdiff() {
    let store = MemStore::new();
    store.sadd(b"s1", &[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]).unwrap();
    store.sadd(b"s2", &[b"c".as_slice(), b"d".as_slice()]).unwrap();

    assert_eq!(
        store.sunion(&[b"s1".as_slice(), b"s2".as_slice(), b"none".as_slice()]).unwrap(),
        vec![b("a"), b("b"), b("c"), b("d")]
    );
    assert_eq!(
        store.sdiff(&[b"s1".as_slice(), b"s2".as_slice()]).unwrap(),
        vec![b("a"), b("b")]
    );
    assert!(store.sdiff(&[b"none".as_slice(), b"s1".as_slice()]).unwrap().is_empty());
}

// =============================================================================
// Sorted Set Tests
// =============================================================================

#[test]
fn test_zadd_and_score() {
    let store = MemStore::new();

    store.zadd(b"z", 1.5, b"alice").unwrap();
    store.zadd(b"z", 3.0, b"bob").unwrap();
    store.zadd(b"z", 2.0, b"alice").unwrap();

    assert_eq!(store.zcard(b"z"), 2);
    assert_eq!(store.zscore(b"z", b"alice"), Some(2.0));
    assert_eq!(store.zscore(b"z", b"carol"), None);
    assert!(store.zismember(b"z", b"bob"));
}

#[test]
fn test_zadd_rejects_nan() {
    let store = MemStore::new();
    assert!(matches!(
        store.zadd(b"z", f64::NAN, b"m"),
        Err(StoreError::InvalidArgument(_))
    ));
}

#[test]
fn test_zscore_range_is_ascending_inclusive() {
    let store = MemStore::new();
    store.zadd(b"z", 5.0, b"e").unwrap();
    store.zadd(b"z", 1.0, b"a").unwrap();
    store.zadd(b"z", 3.0, b"c").unwrap();

    assert_eq!(
        store.zscore_range(b"z", 1.0, 3.0).unwrap(),
        vec![(b("a"), 1.0), (b("c"), 3.0)]
    );
    assert!(store.zscore_range(b"z", 10.0, 20.0).unwrap().is_empty());
}

#[test]
fn test_ztop_is_descending() {
    let store = MemStore::new();
    store.zadd(b"z", 1.0, b"a").unwrap();
    store.zadd(b"z", 3.0, b"c").unwrap();
    store.zadd(b"z", 2.0, b"b").unwrap();

    assert_eq!(store.ztop(b"z", 2).unwrap(), vec![(b("c"), 3.0), (b("b"), 2.0)]);
    assert_eq!(store.ztop(b"z", 10).unwrap().len(), 3);
    assert!(store.ztop(b"missing", 3).unwrap().is_empty());
}

#[test]
fn test_zrem() {
    let store = MemStore::new();
    store.zadd(b"z", 1.0, b"a").unwrap();

    store.zrem(b"z", b"a").unwrap();
    assert_eq!(store.zrem(b"z", b"a"), Err(StoreError::MemberNotFound));
    assert_eq!(store.zcard(b"z"), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writes() {
    let store = Arc::new(MemStore::new());

    let mut handles = vec![];
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for j in 0..50 {
                let key = format!("key{}_{}", i, j);
                store.set(key.as_bytes(), b"v").unwrap();
                store.rpush(b"shared", &[key.as_bytes()]).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.str_len(), 400);
    assert_eq!(store.llen(b"shared"), 400);
}
