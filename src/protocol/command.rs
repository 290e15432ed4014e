//! Command registry
//!
//! Static table mapping shell command names to wire ids, plus the token
//! count each command accepts. Client and server builds must agree on this
//! table; the numeric ids are the wire contract.

use Arity::{AtLeast, Exact};

/// Wire id reserved for keep-alive frames. Never a registered command.
pub const HEARTBEAT_ID: u32 = 100;

/// Command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandId {
    // string
    Set = 0,
    MSet = 1,
    SetNx = 2,
    MSetNx = 3,
    Get = 4,
    MGet = 5,
    GetSet = 6,
    Remove = 7,
    SLen = 8,
    // hash
    HSet = 9,
    HSetNx = 10,
    HGet = 11,
    HGetAll = 12,
    HDel = 13,
    HLen = 14,
    HExist = 15,
    // list
    LPush = 16,
    LRPush = 17,
    LPop = 18,
    LRPop = 19,
    LInsert = 20,
    LRInsert = 21,
    LSet = 22,
    LRem = 23,
    LLen = 24,
    LIndex = 25,
    LRange = 26,
    LExist = 27,
    // set
    SAdd = 28,
    SRem = 29,
    SMove = 30,
    SUnion = 31,
    SDiff = 32,
    SScan = 33,
    SCard = 34,
    SIsMember = 35,
    // sorted set
    ZAdd = 36,
    ZRem = 37,
    ZScoreRange = 38,
    ZScore = 39,
    ZCard = 40,
    ZIsMember = 41,
    ZTop = 42,
}

impl CommandId {
    /// Numeric id as sent on the wire
    pub fn wire(self) -> u32 {
        self as u32
    }
}

/// Accepted token counts, command name included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many tokens. Zero-argument commands are `Exact(1)`.
    Exact(usize),
    /// At least this many tokens
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, token_count: usize) -> bool {
        match self {
            Arity::Exact(k) => token_count == k,
            Arity::AtLeast(k) => token_count >= k,
        }
    }
}

/// One registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub id: CommandId,
    pub arity: Arity,
}

const fn spec(name: &'static str, id: CommandId, arity: Arity) -> CommandSpec {
    CommandSpec { name, id, arity }
}

/// Every registered command, ordered by id
pub static COMMANDS: &[CommandSpec] = &[
    spec("set", CommandId::Set, Exact(3)),
    spec("mset", CommandId::MSet, AtLeast(3)),
    spec("setnx", CommandId::SetNx, Exact(3)),
    spec("msetnx", CommandId::MSetNx, AtLeast(3)),
    spec("get", CommandId::Get, Exact(2)),
    spec("mget", CommandId::MGet, AtLeast(2)),
    spec("getset", CommandId::GetSet, Exact(3)),
    spec("remove", CommandId::Remove, Exact(2)),
    spec("slen", CommandId::SLen, Exact(1)),
    spec("hset", CommandId::HSet, Exact(4)),
    spec("hsetnx", CommandId::HSetNx, Exact(4)),
    spec("hget", CommandId::HGet, Exact(3)),
    spec("hgetall", CommandId::HGetAll, Exact(2)),
    spec("hdel", CommandId::HDel, Exact(3)),
    spec("hlen", CommandId::HLen, Exact(2)),
    spec("hexist", CommandId::HExist, Exact(3)),
    spec("lpush", CommandId::LPush, AtLeast(3)),
    spec("lrpush", CommandId::LRPush, AtLeast(3)),
    spec("lpop", CommandId::LPop, Exact(2)),
    spec("lrpop", CommandId::LRPop, Exact(2)),
    spec("linsert", CommandId::LInsert, Exact(4)),
    spec("lrinsert", CommandId::LRInsert, Exact(4)),
    spec("lset", CommandId::LSet, Exact(4)),
    spec("lrem", CommandId::LRem, Exact(4)),
    spec("llen", CommandId::LLen, Exact(2)),
    spec("lindex", CommandId::LIndex, Exact(3)),
    spec("lrange", CommandId::LRange, Exact(4)),
    spec("lexist", CommandId::LExist, Exact(3)),
    spec("sadd", CommandId::SAdd, AtLeast(3)),
    spec("srem", CommandId::SRem, Exact(3)),
    spec("smove", CommandId::SMove, Exact(4)),
    spec("sunion", CommandId::SUnion, AtLeast(2)),
    spec("sdiff", CommandId::SDiff, AtLeast(2)),
    spec("sscan", CommandId::SScan, Exact(2)),
    spec("scard", CommandId::SCard, Exact(2)),
    spec("sismember", CommandId::SIsMember, Exact(3)),
    spec("zadd", CommandId::ZAdd, Exact(4)),
    spec("zrem", CommandId::ZRem, Exact(3)),
    spec("zscorerange", CommandId::ZScoreRange, Exact(4)),
    spec("zscore", CommandId::ZScore, Exact(3)),
    spec("zcard", CommandId::ZCard, Exact(2)),
    spec("zismember", CommandId::ZIsMember, Exact(3)),
    spec("ztop", CommandId::ZTop, Exact(3)),
];

/// Find a command by its lowercase name
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Find a command by its wire id
pub fn lookup_id(id: u32) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.id.wire() == id)
}

/// Check a token count (command name included) against a command's arity.
/// Unknown names never validate.
pub fn validate(name: &str, token_count: usize) -> bool {
    lookup(name).is_some_and(|c| c.arity.accepts(token_count))
}
