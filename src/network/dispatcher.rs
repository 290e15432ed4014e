//! Command Dispatcher
//!
//! Routes decoded requests to the store.
//!
//! ## Flow
//! 1. Look up the request's command id in the route table
//! 2. Split the payload into arguments and re-check the arity
//! 3. Run exactly one store operation
//! 4. Format its [`Outcome`] into a single reply
//!
//! Store failures become `400` replies carrying the error text; every
//! success is `200`.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CaskError, Result};
use crate::protocol::{CommandId, CommandSpec, Outcome, Reply, Request, COMMANDS};
use crate::store::{Store, StoreError, StoreResult};

/// Runs one store operation for already split arguments
pub type Handler = fn(&dyn Store, &Args<'_>) -> StoreResult<Outcome>;

/// A route table entry
#[derive(Clone, Copy)]
pub struct Route {
    pub spec: &'static CommandSpec,
    pub handler: Handler,
}

/// Maps command ids to handlers bound to a store
pub struct Dispatcher {
    store: Arc<dyn Store>,
    routes: HashMap<u32, Route>,
}

impl Dispatcher {
    /// Build the route table for every registered command
    pub fn new(store: Arc<dyn Store>) -> Self {
        let routes = COMMANDS
            .iter()
            .map(|spec| {
                (
                    spec.id.wire(),
                    Route {
                        spec,
                        handler: handler_for(spec.id),
                    },
                )
            })
            .collect();
        Self { store, routes }
    }

    /// Look up the route for a wire id
    pub fn route(&self, id: u32) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Execute a request and produce its reply
    ///
    /// Fails only when no route exists for the id, which means client and
    /// server disagree on the command table.
    pub fn dispatch(&self, request: &Request) -> Result<Reply> {
        let route = self
            .route(request.command)
            .ok_or(CaskError::UnregisteredCommand(request.command))?;

        let args = Args::new(request.args());
        let token_count = args.len() + 1;
        if !route.spec.arity.accepts(token_count) {
            tracing::debug!(
                "Rejected '{}' with {} tokens",
                route.spec.name,
                token_count
            );
            return Ok(Reply::error(&format!(
                "ERR wrong number of arguments for '{}'",
                route.spec.name
            )));
        }

        tracing::trace!("Dispatching '{}' ({} args)", route.spec.name, args.len());

        let reply = match (route.handler)(self.store.as_ref(), &args) {
            Ok(outcome) => outcome.into_reply(),
            Err(e) => Reply::error(&e.to_string()),
        };
        Ok(reply)
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Split request arguments with typed accessors
///
/// Indices are always in range for a request that passed the arity check.
pub struct Args<'a> {
    items: Vec<&'a [u8]>,
}

impl<'a> Args<'a> {
    pub fn new(items: Vec<&'a [u8]>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw argument bytes
    pub fn at(&self, i: usize) -> &'a [u8] {
        self.items[i]
    }

    /// Every argument from `i` on
    pub fn rest(&self, i: usize) -> &[&'a [u8]] {
        &self.items[i..]
    }

    /// Argument parsed as an integer
    pub fn int<T: FromStr>(&self, i: usize) -> StoreResult<T> {
        self.parse(i, "ERR value is not a valid integer")
    }

    /// Argument parsed as a float
    pub fn float(&self, i: usize) -> StoreResult<f64> {
        self.parse(i, "ERR value is not a valid float")
    }

    /// Arguments from `i` on, taken two at a time
    pub fn pairs(&self, i: usize) -> StoreResult<Vec<(&'a [u8], &'a [u8])>> {
        let rest = self.rest(i);
        if rest.len() % 2 != 0 {
            return Err(StoreError::InvalidArgument(
                "ERR wrong number of arguments: expected key value pairs".into(),
            ));
        }
        Ok(rest.chunks_exact(2).map(|c| (c[0], c[1])).collect())
    }

    fn parse<T: FromStr>(&self, i: usize, message: &str) -> StoreResult<T> {
        std::str::from_utf8(self.at(i))
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| StoreError::InvalidArgument(message.to_string()))
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn handler_for(id: CommandId) -> Handler {
    use CommandId::*;

    match id {
        // string
        Set => |s, a| s.set(a.at(0), a.at(1)).map(done),
        MSet => |s, a| s.mset(&a.pairs(0)?).map(done),
        SetNx => |s, a| s.setnx(a.at(0), a.at(1)).map(done),
        MSetNx => |s, a| s.msetnx(&a.pairs(0)?).map(done),
        Get => |s, a| s.get(a.at(0)).map(Outcome::Value),
        MGet => |s, a| s.mget(a.rest(0)).map(Outcome::Values),
        GetSet => |s, a| s.getset(a.at(0), a.at(1)).map(Outcome::Value),
        Remove => |s, a| s.remove(a.at(0)).map(done),
        SLen => |s, _| Ok(Outcome::Count(s.str_len())),

        // hash
        HSet => |s, a| s.hset(a.at(0), a.at(1), a.at(2)).map(done),
        HSetNx => |s, a| s.hsetnx(a.at(0), a.at(1), a.at(2)).map(done),
        HGet => |s, a| s.hget(a.at(0), a.at(1)).map(Outcome::Value),
        HGetAll => |s, a| s.hgetall(a.at(0)).map(values),
        HDel => |s, a| s.hdel(a.at(0), a.at(1)).map(done),
        HLen => |s, a| Ok(Outcome::Count(s.hlen(a.at(0)))),
        HExist => |s, a| Ok(Outcome::Flag(s.hexist(a.at(0), a.at(1)))),

        // list
        LPush => |s, a| s.lpush(a.at(0), a.rest(1)).map(done),
        LRPush => |s, a| s.rpush(a.at(0), a.rest(1)).map(done),
        LPop => |s, a| s.lpop(a.at(0)).map(Outcome::Value),
        LRPop => |s, a| s.rpop(a.at(0)).map(Outcome::Value),
        LInsert => |s, a| s.linsert(a.at(0), a.at(1), a.int(2)?).map(done),
        LRInsert => |s, a| s.rinsert(a.at(0), a.at(1), a.int(2)?).map(done),
        LSet => |s, a| s.lset(a.at(0), a.at(1), a.int(2)?).map(done),
        LRem => |s, a| s.lrem(a.at(0), a.at(1), a.int(2)?).map(done),
        LLen => |s, a| Ok(Outcome::Count(s.llen(a.at(0)))),
        LIndex => |s, a| s.lindex(a.at(0), a.int(1)?).map(Outcome::Value),
        LRange => |s, a| s.lrange(a.at(0), a.int(1)?, a.int(2)?).map(values),
        LExist => |s, a| Ok(Outcome::Flag(s.lexist(a.at(0), a.at(1)))),

        // set
        SAdd => |s, a| s.sadd(a.at(0), a.rest(1)).map(done),
        SRem => |s, a| s.srem(a.at(0), a.at(1)).map(done),
        SMove => |s, a| s.smove(a.at(0), a.at(1), a.at(2)).map(done),
        SUnion => |s, a| s.sunion(a.rest(0)).map(values),
        SDiff => |s, a| s.sdiff(a.rest(0)).map(values),
        SScan => |s, a| s.sscan(a.at(0)).map(values),
        SCard => |s, a| Ok(Outcome::Count(s.scard(a.at(0)))),
        SIsMember => |s, a| Ok(Outcome::Flag(s.sismember(a.at(0), a.at(1)))),

        // sorted set
        ZAdd => |s, a| s.zadd(a.at(0), a.float(1)?, a.at(2)).map(done),
        ZRem => |s, a| s.zrem(a.at(0), a.at(1)).map(done),
        ZScoreRange => |s, a| {
            s.zscore_range(a.at(0), a.float(1)?, a.float(2)?)
                .map(Outcome::Scored)
        },
        ZScore => |s, a| {
            let score = s.zscore(a.at(0), a.at(1));
            Ok(Outcome::Value(
                score.map(|v| crate::protocol::format_score(v).into_bytes()),
            ))
        },
        ZCard => |s, a| Ok(Outcome::Count(s.zcard(a.at(0)))),
        ZIsMember => |s, a| Ok(Outcome::Flag(s.zismember(a.at(0), a.at(1)))),
        ZTop => |s, a| s.ztop(a.at(0), a.int(1)?).map(Outcome::Scored),
    }
}

fn done<T>(_: T) -> Outcome {
    Outcome::Done
}

fn values(items: Vec<Vec<u8>>) -> Outcome {
    Outcome::Values(items.into_iter().map(Some).collect())
}
