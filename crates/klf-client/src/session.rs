//! Session-id allocation.
//!
//! Multi-step gateway operations (`GW_COMMAND_SEND_REQ` and friends) are
//! tagged with a 16-bit session id from initiation through the terminal
//! `GW_SESSION_FINISHED_NTF`. The pool hands out unique ids and reclaims
//! them when the terminal notification arrives.

use std::collections::BTreeSet;

use thiserror::Error;

/// Every session id is live; nothing can be allocated until one finishes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no session id available")]
pub struct NoSessionIdAvailable;

/// Registry of live session ids.
///
/// Allocation is `max(live) + 1` below saturation, which approximates
/// monotonic issuance and keeps just-released ids out of circulation for a
/// while; once the top of the range is reached it wraps to the smallest
/// unused id.
#[derive(Debug, Default)]
pub struct SessionPool {
    live: BTreeSet<u16>,
}

impl SessionPool {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh session id.
    ///
    /// # Errors
    ///
    /// [`NoSessionIdAvailable`] when all 65536 ids are live.
    pub fn allocate(&mut self) -> Result<u16, NoSessionIdAvailable> {
        let id = match self.live.last() {
            None => 0,
            Some(&max) if max < u16::MAX => max + 1,
            Some(_) => self.smallest_unused()?,
        };
        self.live.insert(id);
        Ok(id)
    }

    fn smallest_unused(&self) -> Result<u16, NoSessionIdAvailable> {
        let mut candidate: u16 = 0;
        for &used in &self.live {
            if used > candidate {
                break;
            }
            // used == candidate: this one is taken, try the next value.
            candidate = candidate.checked_add(1).ok_or(NoSessionIdAvailable)?;
        }
        Ok(candidate)
    }

    /// Return a session id to the pool.
    ///
    /// Returns false if the id was not live. That happens when a session was
    /// cancelled locally and its terminal notification arrives afterwards;
    /// the caller logs it instead of failing.
    pub fn release(&mut self, id: u16) -> bool {
        self.live.remove(&id)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
