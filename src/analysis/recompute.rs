//! Latest-wins powder factor recomputation
//!
//! A dashboard control re-issues the powder factor query every time rock
//! density or bench height changes. Responses may complete out of order, so
//! every request is tagged with a monotonically increasing sequence number
//! and only the completion for the most recently issued request is applied.
//! A completion for a superseded request is dropped even if it arrives last.
//!
//! Applied results are published on a `tokio::sync::watch` channel.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use super::{powder_factor, AnalysisError};
use crate::types::{HoleRecord, PowderFactorParams};

/// Handle for one issued recompute request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeTicket {
    pub seq: u64,
    pub rock_density_t_m3: f64,
    pub bench_height_m: f64,
}

/// Result that was accepted as current.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPowderFactor {
    pub seq: u64,
    pub rock_density_t_m3: f64,
    pub bench_height_m: f64,
    pub result: Result<Option<f64>, AnalysisError>,
}

/// What happened to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Matched the latest request and was published
    Applied,
    /// A newer request had been issued; result dropped
    Stale,
    /// Ticket was unknown or already resolved
    Unknown,
}

#[derive(Debug, Default)]
struct Inflight {
    next_seq: u64,
    /// Outstanding requests keyed by sequence number
    pending: BTreeMap<u64, RecomputeTicket>,
}

/// Arbitrates out-of-order recompute completions.
#[derive(Debug)]
pub struct RecomputeCoordinator {
    inflight: Mutex<Inflight>,
    tx: watch::Sender<Option<AppliedPowderFactor>>,
}

impl Default for RecomputeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecomputeCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inflight: Mutex::new(Inflight::default()),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inflight> {
        // State stays consistent across a panic in another holder
        self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a new request for the given parameters.
    pub fn issue(&self, rock_density_t_m3: f64, bench_height_m: f64) -> RecomputeTicket {
        let mut inflight = self.lock();
        inflight.next_seq += 1;
        let ticket = RecomputeTicket {
            seq: inflight.next_seq,
            rock_density_t_m3,
            bench_height_m,
        };
        inflight.pending.insert(ticket.seq, ticket);
        ticket
    }

    /// Sequence number of the most recently issued request (0 if none).
    pub fn latest_seq(&self) -> u64 {
        self.lock().next_seq
    }

    /// Number of issued requests that have not completed yet.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Deliver the result of a request.
    ///
    /// Only the latest issued request is applied. Applying it also discards
    /// every older outstanding request, whose results can no longer win.
    pub fn complete(
        &self,
        ticket: RecomputeTicket,
        result: Result<Option<f64>, AnalysisError>,
    ) -> Resolution {
        let mut inflight = self.lock();

        if inflight.pending.remove(&ticket.seq).is_none() {
            return Resolution::Unknown;
        }

        if ticket.seq != inflight.next_seq {
            debug!(
                seq = ticket.seq,
                latest = inflight.next_seq,
                "Dropping stale powder factor result"
            );
            return Resolution::Stale;
        }

        inflight.pending.retain(|&seq, _| seq > ticket.seq);

        // Publish while locked; no newer request can complete in between
        self.tx.send_replace(Some(AppliedPowderFactor {
            seq: ticket.seq,
            rock_density_t_m3: ticket.rock_density_t_m3,
            bench_height_m: ticket.bench_height_m,
            result,
        }));
        drop(inflight);
        Resolution::Applied
    }

    /// Most recently applied result.
    pub fn current(&self) -> Option<AppliedPowderFactor> {
        self.tx.borrow().clone()
    }

    /// Subscribe to applied results.
    pub fn subscribe(&self) -> watch::Receiver<Option<AppliedPowderFactor>> {
        self.tx.subscribe()
    }

    /// Issue a request and compute it on the blocking pool.
    ///
    /// The computation always runs to completion; whether its result is
    /// published depends on what else was issued meanwhile.
    pub async fn recompute(
        &self,
        holes: Arc<[HoleRecord]>,
        rock_density_t_m3: f64,
        bench_height_m: f64,
    ) -> Resolution {
        let ticket = self.issue(rock_density_t_m3, bench_height_m);
        let result = tokio::task::spawn_blocking(move || {
            PowderFactorParams::new(rock_density_t_m3, bench_height_m)
                .map(|params| powder_factor::powder_factor_breakdown(&holes, params).powder_factor_kg_m3)
        })
        .await;

        match result {
            Ok(result) => self.complete(ticket, result),
            Err(e) => {
                debug!(seq = ticket.seq, error = %e, "Powder factor task did not finish");
                self.abandon(ticket);
                Resolution::Unknown
            }
        }
    }

    /// Forget a request without publishing anything.
    pub fn abandon(&self, ticket: RecomputeTicket) {
        self.lock().pending.remove(&ticket.seq);
    }
}
