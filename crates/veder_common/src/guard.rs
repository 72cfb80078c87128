//! Sequence guard for overlapping queries.
//!
//! Every submitted query takes a ticket from a monotonically increasing
//! counter. In-flight requests are never cancelled; when one resolves, its
//! outcome is kept only if its ticket is still the latest issued. A slow
//! response to an older query therefore cannot overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;
use veder_shared::{Report, VederError};

/// Ticket identifying one submitted query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct SequenceGuard {
    latest: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket; it supersedes all earlier ones
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// Status of the most recent query
#[derive(Debug)]
pub enum QueryState {
    Idle,
    Pending { seq: u64 },
    Complete { seq: u64, report: Box<Report> },
    Failed { seq: u64, code: i32, message: String },
}

impl QueryState {
    pub fn label(&self) -> &'static str {
        match self {
            QueryState::Idle => "idle",
            QueryState::Pending { .. } => "pending",
            QueryState::Complete { .. } => "complete",
            QueryState::Failed { .. } => "error",
        }
    }
}

/// Holds the displayed outcome, updated only by the latest ticket
#[derive(Debug)]
pub struct LatestReport {
    guard: SequenceGuard,
    state: Mutex<QueryState>,
}

impl Default for LatestReport {
    fn default() -> Self {
        Self {
            guard: SequenceGuard::new(),
            state: Mutex::new(QueryState::Idle),
        }
    }
}

impl LatestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query: issue a ticket and mark the slot pending.
    /// The previous report is discarded.
    pub fn begin(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let ticket = self.guard.issue();
        *state = QueryState::Pending { seq: ticket.seq() };
        ticket
    }

    /// Record an outcome. Returns false and drops it when `ticket` was superseded.
    pub fn complete(&self, ticket: Ticket, outcome: Result<&Report, &VederError>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !self.guard.is_latest(ticket) {
            debug!(
                "Discarding superseded result seq={} (latest={})",
                ticket.seq(),
                self.guard.latest_seq()
            );
            return false;
        }
        *state = match outcome {
            Ok(report) => QueryState::Complete {
                seq: ticket.seq(),
                report: Box::new(report.clone()),
            },
            Err(error) => QueryState::Failed {
                seq: ticket.seq(),
                code: error.code(),
                message: error.to_string(),
            },
        };
        true
    }

    /// Copy of the currently displayed report, if the latest query succeeded
    pub fn report(&self) -> Option<Report> {
        match &*self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            QueryState::Complete { report, .. } => Some((**report).clone()),
            _ => None,
        }
    }

    /// Error message of the latest query, if it failed
    pub fn error_message(&self) -> Option<String> {
        match &*self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            QueryState::Failed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).label()
    }

    /// Sequence number of the state currently held (0 when idle)
    pub fn current_seq(&self) -> u64 {
        match &*self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            QueryState::Idle => 0,
            QueryState::Pending { seq } | QueryState::Complete { seq, .. } | QueryState::Failed { seq, .. } => *seq,
        }
    }

    /// User-initiated reset after an error
    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = QueryState::Idle;
    }
}
