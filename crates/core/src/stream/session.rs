use crate::stream::run::{AnalysisRun, RunPhase, RunUpdate};
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one run within a session. Chunks tagged with a run that is no
/// longer current are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(u64);

impl RunId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trims and upper-cases a user-entered ticker.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Owns the current run. Starting a run replaces the previous one wholesale,
/// so its step log and accumulator never leak into the next.
#[derive(Debug, Default)]
pub struct Session {
    last_id: u64,
    current: Option<AnalysisRun>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, raw_ticker: &str) -> anyhow::Result<RunId> {
        let ticker = normalize_ticker(raw_ticker);
        ensure!(!ticker.is_empty(), "ticker must be non-empty");

        self.last_id += 1;
        let id = RunId(self.last_id);
        if let Some(prev) = &self.current {
            if prev.phase() == RunPhase::Analyzing {
                tracing::info!(previous = %prev.id(), "superseding run still in progress");
            }
        }
        tracing::info!(run_id = %id, %ticker, "analysis run started");
        self.current = Some(AnalysisRun::new(id, ticker));
        Ok(id)
    }

    pub fn push_chunk(&mut self, run: RunId, chunk: &[u8]) -> Vec<RunUpdate> {
        self.run_mut(run)
            .map(|r| r.push_chunk(chunk))
            .unwrap_or_default()
    }

    pub fn finish(&mut self, run: RunId) -> Vec<RunUpdate> {
        self.run_mut(run).map(|r| r.finish()).unwrap_or_default()
    }

    pub fn fail(&mut self, run: RunId, message: impl Into<String>) -> Vec<RunUpdate> {
        self.run_mut(run)
            .map(|r| vec![r.fail(message)])
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<&AnalysisRun> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> RunPhase {
        self.current
            .as_ref()
            .map(AnalysisRun::phase)
            .unwrap_or(RunPhase::Idle)
    }

    pub fn dismiss_error(&mut self) {
        if let Some(run) = self.current.as_mut() {
            run.dismiss_error();
        }
    }

    fn run_mut(&mut self, run: RunId) -> Option<&mut AnalysisRun> {
        match self.current.as_mut() {
            Some(current) if current.id() == run => Some(current),
            _ => {
                tracing::debug!(run_id = %run, "dropping input for stale run");
                None
            }
        }
    }
}
