use crate::domain::event::{StatusPayload, StepPayload, StreamEvent};
use crate::domain::persona::{CompanyProfile, PersonaAnalysisData};
use crate::domain::report::ReportData;
use crate::domain::step::{StepKind, StepStatus, ThinkingStep};
use crate::report::parse_report;
use crate::stream::frame::{decode_frame, FrameDecoder};
use crate::stream::session::RunId;
use serde::{Deserialize, Serialize};

const START_STEP_ID: &str = "start";
const START_STEP_LABEL: &str = "Pipeline Started";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Analyzing,
    Done,
    Error,
}

/// Latest values seen mid-stream for the fields only needed at completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub ticker: String,
    pub financial_info: String,
    pub persona_analyses: Vec<PersonaAnalysisData>,
    pub report: String,
    pub company_profile: Option<CompanyProfile>,
}

impl Accumulator {
    /// Overwrites each field the step carries a non-empty value for.
    fn absorb(&mut self, step: &mut StepPayload) {
        if let Some(ticker) = step.ticker.take().filter(|s| !s.is_empty()) {
            self.ticker = ticker;
        }
        if let Some(info) = step.financial_info.take().filter(|s| !s.is_empty()) {
            self.financial_info = info;
        }
        if let Some(analyses) = step.persona_analyses.take().filter(|v| !v.is_empty()) {
            self.persona_analyses = analyses;
        }
        if let Some(report) = step.report.take().filter(|s| !s.is_empty()) {
            self.report = report;
        }
        if let Some(profile) = step.company_profile.take().filter(|p| !p.is_empty()) {
            self.company_profile = Some(profile);
        }
    }
}

/// A state transition the UI should render, emitted in frame order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
    StepAppended(ThinkingStep),
    ReportReady,
    Failed(String),
}

/// Serializable view of a run for callers outside the reducer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub ticker: String,
    pub phase: RunPhase,
    pub steps: Vec<ThinkingStep>,
    pub steps_collapsed: bool,
    pub report: Option<ReportData>,
    pub error: Option<String>,
}

/// State of one analysis run: the step log, the accumulator and, once the
/// stream completes, the parsed report.
#[derive(Debug)]
pub struct AnalysisRun {
    id: RunId,
    ticker: String,
    decoder: FrameDecoder,
    phase: RunPhase,
    steps: Vec<ThinkingStep>,
    accumulator: Accumulator,
    report: Option<ReportData>,
    error: Option<String>,
    steps_collapsed: bool,
    closed: bool,
}

impl AnalysisRun {
    pub fn new(id: RunId, ticker: impl Into<String>) -> Self {
        Self {
            id,
            ticker: ticker.into(),
            decoder: FrameDecoder::new(),
            phase: RunPhase::Analyzing,
            steps: Vec::new(),
            accumulator: Accumulator::default(),
            report: None,
            error: None,
            steps_collapsed: false,
            closed: false,
        }
    }

    /// Feeds one transport chunk and returns the updates caused by every frame
    /// it completed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<RunUpdate> {
        if self.closed {
            tracing::debug!(run_id = %self.id, "chunk after transport close ignored");
            return Vec::new();
        }

        let mut updates = Vec::new();
        for frame in self.decoder.push(chunk) {
            if let Some(event) = decode_frame(&frame) {
                updates.extend(self.apply(event));
            }
        }
        updates
    }

    pub fn apply(&mut self, event: StreamEvent) -> Vec<RunUpdate> {
        match event {
            StreamEvent::Start { message } => {
                let step = ThinkingStep::completed(
                    START_STEP_ID,
                    START_STEP_ID,
                    START_STEP_LABEL,
                    message.unwrap_or_default(),
                    StepKind::Step,
                );
                vec![self.append(step)]
            }
            StreamEvent::Status(StatusPayload {
                node,
                label,
                message,
            }) => {
                let step = ThinkingStep::completed(
                    format!("status-{}", uuid::Uuid::new_v4()),
                    node.unwrap_or_default(),
                    label.unwrap_or_default(),
                    message.unwrap_or_default(),
                    StepKind::Status,
                );
                vec![self.append(step)]
            }
            StreamEvent::Step(mut payload) => {
                let node = payload.node.take().unwrap_or_default();
                let label = payload
                    .label
                    .take()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| node.clone());
                let message = payload.message.take().unwrap_or_default();
                let step =
                    ThinkingStep::completed(node.clone(), node, label, message, StepKind::Step);
                let update = self.append(step);
                self.accumulator.absorb(&mut payload);
                vec![update]
            }
            StreamEvent::Complete {} => vec![self.complete()],
            StreamEvent::Error { message } => {
                vec![self.fail(message.unwrap_or_default())]
            }
            StreamEvent::Unknown => {
                tracing::debug!(run_id = %self.id, "ignoring event of unknown type");
                Vec::new()
            }
        }
    }

    /// Called once the transport reports end of data. Processes a trailing
    /// undelimited frame, then synthesizes completion if the backend never
    /// sent one but a report body did arrive.
    pub fn finish(&mut self) -> Vec<RunUpdate> {
        if self.closed {
            return Vec::new();
        }

        let mut updates = Vec::new();
        if let Some(tail) = self.decoder.finish() {
            if let Some(event) = decode_frame(&tail) {
                updates.extend(self.apply(event));
            }
        }
        self.closed = true;

        if self.report.is_none()
            && self.phase != RunPhase::Error
            && !self.accumulator.report.is_empty()
        {
            tracing::info!(
                run_id = %self.id,
                "stream ended without complete event; building report from accumulated fields"
            );
            updates.push(self.complete());
        }
        updates
    }

    /// Records a terminal failure, either reported by the backend or raised by
    /// the transport.
    pub fn fail(&mut self, message: impl Into<String>) -> RunUpdate {
        let message = message.into();
        tracing::warn!(run_id = %self.id, error = %message, "analysis run failed");
        self.error = Some(message.clone());
        self.phase = RunPhase::Error;
        RunUpdate::Failed(message)
    }

    fn complete(&mut self) -> RunUpdate {
        let acc = &self.accumulator;
        let ticker = if acc.ticker.is_empty() {
            self.ticker.as_str()
        } else {
            acc.ticker.as_str()
        };

        let report = parse_report(
            ticker,
            &acc.report,
            &acc.financial_info,
            &acc.persona_analyses,
            acc.company_profile.as_ref(),
        );
        tracing::info!(
            run_id = %self.id,
            ticker = %report.ticker,
            recommendation = %report.recommendation,
            analysts = report.analysts.len(),
            consensus = report.consensus_score,
            "report ready"
        );

        self.report = Some(report);
        self.phase = RunPhase::Done;
        self.steps_collapsed = true;
        RunUpdate::ReportReady
    }

    fn append(&mut self, step: ThinkingStep) -> RunUpdate {
        tracing::debug!(run_id = %self.id, node = %step.node, kind = ?step.kind, "step appended");
        self.steps.push(step.clone());
        RunUpdate::StepAppended(step)
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    /// The ticker as submitted, before any value the backend reports.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn steps(&self) -> &[ThinkingStep] {
        &self.steps
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn report(&self) -> Option<&ReportData> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn steps_collapsed(&self) -> bool {
        self.steps_collapsed
    }

    pub fn toggle_steps_collapsed(&mut self) {
        self.steps_collapsed = !self.steps_collapsed;
    }

    /// Number of completed pipeline steps, as shown on the collapsed log.
    pub fn completed_step_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Step && s.status == StepStatus::Completed)
            .count()
    }

    /// Clears an error so the user can start over.
    pub fn dismiss_error(&mut self) {
        if self.phase == RunPhase::Error {
            self.phase = RunPhase::Idle;
            self.error = None;
        }
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            run_id: self.id,
            ticker: self.ticker.clone(),
            phase: self.phase,
            steps: self.steps.clone(),
            steps_collapsed: self.steps_collapsed,
            report: self.report.clone(),
            error: self.error.clone(),
        }
    }
}
