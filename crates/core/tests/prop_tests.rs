use analyst_core::domain::step::StepKind;
use analyst_core::stream::run::{AnalysisRun, RunPhase};
use analyst_core::stream::session::RunId;
use proptest::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn frame(v: serde_json::Value) -> String {
    format!("data: {v}\n\n")
}

/// A realistic pipeline stream, including frames the reducer must skip.
fn sample_body() -> Vec<u8> {
    let report = "## 1. Recommendation\n**Buy**\nStrong moat.\n\n## 2. Executive Summary\nÉlan continues • steady.\n- Margin expansion\n";
    let mut body = String::new();
    body.push_str(&frame(json!({"type": "start", "message": "Starting analysis pipeline..."})));
    body.push_str(": keep-alive comment\n\n");
    body.push_str(&frame(json!({"type": "step", "node": "planner", "label": "Understanding your request", "message": "Identified ticker: ASML", "ticker": "ASML"})));
    body.push_str("data: {broken json\n\n");
    body.push_str(&frame(json!({"type": "status", "node": "analysis", "label": "Persona", "message": "Zürich desk — 分析中"})));
    body.push_str(&frame(json!({"type": "step", "node": "stock_info", "financial_info": "### yfinance Company Info\n{\"trailingPE\": 35.1}\n"})));
    body.push_str(&frame(json!({"type": "step", "node": "analysis", "persona_analyses": [
        {"persona_name": "Value", "executive_summary": {"overall_view": "Bullish on pricing power.", "profit_outlook": "growth", "risk_assessment": "Cyclical semiconductor demand"}},
        {"persona_name": "Macro", "executive_summary": {"overall_view": "Bearish given export limits.", "profit_outlook": "growth", "risk_assessment": "Geopolitics dominate outlook"}}
    ]})));
    body.push_str(&frame(json!({"type": "heartbeat"})));
    body.push_str(&frame(json!({"type": "step", "node": "generate_report", "report": report})));
    body.push_str(&frame(json!({"type": "complete"})));
    body.into_bytes()
}

/// Step log without the parts that legitimately differ between runs
/// (status ids are random, timestamps are wall-clock).
fn log_view(run: &AnalysisRun) -> Vec<(Option<String>, String, String, String, StepKind)> {
    run.steps()
        .iter()
        .map(|s| {
            let id = (s.kind == StepKind::Step).then(|| s.id.clone());
            (id, s.node.clone(), s.label.clone(), s.message.clone(), s.kind)
        })
        .collect()
}

fn feed(body: &[u8], cuts: &[usize]) -> AnalysisRun {
    let mut run = AnalysisRun::new(RunId::new(1), "ASML");
    let mut start = 0;
    for &cut in cuts {
        run.push_chunk(&body[start..cut]);
        start = cut;
    }
    run.push_chunk(&body[start..]);
    run.finish();
    run
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    // Splitting the body at arbitrary byte offsets, including inside frames,
    // delimiters and multi-byte characters, must not change the outcome.
    #[test]
    fn chunk_boundaries_do_not_change_outcome(
        raw_cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..16)
    ) {
        let body = sample_body();
        let mut cuts: Vec<usize> = raw_cuts.iter().map(|i| i.index(body.len() + 1)).collect();
        cuts.sort_unstable();
        cuts.dedup();

        let whole = feed(&body, &[]);
        let split = feed(&body, &cuts);

        prop_assert_eq!(log_view(&split), log_view(&whole));
        prop_assert_eq!(split.accumulator(), whole.accumulator());
        prop_assert_eq!(split.report(), whole.report());
        prop_assert_eq!(split.phase(), RunPhase::Done);
    }

    // The report ticker is the last non-empty streamed ticker, or the
    // submitted one if the stream never named one.
    #[test]
    fn report_ticker_is_last_streamed_or_submitted(
        streamed in proptest::collection::vec(proptest::option::of("[A-Z]{0,5}"), 0..6)
    ) {
        let mut body = String::new();
        for (i, ticker) in streamed.iter().enumerate() {
            let mut v = json!({"type": "step", "node": format!("node_{i}")});
            if let Some(t) = ticker {
                v["ticker"] = json!(t);
            }
            body.push_str(&frame(v));
        }
        body.push_str(&frame(json!({"type": "step", "node": "generate_report", "report": "**Hold**"})));
        body.push_str(&frame(json!({"type": "complete"})));

        let run = feed(body.as_bytes(), &[]);
        let expected = streamed
            .iter()
            .flatten()
            .filter(|t| !t.is_empty())
            .last()
            .cloned()
            .unwrap_or_else(|| "ASML".to_string());

        let report = run.report();
        prop_assert!(report.is_some());
        prop_assert_eq!(report.map(|r| r.ticker.clone()), Some(expected));
    }

    // Any body ending in a report step but no `complete` still yields a report.
    #[test]
    fn fallback_always_produces_report(report in "[a-zA-Z0-9 .*#\n]{1,80}") {
        let body = frame(json!({"type": "step", "node": "generate_report", "report": report}));
        let run = feed(body.as_bytes(), &[]);
        prop_assert!(run.report().is_some());
        prop_assert_eq!(run.phase(), RunPhase::Done);
    }
}
