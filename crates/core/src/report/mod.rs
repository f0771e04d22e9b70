pub mod analysts;
pub mod metrics;
pub mod sections;
mod text;

use crate::domain::persona::{CompanyProfile, PersonaAnalysisData};
use crate::domain::report::ReportData;

pub use analysts::{
    build_analyst_cards, compute_consensus, determine_sentiment, extract_first_sentence,
    find_agreements, find_disagreements,
};
pub use metrics::extract_metrics;
pub use sections::{
    extract_company_profile, extract_executive_summary, extract_recommendation,
    extract_recommendation_text, ExecutiveSummary,
};

/// Builds the report model. Each extractor only blanks its own fields when
/// its section is missing or malformed. A structured company profile, when
/// the pipeline supplied one, replaces the profile parsed from the markdown.
pub fn parse_report(
    ticker: &str,
    report: &str,
    financial_info: &str,
    persona_analyses: &[PersonaAnalysisData],
    structured_profile: Option<&CompanyProfile>,
) -> ReportData {
    let ExecutiveSummary { summary, takeaways } = extract_executive_summary(report);
    let company_profile = match structured_profile {
        Some(profile) => profile.clone(),
        None => extract_company_profile(report),
    };
    let analysts = build_analyst_cards(persona_analyses);

    ReportData {
        ticker: ticker.to_string(),
        recommendation: extract_recommendation(report),
        recommendation_text: extract_recommendation_text(report),
        executive_summary: summary,
        key_takeaways: takeaways,
        company_profile,
        agreements: find_agreements(&analysts),
        disagreements: find_disagreements(&analysts),
        consensus_score: compute_consensus(&analysts),
        metrics: extract_metrics(financial_info),
        financial_info: financial_info.to_string(),
        analysts,
    }
}
