use crate::domain::persona::CompanyProfile;
use crate::domain::report::Recommendation;
use crate::report::text::{compile, section};
use regex::Regex;
use std::sync::LazyLock;

static RECOMMENDATION_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\*\*(Buy|Hold|Sell|Avoid)\*\*"));
static RECOMMENDATION_HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)##\s*1\.\s*Recommendation\s*\n"));
static SUMMARY_HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)##\s*2\.\s*Executive Summary\s*\n"));
static PROFILE_HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)##\s*3\.\s*Company Profile\s*\n"));

static NEXT_HEADING: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\n##\s"));
static NEXT_HEADING_OR_RULE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"\n##\s|\n---"));

static LIST_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?m)^[ \t]*[-*•][ \t]+"));
static BULLET: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"^[-*•]\s+"));

const PROFILE_LABELS: [&str; 8] = [
    "Business Model",
    "Products & Customers",
    "Revenue Model",
    "Revenue Quality",
    "Cost Structure",
    "Capital Intensity",
    "Growth Drivers",
    "Competitive Edge",
];

static PROFILE_RULES: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    PROFILE_LABELS
        .iter()
        .map(|label| compile(&format!(r"(?i)\*\*{}\*\*:\s*", regex::escape(label))))
        .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutiveSummary {
    pub summary: String,
    pub takeaways: Vec<String>,
}

/// First bolded `Buy`/`Hold`/`Sell`/`Avoid` tag in document order, `Hold` when
/// there is none.
pub fn extract_recommendation(report: &str) -> Recommendation {
    RECOMMENDATION_TAG
        .as_ref()
        .and_then(|re| re.captures(report))
        .and_then(|caps| caps.get(1))
        .and_then(|m| Recommendation::from_tag(m.as_str()))
        .unwrap_or_default()
}

/// Prose under `## 1. Recommendation` with the tag and list markers removed,
/// flattened to one line.
pub fn extract_recommendation_text(report: &str) -> String {
    let Some(body) = section(
        report,
        RECOMMENDATION_HEADING.as_ref(),
        NEXT_HEADING_OR_RULE.as_ref(),
    ) else {
        return String::new();
    };

    let mut text = body.to_string();
    if let Some(re) = RECOMMENDATION_TAG.as_ref() {
        text = re.replace_all(&text, "").into_owned();
    }
    if let Some(re) = LIST_MARKER.as_ref() {
        text = re.replace_all(&text, "").into_owned();
    }
    join_lines(&text)
}

pub fn extract_executive_summary(report: &str) -> ExecutiveSummary {
    let Some(body) = section(report, SUMMARY_HEADING.as_ref(), NEXT_HEADING.as_ref()) else {
        return ExecutiveSummary::default();
    };

    let mut paragraphs = Vec::new();
    let mut takeaways = Vec::new();
    for line in body.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match BULLET.as_ref().and_then(|re| re.find(line)) {
            Some(marker) => takeaways.push(line[marker.end()..].to_string()),
            None => paragraphs.push(line),
        }
    }

    ExecutiveSummary {
        summary: paragraphs.join(" "),
        takeaways,
    }
}

/// The eight labelled fields under `## 3. Company Profile`. Each field runs
/// from its bold label to the next line opening with `**`, or the section end.
pub fn extract_company_profile(report: &str) -> CompanyProfile {
    let Some(body) = section(report, PROFILE_HEADING.as_ref(), NEXT_HEADING.as_ref()) else {
        return CompanyProfile::default();
    };
    let body = body.trim();

    let mut fields = PROFILE_RULES
        .iter()
        .map(|rule| capture_field(body, rule.as_ref()));
    let mut next = || fields.next().unwrap_or_default();

    CompanyProfile {
        business_model: next(),
        what_they_sell_and_who_buys: next(),
        how_they_make_money: next(),
        revenue_quality: next(),
        cost_structure: next(),
        capital_intensity: next(),
        growth_drivers: next(),
        competitive_edge: next(),
    }
}

fn capture_field(body: &str, label: Option<&Regex>) -> String {
    let Some(start) = label.and_then(|re| re.find(body)).map(|m| m.end()) else {
        return String::new();
    };
    let rest = &body[start..];
    let end = rest.find("\n**").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

fn join_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
