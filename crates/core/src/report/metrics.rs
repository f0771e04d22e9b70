use crate::domain::report::FinancialMetrics;
use crate::report::text::{compile, section};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static COMPANY_INFO_HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"### yfinance Company Info\s*\n"));
static NEXT_HEADING: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\n##"));

/// Reads the `### yfinance Company Info` JSON block of the financial-info
/// text. Any failure yields all-null metrics.
///
/// PEG ratio, gross margins and revenue growth have no source field in that
/// block and are always null.
pub fn extract_metrics(financial_info: &str) -> FinancialMetrics {
    let Some(body) = section(
        financial_info,
        COMPANY_INFO_HEADING.as_ref(),
        NEXT_HEADING.as_ref(),
    ) else {
        return FinancialMetrics::default();
    };

    let info = match serde_json::from_str::<Value>(body.trim()) {
        Ok(info) => info,
        Err(err) => {
            tracing::debug!(error = %err, "company info block is not valid JSON");
            return FinancialMetrics::default();
        }
    };

    FinancialMetrics {
        pe_ratio: parse_number(info.get("trailingPE")),
        peg_ratio: None,
        gross_margin_current: None,
        gross_margin_previous: None,
        revenue_growth_current: None,
        free_cash_flow: stringify(info.get("freeCashflow")),
        eps_current: parse_number(info.get("trailingEps")),
        eps_previous: parse_number(info.get("forwardEps")),
        peer_pe_avg: parse_number(info.get("forwardPE")),
    }
}

fn parse_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "N/A" {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn stringify(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            // Whole floats print without a trailing ".0".
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => Some(format!("{f:.0}")),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    }
}
