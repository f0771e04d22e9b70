use analyst_core::domain::report::{FinancialMetrics, ReportData};
use std::fmt;

/// Plain-text rendering of a report for terminal output.
pub struct TextReport<'a>(pub &'a ReportData);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(
            f,
            "{} | {} | consensus {}/100",
            report.ticker, report.recommendation, report.consensus_score
        )?;
        if !report.recommendation_text.is_empty() {
            writeln!(f, "{}", report.recommendation_text)?;
        }

        if !report.executive_summary.is_empty() || !report.key_takeaways.is_empty() {
            writeln!(f, "\nExecutive summary")?;
            if !report.executive_summary.is_empty() {
                writeln!(f, "{}", report.executive_summary)?;
            }
            for takeaway in &report.key_takeaways {
                writeln!(f, "  - {takeaway}")?;
            }
        }

        let metrics = metric_lines(&report.metrics);
        if !metrics.is_empty() {
            writeln!(f, "\nMetrics")?;
            for line in metrics {
                writeln!(f, "  {line}")?;
            }
        }

        if !report.analysts.is_empty() {
            writeln!(f, "\nAnalysts")?;
            for card in &report.analysts {
                writeln!(
                    f,
                    "  {} {} ({}, {}): {}",
                    card.icon, card.name, card.archetype, card.sentiment, card.headline
                )?;
            }
        }

        for agreement in &report.agreements {
            writeln!(f, "\n+ {agreement}")?;
        }
        for disagreement in &report.disagreements {
            writeln!(f, "\n! {disagreement}")?;
        }
        Ok(())
    }
}

fn metric_lines(m: &FinancialMetrics) -> Vec<String> {
    let numeric = [
        ("P/E", m.pe_ratio),
        ("Forward P/E", m.peer_pe_avg),
        ("EPS (trailing)", m.eps_current),
        ("EPS (forward)", m.eps_previous),
    ];
    let mut lines: Vec<String> = numeric
        .iter()
        .filter_map(|(label, v)| v.map(|v| format!("{label}: {v:.2}")))
        .collect();
    if let Some(fcf) = &m.free_cash_flow {
        lines.push(format!("Free cash flow: {fcf}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::report::parse_report;

    #[test]
    fn renders_headline_and_metrics() {
        let report = parse_report(
            "AAPL",
            "## 1. Recommendation\n**Buy**\nCash machine.\n",
            "### yfinance Company Info\n{\"trailingPE\": 30}\n",
            &[],
            None,
        );
        let text = TextReport(&report).to_string();
        assert!(text.starts_with("AAPL | Buy | consensus 50/100\nCash machine.\n"));
        assert!(text.contains("P/E: 30.00"));
        assert!(!text.contains("Analysts"));
    }
}
