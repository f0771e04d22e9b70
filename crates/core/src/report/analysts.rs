use crate::domain::persona::PersonaAnalysisData;
use crate::domain::report::{AnalystCard, Sentiment};
use crate::report::text::compile;
use regex::Regex;
use std::sync::LazyLock;

const ANALYST_ICONS: [&str; 4] = ["📊", "🔍", "🌐", "📈"];
const ANALYST_ARCHETYPES: [&str; 4] = [
    "Value Analyst",
    "Growth Analyst",
    "Macro Strategist",
    "Quantitative Analyst",
];

const SENTENCE_FALLBACK_CHARS: usize = 120;
const SUBSTANTIVE_RISK_CHARS: usize = 20;
const NEUTRAL_CONSENSUS: u32 = 50;

static BULLISH_WORDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:bullish|buy|optimistic)\b"));
static BEARISH_WORDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:bearish|sell|avoid|pessimistic)\b"));

/// Keyword classification of an analyst's overall view. Bullish wins when
/// both keyword sets appear.
pub fn determine_sentiment(overall_view: &str) -> Sentiment {
    let mentions = |words: &LazyLock<Option<Regex>>| {
        words
            .as_ref()
            .is_some_and(|re| re.is_match(overall_view))
    };

    if mentions(&BULLISH_WORDS) {
        Sentiment::Bullish
    } else if mentions(&BEARISH_WORDS) {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Text up to and including the first `.`, `!` or `?`; the first 120
/// characters when there is no terminator.
pub fn extract_first_sentence(text: &str) -> String {
    match text.find(['.', '!', '?']) {
        Some(end) => text[..=end].trim().to_string(),
        None => text.chars().take(SENTENCE_FALLBACK_CHARS).collect(),
    }
}

/// One card per persona, in input order. Icon and archetype rotate by
/// position, independent of content.
pub fn build_analyst_cards(personas: &[PersonaAnalysisData]) -> Vec<AnalystCard> {
    personas
        .iter()
        .enumerate()
        .map(|(i, pa)| {
            let summary = &pa.executive_summary;
            AnalystCard {
                name: pa.persona_name.clone(),
                icon: ANALYST_ICONS[i % ANALYST_ICONS.len()].to_string(),
                archetype: ANALYST_ARCHETYPES[i % ANALYST_ARCHETYPES.len()].to_string(),
                headline: extract_first_sentence(&summary.overall_view),
                key_stat: extract_first_sentence(&summary.profit_outlook),
                key_quote: extract_first_sentence(&summary.risk_assessment),
                sentiment: determine_sentiment(&summary.overall_view),
                profit_outlook: summary.profit_outlook.clone(),
                risk_assessment: summary.risk_assessment.clone(),
                overall_view: summary.overall_view.clone(),
                business_model: pa.business_model.clone(),
                what_they_sell_and_who_buys: pa.what_they_sell_and_who_buys.clone(),
                how_they_make_money: pa.how_they_make_money.clone(),
                revenue_quality: pa.revenue_quality.clone(),
                cost_structure: pa.cost_structure.clone(),
                capital_intensity: pa.capital_intensity.clone(),
                growth_drivers: pa.growth_drivers.clone(),
                competitive_edge: pa.competitive_edge.clone(),
            }
        })
        .collect()
}

/// Mean sentiment score (bullish 80, neutral 50, bearish 20), rounded.
pub fn compute_consensus(analysts: &[AnalystCard]) -> u32 {
    if analysts.is_empty() {
        return NEUTRAL_CONSENSUS;
    }
    let total: u32 = analysts.iter().map(|a| a.sentiment.score()).sum();
    (f64::from(total) / analysts.len() as f64).round() as u32
}

pub fn find_agreements(analysts: &[AnalystCard]) -> Vec<String> {
    if analysts.len() < 2 {
        return Vec::new();
    }

    let mut agreements = Vec::new();
    if let Some(sentiment) = unanimous_sentiment(analysts) {
        agreements.push(format!("All analysts share a {sentiment} outlook"));
    }

    let all_mention_growth = analysts.iter().all(|a| {
        contains_ignore_case(&a.profit_outlook, "growth")
            || contains_ignore_case(&a.growth_drivers, "growth")
    });
    if all_mention_growth {
        agreements.push("All analysts identify growth as a key factor".to_string());
    }

    let all_assess_risk = analysts
        .iter()
        .all(|a| a.risk_assessment.chars().count() > SUBSTANTIVE_RISK_CHARS);
    if all_assess_risk && agreements.is_empty() {
        agreements.push("All analysts provide substantive risk assessments".to_string());
    }

    agreements
}

pub fn find_disagreements(analysts: &[AnalystCard]) -> Vec<String> {
    if analysts.len() < 2 || unanimous_sentiment(analysts).is_some() {
        return Vec::new();
    }

    let names_with = |sentiment: Sentiment| {
        analysts
            .iter()
            .filter(|a| a.sentiment == sentiment)
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
    };
    let bulls = names_with(Sentiment::Bullish);
    let bears = names_with(Sentiment::Bearish);
    if bulls.is_empty() || bears.is_empty() {
        return Vec::new();
    }

    vec![format!(
        "{} {} bullish while {} {} bearish",
        bulls.join(", "),
        verb_for(bulls.len()),
        bears.join(", "),
        verb_for(bears.len()),
    )]
}

fn unanimous_sentiment(analysts: &[AnalystCard]) -> Option<Sentiment> {
    let first = analysts.first()?.sentiment;
    analysts
        .iter()
        .all(|a| a.sentiment == first)
        .then_some(first)
}

fn verb_for(count: usize) -> &'static str {
    if count == 1 {
        "is"
    } else {
        "are"
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::ExecutiveSummaryData;

    fn persona(name: &str, overall_view: &str, profit_outlook: &str, risk: &str) -> PersonaAnalysisData {
        PersonaAnalysisData {
            persona_name: name.to_string(),
            executive_summary: ExecutiveSummaryData {
                profit_outlook: profit_outlook.to_string(),
                risk_assessment: risk.to_string(),
                overall_view: overall_view.to_string(),
            },
            ..Default::default()
        }
    }

    fn cards(views: &[(&str, &str)]) -> Vec<AnalystCard> {
        let personas: Vec<_> = views
            .iter()
            .map(|(name, view)| persona(name, view, "", ""))
            .collect();
        build_analyst_cards(&personas)
    }

    #[test]
    fn sentiment_keywords() {
        assert_eq!(determine_sentiment("We remain bullish on growth"), Sentiment::Bullish);
        assert_eq!(determine_sentiment("Pessimistic about margins"), Sentiment::Bearish);
        assert_eq!(determine_sentiment("Stable outlook"), Sentiment::Neutral);
        assert_eq!(determine_sentiment("Not a buy yet, but not a sell"), Sentiment::Bullish);
        assert_eq!(determine_sentiment("We would AVOID it."), Sentiment::Bearish);
        // Whole words only.
        assert_eq!(determine_sentiment("Buyback-driven upside is limited by the sellers' market"), Sentiment::Neutral);
    }

    #[test]
    fn first_sentence_or_prefix() {
        assert_eq!(extract_first_sentence("  Strong quarter. Weak guide."), "Strong quarter.");
        assert_eq!(extract_first_sentence("Wow! Really?"), "Wow!");
        let long = "x".repeat(200);
        assert_eq!(extract_first_sentence(&long).len(), 120);
        assert_eq!(extract_first_sentence(""), "");
    }

    #[test]
    fn icons_and_archetypes_rotate_by_index() {
        let cards = cards(&[("a", ""), ("b", ""), ("c", ""), ("d", ""), ("e", "")]);
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].icon, "📊");
        assert_eq!(cards[1].archetype, "Growth Analyst");
        assert_eq!(cards[3].archetype, "Quantitative Analyst");
        assert_eq!(cards[4].icon, cards[0].icon);
        assert_eq!(cards[4].archetype, "Value Analyst");
    }

    #[test]
    fn card_carries_headline_and_raw_fields() {
        let mut pa = persona(
            "Value Hunter",
            "Optimistic on cash returns. More later.",
            "EPS grows 12%. Buybacks help.",
            "Regulatory risk is real! Watch the EU.",
        );
        pa.growth_drivers = "Services attach".to_string();
        let card = &build_analyst_cards(&[pa])[0];
        assert_eq!(card.name, "Value Hunter");
        assert_eq!(card.headline, "Optimistic on cash returns.");
        assert_eq!(card.key_stat, "EPS grows 12%.");
        assert_eq!(card.key_quote, "Regulatory risk is real!");
        assert_eq!(card.sentiment, Sentiment::Bullish);
        assert_eq!(card.growth_drivers, "Services attach");
        assert_eq!(card.overall_view, "Optimistic on cash returns. More later.");
    }

    #[test]
    fn consensus_scores() {
        assert_eq!(compute_consensus(&[]), 50);
        assert_eq!(compute_consensus(&cards(&[("a", "bullish"), ("b", "bearish")])), 50);
        assert_eq!(compute_consensus(&cards(&[("a", "bullish"), ("b", "bullish"), ("c", "stable")])), 70);
        assert_eq!(compute_consensus(&cards(&[("a", "bullish"), ("b", "stable"), ("c", "stable")])), 60);
        assert_eq!(compute_consensus(&cards(&[("a", "bearish")])), 20);
    }

    #[test]
    fn agreements_need_two_analysts() {
        let one = build_analyst_cards(&[persona("a", "bullish", "growth", "a long enough risk assessment")]);
        assert!(find_agreements(&one).is_empty());
        assert!(find_disagreements(&one).is_empty());
    }

    #[test]
    fn unanimous_and_growth_agreements() {
        let analysts = build_analyst_cards(&[
            persona("a", "bullish", "Revenue Growth accelerates", "short"),
            persona("b", "Bullish overall", "growth in services", "short"),
        ]);
        assert_eq!(
            find_agreements(&analysts),
            vec![
                "All analysts share a bullish outlook".to_string(),
                "All analysts identify growth as a key factor".to_string(),
            ]
        );
    }

    #[test]
    fn growth_may_come_from_growth_drivers() {
        let mut a = persona("a", "bullish", "margins expand", "short");
        a.growth_drivers = "Cloud growth".to_string();
        let b = persona("b", "bearish", "growth slows", "short");
        let agreements = find_agreements(&build_analyst_cards(&[a, b]));
        assert_eq!(agreements, vec!["All analysts identify growth as a key factor".to_string()]);
    }

    #[test]
    fn risk_agreement_only_when_nothing_else() {
        let risk = "Supply chain concentration in Taiwan";
        let analysts = build_analyst_cards(&[
            persona("a", "bullish", "flat", risk),
            persona("b", "bearish", "down", risk),
        ]);
        assert_eq!(
            find_agreements(&analysts),
            vec!["All analysts provide substantive risk assessments".to_string()]
        );

        let unanimous = build_analyst_cards(&[
            persona("a", "bullish", "flat", risk),
            persona("b", "bullish", "down", risk),
        ]);
        assert_eq!(
            find_agreements(&unanimous),
            vec!["All analysts share a bullish outlook".to_string()]
        );
    }

    #[test]
    fn disagreement_plural_verbs() {
        let analysts = cards(&[
            ("Value", "bullish"),
            ("Growth", "bullish"),
            ("Macro", "bearish"),
            ("Quant", "bearish"),
        ]);
        assert_eq!(
            find_disagreements(&analysts),
            vec!["Value, Growth are bullish while Macro, Quant are bearish".to_string()]
        );
    }

    #[test]
    fn disagreement_singular_verbs_and_neutral_omitted() {
        let analysts = cards(&[("Value", "bullish"), ("Macro", "stable"), ("Quant", "sell")]);
        assert_eq!(
            find_disagreements(&analysts),
            vec!["Value is bullish while Quant is bearish".to_string()]
        );
    }

    #[test]
    fn no_disagreement_without_both_camps() {
        let analysts = cards(&[("Value", "bullish"), ("Macro", "stable")]);
        assert!(find_disagreements(&analysts).is_empty());
        let unanimous = cards(&[("Value", "bearish"), ("Macro", "bearish")]);
        assert!(find_disagreements(&unanimous).is_empty());
    }
}
