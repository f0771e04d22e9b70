use crate::domain::persona::CompanyProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    #[default]
    Hold,
    Sell,
    Avoid,
}

impl Recommendation {
    /// Case-insensitive match against the four report tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "hold" => Some(Self::Hold),
            "sell" => Some(Self::Sell),
            "avoid" => Some(Self::Avoid),
            _ => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Hold => write!(f, "Hold"),
            Self::Sell => write!(f, "Sell"),
            Self::Avoid => write!(f, "Avoid"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Numeric weight used by the consensus score.
    pub fn score(self) -> u32 {
        match self {
            Self::Bullish => 80,
            Self::Bearish => 20,
            Self::Neutral => 50,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystCard {
    pub name: String,
    pub icon: String,
    pub archetype: String,
    pub headline: String,
    pub key_stat: String,
    pub key_quote: String,
    pub sentiment: Sentiment,
    pub profit_outlook: String,
    pub risk_assessment: String,
    pub overall_view: String,
    pub business_model: String,
    pub what_they_sell_and_who_buys: String,
    pub how_they_make_money: String,
    pub revenue_quality: String,
    pub cost_structure: String,
    pub capital_intensity: String,
    pub growth_drivers: String,
    pub competitive_edge: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub gross_margin_current: Option<f64>,
    pub gross_margin_previous: Option<f64>,
    pub revenue_growth_current: Option<f64>,
    pub free_cash_flow: Option<String>,
    pub eps_current: Option<f64>,
    pub eps_previous: Option<f64>,
    pub peer_pe_avg: Option<f64>,
}

impl FinancialMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The typed report consumed by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub ticker: String,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
    pub executive_summary: String,
    pub key_takeaways: Vec<String>,
    pub company_profile: CompanyProfile,
    pub agreements: Vec<String>,
    pub disagreements: Vec<String>,
    pub analysts: Vec<AnalystCard>,
    pub metrics: FinancialMetrics,
    pub financial_info: String,
    pub consensus_score: u32,
}
