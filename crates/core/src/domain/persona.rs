use serde::{Deserialize, Deserializer, Serialize};

/// One analyst persona's structured output, as produced by the pipeline's
/// analysis node. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaAnalysisData {
    #[serde(deserialize_with = "null_as_default")]
    pub persona_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub executive_summary: ExecutiveSummaryData,
    #[serde(deserialize_with = "null_as_default")]
    pub business_model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub what_they_sell_and_who_buys: String,
    #[serde(deserialize_with = "null_as_default")]
    pub how_they_make_money: String,
    #[serde(deserialize_with = "null_as_default")]
    pub revenue_quality: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cost_structure: String,
    #[serde(deserialize_with = "null_as_default")]
    pub capital_intensity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub growth_drivers: String,
    #[serde(deserialize_with = "null_as_default")]
    pub competitive_edge: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveSummaryData {
    #[serde(deserialize_with = "null_as_default")]
    pub profit_outlook: String,
    #[serde(deserialize_with = "null_as_default")]
    pub risk_assessment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_view: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub business_model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub what_they_sell_and_who_buys: String,
    #[serde(deserialize_with = "null_as_default")]
    pub how_they_make_money: String,
    #[serde(deserialize_with = "null_as_default")]
    pub revenue_quality: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cost_structure: String,
    #[serde(deserialize_with = "null_as_default")]
    pub capital_intensity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub growth_drivers: String,
    #[serde(deserialize_with = "null_as_default")]
    pub competitive_edge: String,
}

impl CompanyProfile {
    pub fn is_empty(&self) -> bool {
        [
            &self.business_model,
            &self.what_they_sell_and_who_buys,
            &self.how_they_make_money,
            &self.revenue_quality,
            &self.cost_structure,
            &self.capital_intensity,
            &self.growth_drivers,
            &self.competitive_edge,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persona_accepts_missing_keys() {
        let v = json!({
            "persona_name": "Value Hunter",
            "executive_summary": {"overall_view": "Bullish."},
        });
        let parsed: PersonaAnalysisData = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.persona_name, "Value Hunter");
        assert_eq!(parsed.executive_summary.overall_view, "Bullish.");
        assert!(parsed.executive_summary.risk_assessment.is_empty());
        assert!(parsed.growth_drivers.is_empty());
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let v = json!({
            "persona_name": "Growth Scout",
            "growth_drivers": null,
            "executive_summary": {"overall_view": "Bullish.", "risk_assessment": null},
        });
        let parsed: PersonaAnalysisData = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.persona_name, "Growth Scout");
        assert!(parsed.growth_drivers.is_empty());
        assert!(parsed.executive_summary.risk_assessment.is_empty());

        let v = json!({"persona_name": "Macro", "executive_summary": null});
        let parsed: PersonaAnalysisData = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.executive_summary, ExecutiveSummaryData::default());

        let profile: CompanyProfile =
            serde_json::from_value(json!({"business_model": "Ads", "cost_structure": null}))
                .unwrap();
        assert_eq!(profile.business_model, "Ads");
        assert!(profile.cost_structure.is_empty());
    }

    #[test]
    fn blank_profile_is_empty() {
        let profile = CompanyProfile {
            business_model: "  ".to_string(),
            ..Default::default()
        };
        assert!(profile.is_empty());
    }
}
