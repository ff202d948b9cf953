use crate::rcv::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The contest description written at the top of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "rankBase")]
    pub rank_base: Option<i64>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    pub methods: Option<Vec<String>>,
    #[serde(rename = "scoringSystems")]
    pub scoring_systems: Option<Vec<String>>,
    #[serde(rename = "nonStrictPairOrdering")]
    pub non_strict_pair_ordering: Option<String>,
}

impl RulesConfig {
    pub fn validate(&self) -> RcvResult<TallyRules> {
        let default_rules = TallyRules::default();
        let methods = match &self.methods {
            Some(names) => names
                .iter()
                .map(|n| Method::from_name(n))
                .collect::<Result<Vec<Method>, TallyError>>()
                .context(InvalidRulesSnafu {})?,
            None => default_rules.methods,
        };
        let scoring_systems = match &self.scoring_systems {
            Some(names) => names
                .iter()
                .map(|n| ScoringSystem::from_name(n))
                .collect::<Result<Vec<ScoringSystem>, TallyError>>()
                .context(InvalidRulesSnafu {})?,
            None => default_rules.scoring_systems,
        };
        let non_strict_ordering = match self.non_strict_pair_ordering.as_deref() {
            None | Some("flag") => NonStrictOrdering::Flag,
            Some("fail") => NonStrictOrdering::Fail,
            Some(x) => whatever!("unknown nonStrictPairOrdering option: {}", x),
        };
        Ok(TallyRules {
            methods,
            scoring_systems,
            non_strict_ordering,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "ballotSource")]
    pub ballot_source: Option<BallotSource>,
    #[serde(default)]
    pub rules: RulesConfig,
}

pub fn read_config(path: &str) -> RcvResult<TallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: TallyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let config: TallyConfig =
            serde_json::from_str(r#"{"ballotSource": {"filePath": "ballots.csv"}}"#).unwrap();
        assert_eq!(config.output_settings, OutputSettings::default());
        let source = config.ballot_source.unwrap();
        assert_eq!(source.file_path, "ballots.csv");
        assert_eq!(source.rank_base, None);
        assert_eq!(config.rules.validate().unwrap(), TallyRules::default());
    }

    #[test]
    fn rules_are_validated() {
        let rules = RulesConfig {
            methods: Some(vec!["rpv".to_string()]),
            scoring_systems: Some(vec!["Power".to_string()]),
            non_strict_pair_ordering: Some("fail".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(rules.methods, vec![Method::RankedPairs]);
        assert_eq!(rules.scoring_systems, vec![ScoringSystem::Power]);
        assert_eq!(rules.non_strict_ordering, NonStrictOrdering::Fail);

        let bad = RulesConfig {
            methods: Some(vec!["approval".to_string()]),
            ..RulesConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
