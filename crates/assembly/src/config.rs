use crate::budget::Budget;
use crate::compact::DEFAULT_RUN_SEPARATOR;
use crate::error::{AssemblyError, Result};
use crate::item::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Characters per token used to turn token budgets into character limits
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

const DEFAULT_RECENT_VIEW_THRESHOLD_MS: u64 = 60_000;
const DEFAULT_RECENT_EDIT_THRESHOLD_MS: u64 = 60_000;

/// Token budget for one retrieval source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceBudget {
    pub max_tokens: usize,
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl SourceBudget {
    #[must_use]
    pub const fn new(max_tokens: usize, max_items: Option<usize>) -> Self {
        Self {
            max_tokens,
            max_items,
        }
    }
}

/// Settings for one aggregation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Per-source budgets; a source missing here contributes nothing
    pub budgets: BTreeMap<SourceId, SourceBudget>,

    /// Conversion ratio from configured tokens to measured characters
    pub chars_per_token: usize,

    /// Views younger than this go to the late, fast-changing section
    pub recent_view_threshold_ms: u64,

    /// Edits younger than this go to the late, fast-changing section
    pub recent_edit_threshold_ms: u64,

    /// Joins the hunks of one compacted edit run
    pub edit_run_separator: String,

    /// Trailing instruction section
    pub instruction: Option<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        let budgets = BTreeMap::from([
            (SourceId::RecentView, SourceBudget::new(1_000, Some(10))),
            (SourceId::RecentEdit, SourceBudget::new(1_500, None)),
            (SourceId::Diagnostics, SourceBudget::new(400, None)),
            (SourceId::RecentCopy, SourceBudget::new(500, Some(3))),
            (SourceId::SimilarSnippet, SourceBudget::new(1_000, Some(5))),
        ]);
        Self {
            budgets,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            recent_view_threshold_ms: DEFAULT_RECENT_VIEW_THRESHOLD_MS,
            recent_edit_threshold_ms: DEFAULT_RECENT_EDIT_THRESHOLD_MS,
            edit_run_separator: DEFAULT_RUN_SEPARATOR.to_string(),
            instruction: None,
        }
    }
}

impl AggregationConfig {
    /// Load a config file (JSON, or TOML when JSON parsing fails) and validate it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let config = Self::parse(&bytes).map_err(|err| match err {
            AssemblyError::InvalidConfig(msg) => {
                AssemblyError::invalid_config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        log::debug!("Loaded aggregation config from {}", path.display());
        Ok(config)
    }

    /// Parse JSON or TOML bytes and validate the result
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes)
                    .map_err(|err| AssemblyError::invalid_config(format!("{json_err}; {err}")))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    AssemblyError::invalid_config(format!(
                        "config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    ))
                })?;
                serde_json::to_value(toml_value)?
            }
        };

        let config: Self = serde_json::from_value(value)
            .map_err(|err| AssemblyError::invalid_config(format!("config parse error: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chars_per_token == 0 {
            return Err(AssemblyError::invalid_config("chars_per_token must be > 0"));
        }
        if self.edit_run_separator.is_empty() {
            return Err(AssemblyError::invalid_config(
                "edit_run_separator must not be empty",
            ));
        }
        Ok(())
    }

    /// Character budget for `source`, if one is configured
    #[must_use]
    pub fn budget_for(&self, source: SourceId) -> Option<Budget> {
        self.budgets.get(&source).map(|budget| {
            Budget::new(
                budget.max_tokens.saturating_mul(self.chars_per_token),
                budget.max_items,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_config_is_valid_and_budgets_every_source() {
        let config = AggregationConfig::default();
        assert!(config.validate().is_ok());
        for source in SourceId::ALL {
            assert!(config.budget_for(source).is_some(), "{source} has no budget");
        }
    }

    #[test]
    fn tokens_convert_to_chars() {
        let config = AggregationConfig::default();
        assert_eq!(
            config.budget_for(SourceId::RecentCopy),
            Some(Budget::new(2_000, Some(3)))
        );
    }

    #[test]
    fn parses_json_with_defaults_for_missing_fields() {
        let config = AggregationConfig::parse(
            br#"{"budgets":{"recent_edit":{"max_tokens":10}},"chars_per_token":3}"#,
        )
        .unwrap();
        assert_eq!(config.budgets.len(), 1);
        assert_eq!(
            config.budget_for(SourceId::RecentEdit),
            Some(Budget::new(30, None))
        );
        assert_eq!(config.budget_for(SourceId::RecentView), None);
        assert_eq!(config.recent_edit_threshold_ms, DEFAULT_RECENT_EDIT_THRESHOLD_MS);
    }

    #[test]
    fn parses_toml() {
        let config = AggregationConfig::parse(
            br#"
recent_view_threshold_ms = 5000
instruction = "Rewrite the marked code."

[budgets.similar_snippet]
max_tokens = 200
max_items = 2
"#,
        )
        .unwrap();
        assert_eq!(config.recent_view_threshold_ms, 5_000);
        assert_eq!(config.instruction.as_deref(), Some("Rewrite the marked code."));
        assert_eq!(
            config.budget_for(SourceId::SimilarSnippet),
            Some(Budget::new(800, Some(2)))
        );
    }

    #[test]
    fn rejects_negative_budget_and_unknown_keys() {
        let negative =
            AggregationConfig::parse(br#"{"budgets":{"recent_edit":{"max_tokens":-1}}}"#);
        assert!(matches!(negative, Err(AssemblyError::InvalidConfig(_))));

        let unknown = AggregationConfig::parse(br#"{"budget":{}}"#);
        assert!(matches!(unknown, Err(AssemblyError::InvalidConfig(_))));

        let source = AggregationConfig::parse(br#"{"budgets":{"clipboard":{"max_tokens":1}}}"#);
        assert!(matches!(source, Err(AssemblyError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_ratio() {
        let err = AggregationConfig::parse(br#"{"chars_per_token":0}"#).unwrap_err();
        assert!(err.to_string().contains("chars_per_token"));
    }

    #[test]
    fn path_errors_name_the_file_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chars_per_token = 0").unwrap();
        let err = AggregationConfig::from_path(file.path()).unwrap_err();
        let message = err.to_string();
        assert_eq!(message.matches("Invalid configuration").count(), 1);
        assert!(message.contains(&file.path().display().to_string()));
        assert!(message.ends_with("chars_per_token must be > 0"));
    }

    #[test]
    fn loads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chars_per_token = 2").unwrap();
        let config = AggregationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.chars_per_token, 2);

        let missing = AggregationConfig::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(AssemblyError::IoError(_))));
    }
}
