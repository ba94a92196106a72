use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::window::{MonthDay, RecurringWindow, WindowError};

/// Event severity, ordered MINOR < MEDIUM < MAJOR < PEAK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Minor,
    Medium,
    Major,
    Peak,
}

impl Tier {
    /// Reference boost for the tier. Rules carry their own percent, which is
    /// what pricing applies; this table is only checked against at load.
    pub fn reference_percent(&self) -> f64 {
        match self {
            Tier::Minor => 5.0,
            Tier::Medium => 15.0,
            Tier::Major => 25.0,
            Tier::Peak => 35.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Minor => "MINOR",
            Tier::Medium => "MEDIUM",
            Tier::Major => "MAJOR",
            Tier::Peak => "PEAK",
        }
    }
}

impl FromStr for Tier {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MINOR" => Ok(Tier::Minor),
            "MEDIUM" => Ok(Tier::Medium),
            "MAJOR" => Ok(Tier::Major),
            "PEAK" => Ok(Tier::Peak),
            _ => Err(RuleError::UnknownTier(s.to_string())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule record exactly as written in the rules file, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleRecord {
    pub name: String,
    pub keywords: Vec<String>,
    pub tier: String,
    pub increase_percent: f64,
    pub start_date: String,
    pub end_date: String,
}

/// A validated, date-bounded pricing event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRule {
    pub name: String,
    /// Lowercase, trimmed, non-blank
    pub keywords: Vec<String>,
    pub tier: Tier,
    pub increase_percent: f64,
    pub start_date: MonthDay,
    pub end_date: MonthDay,
}

impl EventRule {
    pub fn window(&self) -> RecurringWindow {
        RecurringWindow::new(self.start_date, self.end_date)
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    /// `text` must already be lowercase.
    pub fn matches_lowercase(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.matches_lowercase(&text.to_lowercase())
    }
}

impl TryFrom<RuleRecord> for EventRule {
    type Error = RuleError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(RuleError::MissingName);
        }

        let tier: Tier = record.tier.parse()?;

        if !record.increase_percent.is_finite() || record.increase_percent < 0.0 {
            return Err(RuleError::InvalidPercent(record.increase_percent));
        }

        let start_date: MonthDay = record
            .start_date
            .parse()
            .map_err(|source| RuleError::InvalidDate { field: "start_date", source })?;
        let end_date: MonthDay = record
            .end_date
            .parse()
            .map_err(|source| RuleError::InvalidDate { field: "end_date", source })?;

        let mut keywords: Vec<String> = Vec::with_capacity(record.keywords.len());
        for kw in record.keywords {
            let kw = kw.trim().to_lowercase();
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }

        Ok(Self {
            name,
            keywords,
            tier,
            increase_percent: record.increase_percent,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Malformed rule record: {0}")]
    Malformed(String),

    #[error("Rule is missing a name")]
    MissingName,

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Invalid increase_percent: {0}")]
    InvalidPercent(f64),

    #[error("Invalid {field}: {source}")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: WindowError,
    },
}

/// Failure to read the rules source as a whole.
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("Rules source is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rules source must be a JSON array of rule records")]
    NotAnArray,
}

/// A record excluded from the rule set at load time.
#[derive(Debug)]
pub struct RuleRejection {
    /// Position of the record in the source
    pub index: usize,
    pub name: Option<String>,
    pub error: RuleError,
}

#[derive(Debug)]
pub struct LoadReport {
    pub rules: RuleSet,
    pub rejected: Vec<RuleRejection>,
    /// Names of accepted rules whose percent disagrees with their tier's reference percent.
    pub tier_mismatches: Vec<String>,
}

/// Immutable, ordered collection of validated rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<EventRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<EventRule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON array of rule records. Bad records are reported and skipped;
    /// only a source that is not a JSON array fails.
    pub fn from_json(source: &str) -> Result<LoadReport, RuleLoadError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        match value {
            serde_json::Value::Array(records) => Ok(Self::from_values(records)),
            _ => Err(RuleLoadError::NotAnArray),
        }
    }

    pub fn from_values(records: Vec<serde_json::Value>) -> LoadReport {
        let mut rules = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        let mut tier_mismatches = Vec::new();

        for (index, value) in records.into_iter().enumerate() {
            let name = value.get("name").and_then(|n| n.as_str()).map(str::to_string);

            let parsed = serde_json::from_value::<RuleRecord>(value)
                .map_err(|e| RuleError::Malformed(e.to_string()))
                .and_then(EventRule::try_from);

            match parsed {
                Ok(rule) => {
                    if (rule.increase_percent - rule.tier.reference_percent()).abs() > f64::EPSILON {
                        tracing::warn!(
                            rule = %rule.name,
                            tier = %rule.tier,
                            increase_percent = rule.increase_percent,
                            reference_percent = rule.tier.reference_percent(),
                            "Rule percent differs from its tier; the rule's own percent applies"
                        );
                        tier_mismatches.push(rule.name.clone());
                    }
                    if rule.keywords.is_empty() {
                        tracing::warn!(rule = %rule.name, "Rule has no keywords and will never match an item");
                    }
                    rules.push(rule);
                }
                Err(error) => {
                    tracing::warn!(index, name = ?name, %error, "Excluding malformed pricing rule");
                    rejected.push(RuleRejection { index, name, error });
                }
            }
        }

        LoadReport {
            rules: RuleSet { rules },
            rejected,
            tier_mismatches,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a EventRule;
    type IntoIter = std::slice::Iter<'a, EventRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
