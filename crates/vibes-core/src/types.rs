//! Core domain types for vibes
//!
//! This module contains the usage bundle data model exchanged between the
//! local stats extractor, the server and the renderer, together with the
//! percentile output type. Wire names are camelCase; optional collections
//! decode as empty when absent and are omitted again on output, so a
//! decoded bundle re-encodes to the same structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, VibesError};

/// Number of buckets in the hour-of-day histogram
pub const HOURS_PER_DAY: usize = 24;

/// Anonymous usage bundle
///
/// The bundle is immutable once received. Everything the core computes
/// (metrics, percentiles, persona) is derived from it without mutation.
///
/// # Examples
/// ```
/// use vibes_core::types::UsageBundle;
///
/// let bundle = UsageBundle::from_json(r#"{"stats": {"totalSessions": 3}}"#).unwrap();
/// assert_eq!(bundle.stats.total_sessions, 3);
/// assert!(bundle.persona_id().is_none());
///
/// // A bundle without stats is rejected before it reaches the pipeline
/// assert!(UsageBundle::from_json(r#"{"traits": []}"#).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBundle {
    /// Aggregate counters
    pub stats: Stats,
    /// Behavioral counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quirks: Option<Quirks>,
    /// Qualitative signals extracted from prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    /// Pre-assigned persona; read it through [`UsageBundle::persona_id`],
    /// which treats an empty string as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    /// Free-form trait keywords
    #[serde(default)]
    pub traits: Vec<String>,
    /// Opaque description, passed through
    #[serde(default)]
    pub prompting_style: String,
    /// Opaque description, passed through
    #[serde(default)]
    pub communication_tone: String,
    /// Opaque fun facts, passed through
    #[serde(default)]
    pub fun_facts: Vec<String>,
    /// Generation timestamp, passed through
    #[serde(default)]
    pub generated_at: String,
}

impl UsageBundle {
    /// Parse a bundle from JSON, rejecting payloads without `stats`
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Convert a JSON value into a bundle, rejecting payloads without `stats`
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value.get("stats").map(serde_json::Value::is_object) {
            Some(true) => Ok(serde_json::from_value(value)?),
            Some(false) => Err(VibesError::MalformedBundle(
                "stats must be an object".to_string(),
            )),
            None => Err(VibesError::MalformedBundle("missing stats".to_string())),
        }
    }

    /// The pre-assigned persona id, if any
    pub fn persona_id(&self) -> Option<&str> {
        self.persona_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether `keyword` appears in the trait list (case-insensitive)
    pub fn has_trait(&self, keyword: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(keyword))
    }

    /// Count recorded for `word` in the top-words list (case-insensitive)
    pub fn word_count(&self, word: &str) -> u64 {
        self.insights
            .as_ref()
            .and_then(|insights| {
                insights
                    .top_words
                    .iter()
                    .find(|w| w.word.eq_ignore_ascii_case(word))
            })
            .map_or(0, |w| w.count)
    }

    /// Count of the first top phrase containing `needle` (case-insensitive)
    pub fn phrase_count(&self, needle: &str) -> u64 {
        let needle = needle.to_lowercase();
        self.insights
            .as_ref()
            .and_then(|insights| {
                insights
                    .top_phrases
                    .iter()
                    .find(|p| p.phrase.to_lowercase().contains(&needle))
            })
            .map_or(0, |p| p.count)
    }

    /// The most dominant topic, if the insights list any
    pub fn dominant_topic(&self) -> Option<&str> {
        self.insights
            .as_ref()
            .and_then(|insights| insights.dominant_topics.first())
            .map(String::as_str)
    }

    /// Politeness characterization from the communication style
    pub fn politeness(&self) -> Option<PolitenessLevel> {
        self.insights
            .as_ref()
            .and_then(|insights| insights.communication_style.as_ref())
            .and_then(|style| style.politeness_level)
    }

    /// Average prompt length in characters, zero when unknown
    pub fn average_prompt_length(&self) -> f64 {
        self.insights
            .as_ref()
            .and_then(|insights| insights.communication_style.as_ref())
            .and_then(|style| style.average_prompt_length)
            .unwrap_or(0.0)
    }
}

/// Aggregate usage counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub total_tokens: TokenCounts,
    #[serde(default)]
    pub total_tool_calls: u64,
    /// Tool name to call count
    #[serde(default)]
    pub tool_usage: BTreeMap<String, u64>,
    /// Model name to token count
    #[serde(default)]
    pub model_usage: BTreeMap<String, u64>,
    /// Sessions started per hour of day, index = hour
    #[serde(default)]
    pub hour_counts: [u64; HOURS_PER_DAY],
    #[serde(default)]
    pub peak_hour: u8,
    #[serde(default)]
    pub longest_session_minutes: f64,
    /// Total time across all sessions in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_minutes: Option<f64>,
    #[serde(default)]
    pub project_count: u64,
    #[serde(default)]
    pub days_active: u64,
    /// Daily activity for the contribution grid
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_dates: Vec<DailyActivity>,
}

/// Token counts split by kind
///
/// # Examples
/// ```
/// use vibes_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(1_000, 500, 750);
/// assert_eq!(tokens.total(), 1_500);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    /// Cache read tokens (served from cache)
    #[serde(default)]
    pub cached: u64,
    /// Cache creation tokens (written to cache)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation: Option<u64>,
}

impl TokenCounts {
    /// Create new TokenCounts without cache-creation data
    pub fn new(input: u64, output: u64, cached: u64) -> Self {
        Self {
            input,
            output,
            cached,
            cache_creation: None,
        }
    }

    /// Input plus output tokens
    pub fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }
}

/// Sessions on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub sessions: u64,
}

/// Behavioral counters computed from session timing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quirks {
    pub interrupt_count: u64,
    pub abandoned_sessions: u64,
    pub late_night_sessions: u64,
    pub early_morning_sessions: u64,
    pub weekend_percentage: f64,
    pub shortest_session_seconds: u64,
    pub longest_streak_days: u64,
}

/// Qualitative signals derived from prompt text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memorable_prompts: Option<MemorablePrompts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<CommunicationStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obsessions: Option<Obsessions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrasts: Option<Contrasts>,
    /// Most meaningful words, most frequent first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_words: Vec<WordCount>,
    /// Most common phrases, most frequent first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_phrases: Vec<PhraseCount>,
    /// Primary areas of focus, most dominant first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dominant_topics: Vec<String>,
}

/// Notable prompts found during analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemorablePrompts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funniest: Option<PromptWithContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frustrated: Option<PromptWithContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_ambitious: Option<PromptWithContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weirdest: Option<PromptWithContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptWithContext {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// How the user communicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunicationStyle {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catchphrases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signature_openers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verbal_tics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub politeness_level: Option<PolitenessLevel>,
    /// Average character length of prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_prompt_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompting_evolution: Option<String>,
}

/// Overall politeness characterization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolitenessLevel {
    Diplomatic,
    Direct,
    Demanding,
    Apologetic,
}

impl fmt::Display for PolitenessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diplomatic => write!(f, "diplomatic"),
            Self::Direct => write!(f, "direct"),
            Self::Demanding => write!(f, "demanding"),
            Self::Apologetic => write!(f, "apologetic"),
        }
    }
}

/// What the user kept focusing on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Obsessions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frequently_revisited: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actual_projects: Vec<String>,
}

/// Contrasts in prompting style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contrasts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_effective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_ramble: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub politest_moment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_demanding: Option<String>,
    /// Prompts that were mostly ALL CAPS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caps_lock_prompts: Option<u64>,
    /// Very short or vague prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vague_prompt_count: Option<u64>,
    /// Requests to undo, revert or go back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_requests: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseCount {
    pub phrase: String,
    pub count: u64,
}

/// One of the six tracked percentile dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    TokenUsage,
    ToolDiversity,
    NightCoding,
    SessionLength,
    CacheEfficiency,
    TotalSessions,
}

impl Dimension {
    /// Every dimension in output order
    pub const ALL: [Dimension; 6] = [
        Dimension::TokenUsage,
        Dimension::ToolDiversity,
        Dimension::NightCoding,
        Dimension::SessionLength,
        Dimension::CacheEfficiency,
        Dimension::TotalSessions,
    ];

    /// Wire name of the dimension
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenUsage => "tokenUsage",
            Self::ToolDiversity => "toolDiversity",
            Self::NightCoding => "nightCoding",
            Self::SessionLength => "sessionLength",
            Self::CacheEfficiency => "cacheEfficiency",
            Self::TotalSessions => "totalSessions",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentile rankings, lower is rarer ("top 5%" is 5)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentiles {
    pub token_usage: f64,
    pub tool_diversity: f64,
    pub night_coding: f64,
    pub session_length: f64,
    pub cache_efficiency: f64,
    pub total_sessions: f64,
}

impl Percentiles {
    /// Neutral midpoint used when no population exists yet
    pub const NEUTRAL: f64 = 50.0;

    /// Every dimension set to the neutral midpoint
    pub fn neutral() -> Self {
        Self::from_fn(|_| Self::NEUTRAL)
    }

    /// Build percentiles by evaluating `f` once per dimension
    pub fn from_fn(mut f: impl FnMut(Dimension) -> f64) -> Self {
        Self {
            token_usage: f(Dimension::TokenUsage),
            tool_diversity: f(Dimension::ToolDiversity),
            night_coding: f(Dimension::NightCoding),
            session_length: f(Dimension::SessionLength),
            cache_efficiency: f(Dimension::CacheEfficiency),
            total_sessions: f(Dimension::TotalSessions),
        }
    }

    /// Score for one dimension
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::TokenUsage => self.token_usage,
            Dimension::ToolDiversity => self.tool_diversity,
            Dimension::NightCoding => self.night_coding,
            Dimension::SessionLength => self.session_length,
            Dimension::CacheEfficiency => self.cache_efficiency,
            Dimension::TotalSessions => self.total_sessions,
        }
    }

    /// Iterate `(dimension, score)` pairs in output order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_stats_is_malformed() {
        let err = UsageBundle::from_json(r#"{"personaId": "vibe-coder"}"#).unwrap_err();
        assert!(matches!(err, VibesError::MalformedBundle(_)));

        let err = UsageBundle::from_json(r#"{"stats": 7}"#).unwrap_err();
        assert!(matches!(err, VibesError::MalformedBundle(_)));
    }

    #[test]
    fn test_hour_counts_must_have_24_entries() {
        let raw = json!({"stats": {"hourCounts": [1, 2, 3]}});
        assert!(matches!(
            UsageBundle::from_value(raw),
            Err(VibesError::Json(_))
        ));

        let raw = json!({"stats": {"hourCounts": vec![1; 24]}});
        let bundle = UsageBundle::from_value(raw).unwrap();
        assert_eq!(bundle.stats.hour_counts.iter().sum::<u64>(), 24);
    }

    #[test]
    fn test_negative_counts_rejected() {
        let raw = json!({"stats": {"totalSessions": -1}});
        assert!(UsageBundle::from_value(raw).is_err());
    }

    #[test]
    fn test_empty_persona_id_is_absent() {
        let bundle = UsageBundle::from_json(r#"{"stats": {}, "personaId": ""}"#).unwrap();
        assert_eq!(bundle.persona_id(), None);

        // Kept verbatim so the bundle re-encodes to the same structure
        let reparsed = UsageBundle::from_json(&serde_json::to_string(&bundle).unwrap()).unwrap();
        assert_eq!(reparsed, bundle);

        let bundle = UsageBundle::from_json(r#"{"stats": {}, "personaId": "token-titan"}"#).unwrap();
        assert_eq!(bundle.persona_id(), Some("token-titan"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = json!({
            "stats": {"totalSessions": 2, "somethingNew": true},
            "roastEvidence": {"topWord": "fix"}
        });
        let bundle = UsageBundle::from_value(raw).unwrap();
        assert_eq!(bundle.stats.total_sessions, 2);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let mut bundle = UsageBundle::default();
        bundle.stats.total_tokens = TokenCounts::new(10, 5, 2);
        bundle.stats.longest_session_minutes = 42.5;
        let value = serde_json::to_value(&bundle).unwrap();

        assert_eq!(value["stats"]["totalTokens"]["input"], 10);
        assert_eq!(value["stats"]["longestSessionMinutes"], 42.5);
        assert!(value["stats"].get("activeDates").is_none());
        assert!(value["stats"]["totalTokens"].get("cacheCreation").is_none());
        assert!(value.get("insights").is_none());
    }

    #[test]
    fn test_word_and_phrase_lookup() {
        let raw = json!({
            "stats": {},
            "insights": {
                "topWords": [{"word": "Fix", "count": 40}, {"word": "help", "count": 3}],
                "topPhrases": [{"phrase": "please make sure", "count": 12}],
                "dominantTopics": ["debugging", "frontend"],
                "communicationStyle": {"politenessLevel": "apologetic", "averagePromptLength": 88.5}
            }
        });
        let bundle = UsageBundle::from_value(raw).unwrap();

        assert_eq!(bundle.word_count("fix"), 40);
        assert_eq!(bundle.word_count("HELP"), 3);
        assert_eq!(bundle.word_count("refactor"), 0);
        assert_eq!(bundle.phrase_count("make sure"), 12);
        assert_eq!(bundle.dominant_topic(), Some("debugging"));
        assert_eq!(bundle.politeness(), Some(PolitenessLevel::Apologetic));
        assert_eq!(bundle.average_prompt_length(), 88.5);
    }

    #[test]
    fn test_trait_lookup_is_case_insensitive() {
        let bundle = UsageBundle {
            traits: vec!["Impatient".to_string()],
            ..Default::default()
        };
        assert!(bundle.has_trait("impatient"));
        assert!(!bundle.has_trait("curious"));
    }

    #[test]
    fn test_politeness_rejects_unknown_level() {
        let raw = json!({"stats": {}, "insights": {"communicationStyle": {"politenessLevel": "rude"}}});
        assert!(UsageBundle::from_value(raw).is_err());
    }

    #[test]
    fn test_active_dates_parse() {
        let raw = json!({"stats": {"activeDates": [{"date": "2024-02-29", "sessions": 4}]}});
        let bundle = UsageBundle::from_value(raw).unwrap();
        assert_eq!(
            bundle.stats.active_dates[0].date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_percentiles_accessors() {
        let percentiles = Percentiles::from_fn(|d| match d {
            Dimension::TokenUsage => 5.0,
            _ => 60.0,
        });
        assert_eq!(percentiles.get(Dimension::TokenUsage), 5.0);
        assert_eq!(percentiles.iter().count(), 6);
        assert!(Percentiles::neutral().iter().all(|(_, v)| v == 50.0));

        let value = serde_json::to_value(percentiles).unwrap();
        assert_eq!(value["tokenUsage"], 5.0);
        assert_eq!(value["cacheEfficiency"], 60.0);
    }
}
