//! Rule-cascade persona classifier
//!
//! [`RULES`] is an ordered list of `(predicate, persona)` pairs evaluated
//! by linear scan; the first predicate that holds picks the persona and
//! [`PersonaId::DEFAULT`] is returned when none does. List order is the
//! tie-break, so a bundle that qualifies for several rules gets the one
//! listed first. Tiers run in this order:
//!
//! 1. roast: extreme night activity, politeness, debugging topic, frontend
//!    topic, impulsivity, vibe words
//! 2. behavioral: tool dominance, premium model on low volume, cache
//!    neglect, impatience
//! 3. achievement: top volume, versatility, cache efficiency
//! 4. lifestyle: night share, dawn share, project count, session length
//! 5. traits: methodical, curious, perfectionist, collaborative,
//!    experimental
//!
//! A pre-assigned `personaId` on the bundle skips the cascade entirely.
//!
//! Thresholds below are tuning parameters. Moving one shifts boundaries
//! across every tier after it, so they are kept together here.

use serde::Serialize;
use std::fmt;
use tracing::debug;
use vibes_core::types::PolitenessLevel;
use vibes_core::{DerivedMetrics, UsageBundle};

use crate::catalog::PersonaId;

/// Night share above which the roast-tier night persona applies
pub const EXTREME_NIGHT_SHARE: f64 = 0.5;
/// Late-night session count above which the roast-tier night persona applies
pub const LATE_NIGHT_SESSION_FLOOR: u64 = 15;
/// Dominant topic that marks the debugging persona
pub const DEBUGGING_TOPIC: &str = "debugging";
/// Dominant topic that marks the frontend persona
pub const FRONTEND_TOPIC: &str = "frontend";
/// Interrupt count above which the impulsivity persona applies
pub const INTERRUPT_FLOOR: u64 = 5;
/// Abandoned-session count above which the impulsivity persona applies
pub const ABANDONED_SESSION_FLOOR: u64 = 10;
/// Both "fix" and "help" must exceed this count for the vibe persona
pub const VIBE_WORD_FLOOR: u64 = 15;

/// Share of tool calls going to the dominant tool
pub const TOOL_DOMINANCE_SHARE: f64 = 0.5;
/// Premium-model token share for the over-provisioning persona
pub const PREMIUM_MODEL_SHARE: f64 = 0.7;
/// Token volume below which premium-model use counts as over-provisioning
pub const PREMIUM_MODEL_TOKEN_CEILING: u64 = 500_000;
/// Cache rate below which a heavy user counts as neglecting the cache
pub const CACHE_NEGLECT_RATE: f64 = 0.15;
/// Token volume above which cache neglect is noticed
pub const CACHE_NEGLECT_TOKEN_FLOOR: u64 = 1_000_000;
/// Trait keyword for the impatience persona
pub const IMPATIENT_TRAIT: &str = "impatient";

/// Token volume for the top-volume persona
pub const TOP_VOLUME_TOKENS: u64 = 5_000_000;
/// Minimum distinct tools for the versatility persona
pub const VERSATILE_TOOL_COUNT: usize = 8;
/// Tool calls above which versatility is noticed
pub const VERSATILE_TOOL_CALLS: u64 = 2_000;
/// Cache rate above which a heavy user counts as efficient
pub const EFFICIENT_CACHE_RATE: f64 = 0.6;
/// Token volume above which cache efficiency is noticed
pub const EFFICIENT_TOKEN_FLOOR: u64 = 1_000_000;

/// Night share for the lifestyle night persona
pub const NIGHT_LIFESTYLE_SHARE: f64 = 0.3;
/// Dawn share for the morning persona
pub const DAWN_LIFESTYLE_SHARE: f64 = 0.25;
/// Project count above which the nomad persona applies
pub const NOMAD_PROJECT_COUNT: u64 = 10;
/// Longest session (minutes) above which the deep-focus persona applies
pub const DEEP_FOCUS_MINUTES: f64 = 180.0;

/// Everything a predicate may look at
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub metrics: &'a DerivedMetrics,
    pub bundle: &'a UsageBundle,
}

impl ClassifierInput<'_> {
    fn quirk(&self, read: impl Fn(&vibes_core::types::Quirks) -> u64) -> u64 {
        self.bundle.quirks.as_ref().map_or(0, read)
    }
}

/// Cascade tier, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Roast,
    Behavioral,
    Achievement,
    Lifestyle,
    Traits,
}

impl Tier {
    /// 1-based position in the cascade
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roast => write!(f, "roast"),
            Self::Behavioral => write!(f, "behavioral"),
            Self::Achievement => write!(f, "achievement"),
            Self::Lifestyle => write!(f, "lifestyle"),
            Self::Traits => write!(f, "traits"),
        }
    }
}

/// One `(predicate, persona)` pair of the cascade
#[derive(Clone, Copy, Serialize)]
pub struct Rule {
    pub persona: PersonaId,
    pub tier: Tier,
    /// Human-readable condition, shown by `vibes personas --rules`
    pub condition: &'static str,
    #[serde(skip)]
    pub predicate: fn(&ClassifierInput<'_>) -> bool,
}

impl Rule {
    /// Evaluate the predicate
    pub fn matches(&self, input: &ClassifierInput<'_>) -> bool {
        (self.predicate)(input)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("persona", &self.persona)
            .field("tier", &self.tier)
            .field("condition", &self.condition)
            .finish()
    }
}

/// The cascade, in evaluation order
pub static RULES: &[Rule] = &[
    // Roast tier
    Rule {
        persona: PersonaId::ThreeAmDemon,
        tier: Tier::Roast,
        condition: "night share > 0.5 or late-night sessions > 15",
        predicate: extreme_night,
    },
    Rule {
        persona: PersonaId::PoliteMenace,
        tier: Tier::Roast,
        condition: "politeness is diplomatic or apologetic",
        predicate: overly_polite,
    },
    Rule {
        persona: PersonaId::DebugDemon,
        tier: Tier::Roast,
        condition: "dominant topic is debugging",
        predicate: debugging_first,
    },
    Rule {
        persona: PersonaId::CssCasualty,
        tier: Tier::Roast,
        condition: "dominant topic is frontend",
        predicate: frontend_first,
    },
    Rule {
        persona: PersonaId::SquirrelBrain,
        tier: Tier::Roast,
        condition: "interrupts > 5 or abandoned sessions > 10",
        predicate: impulsive,
    },
    Rule {
        persona: PersonaId::VibeCoder,
        tier: Tier::Roast,
        condition: "\"fix\" > 15 and \"help\" > 15",
        predicate: vibe_words,
    },
    // Behavioral tier
    Rule {
        persona: PersonaId::BashBerserker,
        tier: Tier::Behavioral,
        condition: "Bash share of tool calls > 0.5",
        predicate: tool_dominance,
    },
    Rule {
        persona: PersonaId::OpusMaximalist,
        tier: Tier::Behavioral,
        condition: "opus token share > 0.7 and tokens < 500k",
        predicate: over_provisioned,
    },
    Rule {
        persona: PersonaId::ContextAmnesiac,
        tier: Tier::Behavioral,
        condition: "cache rate < 0.15 and tokens > 1M",
        predicate: cache_neglect,
    },
    Rule {
        persona: PersonaId::SpeedDemon,
        tier: Tier::Behavioral,
        condition: "trait \"impatient\"",
        predicate: impatient,
    },
    // Achievement tier
    Rule {
        persona: PersonaId::TokenTitan,
        tier: Tier::Achievement,
        condition: "tokens > 5M",
        predicate: top_volume,
    },
    Rule {
        persona: PersonaId::SwissArmyKnife,
        tier: Tier::Achievement,
        condition: "distinct tools >= 8 and tool calls > 2000",
        predicate: versatile,
    },
    Rule {
        persona: PersonaId::CacheWizard,
        tier: Tier::Achievement,
        condition: "cache rate > 0.6 and tokens > 1M",
        predicate: cache_efficient,
    },
    // Lifestyle tier
    Rule {
        persona: PersonaId::NightOwl,
        tier: Tier::Lifestyle,
        condition: "night share > 0.3",
        predicate: night_lifestyle,
    },
    Rule {
        persona: PersonaId::EarlyBird,
        tier: Tier::Lifestyle,
        condition: "dawn share > 0.25",
        predicate: dawn_lifestyle,
    },
    Rule {
        persona: PersonaId::ProjectNomad,
        tier: Tier::Lifestyle,
        condition: "projects > 10",
        predicate: nomad,
    },
    Rule {
        persona: PersonaId::DeepDiver,
        tier: Tier::Lifestyle,
        condition: "longest session > 180 minutes",
        predicate: deep_focus,
    },
    // Trait tier
    Rule {
        persona: PersonaId::Architect,
        tier: Tier::Traits,
        condition: "trait \"methodical\"",
        predicate: trait_methodical,
    },
    Rule {
        persona: PersonaId::Explorer,
        tier: Tier::Traits,
        condition: "trait \"curious\"",
        predicate: trait_curious,
    },
    Rule {
        persona: PersonaId::Perfectionist,
        tier: Tier::Traits,
        condition: "trait \"perfectionist\"",
        predicate: trait_perfectionist,
    },
    Rule {
        persona: PersonaId::Collaborator,
        tier: Tier::Traits,
        condition: "trait \"collaborative\"",
        predicate: trait_collaborative,
    },
    Rule {
        persona: PersonaId::Experimenter,
        tier: Tier::Traits,
        condition: "trait \"experimental\"",
        predicate: trait_experimental,
    },
];

fn extreme_night(input: &ClassifierInput<'_>) -> bool {
    input.metrics.night_percentage > EXTREME_NIGHT_SHARE
        || input.quirk(|q| q.late_night_sessions) > LATE_NIGHT_SESSION_FLOOR
}

fn overly_polite(input: &ClassifierInput<'_>) -> bool {
    matches!(
        input.bundle.politeness(),
        Some(PolitenessLevel::Diplomatic | PolitenessLevel::Apologetic)
    )
}

fn debugging_first(input: &ClassifierInput<'_>) -> bool {
    input.bundle.dominant_topic() == Some(DEBUGGING_TOPIC)
}

fn frontend_first(input: &ClassifierInput<'_>) -> bool {
    input.bundle.dominant_topic() == Some(FRONTEND_TOPIC)
}

fn impulsive(input: &ClassifierInput<'_>) -> bool {
    input.quirk(|q| q.interrupt_count) > INTERRUPT_FLOOR
        || input.quirk(|q| q.abandoned_sessions) > ABANDONED_SESSION_FLOOR
}

fn vibe_words(input: &ClassifierInput<'_>) -> bool {
    input.bundle.word_count("fix") > VIBE_WORD_FLOOR
        && input.bundle.word_count("help") > VIBE_WORD_FLOOR
}

fn tool_dominance(input: &ClassifierInput<'_>) -> bool {
    input.metrics.bash_ratio > TOOL_DOMINANCE_SHARE
}

fn over_provisioned(input: &ClassifierInput<'_>) -> bool {
    input.metrics.opus_percentage > PREMIUM_MODEL_SHARE
        && input.metrics.total_tokens < PREMIUM_MODEL_TOKEN_CEILING
}

fn cache_neglect(input: &ClassifierInput<'_>) -> bool {
    input.metrics.clamped_cache_rate() < CACHE_NEGLECT_RATE
        && input.metrics.total_tokens > CACHE_NEGLECT_TOKEN_FLOOR
}

fn impatient(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait(IMPATIENT_TRAIT)
}

fn trait_methodical(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait("methodical")
}

fn trait_curious(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait("curious")
}

fn trait_perfectionist(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait("perfectionist")
}

fn trait_collaborative(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait("collaborative")
}

fn trait_experimental(input: &ClassifierInput<'_>) -> bool {
    input.bundle.has_trait("experimental")
}

fn top_volume(input: &ClassifierInput<'_>) -> bool {
    input.metrics.total_tokens > TOP_VOLUME_TOKENS
}

fn versatile(input: &ClassifierInput<'_>) -> bool {
    input.metrics.tool_diversity >= VERSATILE_TOOL_COUNT
        && input.metrics.total_tool_calls > VERSATILE_TOOL_CALLS
}

fn cache_efficient(input: &ClassifierInput<'_>) -> bool {
    input.metrics.clamped_cache_rate() > EFFICIENT_CACHE_RATE
        && input.metrics.total_tokens > EFFICIENT_TOKEN_FLOOR
}

fn night_lifestyle(input: &ClassifierInput<'_>) -> bool {
    input.metrics.night_percentage > NIGHT_LIFESTYLE_SHARE
}

fn dawn_lifestyle(input: &ClassifierInput<'_>) -> bool {
    input.metrics.dawn_percentage > DAWN_LIFESTYLE_SHARE
}

fn nomad(input: &ClassifierInput<'_>) -> bool {
    input.metrics.project_count > NOMAD_PROJECT_COUNT
}

fn deep_focus(input: &ClassifierInput<'_>) -> bool {
    input.metrics.longest_session_minutes > DEEP_FOCUS_MINUTES
}

/// How a persona was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Classification {
    /// The bundle carried a `personaId`
    Preassigned { persona: PersonaId },
    /// A cascade rule matched
    Matched { persona: PersonaId, tier: Tier },
    /// No rule matched
    Default { persona: PersonaId },
}

impl Classification {
    /// The chosen persona
    pub fn persona(&self) -> PersonaId {
        match *self {
            Self::Preassigned { persona }
            | Self::Matched { persona, .. }
            | Self::Default { persona } => persona,
        }
    }
}

/// Classify a bundle and report which path decided it
pub fn explain(metrics: &DerivedMetrics, bundle: &UsageBundle) -> Classification {
    if let Some(id) = bundle.persona_id() {
        let persona = PersonaId::resolve(id);
        debug!(%persona, "Using pre-assigned persona");
        return Classification::Preassigned { persona };
    }

    let input = ClassifierInput { metrics, bundle };
    match RULES.iter().find(|rule| rule.matches(&input)) {
        Some(rule) => {
            debug!(
                persona = %rule.persona,
                tier = %rule.tier,
                condition = rule.condition,
                "Persona rule matched"
            );
            Classification::Matched {
                persona: rule.persona,
                tier: rule.tier,
            }
        }
        None => {
            debug!("No persona rule matched, using default");
            Classification::Default {
                persona: PersonaId::DEFAULT,
            }
        }
    }
}

/// Classify a bundle into exactly one persona
///
/// Total and deterministic. A pre-assigned `personaId` wins over every
/// rule; an unknown pre-assigned id resolves to the default persona.
///
/// # Examples
/// ```
/// use vibes_core::UsageBundle;
/// use vibes_core::metrics::derive;
/// use vibes_persona::{PersonaId, classify};
///
/// let mut bundle = UsageBundle::default();
/// bundle.stats.hour_counts[2] = 100;
/// assert_eq!(classify(&derive(&bundle), &bundle), PersonaId::ThreeAmDemon);
///
/// bundle.persona_id = Some("token-titan".to_string());
/// assert_eq!(classify(&derive(&bundle), &bundle), PersonaId::TokenTitan);
/// ```
pub fn classify(metrics: &DerivedMetrics, bundle: &UsageBundle) -> PersonaId {
    explain(metrics, bundle).persona()
}
