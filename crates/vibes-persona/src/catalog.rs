//! Persona catalog
//!
//! The catalog is static reference data: one [`PersonaDefinition`] per
//! [`PersonaId`], stored in [`PersonaId::ALL`] order. Every field is
//! mandatory except `evidence`. Lookups by wire name go through
//! [`get_persona`], which resolves unknown or retired ids to
//! [`PersonaId::DEFAULT`] instead of failing.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use vibes_core::VibesError;

/// Identifier of a persona in the closed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaId {
    #[serde(rename = "3am-demon")]
    ThreeAmDemon,
    PoliteMenace,
    DebugDemon,
    CssCasualty,
    SquirrelBrain,
    VibeCoder,
    BashBerserker,
    OpusMaximalist,
    ContextAmnesiac,
    SpeedDemon,
    TokenTitan,
    SwissArmyKnife,
    CacheWizard,
    NightOwl,
    EarlyBird,
    ProjectNomad,
    DeepDiver,
    Architect,
    Explorer,
    Perfectionist,
    Collaborator,
    Experimenter,
    CodeRoulette,
}

impl PersonaId {
    /// Persona returned when no rule matches or an id is unknown
    pub const DEFAULT: PersonaId = PersonaId::CodeRoulette;

    /// Every persona in catalog order
    pub const ALL: [PersonaId; 23] = [
        PersonaId::ThreeAmDemon,
        PersonaId::PoliteMenace,
        PersonaId::DebugDemon,
        PersonaId::CssCasualty,
        PersonaId::SquirrelBrain,
        PersonaId::VibeCoder,
        PersonaId::BashBerserker,
        PersonaId::OpusMaximalist,
        PersonaId::ContextAmnesiac,
        PersonaId::SpeedDemon,
        PersonaId::TokenTitan,
        PersonaId::SwissArmyKnife,
        PersonaId::CacheWizard,
        PersonaId::NightOwl,
        PersonaId::EarlyBird,
        PersonaId::ProjectNomad,
        PersonaId::DeepDiver,
        PersonaId::Architect,
        PersonaId::Explorer,
        PersonaId::Perfectionist,
        PersonaId::Collaborator,
        PersonaId::Experimenter,
        PersonaId::CodeRoulette,
    ];

    /// Wire name, e.g. `"token-titan"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeAmDemon => "3am-demon",
            Self::PoliteMenace => "polite-menace",
            Self::DebugDemon => "debug-demon",
            Self::CssCasualty => "css-casualty",
            Self::SquirrelBrain => "squirrel-brain",
            Self::VibeCoder => "vibe-coder",
            Self::BashBerserker => "bash-berserker",
            Self::OpusMaximalist => "opus-maximalist",
            Self::ContextAmnesiac => "context-amnesiac",
            Self::SpeedDemon => "speed-demon",
            Self::TokenTitan => "token-titan",
            Self::SwissArmyKnife => "swiss-army-knife",
            Self::CacheWizard => "cache-wizard",
            Self::NightOwl => "night-owl",
            Self::EarlyBird => "early-bird",
            Self::ProjectNomad => "project-nomad",
            Self::DeepDiver => "deep-diver",
            Self::Architect => "architect",
            Self::Explorer => "explorer",
            Self::Perfectionist => "perfectionist",
            Self::Collaborator => "collaborator",
            Self::Experimenter => "experimenter",
            Self::CodeRoulette => "code-roulette",
        }
    }

    /// Catalog entry for this persona
    pub fn definition(&self) -> &'static PersonaDefinition {
        &CATALOG[*self as usize]
    }

    /// Resolve a wire name, falling back to [`PersonaId::DEFAULT`]
    pub fn resolve(name: &str) -> PersonaId {
        match name.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    "Unknown persona id '{}', using {}",
                    name,
                    PersonaId::DEFAULT
                );
                PersonaId::DEFAULT
            }
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaId {
    type Err = VibesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| VibesError::InvalidArgument(format!("unknown persona id: {s}")))
    }
}

/// Broad grouping used by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Legendary,
    Lifestyle,
    Personality,
    Roast,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legendary => write!(f, "legendary"),
            Self::Lifestyle => write!(f, "lifestyle"),
            Self::Personality => write!(f, "personality"),
            Self::Roast => write!(f, "roast"),
        }
    }
}

/// Display data for one persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaDefinition {
    pub id: PersonaId,
    pub name: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    /// Accent color as a CSS hex string
    pub color: &'static str,
    /// CSS gradient used behind the persona card
    pub gradient: &'static str,
    pub category: Category,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<&'static [&'static str]>,
}

/// Look up a persona by wire name; unknown ids yield the default persona
///
/// # Examples
/// ```
/// use vibes_persona::{PersonaId, get_persona};
///
/// assert_eq!(get_persona("token-titan").id, PersonaId::TokenTitan);
/// assert_eq!(get_persona("token-burner").id, PersonaId::DEFAULT);
/// ```
pub fn get_persona(id: &str) -> &'static PersonaDefinition {
    PersonaId::resolve(id).definition()
}

static BY_NAME: Lazy<HashMap<&'static str, PersonaId>> = Lazy::new(|| {
    PersonaId::ALL
        .iter()
        .map(|&id| (id.as_str(), id))
        .collect()
});

static CATALOG: [PersonaDefinition; 23] = [
    PersonaDefinition {
        id: PersonaId::ThreeAmDemon,
        name: "3AM DEMON",
        tagline: "Sleep is for the weak",
        description: "Your peak hours are when everyone else is unconscious. The bugs you write at 3AM will be waiting for you at 9AM, and they will have friends.",
        color: "#2c3e50",
        gradient: "linear-gradient(135deg, #1a1a2e, #16213e, #0f3460)",
        category: Category::Roast,
        icon: "👹",
        evidence: Some(&[
            "Most active between midnight and 4 AM",
            "Sunlight is a rumor to you",
        ]),
    },
    PersonaDefinition {
        id: PersonaId::PoliteMenace,
        name: "POLITE MENACE",
        tagline: "Please and thank you, now rewrite everything",
        description: "Every prompt opens with a courtesy and ends with a demolition order. You apologize to the model and then ask it to start over. Again.",
        color: "#fd79a8",
        gradient: "linear-gradient(135deg, #fd79a8, #e84393, #6c5ce7)",
        category: Category::Roast,
        icon: "🎩",
        evidence: Some(&["\"Please\" count: excessive", "Sorry, not sorry"]),
    },
    PersonaDefinition {
        id: PersonaId::DebugDemon,
        name: "DEBUG DEMON",
        tagline: "Your code: broken. Your spirit: also broken.",
        description: "Debugging is not a phase of your workflow, it is the workflow. You fix one thing and break two more; the moles are winning.",
        color: "#e67e22",
        gradient: "linear-gradient(135deg, #e67e22, #d35400, #c0392b)",
        category: Category::Roast,
        icon: "🐛",
        evidence: Some(&[
            "Error messages: your love language",
            "Working code: a rare achievement",
        ]),
    },
    PersonaDefinition {
        id: PersonaId::CssCasualty,
        name: "CSS CASUALTY",
        tagline: "Centering a div is your villain origin story",
        description: "Flexbox, grid, z-index: you have fought them all and lost with dignity. Your stylesheets have stylesheets.",
        color: "#e84393",
        gradient: "linear-gradient(135deg, #e84393, #636e72, #f97316)",
        category: Category::Roast,
        icon: "💀",
        evidence: Some(&["\"center\" is in your top words", "!important, everywhere"]),
    },
    PersonaDefinition {
        id: PersonaId::SquirrelBrain,
        name: "SQUIRREL BRAIN",
        tagline: "Ooh shiny... wait, what were we doing?",
        description: "You interrupt mid-thought and abandon sessions constantly. You started 47 things and finished 2. \"Actually, go back\" is your catchphrase.",
        color: "#f39c12",
        gradient: "linear-gradient(135deg, #f39c12, #f1c40f, #e67e22)",
        category: Category::Roast,
        icon: "🐿️",
        evidence: Some(&[
            "Interrupted the model: constantly",
            "Abandoned sessions: everywhere",
        ]),
    },
    PersonaDefinition {
        id: PersonaId::VibeCoder,
        name: "VIBE CODER",
        tagline: "\"just make it work lol\"",
        description: "You don't write code, you manifest it. \"fix\" and \"help\" are your entire vocabulary and the plan is whatever the model says it is.",
        color: "#ff6b6b",
        gradient: "linear-gradient(135deg, #ff6b6b, #ee5a24, #ff3838)",
        category: Category::Roast,
        icon: "🎲",
        evidence: Some(&["Average prompt: vibes only", "Plans read: approximately zero"]),
    },
    PersonaDefinition {
        id: PersonaId::BashBerserker,
        name: "BASH BERSERKER",
        tagline: "When in doubt, sudo",
        description: "Read a file? Bash. Edit code? Bash. Emotional problems? Probably bash. You live in the terminal and the terminal lives in you.",
        color: "#fb923c",
        gradient: "linear-gradient(135deg, #fb923c, #f97316, #ea580c)",
        category: Category::Roast,
        icon: "💥",
        evidence: Some(&["Bash usage: over half of all tool calls", "GUI is for the weak"]),
    },
    PersonaDefinition {
        id: PersonaId::OpusMaximalist,
        name: "OPUS MAXIMALIST",
        tagline: "The biggest model for the smallest task",
        description: "You bring the heaviest model to rename a variable. Your token count is modest; your ambitions for it are not.",
        color: "#a29bfe",
        gradient: "linear-gradient(135deg, #a29bfe, #6c5ce7, #341f97)",
        category: Category::Roast,
        icon: "👑",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::ContextAmnesiac,
        name: "CONTEXT AMNESIAC",
        tagline: "Paying full price for the same context, every time",
        description: "Millions of tokens and barely any of them cached. Every session starts from scratch, like meeting your codebase for the first time.",
        color: "#74b9ff",
        gradient: "linear-gradient(135deg, #74b9ff, #0984e3, #2d3436)",
        category: Category::Roast,
        icon: "🫥",
        evidence: Some(&["Cache hit rate: tragic"]),
    },
    PersonaDefinition {
        id: PersonaId::SpeedDemon,
        name: "SPEED DEMON",
        tagline: "Why is it not done yet?",
        description: "You hit enter before the last answer finished rendering. Patience is a setting you have never found.",
        color: "#ff7675",
        gradient: "linear-gradient(135deg, #ff7675, #d63031, #e17055)",
        category: Category::Roast,
        icon: "⚡",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::TokenTitan,
        name: "TOKEN TITAN",
        tagline: "Anthropic's favorite customer",
        description: "You have burned through more tokens than most people have read words. Somebody's holiday bonus is on you.",
        color: "#ffd700",
        gradient: "linear-gradient(135deg, #ffd700, #ff8c00, #ff4500)",
        category: Category::Legendary,
        icon: "🔥",
        evidence: Some(&["Token usage: absolutely unhinged", "You keep the lights on"]),
    },
    PersonaDefinition {
        id: PersonaId::SwissArmyKnife,
        name: "SWISS ARMY KNIFE",
        tagline: "Every tool, every day",
        description: "Thousands of tool calls spread across the whole toolbox. If a tool exists you have used it, probably twice.",
        color: "#d63031",
        gradient: "linear-gradient(135deg, #d63031, #e17055, #fdcb6e)",
        category: Category::Legendary,
        icon: "🛠️",
        evidence: Some(&["Used every tool in the arsenal"]),
    },
    PersonaDefinition {
        id: PersonaId::CacheWizard,
        name: "CACHE WIZARD",
        tagline: "Why pay twice?",
        description: "Most of your input comes straight from cache. You have turned context reuse into an art form and your bill thanks you.",
        color: "#00cec9",
        gradient: "linear-gradient(135deg, #00cec9, #0984e3, #6c5ce7)",
        category: Category::Legendary,
        icon: "🧙",
        evidence: Some(&["Cache hit rate: suspiciously good"]),
    },
    PersonaDefinition {
        id: PersonaId::NightOwl,
        name: "NIGHT OWL",
        tagline: "Best ideas arrive after dark",
        description: "A good share of your sessions start after 10 PM. The house is quiet, the coffee is cold and the code is flowing.",
        color: "#6c5ce7",
        gradient: "linear-gradient(135deg, #2d3436, #6c5ce7, #a29bfe)",
        category: Category::Lifestyle,
        icon: "🦉",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::EarlyBird,
        name: "EARLY BIRD",
        tagline: "Shipping before standup",
        description: "You are coding while the sun comes up. Disgusting. Respect.",
        color: "#fdcb6e",
        gradient: "linear-gradient(135deg, #fdcb6e, #ffeaa7, #fab1a0)",
        category: Category::Lifestyle,
        icon: "🐦",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::ProjectNomad,
        name: "PROJECT NOMAD",
        tagline: "So many repos, so little time",
        description: "You wander from project to project and leave a trail of half-built ideas behind. Commitment is a git command, not a lifestyle.",
        color: "#55efc4",
        gradient: "linear-gradient(135deg, #55efc4, #00b894, #00cec9)",
        category: Category::Lifestyle,
        icon: "🧳",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::DeepDiver,
        name: "DEEP DIVER",
        tagline: "See you in three hours",
        description: "Your longest session outlasted a feature film. When you go in, you go all the way down.",
        color: "#0984e3",
        gradient: "linear-gradient(135deg, #0984e3, #074e8c, #001f3f)",
        category: Category::Lifestyle,
        icon: "🤿",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::Architect,
        name: "THE ARCHITECT",
        tagline: "Plan first, code later",
        description: "You think in systems and diagrams. Every change has a plan and every plan has a plan.",
        color: "#636e72",
        gradient: "linear-gradient(135deg, #636e72, #2d3436, #b2bec3)",
        category: Category::Personality,
        icon: "📐",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::Explorer,
        name: "THE EXPLORER",
        tagline: "What does this button do?",
        description: "You ask why, then how, then what if. Every codebase is a new continent to map.",
        color: "#00b894",
        gradient: "linear-gradient(135deg, #00b894, #55efc4, #81ecec)",
        category: Category::Personality,
        icon: "🧭",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::Perfectionist,
        name: "THE PERFECTIONIST",
        tagline: "Almost right is still wrong",
        description: "It works, but is it elegant? You polish until it shines and then polish the polish.",
        color: "#e17055",
        gradient: "linear-gradient(135deg, #e17055, #fab1a0, #ffeaa7)",
        category: Category::Personality,
        icon: "💎",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::Collaborator,
        name: "THE COLLABORATOR",
        tagline: "Pair programming, but make it AI",
        description: "You treat the model like a teammate: you share context, talk it through and build together.",
        color: "#0abde3",
        gradient: "linear-gradient(135deg, #0abde3, #48dbfb, #c8d6e5)",
        category: Category::Personality,
        icon: "🤝",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::Experimenter,
        name: "THE EXPERIMENTER",
        tagline: "Let's just try it",
        description: "Hypothesis, prototype, throw it away, repeat. Your branches are a lab notebook.",
        color: "#10ac84",
        gradient: "linear-gradient(135deg, #10ac84, #1dd1a1, #feca57)",
        category: Category::Personality,
        icon: "🧪",
        evidence: None,
    },
    PersonaDefinition {
        id: PersonaId::CodeRoulette,
        name: "CODE ROULETTE",
        tagline: "Spin the wheel, see what happens",
        description: "Your coding style is \"let's see what happens\". You try things until something sticks. Science? No. Effective? Sometimes.",
        color: "#00ff41",
        gradient: "linear-gradient(135deg, #00ff41, #00d4ff, #a855f7)",
        category: Category::Roast,
        icon: "🎰",
        evidence: Some(&[
            "Trial and error is your methodology",
            "Whatever works, works (until you touch it)",
        ]),
    },
];
