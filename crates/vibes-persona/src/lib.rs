//! Persona classification for vibes
//!
//! - [`catalog`]: the closed persona catalog keyed by [`PersonaId`]
//! - [`classifier`]: the ordered rule cascade that picks exactly one persona
//! - [`roast`]: canned copy for words, quirks and topics

pub mod catalog;
pub mod classifier;
pub mod roast;

pub use catalog::{Category, PersonaDefinition, PersonaId, get_persona};
pub use classifier::{Classification, ClassifierInput, RULES, Rule, Tier, classify, explain};
pub use roast::{Roasts, quirk_roast, roasts_for, topic_roast, word_roast};
