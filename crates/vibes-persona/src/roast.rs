//! Canned roast copy for renderers
//!
//! Each helper has a fixed table of lines and a generic fallback, so any
//! input produces a line. [`roasts_for`] picks the lines a bundle earns.

use serde::Serialize;
use vibes_core::UsageBundle;

/// Roast lines earned by one bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roasts {
    /// Line for the most frequent word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_word: Option<String>,
    /// Lines for the quirks that stand out, in display order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quirks: Vec<String>,
    /// Line for the most dominant topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Roasts {
    /// Whether the bundle earned no lines at all
    pub fn is_empty(&self) -> bool {
        self.top_word.is_none() && self.quirks.is_empty() && self.topic.is_none()
    }

    /// All lines, word first and topic last
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.top_word
            .iter()
            .chain(&self.quirks)
            .chain(&self.topic)
            .map(String::as_str)
    }
}

/// Collect the roast lines a bundle earns
///
/// Quirks only count past their thresholds: any interrupt or after-midnight
/// session, more than 20% weekend coding, a session under a minute, a streak
/// over 3 days, more than 5 abandoned sessions. Topics share 100% equally.
pub fn roasts_for(bundle: &UsageBundle) -> Roasts {
    let insights = bundle.insights.as_ref();

    let top_word = insights
        .and_then(|insights| insights.top_words.first())
        .map(|w| word_roast(&w.word, w.count));

    let topic = insights.and_then(|insights| {
        let topics = &insights.dominant_topics;
        let share = (100.0 / topics.len().max(1) as f64).round();
        topics.first().map(|topic| topic_roast(topic, share))
    });

    let mut quirks = Vec::new();
    if let Some(q) = &bundle.quirks {
        let earned = [
            ("interruptCount", q.interrupt_count as f64, q.interrupt_count > 0),
            ("lateNightSessions", q.late_night_sessions as f64, q.late_night_sessions > 0),
            ("weekendPercentage", q.weekend_percentage, q.weekend_percentage > 20.0),
            (
                "shortestSessionSeconds",
                q.shortest_session_seconds as f64,
                (1..60).contains(&q.shortest_session_seconds),
            ),
            ("longestStreakDays", q.longest_streak_days as f64, q.longest_streak_days > 3),
            ("abandonedSessions", q.abandoned_sessions as f64, q.abandoned_sessions > 5),
        ];
        quirks = earned
            .into_iter()
            .filter(|&(_, _, earned)| earned)
            .map(|(name, value, _)| quirk_roast(name, value))
            .collect();
    }

    Roasts {
        top_word,
        quirks,
        topic,
    }
}

/// Roast line for a frequently used word (matched case-insensitively)
///
/// # Examples
/// ```
/// use vibes_persona::word_roast;
///
/// assert!(word_roast("FIX", 42).contains("42"));
/// assert_eq!(
///     word_roast("banana", 3),
///     "You said \"banana\" 3 times. Interesting choice."
/// );
/// ```
pub fn word_roast(word: &str, count: u64) -> String {
    match word.to_lowercase().as_str() {
        "fix" => format!("You said \"fix\" {count} times. Have you considered writing code that works?"),
        "help" => format!("\"Help\" appeared {count} times. Learned helplessness is your superpower."),
        "please" => format!("{count} \"please\"s. Manners won't fix your code, but we appreciate the effort."),
        "why" => format!("You asked \"why\" {count} times. The code is judging you back."),
        "error" => format!("{count} errors discussed. Your code is a support group for bugs."),
        "bug" => format!("{count} bugs mentioned. At this point it's a feature farm."),
        "test" => format!("{count} test mentions. Running them is a different story."),
        "just" => format!("\"Just\" appeared {count} times. Nothing is ever \"just\" anything."),
        "actually" => format!("\"Actually\" {count} times. Changing your mind is your cardio."),
        "undo" => format!("\"Undo\" {count} times. Ctrl+Z is your love language."),
        "again" => format!("\"Again\" {count} times. Groundhog Day vibes."),
        "sorry" => format!("\"Sorry\" {count} times. Nobody is mad. Yet."),
        "thanks" => format!("\"Thanks\" {count} times. Gratitude noted, not billable."),
        "quick" => format!("\"Quick\" {count} times. Nothing you asked for was quick."),
        _ => format!("You said \"{word}\" {count} times. Interesting choice."),
    }
}

/// Roast line for a behavioral quirk, keyed by its camelCase wire name
pub fn quirk_roast(quirk: &str, value: f64) -> String {
    match quirk {
        "interruptCount" => format!("Interrupted {value} times. Patience of a caffeinated squirrel."),
        "abandonedSessions" => {
            format!("{value} abandoned sessions. Your code has abandonment issues now.")
        }
        "lateNightSessions" => {
            format!("{value} sessions after midnight. Your 3AM code will haunt you at 9AM.")
        }
        "earlyMorningSessions" => format!("{value} sessions before 8AM. Disgusting. Respect."),
        "weekendPercentage" => format!("{value}% weekend coding. Work-life balance left the chat."),
        "shortestSessionSeconds" => {
            format!("Shortest session: {value} seconds. Just checking if anyone was home.")
        }
        "longestStreakDays" => format!("{value} day streak. The sun misses you."),
        _ => format!("{quirk}: {value}. Make of that what you will."),
    }
}

/// Roast line for a dominant topic and its share in percent
pub fn topic_roast(topic: &str, percentage: f64) -> String {
    match topic {
        "debugging" => format!("{percentage}% debugging. Your code is a bug sanctuary."),
        "frontend" => format!("{percentage}% frontend. CSS: Can't Style Stuff."),
        "backend" => format!("{percentage}% backend. REST in peace, endpoints."),
        "devops" => format!("{percentage}% devops. YAML indentation is your nemesis."),
        "ai" => format!("{percentage}% AI/ML. Using AI to write AI prompts. Very meta."),
        "testing" => format!("{percentage}% testing. Writing tests for code that's already broken."),
        "refactoring" => format!("{percentage}% refactoring. If it works, make it not work prettier."),
        "deployment" => format!("{percentage}% deployment. Shipping bugs to production at scale."),
        "database" => format!("{percentage}% database. SELECT * FROM problems WHERE solution IS NULL."),
        "security" => format!("{percentage}% security. Closing the barn door after the horses left."),
        _ => format!("{percentage}% {topic}. A choice was made."),
    }
}
