//! Built-in demonstration bundles
//!
//! Used as the last-resort acquisition path and by `vibes demo`. The data
//! is deterministic so demo output is stable across runs.

use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;
use std::collections::BTreeMap;
use vibes_core::types::{
    CommunicationStyle, Contrasts, DailyActivity, Insights, MemorablePrompts, Obsessions,
    PhraseCount, PolitenessLevel, PromptWithContext, Quirks, Stats, TokenCounts, WordCount,
};
use vibes_core::UsageBundle;

/// Named demonstration samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum DemoSample {
    /// Heavy all-rounder who codes past midnight
    #[default]
    Default,
    /// Evening coder with a moderate night share
    NightOwl,
    /// Diplomatic prompter
    Polite,
    /// Long, methodical prompts
    EssayWriter,
}

impl DemoSample {
    /// Every sample in listing order
    pub const ALL: [DemoSample; 4] = [
        DemoSample::Default,
        DemoSample::NightOwl,
        DemoSample::Polite,
        DemoSample::EssayWriter,
    ];

    /// CLI name of the sample
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NightOwl => "night-owl",
            Self::Polite => "polite",
            Self::EssayWriter => "essay-writer",
        }
    }
}

/// Build the bundle for a demo sample
pub fn demo_bundle(sample: DemoSample) -> UsageBundle {
    match sample {
        DemoSample::Default => default_bundle(),
        DemoSample::NightOwl => night_owl_bundle(),
        DemoSample::Polite => polite_bundle(),
        DemoSample::EssayWriter => essay_writer_bundle(),
    }
}

const GENERATED_AT: &str = "2025-12-31T12:00:00Z";

fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
    pairs
        .iter()
        .map(|&(name, count)| (name.to_string(), count))
        .collect()
}

fn words(pairs: &[(&str, u64)]) -> Vec<WordCount> {
    pairs
        .iter()
        .map(|&(word, count)| WordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

fn phrases(pairs: &[(&str, u64)]) -> Vec<PhraseCount> {
    pairs
        .iter()
        .map(|&(phrase, count)| PhraseCount {
            phrase: phrase.to_string(),
            count,
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn prompt(prompt: &str, context: &str) -> Option<PromptWithContext> {
    Some(PromptWithContext {
        prompt: prompt.to_string(),
        context: Some(context.to_string()),
    })
}

fn peak_hour(hour_counts: &[u64; 24]) -> u8 {
    (0u8..24)
        .max_by_key(|&h| (hour_counts[h as usize], std::cmp::Reverse(h)))
        .unwrap_or(0)
}

// A year of bursty activity: busier on weekdays and in two of every four weeks.
fn active_dates() -> Vec<DailyActivity> {
    let Some(start) = NaiveDate::from_ymd_opt(2025, 1, 1) else {
        return Vec::new();
    };
    start
        .iter_days()
        .take(364)
        .enumerate()
        .filter_map(|(i, date)| {
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            let sprint = (i / 7) % 4 < 2;
            let active = if weekend { i % 5 == 0 } else { sprint || i % 2 == 0 };
            active.then(|| DailyActivity {
                date,
                sessions: (i as u64 * 7 + date.day() as u64) % 8 + 1,
            })
        })
        .collect()
}

fn stats(
    sessions: u64,
    tokens: TokenCounts,
    tool_usage: BTreeMap<String, u64>,
    model_usage: BTreeMap<String, u64>,
    hour_counts: [u64; 24],
    longest_session_minutes: f64,
    project_count: u64,
) -> Stats {
    let active_dates = active_dates();
    Stats {
        total_sessions: sessions,
        total_messages: sessions * 15,
        total_tokens: tokens,
        total_tool_calls: tool_usage.values().sum(),
        tool_usage,
        model_usage,
        hour_counts,
        peak_hour: peak_hour(&hour_counts),
        longest_session_minutes,
        total_minutes: Some(sessions as f64 * 38.0),
        project_count,
        days_active: active_dates.len() as u64,
        active_dates,
    }
}

fn default_bundle() -> UsageBundle {
    UsageBundle {
        stats: stats(
            847,
            TokenCounts::new(4_521_890, 2_134_567, 1_876_543),
            counts(&[
                ("Read", 2847),
                ("Bash", 2341),
                ("Edit", 1876),
                ("Write", 892),
                ("Grep", 534),
                ("Glob", 298),
                ("Task", 146),
            ]),
            counts(&[("sonnet", 3_245_678), ("opus", 1_876_543), ("haiku", 534_236)]),
            [
                23, 18, 12, 8, 5, 12, 34, 56, 78, 89, 92, 87, 76, 82, 91, 95, 89, 78, 67, 54, 45,
                38, 32, 28,
            ],
            247.0,
            23,
        ),
        quirks: Some(Quirks {
            interrupt_count: 23,
            abandoned_sessions: 47,
            late_night_sessions: 89,
            early_morning_sessions: 34,
            weekend_percentage: 28.0,
            shortest_session_seconds: 12,
            longest_streak_days: 14,
        }),
        insights: Some(Insights {
            memorable_prompts: Some(MemorablePrompts {
                funniest: prompt(
                    "can you make this code not suck",
                    "A refreshingly honest request for code improvement",
                ),
                most_frustrated: prompt(
                    "WHY IS THIS NOT WORKING I HAVE TRIED EVERYTHING",
                    "All caps, hours into a debugging session",
                ),
                most_ambitious: prompt(
                    "rewrite the whole auth flow but keep every test green",
                    "Scope creep in a single sentence",
                ),
                weirdest: prompt(
                    "make the button more... buttony",
                    "Somehow it made sense in context",
                ),
            }),
            communication_style: Some(CommunicationStyle {
                catchphrases: strings(&["can you just...", "help me understand", "fix this please"]),
                signature_openers: strings(&["Hey", "Can you help me", "Quick question:"]),
                verbal_tics: strings(&["basically", "just", "like"]),
                politeness_level: Some(PolitenessLevel::Direct),
                average_prompt_length: Some(64.0),
                prompting_evolution: Some(
                    "Started verbose, became terse and efficient over time".to_string(),
                ),
            }),
            obsessions: Some(Obsessions {
                topics: strings(&["React performance", "authentication", "CSS alignment"]),
                frequently_revisited: strings(&["that auth bug", "centering divs"]),
                actual_projects: strings(&["E-commerce dashboard", "CLI tool"]),
            }),
            contrasts: Some(Contrasts {
                shortest_effective: Some("fix it".to_string()),
                most_demanding: Some("Just make it work. Now.".to_string()),
                caps_lock_prompts: Some(4),
                undo_requests: Some(12),
                ..Default::default()
            }),
            top_words: words(&[
                ("fix", 847),
                ("help", 634),
                ("error", 521),
                ("component", 387),
                ("test", 267),
                ("please", 156),
            ]),
            top_phrases: phrases(&[("can you", 234), ("help me", 198), ("not working", 143)]),
            dominant_topics: strings(&["debugging", "frontend", "testing"]),
        }),
        persona_id: None,
        traits: strings(&["night-owl", "impatient", "debugging-heavy", "direct"]),
        prompting_style: "Terse and direct, gets straight to the point".to_string(),
        communication_tone: "Casual with occasional frustration".to_string(),
        fun_facts: strings(&[
            "You said \"fix\" 847 times",
            "Your longest session was 4 hours 7 minutes",
            "You worked on 23 different projects",
        ]),
        generated_at: GENERATED_AT.to_string(),
    }
}

fn night_owl_bundle() -> UsageBundle {
    let mut hour_counts = [2; 24];
    for (hour, count) in [
        (18, 25),
        (19, 35),
        (20, 40),
        (21, 45),
        (22, 30),
        (23, 25),
        (0, 15),
        (1, 5),
    ] {
        hour_counts[hour] = count;
    }
    UsageBundle {
        stats: stats(
            212,
            TokenCounts::new(900_000, 400_000, 450_000),
            counts(&[("Read", 400), ("Edit", 350), ("Bash", 200), ("Grep", 90)]),
            counts(&[("sonnet", 1_100_000), ("haiku", 200_000)]),
            hour_counts,
            95.0,
            6,
        ),
        traits: strings(&["curious"]),
        prompting_style: "Conversational".to_string(),
        generated_at: GENERATED_AT.to_string(),
        ..Default::default()
    }
}

fn polite_bundle() -> UsageBundle {
    let mut hour_counts = [0; 24];
    for hour in 9..18 {
        hour_counts[hour] = 20;
    }
    UsageBundle {
        stats: stats(
            140,
            TokenCounts::new(600_000, 300_000, 200_000),
            counts(&[("Read", 300), ("Edit", 250), ("Write", 80)]),
            counts(&[("sonnet", 900_000)]),
            hour_counts,
            70.0,
            4,
        ),
        insights: Some(Insights {
            communication_style: Some(CommunicationStyle {
                politeness_level: Some(PolitenessLevel::Diplomatic),
                catchphrases: strings(&["would you mind", "thank you so much"]),
                ..Default::default()
            }),
            top_words: words(&[("please", 310), ("thanks", 240), ("sorry", 45)]),
            ..Default::default()
        }),
        traits: strings(&["collaborative"]),
        generated_at: GENERATED_AT.to_string(),
        ..Default::default()
    }
}

fn essay_writer_bundle() -> UsageBundle {
    let mut hour_counts = [0; 24];
    for hour in 10..19 {
        hour_counts[hour] = 12;
    }
    UsageBundle {
        stats: stats(
            96,
            TokenCounts::new(700_000, 250_000, 350_000),
            counts(&[("Read", 500), ("Edit", 120), ("Task", 40)]),
            counts(&[("sonnet", 950_000)]),
            hour_counts,
            150.0,
            3,
        ),
        insights: Some(Insights {
            communication_style: Some(CommunicationStyle {
                politeness_level: Some(PolitenessLevel::Direct),
                average_prompt_length: Some(480.0),
                ..Default::default()
            }),
            top_words: words(&[("because", 64), ("context", 41)]),
            dominant_topics: strings(&["architecture", "refactoring"]),
            ..Default::default()
        }),
        traits: strings(&["methodical", "thorough"]),
        prompting_style: "Long-form, with background for the background".to_string(),
        generated_at: GENERATED_AT.to_string(),
        ..Default::default()
    }
}
