//! Output formatting module for vibes
//!
//! This module provides formatters for displaying results in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use vibes::demo::{DemoSample, demo_bundle};
//! use vibes::enrichment::Enricher;
//! use vibes::output::get_formatter;
//!
//! # tokio_test::block_on(async {
//! let view = Enricher::offline()
//!     .enrich(demo_bundle(DemoSample::Default), None)
//!     .await;
//!
//! // Table formatter for humans, JSON formatter for scripts
//! println!("{}", get_formatter(false).format_view(&view));
//! println!("{}", get_formatter(true).format_view(&view));
//! # });
//! ```

use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde::Serialize;
use serde_json::json;
use vibes_core::{DerivedMetrics, Percentiles};
use vibes_percentile::PercentileOrigin;
use vibes_persona::{Classification, PersonaDefinition, Rule};

use crate::batch::{ClassifiedFile, RankedFile};
use crate::enrichment::WrappedView;
use crate::submission::GlobalStats;

/// Trait for output formatters
///
/// Implementations decide how each command's result is rendered; the
/// command handlers only pick a formatter and print what it returns.
pub trait OutputFormatter {
    /// Format an enriched wrapped view
    fn format_view(&self, view: &WrappedView) -> String;

    /// Format per-file classifications
    fn format_classifications(&self, files: &[ClassifiedFile]) -> String;

    /// Format per-file rankings with the batch's aggregate counters
    fn format_rankings(&self, files: &[RankedFile], stats: &GlobalStats) -> String;

    /// Format the persona catalog
    fn format_catalog(&self, personas: &[&PersonaDefinition]) -> String;

    /// Format the classification cascade
    fn format_rules(&self, rules: &[Rule]) -> String;
}

/// Table formatter for human-readable output
///
/// Numbers are formatted with thousands separators and percentiles are
/// phrased as "top N%", which is how the wrapped cards present them.
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format a ratio as a whole percentage
    fn format_share(ratio: f64) -> String {
        format!("{:.0}%", ratio * 100.0)
    }

    /// Format a percentile score
    fn format_percentile(score: f64) -> String {
        format!("top {score:.0}%")
    }

    /// Persona name in its accent color
    fn persona_label(persona: &PersonaDefinition) -> String {
        let label = format!("{} {}", persona.icon, persona.name);
        match parse_hex_color(persona.color) {
            Some((r, g, b)) => label.truecolor(r, g, b).bold().to_string(),
            None => label.bold().to_string(),
        }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn percentile_table(percentiles: &Percentiles, metrics: &DerivedMetrics) -> Table {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Dimension", b -> "Value", b -> "Percentile"]);

        let values = [
            Self::format_number(metrics.total_tokens),
            metrics.tool_diversity.to_string(),
            Self::format_share(metrics.night_percentage),
            format!("{:.0} min", metrics.longest_session_minutes),
            Self::format_share(metrics.clamped_cache_rate()),
            Self::format_number(metrics.total_sessions),
        ];
        for ((dimension, score), value) in percentiles.iter().zip(values) {
            table.add_row(row![
                dimension,
                r -> value,
                r -> Self::format_percentile(score)
            ]);
        }
        table
    }

    fn classification_detail(classification: &Classification) -> String {
        match classification {
            Classification::Preassigned { .. } => "pre-assigned".to_string(),
            Classification::Matched { tier, .. } => format!("tier {} ({tier})", tier.rank()),
            Classification::Default { .. } => "default".to_string(),
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_view(&self, view: &WrappedView) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", Self::persona_label(view.persona)));
        output.push_str(&format!("{}\n", view.persona.tagline.italic()));
        output.push_str(&format!("{}\n\n", view.persona.description));

        if let Some(evidence) = view.persona.evidence {
            for line in evidence {
                output.push_str(&format!("  • {line}\n"));
            }
            output.push('\n');
        }

        output.push_str(&Self::percentile_table(&view.percentiles, &view.metrics).to_string());
        if !view.roasts.is_empty() {
            output.push('\n');
            for line in view.roasts.lines() {
                output.push_str(&format!("{}\n", line.dimmed()));
            }
        }
        output.push_str(&format!(
            "\nPercentiles: {}",
            match view.percentile_source {
                PercentileOrigin::Population => "population",
                PercentileOrigin::Estimate => "estimate",
            }
        ));
        if let Some(id) = &view.bundle_id {
            output.push_str(&format!("\nShare id: {id}"));
        }
        output.push('\n');
        output
    }

    fn format_classifications(&self, files: &[ClassifiedFile]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "File",
            b -> "Persona",
            b -> "Chosen By",
            b -> "Tokens",
            b -> "Night",
            b -> "Cache"
        ]);

        for file in files {
            let persona = file.classification.persona().definition();
            table.add_row(row![
                file.path.display(),
                Self::persona_label(persona),
                Self::classification_detail(&file.classification),
                r -> Self::format_number(file.metrics.total_tokens),
                r -> Self::format_share(file.metrics.night_percentage),
                r -> Self::format_share(file.metrics.clamped_cache_rate())
            ]);
        }

        table.to_string()
    }

    fn format_rankings(&self, files: &[RankedFile], stats: &GlobalStats) -> String {
        let mut table = Self::new_table();
        let mut titles = vec![
            Cell::new("File").style_spec("b"),
            Cell::new("Persona").style_spec("b"),
        ];
        titles.extend(
            vibes_core::Dimension::ALL
                .iter()
                .map(|d| Cell::new(d.as_str()).style_spec("b")),
        );
        table.set_titles(Row::new(titles));

        for file in files {
            let mut cells = vec![
                Cell::new(&file.path.display().to_string()),
                Cell::new(file.persona.as_str()),
            ];
            cells.extend(
                file.percentiles
                    .iter()
                    .map(|(_, score)| Cell::new(&format!("{score:.0}")).style_spec("r")),
            );
            table.add_row(Row::new(cells));
        }

        let mut output = table.to_string();
        output.push_str(&format!(
            "\nWraps: {}  Tokens processed: {}  Top persona: {}  Avg sessions: {}\n",
            Self::format_number(stats.total_wraps),
            Self::format_number(stats.total_tokens_processed),
            stats.top_persona,
            Self::format_number(stats.avg_sessions),
        ));
        output
    }

    fn format_catalog(&self, personas: &[&PersonaDefinition]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Id", b -> "Persona", b -> "Category", b -> "Tagline"]);

        for persona in personas {
            table.add_row(row![
                persona.id,
                Self::persona_label(persona),
                persona.category,
                persona.tagline
            ]);
        }

        table.to_string()
    }

    fn format_rules(&self, rules: &[Rule]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Tier", b -> "Persona", b -> "Condition"]);

        for (position, rule) in rules.iter().enumerate() {
            table.add_row(row![
                r -> (position + 1),
                format!("{} ({})", rule.tier.rank(), rule.tier),
                rule.persona,
                rule.condition
            ]);
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// Emits pretty-printed JSON using the same camelCase field names as the
/// bundle wire format, so the output can be piped back into other tools.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: &impl Serialize) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_view(&self, view: &WrappedView) -> String {
        Self::render(view)
    }

    fn format_classifications(&self, files: &[ClassifiedFile]) -> String {
        Self::render(&json!({ "classifications": files }))
    }

    fn format_rankings(&self, files: &[RankedFile], stats: &GlobalStats) -> String {
        Self::render(&json!({
            "rankings": files,
            "stats": stats,
        }))
    }

    fn format_catalog(&self, personas: &[&PersonaDefinition]) -> String {
        Self::render(&json!({ "personas": personas }))
    }

    fn format_rules(&self, rules: &[Rule]) -> String {
        Self::render(&json!({ "rules": rules }))
    }
}

/// Get appropriate formatter based on JSON flag
///
/// # Examples
///
/// ```
/// use vibes::output::get_formatter;
/// use vibes_persona::RULES;
///
/// let output = get_formatter(true).format_rules(RULES);
/// assert!(output.contains("\"rules\""));
/// ```
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

/// Parse a `#rrggbb` CSS color
fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
