//! Inline bundle encoding
//!
//! `encode` never emits `+`, `/` or `=`. `decode` is lenient about what it
//! accepts: surrounding whitespace, the standard base64 alphabet and
//! trailing padding are normalized away before the strict decode, so links
//! mangled by chat clients or form decoding still resolve.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};
use tracing::debug;
use vibes_core::{Result, UsageBundle, VibesError};

/// Upper bound on the inflated JSON, guarding against deflate bombs
pub const MAX_DECODED_BYTES: u64 = 8 * 1024 * 1024;

/// Encode a bundle into a URL-safe string
///
/// # Examples
/// ```
/// use vibes_codec::{decode, encode};
/// use vibes_core::UsageBundle;
///
/// let mut bundle = UsageBundle::default();
/// bundle.stats.total_sessions = 42;
///
/// let encoded = encode(&bundle).unwrap();
/// assert!(!encoded.contains(['+', '/', '=']));
/// assert_eq!(decode(&encoded).unwrap(), bundle);
/// ```
pub fn encode(bundle: &UsageBundle) -> Result<String> {
    let json = serde_json::to_vec(bundle)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    let encoded = URL_SAFE_NO_PAD.encode(&compressed);
    debug!(
        json_bytes = json.len(),
        compressed_bytes = compressed.len(),
        encoded_len = encoded.len(),
        "Encoded bundle"
    );
    Ok(encoded)
}

/// Decode a URL-safe string back into a bundle
///
/// Fails with [`VibesError::Decode`] when the text is not base64 or the
/// bytes do not inflate, and with [`VibesError::MalformedBundle`] or
/// [`VibesError::Json`] when the JSON is not a bundle.
pub fn decode(encoded: &str) -> Result<UsageBundle> {
    UsageBundle::from_value(decode_value(encoded)?)
}

/// Decode to raw JSON without validating the bundle shape
pub fn decode_value(encoded: &str) -> Result<serde_json::Value> {
    let normalized = normalize(encoded);
    if normalized.is_empty() {
        return Err(VibesError::Decode("empty payload".to_string()));
    }

    let compressed = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| VibesError::Decode(format!("invalid base64url: {e}")))?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_BYTES + 1)
        .read_to_end(&mut json)
        .map_err(|e| VibesError::Decode(format!("inflate failed: {e}")))?;
    if json.len() as u64 > MAX_DECODED_BYTES {
        return Err(VibesError::Decode(format!(
            "payload inflates past {MAX_DECODED_BYTES} bytes"
        )));
    }

    debug!(
        compressed_bytes = compressed.len(),
        json_bytes = json.len(),
        "Decoded bundle"
    );
    Ok(serde_json::from_slice(&json)?)
}

fn normalize(encoded: &str) -> String {
    encoded
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            // '+' arrives as a space once a query string is form-decoded
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use proptest::prelude::*;
    use vibes_core::types::{Insights, PolitenessLevel, Quirks, TokenCounts, WordCount};

    fn sample_bundle() -> UsageBundle {
        let mut bundle = UsageBundle::from_json(
            r#"{
                "stats": {"totalSessions": 120, "longestSessionMinutes": 95.5},
                "traits": ["curious", "methodical"],
                "promptingStyle": "Terse",
                "generatedAt": "2025-12-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        bundle.stats.total_tokens = TokenCounts::new(1_000_000, 500_000, 750_000);
        bundle.stats.hour_counts[22] = 7;
        bundle.stats.tool_usage.insert("Bash".to_string(), 300);
        bundle.quirks = Some(Quirks {
            interrupt_count: 4,
            weekend_percentage: 12.5,
            ..Default::default()
        });
        bundle.insights = Some(Insights {
            top_words: vec![WordCount {
                word: "fix".to_string(),
                count: 17,
            }],
            dominant_topics: vec!["debugging".to_string()],
            communication_style: Some(vibes_core::types::CommunicationStyle {
                politeness_level: Some(PolitenessLevel::Direct),
                average_prompt_length: Some(88.25),
                ..Default::default()
            }),
            ..Default::default()
        });
        bundle
    }

    // Re-encode the payload with the standard alphabet and padding
    fn to_standard_alphabet(encoded: &str) -> String {
        STANDARD.encode(URL_SAFE_NO_PAD.decode(encoded).unwrap())
    }

    #[test]
    fn test_round_trip_full_bundle() {
        let bundle = sample_bundle();
        let encoded = encode(&bundle).unwrap();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(decode(&encoded).unwrap(), bundle);
    }

    #[test]
    fn test_decode_tolerates_standard_alphabet_and_padding() {
        let bundle = sample_bundle();
        let standard = to_standard_alphabet(&encode(&bundle).unwrap());
        assert_eq!(decode(&format!("  {standard}\n")).unwrap(), bundle);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode(""), Err(VibesError::Decode(_))));
        assert!(matches!(decode("!!!!"), Err(VibesError::Decode(_))));
        // Valid base64url, but not a zlib stream
        assert!(matches!(
            decode(&URL_SAFE_NO_PAD.encode(b"plain text")),
            Err(VibesError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bundle_without_stats() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"traits": []}"#).unwrap();
        let encoded = URL_SAFE_NO_PAD.encode(encoder.finish().unwrap());

        assert!(decode_value(&encoded).is_ok());
        assert!(matches!(
            decode(&encoded),
            Err(VibesError::MalformedBundle(_))
        ));
    }

    fn arb_politeness() -> impl Strategy<Value = PolitenessLevel> {
        prop_oneof![
            Just(PolitenessLevel::Diplomatic),
            Just(PolitenessLevel::Direct),
            Just(PolitenessLevel::Demanding),
            Just(PolitenessLevel::Apologetic),
        ]
    }

    prop_compose! {
        fn arb_quirks()(
            interrupts in 0u64..1_000,
            abandoned in 0u64..1_000,
            late_night in 0u64..1_000,
            weekend in 0.0f64..100.0,
            streak in 0u64..365,
        ) -> Quirks {
            Quirks {
                interrupt_count: interrupts,
                abandoned_sessions: abandoned,
                late_night_sessions: late_night,
                weekend_percentage: weekend,
                longest_streak_days: streak,
                ..Default::default()
            }
        }
    }

    prop_compose! {
        fn arb_insights()(
            words in prop::collection::vec(("[a-z]{1,10}", 0u64..10_000), 0..6),
            topics in prop::collection::vec("[a-z ]{1,20}", 0..4),
            politeness in prop::option::of(arb_politeness()),
            prompt_length in prop::option::of(0.0f64..5_000.0),
        ) -> Insights {
            let communication_style = (politeness.is_some() || prompt_length.is_some()).then(|| {
                vibes_core::types::CommunicationStyle {
                    politeness_level: politeness,
                    average_prompt_length: prompt_length,
                    ..Default::default()
                }
            });
            Insights {
                top_words: words
                    .into_iter()
                    .map(|(word, count)| WordCount { word, count })
                    .collect(),
                dominant_topics: topics,
                communication_style,
                ..Default::default()
            }
        }
    }

    proptest! {
        #[test]
        fn test_round_trip_preserves_bundle(
            sessions in 0u64..1_000_000,
            input in 0u64..u64::MAX / 2,
            output in 0u64..u64::MAX / 2,
            hours in prop::array::uniform24(0u64..10_000),
            minutes in 0.0f64..10_000.0,
            traits in prop::collection::vec("[a-z]{1,12}", 0..5),
            tool in "[A-Za-z_]{1,16}",
            calls in 0u64..100_000,
            persona_id in prop::option::of("[a-z-]{0,16}"),
            quirks in prop::option::of(arb_quirks()),
            insights in prop::option::of(arb_insights()),
        ) {
            let mut bundle = UsageBundle::default();
            bundle.stats.total_sessions = sessions;
            bundle.stats.total_tokens = TokenCounts::new(input, output, input / 2);
            bundle.stats.hour_counts = hours;
            bundle.stats.longest_session_minutes = minutes;
            bundle.stats.tool_usage.insert(tool, calls);
            bundle.traits = traits;
            bundle.persona_id = persona_id;
            bundle.quirks = quirks;
            bundle.insights = insights;

            let encoded = encode(&bundle).unwrap();
            prop_assert_eq!(decode(&encoded).unwrap(), bundle);
        }
    }

    #[test]
    fn test_round_trip_keeps_empty_persona_id() {
        let mut bundle = sample_bundle();
        bundle.persona_id = Some(String::new());

        let decoded = decode(&encode(&bundle).unwrap()).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.persona_id(), None);
    }
}
