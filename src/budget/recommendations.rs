//! Recommendation list parsing.
//!
//! Model output is usually a bulleted or numbered list, sometimes with items
//! wrapped across several lines, and occasionally plain prose. The parser
//! normalizes all three into a short ordered list of strings.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 7;

/// Prose sentences must be longer than this (in characters) to count.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Turns free model text into a bounded list of recommendations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationParser;

impl RecommendationParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse `raw_text` into at most [`MAX_RECOMMENDATIONS`] entries.
    ///
    /// Lines starting with `-`, `•`, `*` or `N.` open a new entry. Other
    /// non-empty lines continue the open entry. When no marker is found the
    /// text is split into sentences instead.
    pub fn parse(&self, raw_text: &str) -> Vec<String> {
        let mut recommendations = parse_marked(raw_text);

        if recommendations.is_empty() {
            recommendations = parse_sentences(raw_text);
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:[-•*]|\d+\.)").expect("valid marker pattern"))
}

fn parse_marked(raw_text: &str) -> Vec<String> {
    let mut recommendations = Vec::new();
    let mut current: Option<String> = None;

    for line in raw_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = marker_pattern().find(line) {
            flush(&mut recommendations, current.take());
            current = Some(clean(&line[marker.end()..]));
        } else if let Some(entry) = current.as_mut() {
            let continuation = clean(line);
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(&continuation);
        }
        // Lines before the first marker are preamble.
    }

    flush(&mut recommendations, current);
    recommendations
}

fn flush(recommendations: &mut Vec<String>, entry: Option<String>) {
    if let Some(entry) = entry {
        let entry = entry.trim();
        if !entry.is_empty() {
            recommendations.push(entry.to_string());
        }
    }
}

/// Strip bold markers and surrounding whitespace.
///
/// A bold line such as `**Lighting**` matches the `*` marker, leaving a lone
/// leading `*` once the `**` pairs are gone.
fn clean(fragment: &str) -> String {
    fragment
        .replace("**", "")
        .trim()
        .trim_start_matches('*')
        .trim()
        .to_string()
}

fn parse_sentences(raw_text: &str) -> Vec<String> {
    raw_text
        .split(". ")
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .map(|sentence| format!("{}.", sentence.trim_end_matches('.')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(text: &str) -> Vec<String> {
        RecommendationParser::new().parse(text)
    }

    #[test]
    fn test_numbered_list() {
        assert_eq!(
            parse("1. Switch to LED\n2. Unplug devices"),
            vec!["Switch to LED", "Unplug devices"]
        );
    }

    #[test]
    fn test_bullet_markers() {
        let text = "- Lower the thermostat\n• Air-dry laundry\n* Seal window drafts";
        assert_eq!(
            parse(text),
            vec!["Lower the thermostat", "Air-dry laundry", "Seal window drafts"]
        );
    }

    #[test]
    fn test_continuation_lines_merge() {
        assert_eq!(
            parse("1. Switch to LED lighting\nthis reduces cost"),
            vec!["Switch to LED lighting this reduces cost"]
        );
    }

    #[test]
    fn test_preamble_and_blank_lines() {
        let text = "Here are some ideas:\n\n1. Use a smart power strip\n\n   2. Run the dishwasher at night\n";
        assert_eq!(
            parse(text),
            vec!["Use a smart power strip", "Run the dishwasher at night"]
        );
    }

    #[test]
    fn test_bold_heading_lines_lose_marker() {
        let text = "**Lighting**\n- Use LED bulbs\n**Heating:** lower the thermostat";
        let recs = parse(text);
        assert_eq!(
            recs,
            vec!["Lighting", "Use LED bulbs", "Heating: lower the thermostat"]
        );
        assert!(recs.iter().all(|r| !r.starts_with('*')));
    }

    #[test]
    fn test_bold_markers_stripped() {
        let text = "1. **Upgrade insulation:** keeps heat in\n2. **Solar panels** on the roof";
        assert_eq!(
            parse(text),
            vec!["Upgrade insulation: keeps heat in", "Solar panels on the roof"]
        );
    }

    #[test]
    fn test_empty_marker_filled_by_continuation() {
        assert_eq!(parse("-\nTurn off standby devices"), vec!["Turn off standby devices"]);
        assert!(parse("-\n*\n3.").is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n").is_empty());
    }

    #[test]
    fn test_sentence_fallback() {
        let text = "You should switch every bulb to LED lighting. Unplug chargers when they are not in use. Short one. Consider a heat pump for winter heating.";
        let recs = parse(text);
        assert_eq!(
            recs,
            vec![
                "You should switch every bulb to LED lighting.",
                "Unplug chargers when they are not in use.",
                "Consider a heat pump for winter heating.",
            ]
        );
        assert!(recs.iter().all(|r| r.ends_with('.') && !r.ends_with("..")));
    }

    #[test]
    fn test_no_markers_no_long_sentences() {
        assert!(parse("Too short. Also short. Nope").is_empty());
    }

    #[test]
    fn test_truncates_to_seven_in_order() {
        let text: String = (1..=10).map(|i| format!("{}. Tip number {}\n", i, i)).collect();
        let recs = parse(&text);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert_eq!(recs[0], "Tip number 1");
        assert_eq!(recs[6], "Tip number 7");
    }

    proptest! {
        #[test]
        fn prop_never_more_than_seven(text in "(?s).{0,2000}") {
            let recs = parse(&text);
            prop_assert!(recs.len() <= MAX_RECOMMENDATIONS);
            prop_assert!(recs.iter().all(|r| !r.trim().is_empty()));
        }

        #[test]
        fn prop_many_bullets_bounded(count in 0usize..50) {
            let text: String = (0..count).map(|i| format!("- item {}\n", i)).collect();
            prop_assert_eq!(parse(&text).len(), count.min(MAX_RECOMMENDATIONS));
        }
    }
}
