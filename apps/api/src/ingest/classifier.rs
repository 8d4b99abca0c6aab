//! Text features and the heuristic format tagger.
//!
//! Tagging is an ordered rule list applied in sequence: every rule that
//! matches overwrites the tag chosen so far, so the LAST matching rule
//! wins. A text with both `?` and "thread" ends up `story`, not `question`.

use serde::Serialize;

/// Counts derived from post text plus the format tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFeatures {
    pub char_count: usize,
    /// Whitespace-delimited tokens of the trimmed text. An empty text still
    /// counts as one (empty) token.
    pub word_count: usize,
    pub has_link: bool,
    /// Raw `#` count; not validated as real hashtags.
    pub hashtag_count: usize,
    /// Raw `@` count; not validated as real mentions.
    pub mention_count: usize,
    pub format_tag: String,
}

#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// Any phrase occurs in the lowercased text.
    AnyPhrase(Vec<String>),
    /// A line starts with `1.`/`1)` or a `-`/`•` bullet.
    ListMarkers,
}

impl RuleMatcher {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            RuleMatcher::AnyPhrase(phrases) => phrases.iter().any(|p| lowered.contains(p.as_str())),
            RuleMatcher::ListMarkers => lowered.lines().any(starts_with_list_marker),
        }
    }
}

fn starts_with_list_marker(line: &str) -> bool {
    let line = line.trim_start();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        return matches!(line[digits..].chars().next(), Some('.') | Some(')'));
    }
    let mut chars = line.chars();
    matches!(chars.next(), Some('-') | Some('•')) && chars.next().is_some_and(char::is_whitespace)
}

#[derive(Debug, Clone)]
pub struct FormatRule {
    pub tag: String,
    pub matcher: RuleMatcher,
}

impl FormatRule {
    pub fn phrases(tag: &str, phrases: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            matcher: RuleMatcher::AnyPhrase(phrases.iter().map(|p| p.to_lowercase()).collect()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormatClassifier {
    pub default_tag: String,
    pub rules: Vec<FormatRule>,
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self {
            default_tag: "standard".to_string(),
            rules: vec![
                FormatRule::phrases(
                    "comparison",
                    &[" vs ", " vs. ", "versus", "compared to", "better than", "instead of"],
                ),
                FormatRule::phrases(
                    "milestone",
                    &["followers", "milestone", "subscribers", "anniversary", "just hit"],
                ),
                FormatRule::phrases("question", &["?"]),
                FormatRule {
                    tag: "list".to_string(),
                    matcher: RuleMatcher::ListMarkers,
                },
                FormatRule::phrases(
                    "tip",
                    &["how to", "tip:", "tips", "pro tip", "here's how", "step by step"],
                ),
                FormatRule::phrases("story", &["thread"]),
                FormatRule::phrases(
                    "cta",
                    &["click", "link in bio", "link below", "sign up", "join now"],
                ),
            ],
        }
    }
}

impl FormatClassifier {
    pub fn tag(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .fold(&self.default_tag, |current, rule| {
                if rule.matcher.matches(&lowered) {
                    &rule.tag
                } else {
                    current
                }
            })
            .clone()
    }

    pub fn analyze(&self, text: &str) -> TextFeatures {
        let trimmed = text.trim();
        let word_count = if trimmed.is_empty() {
            1
        } else {
            trimmed.split_whitespace().count()
        };

        TextFeatures {
            char_count: text.chars().count(),
            word_count,
            has_link: text.contains("http"),
            hashtag_count: text.matches('#').count(),
            mention_count: text.matches('@').count(),
            format_tag: self.tag(text),
        }
    }
}
