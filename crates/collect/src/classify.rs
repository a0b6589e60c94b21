//! Show classification: assign each fetched video exactly one label from an
//! ordered rule table.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::{CollectError, VideoRecord, VideoSummary};

/// Label reserved for videos no rule matches.
pub const OTHER_LABEL: &str = "Other";

/// One row of the show taxonomy: a label, an optional title pattern, and
/// whether the description is searched as well.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowRule {
    pub label: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub search_description: bool,
}

/// The fixed production taxonomy, in match-priority order.
pub fn default_show_rules() -> Vec<ShowRule> {
    let table: &[(&str, Option<&str>, bool)] = &[
        ("A Fire Inside Out", None, false),
        ("BetterQuest", None, false),
        ("Bonus Podcast", None, false),
        ("Deepest Dive", None, false),
        ("Everything We Know", Some(r"^Everything\s.+Know"), false),
        ("Extra Life", None, false),
        ("Game Case Trivia", None, false),
        ("Great GOTY Hunt", None, false),
        ("Hitman 3 Challenge", Some(r"^Hitman\s3's.+Challenge"), false),
        ("House Hunter Rise", None, false),
        ("Kyle Hilliard's Top 10 Games", None, false),
        ("Leo Plays", None, false),
        ("Live Reaction", None, false),
        ("Nintendo OnWine", None, false),
        ("Max Spoilers", None, false),
        ("MinnMax Interview", None, false),
        ("MinnMax Plays", None, false),
        ("MinnMax Show", None, true),
        ("MinnSnax", None, false),
        ("Photomode Snap", None, false),
        ("Sarah The Horse Girl", None, false),
        ("Steam's Secret Stash", None, false),
        ("Trivia Tower", None, false),
        ("Twilight Highlight Zone", None, false),
    ];

    table
        .iter()
        .map(|(label, pattern, search_description)| ShowRule {
            label: label.to_string(),
            pattern: pattern.map(str::to_string),
            search_description: *search_description,
        })
        .collect()
}

/// Load a rule table from a JSON array of
/// `{"label", "pattern"?, "search_description"?}` objects.
pub fn load_rules(path: &Path) -> Result<Vec<ShowRule>, CollectError> {
    crate::snapshot::read_snapshot(path)
}

/// A single match test. Each rule compiles into an ordered list of these,
/// evaluated left-to-right; substring tests are upper-cased on both sides.
enum Predicate {
    TitlePattern(Regex),
    DescriptionPattern(Regex),
    TitleContains(String),
    DescriptionContains(String),
}

impl Predicate {
    fn matches(&self, video: &VideoRecord) -> bool {
        match self {
            Self::TitlePattern(re) => re.is_match(&video.title),
            Self::DescriptionPattern(re) => re.is_match(&video.description),
            Self::TitleContains(needle) => video.title.to_uppercase().contains(needle),
            Self::DescriptionContains(needle) => video.description.to_uppercase().contains(needle),
        }
    }
}

struct CompiledRule {
    label: String,
    predicates: Vec<Predicate>,
}

/// A rule table compiled for matching. Rules are tried in table order and
/// the first rule with a passing predicate wins.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(rules: &[ShowRule]) -> Result<Self, CollectError> {
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            let mut predicates = Vec::new();
            match &rule.pattern {
                Some(pattern) => {
                    // Patterns are applied as authored, no case folding.
                    let re = Regex::new(pattern)
                        .map_err(|e| CollectError::Pattern(format!("{pattern:?}: {e}")))?;
                    predicates.push(Predicate::TitlePattern(re.clone()));
                    if rule.search_description {
                        predicates.push(Predicate::DescriptionPattern(re));
                    }
                }
                None => {
                    let needle = rule.label.to_uppercase();
                    predicates.push(Predicate::TitleContains(needle.clone()));
                    if rule.search_description {
                        predicates.push(Predicate::DescriptionContains(needle));
                    }
                }
            }
            compiled.push(CompiledRule {
                label: rule.label.clone(),
                predicates,
            });
        }

        Ok(Self { rules: compiled })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.label.as_str())
    }

    /// The label for a video: first matching rule in table order, else
    /// [`OTHER_LABEL`].
    pub fn label_for(&self, video: &VideoRecord) -> &str {
        for rule in &self.rules {
            if rule.predicates.iter().any(|p| p.matches(video)) {
                return &rule.label;
            }
        }
        OTHER_LABEL
    }
}

/// Classify every video against the rule table.
///
/// The output holds one entry per rule label plus [`OTHER_LABEL`], each a
/// list (possibly empty) of summaries in input order. Classification is
/// total and exclusive: every video lands in exactly one list.
pub fn classify(
    videos: &[VideoRecord],
    rules: &[ShowRule],
) -> Result<BTreeMap<String, Vec<VideoSummary>>, CollectError> {
    let set = RuleSet::compile(rules)?;

    let mut matches: BTreeMap<String, Vec<VideoSummary>> = BTreeMap::new();
    matches.insert(OTHER_LABEL.to_string(), Vec::new());
    for label in set.labels() {
        matches.entry(label.to_string()).or_default();
    }

    for video in videos {
        let label = set.label_for(video).to_string();
        let summary = VideoSummary {
            title: video.title.clone(),
            description: video.description.clone(),
            published_at: parse_published(&video.published_at),
        };
        matches.entry(label).or_default().push(summary);
    }

    Ok(matches)
}

/// Parse the platform's ISO-8601 `Z`-suffixed publish time into epoch
/// seconds. An unparseable value is logged and recorded as 0 so one
/// malformed record does not abort the run.
pub fn parse_published(raw: &str) -> i64 {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.timestamp(),
        Err(e) => {
            warn!(raw, error = %e, "unparseable publish timestamp");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, description: &str) -> VideoRecord {
        VideoRecord {
            video_id: "vid".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            published_at: "2021-03-04T17:00:00Z".to_string(),
        }
    }

    fn titled_rule(label: &str) -> ShowRule {
        ShowRule {
            label: label.to_string(),
            pattern: None,
            search_description: false,
        }
    }

    #[test]
    fn every_video_lands_in_exactly_one_list() {
        let rules = vec![titled_rule("Leo Plays"), titled_rule("Trivia Tower")];
        let videos = vec![
            video("Leo Plays Myst", ""),
            video("Trivia Tower Episode 4", ""),
            video("Unrelated Upload", ""),
        ];

        let matches = classify(&videos, &rules).unwrap();

        let total: usize = matches.values().map(Vec::len).sum();
        assert_eq!(total, videos.len());
        assert_eq!(matches["Leo Plays"].len(), 1);
        assert_eq!(matches["Trivia Tower"].len(), 1);
        assert_eq!(matches[OTHER_LABEL].len(), 1);
        assert_eq!(matches[OTHER_LABEL][0].title, "Unrelated Upload");
    }

    #[test]
    fn earlier_rule_wins_when_both_match() {
        let rules = vec![titled_rule("MinnMax"), titled_rule("MinnMax Plays")];
        let videos = vec![video("MinnMax Plays Bloodborne", "")];

        let matches = classify(&videos, &rules).unwrap();

        assert_eq!(matches["MinnMax"].len(), 1);
        assert!(matches["MinnMax Plays"].is_empty());
    }

    #[test]
    fn classification_is_idempotent() {
        let rules = default_show_rules();
        let videos = vec![
            video("MinnMax Plays Bloodborne", ""),
            video("Everything We Don't Know", ""),
            video("Random Talk", ""),
        ];

        let first = classify(&videos, &rules).unwrap();
        let second = classify(&videos, &rules).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn title_substring_is_case_insensitive() {
        let rules = vec![titled_rule("Leo Plays")];
        let videos = vec![video("LEO PLAYS outer wilds", "")];

        let matches = classify(&videos, &rules).unwrap();
        assert_eq!(matches["Leo Plays"].len(), 1);
    }

    #[test]
    fn description_is_searched_only_when_flagged() {
        let rule_without_flag = vec![titled_rule("MinnMax Show")];
        let rule_with_flag = vec![ShowRule {
            label: "MinnMax Show".to_string(),
            pattern: None,
            search_description: true,
        }];
        let videos = vec![video("Random Talk", "Check out the MinnMax show today")];

        let matches = classify(&videos, &rule_without_flag).unwrap();
        assert_eq!(matches[OTHER_LABEL].len(), 1);

        let matches = classify(&videos, &rule_with_flag).unwrap();
        assert_eq!(matches["MinnMax Show"].len(), 1);
        assert!(matches[OTHER_LABEL].is_empty());
    }

    #[test]
    fn pattern_rules_match_title_shape() {
        let rules = vec![ShowRule {
            label: "Everything We Know".to_string(),
            pattern: Some(r"^Everything\s.+Know".to_string()),
            search_description: false,
        }];

        let hit = vec![video("Everything We Don't Know", "")];
        let matches = classify(&hit, &rules).unwrap();
        assert_eq!(matches["Everything We Know"].len(), 1);

        let miss = vec![video("We Know Everything", "")];
        let matches = classify(&miss, &rules).unwrap();
        assert_eq!(matches[OTHER_LABEL].len(), 1);
    }

    #[test]
    fn empty_title_and_description_fall_to_other() {
        let rules = default_show_rules();
        let videos = vec![video("", "")];

        let matches = classify(&videos, &rules).unwrap();
        assert_eq!(matches[OTHER_LABEL].len(), 1);
    }

    #[test]
    fn all_labels_present_even_when_empty() {
        let rules = default_show_rules();
        let matches = classify(&[], &rules).unwrap();

        // one list per rule plus the reserved label
        assert_eq!(matches.len(), rules.len() + 1);
        assert!(matches.values().all(Vec::is_empty));
        assert!(matches.contains_key(OTHER_LABEL));
    }

    #[test]
    fn summaries_carry_epoch_seconds() {
        let rules = vec![titled_rule("Leo Plays")];
        let mut v = video("Leo Plays Myst", "");
        v.published_at = "1970-01-01T00:01:40Z".to_string();

        let matches = classify(&[v], &rules).unwrap();
        assert_eq!(matches["Leo Plays"][0].published_at, 100);
    }

    #[test]
    fn unparseable_timestamp_becomes_zero() {
        assert_eq!(parse_published("not-a-date"), 0);
        assert_eq!(parse_published(""), 0);
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let rules = vec![ShowRule {
            label: "Broken".to_string(),
            pattern: Some(r"([unclosed".to_string()),
            search_description: false,
        }];

        let err = classify(&[], &rules).unwrap_err();
        assert!(matches!(err, CollectError::Pattern(_)));
    }
}
