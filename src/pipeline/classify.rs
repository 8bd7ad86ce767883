//! Free-text penalty classification.
//!
//! Play descriptions are inconsistent across provider feeds, so detection is
//! a plain lower-cased substring scan and typing is an ordered
//! first-match-wins rule table. The rule tables are data rather than control
//! flow: priority order is explicit, independently testable, and the keyword
//! sets can be swapped without touching the evaluation logic. False positives
//! (narrative text that happens to contain "holding") and false negatives
//! (novel phrasing) are accepted trade-offs of the keyword approach.

use std::sync::OnceLock;

use regex::Regex;

use super::types::Classification;

/// Type label for text no rule matches.
pub const UNCLASSIFIED_TYPE: &str = "Other / Unclassified";

/// Category label for text no rule matches.
pub const OTHER_CATEGORY: &str = "Other";

/// One entry in an ordered rule table: the first rule with any keyword
/// present in the text wins.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub label: &'static str,
}

/// Detection and typing rules. The defaults reproduce the keyword sets the
/// pipeline has always used; callers may substitute their own tables.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// A play is a penalty iff its text contains any of these.
    pub penalty_keywords: Vec<&'static str>,
    /// Ordered: earlier rules shadow later ones ("roughing the passer" must
    /// precede "roughing").
    pub type_rules: Vec<KeywordRule>,
    /// Evaluated independently of `type_rules`, not derived from the type.
    pub category_rules: Vec<KeywordRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            penalty_keywords: vec![
                "penalty",
                "holding",
                "false start",
                "offside",
                "pass interference",
                "targeting",
                "personal foul",
                "unsportsmanlike",
                "delay of game",
                "illegal formation",
                "illegal motion",
                "face mask",
                "facemask",
                "roughing",
                "clipping",
            ],
            type_rules: vec![
                KeywordRule { keywords: &["holding"], label: "Holding" },
                KeywordRule { keywords: &["false start"], label: "False Start" },
                KeywordRule { keywords: &["pass interference"], label: "Pass Interference" },
                // "offsides" contains "offside", so one keyword covers both.
                KeywordRule { keywords: &["offside"], label: "Offside" },
                KeywordRule { keywords: &["targeting"], label: "Targeting" },
                KeywordRule { keywords: &["personal foul"], label: "Personal Foul" },
                KeywordRule { keywords: &["unsportsmanlike"], label: "Unsportsmanlike Conduct" },
                KeywordRule { keywords: &["delay of game"], label: "Delay of Game" },
                KeywordRule { keywords: &["illegal formation"], label: "Illegal Formation" },
                KeywordRule { keywords: &["illegal motion"], label: "Illegal Motion" },
                KeywordRule { keywords: &["face mask", "facemask"], label: "Face Mask" },
                KeywordRule { keywords: &["roughing the passer"], label: "Roughing the Passer" },
                KeywordRule { keywords: &["roughing the kicker"], label: "Roughing the Kicker" },
                KeywordRule { keywords: &["roughing"], label: "Roughing" },
                KeywordRule { keywords: &["clipping"], label: "Clipping" },
            ],
            category_rules: vec![
                KeywordRule {
                    keywords: &[
                        "false start",
                        "delay of game",
                        "offside",
                        "encroachment",
                        "illegal formation",
                        "illegal shift",
                    ],
                    label: "Procedural",
                },
                KeywordRule {
                    keywords: &["holding", "block", "hands to the face", "clipping", "chop block"],
                    label: "Blocking / Holding",
                },
                KeywordRule {
                    keywords: &[
                        "pass interference",
                        "roughing",
                        "unsportsmanlike",
                        "personal foul",
                        "targeting",
                    ],
                    label: "Personal / Contact",
                },
                KeywordRule {
                    keywords: &["substitution", "ineligible", "sideline interference", "illegal touching"],
                    label: "Administrative",
                },
                KeywordRule {
                    keywords: &["facemask", "horse collar"],
                    label: "Safety / Tackling",
                },
            ],
        }
    }
}

impl ClassifierConfig {
    /// Classify a play's free text: penalty detection, type, category, and
    /// yardage in one pass. Pure function of the text.
    pub fn classify(&self, text: &str) -> Classification {
        let t = text.to_lowercase();
        let is_penalty = self.penalty_keywords.iter().any(|k| t.contains(k));
        let penalty_type = first_match(&self.type_rules, &t).unwrap_or(UNCLASSIFIED_TYPE);
        let penalty_category = first_match(&self.category_rules, &t).unwrap_or(OTHER_CATEGORY);
        Classification {
            is_penalty,
            penalty_type: penalty_type.to_string(),
            penalty_category: penalty_category.to_string(),
            yards: extract_yards(text),
        }
    }
}

fn first_match(rules: &[KeywordRule], lowered: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map(|rule| rule.label)
}

/// Extract penalty yardage from play text.
///
/// Patterns are tried in order from most to least explicit phrasing; the
/// first one whose captured integer falls in the open range (0, 100) wins.
/// An out-of-range capture falls through to the next pattern. No match means
/// the yardage is unknown — never zero.
pub fn extract_yards(text: &str) -> Option<u8> {
    let t = text.to_lowercase();
    for re in yard_patterns() {
        if let Some(caps) = re.captures(&t) {
            if let Ok(v) = caps[1].parse::<u8>() {
                if v > 0 && v < 100 {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn yard_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\((\d{1,2})\s*yards?\)",
            r"(\d{1,2})\s*yards?\b",
            r"(\d{1,2})-yard",
            r"penalt(?:y|ies)[^\d]{0,10}(\d{1,2})",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static yard pattern compiles"))
        .collect()
    })
}
