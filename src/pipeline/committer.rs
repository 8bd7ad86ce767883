//! Committer attribution heuristics.
//!
//! Play text rarely states outright which team a flag was on, so attribution
//! runs through three stages: explicit team mention, keyword defaults for
//! penalties that only one side can commit, and a last-resort rule that is
//! flagged `guessed` so downstream consumers can audit it.

use super::types::{Attribution, Side};

/// Decide which team committed the penalty and which team drew it.
///
/// Stages, in order:
/// 1. Whole-word mention of either team's canonical name (or its computed
///    initials, two letters or more) in the text. Offense is checked before
///    defense, so a text matching both attributes to the offense.
/// 2. Keyword defaults: false start / delay of game / illegal formation are
///    offensive fouls; offside and encroachment are defensive; holding is
///    defensive only when the text says "defensive holding".
/// 3. Fallback: offside text means defense, anything else means offense, and
///    the attribution is marked `guessed`.
///
/// `drawn` is always the opposite team among the two provided, so the pair
/// (committer, drawn) is exactly {offense, defense}.
pub fn resolve(text: &str, offense: &str, defense: &str) -> Attribution {
    let t = text.to_lowercase();

    // Stage 1: explicit team mention.
    for (candidate, side) in [(offense, Side::Offense), (defense, Side::Defense)] {
        if candidate.is_empty() || candidate == "Unknown" {
            continue;
        }
        if mentions_team(&t, candidate) {
            return attribution(side, offense, defense, false);
        }
    }

    // Stage 2: penalties with a conventional side.
    if ["false start", "delay of game", "illegal formation"]
        .iter()
        .any(|k| t.contains(k))
    {
        return attribution(Side::Offense, offense, defense, false);
    }
    // "offsides" contains "offside", so one keyword covers both spellings.
    if t.contains("offside") || t.contains("encroachment") {
        return attribution(Side::Defense, offense, defense, false);
    }
    if t.contains("holding") {
        let side = if t.contains("defensive holding") {
            Side::Defense
        } else {
            Side::Offense
        };
        return attribution(side, offense, defense, false);
    }

    // Stage 3: nothing to go on. Offside text would mean defense; everything
    // else defaults to offense. Marked as a guess either way.
    let side = if t.contains("offside") {
        Side::Defense
    } else {
        Side::Offense
    };
    attribution(side, offense, defense, true)
}

fn attribution(side: Side, offense: &str, defense: &str, guessed: bool) -> Attribution {
    let (committer, drawn) = match side {
        Side::Offense => (offense, defense),
        Side::Defense => (defense, offense),
    };
    Attribution {
        committer: committer.to_string(),
        side,
        drawn: drawn.to_string(),
        guessed,
    }
}

/// True when the lower-cased text contains the team name as a whole word, or
/// the team's computed initials ("Florida Atlantic" → "fa"). Single-letter
/// initials are ignored: they match almost any text.
fn mentions_team(lowered_text: &str, team: &str) -> bool {
    let name = team.to_lowercase();
    if contains_word(lowered_text, &name) {
        return true;
    }
    let initials: String = team
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_lowercase();
    initials.chars().count() >= 2 && contains_word(lowered_text, &initials)
}

/// Substring search with word boundaries: the match may not be flanked by
/// alphanumeric characters.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_team_mention() {
        let a = resolve(
            "Penalty on Ohio State: holding, 10 yards",
            "Ohio State",
            "Michigan",
        );
        assert_eq!(a.committer, "Ohio State");
        assert_eq!(a.side, Side::Offense);
        assert_eq!(a.drawn, "Michigan");
        assert!(!a.guessed);

        let a = resolve(
            "Michigan flagged for pass interference",
            "Ohio State",
            "Michigan",
        );
        assert_eq!(a.committer, "Michigan");
        assert_eq!(a.side, Side::Defense);
        assert_eq!(a.drawn, "Ohio State");
    }

    #[test]
    fn test_initials_abbreviation_match() {
        let a = resolve(
            "Flag on OSU: personal foul, 15 yards",
            "Ohio State University",
            "Michigan",
        );
        assert_eq!(a.committer, "Ohio State University");
        assert_eq!(a.side, Side::Offense);
        assert!(!a.guessed);
    }

    #[test]
    fn test_initials_require_word_boundary() {
        // "Nebraska Wildcats" would abbreviate to "nw"; the "nw" inside
        // "downward" must not count as a mention.
        let a = resolve(
            "ran downward out of bounds, personal foul",
            "Iowa Hawkeyes",
            "Nebraska Wildcats",
        );
        assert!(a.guessed);
        assert_eq!(a.committer, "Iowa Hawkeyes");
    }

    #[test]
    fn test_single_letter_initials_ignored() {
        // "Rice" would abbreviate to "r"; a single letter must never count
        // as a mention, so this falls through to the holding default.
        let a = resolve("holding on the return", "Akron", "Rice");
        assert_eq!(a.committer, "Akron");
        assert_eq!(a.side, Side::Offense);
        assert!(!a.guessed);
    }

    #[test]
    fn test_whole_word_boundaries() {
        assert!(contains_word("flag on osu here", "osu"));
        assert!(!contains_word("colossus of a play", "osu"));
        assert!(contains_word("osu", "osu"));
        assert!(!contains_word("", "osu"));
    }

    #[test]
    fn test_keyword_defaults() {
        let a = resolve("false start, five yards", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Offense);
        assert_eq!(a.committer, "Iowa");
        assert!(!a.guessed);

        let a = resolve("defense was offsides", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Defense);
        assert_eq!(a.committer, "Nebraska");
        assert!(!a.guessed);

        let a = resolve("encroachment, 5 yards", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Defense);

        let a = resolve("delay of game", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Offense);
    }

    #[test]
    fn test_holding_sides() {
        let a = resolve("holding, 10 yards, repeat 1st down", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Offense);
        assert!(!a.guessed);

        let a = resolve("defensive holding, automatic 1st down", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Defense);
        assert_eq!(a.committer, "Nebraska");
        assert!(!a.guessed);
    }

    #[test]
    fn test_fallback_is_guessed() {
        let a = resolve("personal foul after the play", "Iowa", "Nebraska");
        assert_eq!(a.side, Side::Offense);
        assert_eq!(a.committer, "Iowa");
        assert_eq!(a.drawn, "Nebraska");
        assert!(a.guessed);
    }

    #[test]
    fn test_drawn_is_always_the_other_team() {
        for text in [
            "false start",
            "offside",
            "holding",
            "targeting foul",
            "Penalty on Iowa",
        ] {
            let a = resolve(text, "Iowa", "Nebraska");
            let pair = [a.committer.as_str(), a.drawn.as_str()];
            assert!(pair.contains(&"Iowa") && pair.contains(&"Nebraska"));
            assert_ne!(a.committer, a.drawn);
        }
    }
}
