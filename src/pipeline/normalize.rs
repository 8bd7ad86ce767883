//! School and conference name canonicalization.
//!
//! Team names arrive from several independently-sourced feeds (play-by-play,
//! the FBS team list, poll rankings) with different spellings, diacritics,
//! and whitespace. This module folds them onto a single preferred form so
//! joins across the datasets line up.

use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Alias entries applied by default: official name → preferred short form.
///
/// The diacritic variants of these names ("San José State") fold onto the
/// same normalized key, so one entry per school suffices.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Conferences
    ("Mountain West", "MWC"),
    ("Mid-American", "MAC"),
    ("Sun Belt", "SBC"),
    ("American Athletic", "American"),
    ("Conference USA", "CUSA"),
    ("Big Ten", "Big 10"),
    ("FBS Independents", "Independent"),
    ("Pac-12", "Pac 12"),
    // Schools
    ("Central Michigan", "C Michigan"),
    ("Eastern Michigan", "E Michigan"),
    ("Florida Atlantic", "FAU"),
    ("Florida International", "FIU"),
    ("James Madison", "J Madison"),
    ("Louisiana Tech", "La Tech"),
    ("Massachusetts", "UMass"),
    ("Middle Tennessee", "MTSU"),
    ("North Texas", "N Texas"),
    ("Northern Illinois", "N Illinois"),
    ("Old Dominion", "ODU"),
    ("San Jose State", "San Jose St"),
    ("South Alabama", "S Alabama"),
    ("South Florida", "USF"),
    ("Western Kentucky", "WKU"),
    ("Western Michigan", "W Michigan"),
];

/// Immutable lookup table from normalized name keys to preferred display
/// forms. Built once at startup and passed by reference into the pipeline.
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::from_entries(DEFAULT_ALIASES)
    }
}

impl AliasTable {
    /// Build a table from `(official, preferred)` pairs. Keys are stored in
    /// normalized form so lookups are case- and diacritic-insensitive.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let aliases = entries
            .iter()
            .map(|(official, preferred)| (normalize_key(official), preferred.to_string()))
            .collect();
        Self { aliases }
    }

    /// Map a raw name to its canonical form.
    ///
    /// Unmapped names pass through with whitespace normalization only —
    /// original casing preserved. This fails open: a name the table does not
    /// know is returned as-is rather than rejected, so downstream joins
    /// against reference tables may miss silently.
    ///
    /// Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`.
    pub fn canonicalize(&self, raw: &str) -> String {
        match self.aliases.get(&normalize_key(raw)) {
            Some(preferred) => preferred.clone(),
            None => collapse_whitespace(raw),
        }
    }

    /// Number of alias entries.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Normalization used for comparison keys only: NFKD-decompose and drop
/// combining marks, collapse whitespace, lower-case. Display forms are never
/// produced from this.
pub fn normalize_key(raw: &str) -> String {
    let stripped: String = raw.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    collapse_whitespace(&stripped).to_lowercase()
}

/// Collapse runs of whitespace (including non-breaking space, which
/// `split_whitespace` treats as whitespace) to single ASCII spaces and trim.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
