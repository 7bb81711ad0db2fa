//! Skill → topic lookup table and the matcher strategies used against it.
//!
//! The table is an immutable value handed to the mapper, never a global, so a
//! run can swap in a table loaded from disk (or a test fixture).
//! `TopicMatcher` decides whether a candidate skill "hits" a table keyword.
//! Default: `SubstringMatcher` (bidirectional substring, deliberately fuzzy).

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Lookup table
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    // Operating systems
    (
        "windows 10",
        &["windows-support", "drivers", "performance", "windows-updates"],
    ),
    ("windows 11", &["windows-support", "windows-updates", "drivers"]),
    ("windows", &["windows-support", "drivers", "performance"]),
    ("macos", &["login-profile"]),
    ("linux", &["performance", "drivers"]),
    // Networking
    ("tcp/ip", &["lan-wifi", "tcpip"]),
    ("dns", &["dns", "lan-wifi"]),
    ("dhcp", &["dhcp", "lan-wifi"]),
    ("vpn", &["vpn", "vpn-errors"]),
    ("active directory", &["login-profile", "active-directory"]),
    ("lan/wifi", &["lan-wifi"]),
    ("network", &["lan-wifi", "dns", "dhcp", "tcpip"]),
    // Support software
    (
        "servicenow",
        &["servicenow", "sla", "incident-request", "escalation"],
    ),
    ("remote desktop", &["rdp"]),
    ("anydesk", &["anydesk"]),
    ("teamviewer", &["anydesk"]),
    // Tools
    ("task manager", &["performance", "windows-support"]),
    ("event viewer", &["performance", "windows-support"]),
    ("device manager", &["drivers", "hardware"]),
    ("performance monitor", &["performance"]),
    // Office
    ("excel", &["spreadsheet-basic", "spreadsheet-advanced"]),
    ("word", &["document-processing"]),
    ("outlook", &["outlook", "email-rules"]),
    ("teams", &["teams", "teams-meetings"]),
    ("onedrive", &["onedrive"]),
    // Domain-specific
    ("recruitment", &["talent-acquisition", "candidate-assessment"]),
    ("bgv", &["bgv-process", "compliance"]),
    ("sap", &["sap-finance", "erp-systems"]),
    ("accounting", &["general-ledger", "reconciliation"]),
    ("sales", &["sales-process", "objection-handling"]),
    ("python", &["programming", "automation"]),
    ("sql", &["database-basics", "database-advanced"]),
];

#[derive(Debug, Error)]
pub enum SkillMapError {
    #[error("cannot read skill map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid skill map JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("skill map entry #{0} has an empty keyword")]
    EmptyKeyword(usize),
}

/// One keyword and the topics it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub keyword: String,
    pub topics: Vec<String>,
}

/// Ordered keyword → topics table. Keywords are stored lowercase; each entry's
/// topics are unique and keep their declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillTopicMap {
    entries: Vec<TopicEntry>,
}

impl SkillTopicMap {
    pub fn new(entries: Vec<TopicEntry>) -> Result<Self, SkillMapError> {
        let mut normalized = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let keyword = entry.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(SkillMapError::EmptyKeyword(idx));
            }
            let mut seen = HashSet::new();
            let topics = entry
                .topics
                .into_iter()
                .filter(|t| seen.insert(t.clone()))
                .collect();
            normalized.push(TopicEntry { keyword, topics });
        }
        Ok(Self {
            entries: normalized,
        })
    }

    /// Parses a JSON array of `{"keyword": "...", "topics": [...]}` objects.
    /// An array keeps the declaration order, which drives include-topic order.
    pub fn from_json_str(json: &str) -> Result<Self, SkillMapError> {
        let entries: Vec<TopicEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_file(path: &Path) -> Result<Self, SkillMapError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SkillMapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn entries(&self) -> &[TopicEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn topics_for(&self, keyword: &str) -> Option<&[String]> {
        let keyword = keyword.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.topics.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SkillTopicMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_TABLE
                .iter()
                .map(|(keyword, topics)| TopicEntry {
                    keyword: keyword.to_string(),
                    topics: topics.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Matcher strategies
// ────────────────────────────────────────────────────────────────────────────

/// Decides whether a skill hits a table keyword. Implement this to change how
/// loosely skills are matched without touching the merge pipeline.
///
/// Both arguments arrive lowercased.
pub trait TopicMatcher: Send + Sync {
    fn matches(&self, skill: &str, keyword: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Skill contains keyword OR keyword contains skill.
///
/// Over-matches on purpose ("Windows 10 Administration" hits both
/// `windows 10` and `windows`; a two-letter skill can hit several keywords).
/// Kept as the default for parity with existing topic assignments.
pub struct SubstringMatcher;

impl TopicMatcher for SubstringMatcher {
    fn matches(&self, skill: &str, keyword: &str) -> bool {
        !skill.is_empty() && (skill.contains(keyword) || keyword.contains(skill))
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

/// Skill equals keyword after trimming.
pub struct ExactMatcher;

impl TopicMatcher for ExactMatcher {
    fn matches(&self, skill: &str, keyword: &str) -> bool {
        skill.trim() == keyword
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// The keyword's tokens appear as a contiguous run of whole tokens in the skill.
/// `windows` hits "Windows 10 Administration" but `sap` no longer hits "SAPPHIRE".
pub struct TokenMatcher;

impl TopicMatcher for TokenMatcher {
    fn matches(&self, skill: &str, keyword: &str) -> bool {
        let skill_tokens = tokenize(skill);
        let keyword_tokens = tokenize(keyword);
        if keyword_tokens.is_empty() || keyword_tokens.len() > skill_tokens.len() {
            return false;
        }
        skill_tokens
            .windows(keyword_tokens.len())
            .any(|w| w == keyword_tokens.as_slice())
    }

    fn name(&self) -> &'static str {
        "token"
    }
}

/// Splits on anything that is not alphanumeric or one of `/ + #`, so
/// `tcp/ip` and `c++` survive as single tokens.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '/' | '+' | '#')))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Config-selectable matcher kind (`TOPIC_MATCHER`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatcherKind {
    #[default]
    Substring,
    Exact,
    Token,
}

impl MatcherKind {
    pub fn build(self) -> Box<dyn TopicMatcher> {
        match self {
            MatcherKind::Substring => Box::new(SubstringMatcher),
            MatcherKind::Exact => Box::new(ExactMatcher),
            MatcherKind::Token => Box::new(TokenMatcher),
        }
    }
}

impl FromStr for MatcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(MatcherKind::Substring),
            "exact" => Ok(MatcherKind::Exact),
            "token" => Ok(MatcherKind::Token),
            other => Err(format!(
                "unknown topic matcher '{other}' (expected substring, exact or token)"
            )),
        }
    }
}
