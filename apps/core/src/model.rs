use serde::{Deserialize, Serialize};

/// Closed set of candidate provenance tags. The ranking backend round-trips
/// the tag verbatim; anything it hands back that we did not produce maps to
/// `Unknown` and is ignored at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    List,
    Command,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedResult {
    pub kind: CandidateKind,
    pub text: String,
    pub score: i64,
    pub positions: Vec<usize>,
}

impl RankedResult {
    pub fn unranked(kind: CandidateKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            score: UNRANKED_SCORE,
            positions: Vec::new(),
        }
    }
}

/// Score assigned to baseline entries that never went through the ranker.
pub const UNRANKED_SCORE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchableItem {
    pub display_name: String,
    pub path: String,
}

impl LaunchableItem {
    pub fn new(display_name: &str, path: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verb {
    #[default]
    Open,
    RunAs,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::RunAs => "runas",
        }
    }
}
