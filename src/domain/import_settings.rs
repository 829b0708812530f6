use serde::{Deserialize, Serialize};
use std::fmt;

/// How option letters are handed out when some option cells are empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLettering {
    /// Letters follow the option column position, so an empty middle
    /// option leaves a gap (`a`, `c`)
    Positional,

    /// Letters are handed out after empty options are dropped (`a`, `b`)
    Contiguous,
}

impl Default for OptionLettering {
    fn default() -> Self {
        Self::Positional
    }
}

impl fmt::Display for OptionLettering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => write!(f, "positional"),
            Self::Contiguous => write!(f, "contiguous"),
        }
    }
}

/// Settings consumed by the import flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSettings {
    /// Number of parsed questions returned as preview
    pub preview_limit: usize,

    pub option_lettering: OptionLettering,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            preview_limit: 5,
            option_lettering: OptionLettering::default(),
        }
    }
}
