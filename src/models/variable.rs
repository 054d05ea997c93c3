use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Physical quantity stored in the chunk corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    #[serde(alias = "SALT")]
    Salt,
    #[serde(alias = "THETA")]
    Theta,
    #[serde(alias = "VORT")]
    VorticityUvw,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Salt, Variable::Theta, Variable::VorticityUvw];

    /// Token used in chunk filenames (e.g. `vorticity_uvw_2011_9_13_0_5.bin`)
    pub fn file_token(&self) -> &'static str {
        match self {
            Variable::Salt => "salt",
            Variable::Theta => "theta",
            Variable::VorticityUvw => "vorticity_uvw",
        }
    }

    /// Top-level key in the metadata document
    pub fn display_name(&self) -> &'static str {
        match self {
            Variable::Salt => "SALT",
            Variable::Theta => "THETA",
            Variable::VorticityUvw => "VORT",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_token())
    }
}

impl FromStr for Variable {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| {
                v.file_token().eq_ignore_ascii_case(trimmed)
                    || v.display_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ProcessingError::UnknownVariable(s.to_string()))
    }
}
