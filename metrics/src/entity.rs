//! Levels of the execution hierarchy shared by the query layer and the
//! comparison workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entity levels that can be compared side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    App,
    Job,
    Stage,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Job => "job",
            Self::Stage => "stage",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "job" => Ok(Self::Job),
            "stage" => Ok(Self::Stage),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}
