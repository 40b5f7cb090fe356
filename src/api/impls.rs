use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use anyhow::bail;

use super::*;

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            Self::Open => "Open".into(),
            Self::Resolved(winner) => format!("Resolved({})", Side::from(*winner)),
        };
        write!(f, "{}", output)
    }
}
impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            Self::Yes => "YES",
            Self::No => "NO",
        };
        write!(f, "{}", output)
    }
}
impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" => Ok(Self::No),
            e => bail!("Couldn't deserialize to Side: {}", e),
        }
    }
}
impl From<bool> for Side {
    fn from(outcome: bool) -> Self {
        if outcome {
            Self::Yes
        } else {
            Self::No
        }
    }
}
impl EventStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::Open => None,
            Self::Resolved(outcome) => Some(Side::from(*outcome)),
        }
    }
}
impl Event {
    pub fn pool(&self, side: Side) -> Points {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }
}
impl StakePosition {
    pub fn new(stake: Stake, event: &Event) -> Self {
        Self {
            stake,
            description: event.description.clone(),
            status: event.status,
        }
    }
}
