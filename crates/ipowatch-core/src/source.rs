use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the upstreams that can produce an IPO snapshot.
///
/// `Unresolved` marks a snapshot no source could answer for and is written
/// as `"none"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Nasdaq,
    #[serde(rename = "none")]
    Unresolved,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Yahoo, Self::Nasdaq, Self::Unresolved];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Nasdaq => "nasdaq",
            Self::Unresolved => "none",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "nasdaq" => Ok(Self::Nasdaq),
            "none" => Ok(Self::Unresolved),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_serializes_as_none() {
        let json = serde_json::to_string(&ProviderId::Unresolved).expect("serializable");
        assert_eq!(json, "\"none\"");
        assert_eq!("NONE".parse::<ProviderId>(), Ok(ProviderId::Unresolved));
    }

    #[test]
    fn rejects_unknown_source() {
        let err = "polygon".parse::<ProviderId>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
