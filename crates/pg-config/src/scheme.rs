//! The two smoothing schemes the model supports.

use pg_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeKind {
    Katz,
    ModifiedKn,
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemeKind::Katz => "katz",
            SchemeKind::ModifiedKn => "modified-kn",
        };
        f.write_str(s)
    }
}

impl FromStr for SchemeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "katz" | "backoff" => Ok(SchemeKind::Katz),
            "modified-kn" | "kneserney" | "kneser-ney" | "kn" => Ok(SchemeKind::ModifiedKn),
            other => Err(Error::UnknownScheme {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_aliases() {
        assert_eq!("katz".parse::<SchemeKind>().unwrap(), SchemeKind::Katz);
        assert_eq!("backoff".parse::<SchemeKind>().unwrap(), SchemeKind::Katz);
        assert_eq!(
            "kneserney".parse::<SchemeKind>().unwrap(),
            SchemeKind::ModifiedKn
        );
        assert_eq!(
            "modified-kn".parse::<SchemeKind>().unwrap(),
            SchemeKind::ModifiedKn
        );
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = "bogus".parse::<SchemeKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownScheme { .. }));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for scheme in [SchemeKind::Katz, SchemeKind::ModifiedKn] {
            let s = scheme.to_string();
            assert_eq!(s.parse::<SchemeKind>().unwrap(), scheme);
        }
    }
}
