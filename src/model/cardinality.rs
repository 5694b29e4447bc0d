//! Multiplicity of a property (`1`, `0..1`, `1..*`, `*`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogueError;

/// Multiplicity range. `upper == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cardinality {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Cardinality {
    pub fn new(lower: u32, upper: Option<u32>) -> Result<Self, CatalogueError> {
        if let Some(upper) = upper {
            if upper < lower {
                return Err(CatalogueError::InvalidCardinality(format!(
                    "upper bound {} below lower bound {}",
                    upper, lower
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Exactly one
    pub const fn one() -> Self {
        Self { lower: 1, upper: Some(1) }
    }

    /// `0..1`
    pub const fn optional() -> Self {
        Self { lower: 0, upper: Some(1) }
    }

    /// `0..*`
    pub const fn many() -> Self {
        Self { lower: 0, upper: None }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::one()
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (0, None) => write!(f, "*"),
            (lower, None) => write!(f, "{}..*", lower),
            (lower, Some(upper)) if lower == upper => write!(f, "{}", lower),
            (lower, Some(upper)) => write!(f, "{}..{}", lower, upper),
        }
    }
}

impl FromStr for Cardinality {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bound = |part: &str| -> Result<Option<u32>, CatalogueError> {
            match part.trim() {
                "*" | "n" => Ok(None),
                digits => digits
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| CatalogueError::InvalidCardinality(s.to_string())),
            }
        };

        match s.split_once("..") {
            Some((lower, upper)) => {
                let lower = bound(lower)?
                    .ok_or_else(|| CatalogueError::InvalidCardinality(s.to_string()))?;
                Self::new(lower, bound(upper)?)
            }
            None => match bound(s)? {
                None => Ok(Self::many()),
                Some(n) => Self::new(n, Some(n)),
            },
        }
    }
}

impl TryFrom<String> for Cardinality {
    type Error = CatalogueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cardinality> for String {
    fn from(value: Cardinality) -> Self {
        value.to_string()
    }
}
