//! Document checksums
//!
//! A checksum is the SHA-256 of the compact JSON rendering of a document
//! root. `serde_json::Map` keeps keys sorted, so equal trees hash equally
//! regardless of the key order they were read with.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CatalogueError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Hash a JSON value in its canonical rendering
    pub fn of(value: &serde_json::Value) -> Result<Self> {
        let canonical = serde_json::to_vec(value)?;
        Ok(Self(format!("{:x}", Sha256::digest(&canonical))))
    }

    /// Accept a checksum read from a document: 64 lowercase hex digits
    pub fn parse(hex: &str) -> Result<Self> {
        let valid = hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(CatalogueError::InvalidDocument(format!(
                "malformed checksum {:?}",
                hex
            )));
        }
        Ok(Self(hex.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, value: &serde_json::Value) -> Result<bool> {
        Ok(*self == Self::of(value)?)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
