//! Domain name handling.
//!
//! A [`DomainName`] is deliberately opaque: it is used verbatim both as the
//! network target and as the report label. The only rule enforced is that it
//! is not empty once surrounding whitespace is removed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomwatchError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// Create a domain name, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomwatchError::InvalidDomain(
                "domain name must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last label of the name, used to pick a WHOIS server.
    pub fn tld(&self) -> Option<&str> {
        self.0
            .trim_end_matches('.')
            .rsplit('.')
            .next()
            .filter(|label| !label.is_empty())
    }
}

impl FromStr for DomainName {
    type Err = DomwatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
