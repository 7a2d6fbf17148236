//! Deployment target for a stack

use serde::{Deserialize, Serialize};
use std::fmt;

/// The (account, region) pair a stack's resources are provisioned into
///
/// Fixed at stack construction time for the lifetime of a synthesis run.
/// The pair is carried into the manifest so the apply step knows where
/// each template belongs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentTarget {
    /// Cloud account identifier
    pub account: String,
    /// Region name, e.g. "us-east-1"
    pub region: String,
}

impl EnvironmentTarget {
    /// Create a target from an account id and region name
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// Availability zone name for a single-letter suffix, e.g. `az('a')`
    /// yields "us-east-1a"
    pub fn az(&self, suffix: char) -> String {
        format!("{}{}", self.region, suffix)
    }
}

impl fmt::Display for EnvironmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_az_suffix() {
        let env = EnvironmentTarget::new("111111111111", "us-east-1");
        assert_eq!(env.az('a'), "us-east-1a");
        assert_eq!(env.az('c'), "us-east-1c");
    }

    #[test]
    fn test_display() {
        let env = EnvironmentTarget::new("111111111111", "ap-northeast-2");
        assert_eq!(env.to_string(), "111111111111/ap-northeast-2");
    }
}
