//! Core types for Stratus

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Error;

/// Resource tags. Ordered so that reads are stable between calls.
pub type Tags = BTreeMap<String, String>;

/// Amazon Resource Name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    pub fn new(
        partition: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }
}

impl std::fmt::Display for Arn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The resource part may itself contain ':'
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(Error::Validation(format!("invalid ARN: {}", s)));
        }
        if parts[1].is_empty() || parts[2].is_empty() || parts[5].is_empty() {
            return Err(Error::Validation(format!("invalid ARN: {}", s)));
        }
        Ok(Arn::new(parts[1], parts[2], parts[3], parts[4], parts[5]))
    }
}

/// Twelve decimal digits.
pub fn is_valid_account_id(s: &str) -> bool {
    s.len() == 12 && s.chars().all(|c| c.is_ascii_digit())
}

/// Pending status change of a simulated cloud record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Status the record moves to once settled
    pub to: String,
    /// Describe calls remaining before the move happens
    pub after_polls: u32,
    /// Remove the record instead of keeping it in `to`
    #[serde(default)]
    pub remove: bool,
}

impl Transition {
    pub fn to(state: impl Into<String>, after_polls: u32) -> Self {
        Self {
            to: state.into(),
            after_polls,
            remove: false,
        }
    }

    pub fn removal(state: impl Into<String>, after_polls: u32) -> Self {
        Self {
            to: state.into(),
            after_polls,
            remove: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_round_trip() {
        let arn = Arn::new(
            "aws",
            "ec2",
            "us-west-2",
            "123456789012",
            "carrier-gateway/cagw-0123",
        );
        let s = arn.to_string();
        assert_eq!(
            s,
            "arn:aws:ec2:us-west-2:123456789012:carrier-gateway/cagw-0123"
        );
        assert_eq!(s.parse::<Arn>().unwrap(), arn);
    }

    #[test]
    fn test_arn_resource_with_colons() {
        let arn: Arn = "arn:aws:gamelift:us-east-1::alias/alias-1:extra"
            .parse()
            .unwrap();
        assert_eq!(arn.account_id, "");
        assert_eq!(arn.resource, "alias/alias-1:extra");
    }

    #[test]
    fn test_arn_rejects_garbage() {
        assert!("not-an-arn".parse::<Arn>().is_err());
        assert!("arn::ec2:r:a:res".parse::<Arn>().is_err());
    }

    #[test]
    fn test_account_id() {
        assert!(is_valid_account_id("123456789012"));
        assert!(!is_valid_account_id("12345678901"));
        assert!(!is_valid_account_id("12345678901a"));
    }
}
