//! Deployment-selected policies for the choices that vary between revisions.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How signup assigns a new user to an organization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignupPolicy {
    /// An existing organization must be named; admins may only join children.
    #[default]
    RequireOrganization,
    /// Organization is optional; users without one start unaffiliated.
    OptionalOrganization,
    /// Users without an organization get a fresh root organization.
    AutoCreateOrganization,
}

impl SignupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupPolicy::RequireOrganization => "require-organization",
            SignupPolicy::OptionalOrganization => "optional-organization",
            SignupPolicy::AutoCreateOrganization => "auto-create-organization",
        }
    }
}

impl fmt::Display for SignupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "require-organization" => Ok(SignupPolicy::RequireOrganization),
            "optional-organization" => Ok(SignupPolicy::OptionalOrganization),
            "auto-create-organization" => Ok(SignupPolicy::AutoCreateOrganization),
            other => Err(format!("unknown signup policy '{other}'")),
        }
    }
}

/// What happens when the audit write after a successful mutation fails.
///
/// Neither policy rolls back the primary write.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditPolicy {
    /// The request fails with the storage error.
    #[default]
    Strict,
    /// The failure is logged and the primary result is returned.
    BestEffort,
}

impl AuditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditPolicy::Strict => "strict",
            AuditPolicy::BestEffort => "best-effort",
        }
    }
}

impl fmt::Display for AuditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strict" => Ok(AuditPolicy::Strict),
            "best-effort" => Ok(AuditPolicy::BestEffort),
            other => Err(format!("unknown audit policy '{other}'")),
        }
    }
}
