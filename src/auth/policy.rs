//! Roles and the three nested authorization policies.
//!
//! `Admin` ⊃ `TeamLead` ⊃ `Employee`: every policy admits its own role and all
//! roles above it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    TeamLead,
    #[default]
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::TeamLead, Role::Employee];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::TeamLead => "TeamLead",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "TeamLead" => Ok(Role::TeamLead),
            "Employee" => Ok(Role::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Admin,
    TeamLead,
    Employee,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Policy::Admin => "AdminPolicy",
            Policy::TeamLead => "TeamLeadPolicy",
            Policy::Employee => "EmployeePolicy",
        }
    }

    pub fn admitted_roles(self) -> &'static [Role] {
        match self {
            Policy::Admin => &[Role::Admin],
            Policy::TeamLead => &[Role::TeamLead, Role::Admin],
            Policy::Employee => &[Role::Employee, Role::TeamLead, Role::Admin],
        }
    }

    pub fn admits(self, role: Role) -> bool {
        self.admitted_roles().contains(&role)
    }
}

/// Type-level policy selector for the `Authorized` extractor.
pub trait PolicyGuard: Send + Sync + 'static {
    const POLICY: Policy;
}

#[derive(Debug, Clone, Copy)]
pub struct AdminPolicy;

#[derive(Debug, Clone, Copy)]
pub struct TeamLeadPolicy;

#[derive(Debug, Clone, Copy)]
pub struct EmployeePolicy;

impl PolicyGuard for AdminPolicy {
    const POLICY: Policy = Policy::Admin;
}

impl PolicyGuard for TeamLeadPolicy {
    const POLICY: Policy = Policy::TeamLead;
}

impl PolicyGuard for EmployeePolicy {
    const POLICY: Policy = Policy::Employee;
}
