//! Member model matching the console's Member interface.

use serde::{Deserialize, Serialize};

use crate::store::ConfigurationStore;

/// Job role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    Negotiator,
    Analyst,
    Executive,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Negotiator => "Negotiator",
            MemberRole::Analyst => "Analyst",
            MemberRole::Executive => "Executive",
            MemberRole::Admin => "Admin",
        }
    }
}

/// Department a member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Sales,
    Contracting,
    #[serde(rename = "Rev Cycle")]
    RevCycle,
    #[serde(rename = "IT")]
    It,
    Operations,
}

/// An organization member with direct product assignments and group memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub department: Department,
    #[serde(default)]
    pub external: bool,
    /// Direct assignments, one configuration per product
    #[serde(default)]
    pub product_configurations: ConfigurationStore,
    /// Ids of the groups this member belongs to, in join order
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl Member {
    pub fn is_in_group(&self, group_id: &str) -> bool {
        self.group_ids.iter().any(|id| id == group_id)
    }
}

/// Request body for adding a new member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub department: Department,
    #[serde(default)]
    pub external: bool,
}

/// Request body for updating an existing member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub external: Option<bool>,
}
