//! Organization directory: members, groups and the membership relation between them.
//!
//! `Group::member_count` is a cached count. Every membership change below updates the
//! member's group list and the count in the same call, so the two never disagree.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{
    CreateGroupRequest, CreateMemberRequest, Group, Member, Org, UpdateMemberRequest,
};
use crate::resolver::GroupDirectory;
use crate::scope::matches_query;
use crate::store::ConfigurationStore;

/// A group whose cached member count disagreed with actual membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDrift {
    pub group_id: String,
    pub cached: u32,
    pub actual: u32,
}

/// All members and groups of one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleState {
    pub org: Org,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl GroupDirectory for ConsoleState {
    fn group(&self, group_id: &str) -> Option<&Group> {
        self.get_group(group_id)
    }
}

impl ConsoleState {
    pub fn new(org: Org) -> Self {
        Self {
            org,
            members: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Check state read from outside the mutation methods: ids are unique and every
    /// product configuration holds its scope invariants.
    pub fn validate(&self) -> ConsoleResult<()> {
        for (i, member) in self.members.iter().enumerate() {
            if self.members[..i].iter().any(|m| m.id == member.id) {
                return Err(ConsoleError::Validation(format!(
                    "Duplicate member {}",
                    member.id
                )));
            }
            member.product_configurations.validate().map_err(|err| {
                ConsoleError::Validation(format!("Member {}: {}", member.id, err.message()))
            })?;
        }
        for (i, group) in self.groups.iter().enumerate() {
            if self.groups[..i].iter().any(|g| g.id == group.id) {
                return Err(ConsoleError::Validation(format!(
                    "Duplicate group {}",
                    group.id
                )));
            }
            group.configurations.validate().map_err(|err| {
                ConsoleError::Validation(format!("Group {}: {}", group.id, err.message()))
            })?;
        }
        Ok(())
    }

    // ==================== MEMBER OPERATIONS ====================

    pub fn get_member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub(crate) fn get_member_mut(&mut self, id: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Add a new member at the front of the list.
    pub fn add_member(&mut self, request: CreateMemberRequest) -> ConsoleResult<Member> {
        if request.name.trim().is_empty() {
            return Err(ConsoleError::Validation("Member name is required".to_string()));
        }
        if request.email.trim().is_empty() {
            return Err(ConsoleError::Validation("Member email is required".to_string()));
        }

        let id = request
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_id("m"));
        if self.get_member(&id).is_some() {
            return Err(ConsoleError::Validation(format!(
                "Member {} already exists",
                id
            )));
        }

        let member = Member {
            id,
            org_id: request.org_id.unwrap_or_else(|| self.org.id.clone()),
            name: request.name,
            email: request.email,
            role: request.role,
            department: request.department,
            external: request.external,
            product_configurations: ConfigurationStore::new(),
            group_ids: Vec::new(),
        };
        self.members.insert(0, member.clone());
        tracing::info!("Added member {} ({})", member.id, member.name);
        Ok(member)
    }

    /// Apply a partial update. Returns `Ok(None)` for an unknown member.
    pub fn update_member(
        &mut self,
        id: &str,
        request: UpdateMemberRequest,
    ) -> ConsoleResult<Option<Member>> {
        if matches!(&request.name, Some(name) if name.trim().is_empty()) {
            return Err(ConsoleError::Validation("Member name is required".to_string()));
        }
        if matches!(&request.email, Some(email) if email.trim().is_empty()) {
            return Err(ConsoleError::Validation("Member email is required".to_string()));
        }

        let Some(member) = self.get_member_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = request.name {
            member.name = name;
        }
        if let Some(email) = request.email {
            member.email = email;
        }
        if let Some(role) = request.role {
            member.role = role;
        }
        if let Some(department) = request.department {
            member.department = department;
        }
        if let Some(external) = request.external {
            member.external = external;
        }
        Ok(Some(member.clone()))
    }

    /// Members whose name, email or role contains `query` (case-insensitive).
    pub fn search_members<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| {
            matches_query(&m.name, query)
                || matches_query(&m.email, query)
                || matches_query(m.role.as_str(), query)
        })
    }

    // ==================== GROUP OPERATIONS ====================

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub(crate) fn get_group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Create an empty group at the front of the list.
    pub fn create_group(&mut self, request: CreateGroupRequest) -> ConsoleResult<Group> {
        if request.name.trim().is_empty() {
            return Err(ConsoleError::Validation("Group name is required".to_string()));
        }
        if request.description.trim().is_empty() {
            return Err(ConsoleError::Validation(
                "Group description is required".to_string(),
            ));
        }

        let group = Group {
            id: generate_id("g"),
            name: request.name,
            description: request.description,
            member_count: 0,
            products: request.products,
            role_level: request.role_level,
            last_updated: Utc::now().date_naive(),
            configurations: ConfigurationStore::new(),
        };
        self.groups.insert(0, group.clone());
        tracing::info!("Created group {} ({})", group.id, group.name);
        Ok(group)
    }

    /// Groups whose name or description contains `query` (case-insensitive).
    pub fn search_groups<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups
            .iter()
            .filter(move |g| matches_query(&g.name, query) || matches_query(&g.description, query))
    }

    pub fn group_members<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| m.is_in_group(group_id))
    }

    /// Members not yet in `group_id` whose name or email matches `query`.
    pub fn candidate_members<'a>(
        &'a self,
        group_id: &'a str,
        query: &'a str,
    ) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| {
            !m.is_in_group(group_id)
                && (matches_query(&m.name, query) || matches_query(&m.email, query))
        })
    }

    // ==================== MEMBERSHIP ====================

    /// Record `member_id` as a member of `group_id`.
    ///
    /// Returns `false` without touching anything when either side is unknown or the
    /// membership already exists.
    pub fn add_member_to_group(&mut self, member_id: &str, group_id: &str) -> bool {
        let group_index = match self.groups.iter().position(|g| g.id == group_id) {
            Some(i) => i,
            None => {
                tracing::debug!("Cannot add {} to unknown group {}", member_id, group_id);
                return false;
            }
        };
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            tracing::debug!("Cannot add unknown member {} to {}", member_id, group_id);
            return false;
        };
        if member.is_in_group(group_id) {
            return false;
        }

        member.group_ids.push(group_id.to_string());
        let group = &mut self.groups[group_index];
        group.member_count += 1;
        tracing::info!(
            "Member {} joined group {} ({} members)",
            member_id,
            group_id,
            group.member_count
        );
        true
    }

    /// Remove `member_id` from `group_id`. Absent memberships are a no-op.
    pub fn remove_member_from_group(&mut self, member_id: &str, group_id: &str) -> bool {
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            return false;
        };
        let before = member.group_ids.len();
        member.group_ids.retain(|id| id != group_id);
        if member.group_ids.len() == before {
            return false;
        }

        if let Some(group) = self.get_group_mut(group_id) {
            group.member_count = group.member_count.saturating_sub(1);
            tracing::info!(
                "Member {} left group {} ({} members)",
                member_id,
                group_id,
                group.member_count
            );
        }
        true
    }

    /// Recompute every cached member count from actual membership.
    pub fn reconcile_member_counts(&mut self) -> Vec<CountDrift> {
        let mut drift = Vec::new();
        for group in &mut self.groups {
            let actual = self
                .members
                .iter()
                .filter(|m| m.is_in_group(&group.id))
                .count() as u32;
            if group.member_count != actual {
                drift.push(CountDrift {
                    group_id: group.id.clone(),
                    cached: group.member_count,
                    actual,
                });
                group.member_count = actual;
            }
        }
        drift
    }
}

fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
