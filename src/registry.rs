//! Keyed stores for users and groups.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Group, GroupId, User, UserId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),

    #[error("unknown group {0}")]
    UnknownGroup(GroupId),

    #[error("user {0} already exists")]
    DuplicateUser(UserId),

    #[error("group {0} already exists")]
    DuplicateGroup(GroupId),
}

#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<UserId, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, id: UserId, name: impl Into<String>) -> Result<User, RegistryError> {
        if self.users.contains_key(&id) {
            return Err(RegistryError::DuplicateUser(id));
        }
        let user = User::new(id, name);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> Result<&User, RegistryError> {
        self.users.get(&id).ok_or(RegistryError::UnknownUser(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Groups keyed by id. Membership changes go through here so callers never
/// hold a mutable reference to a stored group.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, Group>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        id: GroupId,
        name: impl Into<String>,
        creator: UserId,
    ) -> Result<Group, RegistryError> {
        if self.groups.contains_key(&id) {
            return Err(RegistryError::DuplicateGroup(id));
        }
        let group = Group::new(id, name, creator);
        self.groups.insert(id, group.clone());
        Ok(group)
    }

    pub fn get(&self, id: GroupId) -> Result<&Group, RegistryError> {
        self.groups.get(&id).ok_or(RegistryError::UnknownGroup(id))
    }

    pub fn add_member(&mut self, user: UserId, group: GroupId) -> Result<bool, RegistryError> {
        let group = self
            .groups
            .get_mut(&group)
            .ok_or(RegistryError::UnknownGroup(group))?;
        Ok(group.add_member(user))
    }

    pub fn remove_member(&mut self, user: UserId, group: GroupId) -> Result<bool, RegistryError> {
        let group = self
            .groups
            .get_mut(&group)
            .ok_or(RegistryError::UnknownGroup(group))?;
        Ok(group.remove_member(user))
    }

    /// Member ids in join order, as an owned copy.
    pub fn members(&self, group: GroupId) -> Result<Vec<UserId>, RegistryError> {
        Ok(self.get(group)?.members().to_vec())
    }
}
