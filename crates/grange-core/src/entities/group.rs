//! Group entity - a named farming community

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{slugify, GroupPrivacy};

/// Community group entity
///
/// `member_count` is a denormalized cache of the number of active
/// memberships; the membership store is the source of truth. `post_count`
/// is owned by the post subsystem and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub privacy: GroupPrivacy,
    pub owner_id: Uuid,
    pub member_count: i32,
    pub post_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create a new Group with a freshly derived slug (uniqueness is the
    /// registry's concern)
    pub fn new(id: Uuid, name: String, slug: String, privacy: GroupPrivacy, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            slug,
            description: None,
            privacy,
            owner_id,
            member_count: 0,
            post_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if a user is the group owner
    #[inline]
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Rename the group, deriving a new slug base from the name
    pub fn rename(&mut self, name: String, slug: String) {
        self.name = name;
        self.slug = slug;
        self.updated_at = Utc::now();
    }

    /// Update the group description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.updated_at = Utc::now();
    }

    /// Update the privacy level
    pub fn set_privacy(&mut self, privacy: GroupPrivacy) {
        self.privacy = privacy;
        self.updated_at = Utc::now();
    }

    /// Soft-delete the group
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Slug base for this group's name
    pub fn slug_base(&self) -> String {
        slugify(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_group() -> Group {
        Group::new(
            Uuid::new_v4(),
            "Prairie Grain Growers".to_string(),
            "prairie-grain-growers".to_string(),
            GroupPrivacy::Public,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_group_creation() {
        let group = test_group();
        assert_eq!(group.member_count, 0);
        assert!(group.is_active);
        assert!(group.is_owner(group.owner_id));
        assert!(!group.is_owner(Uuid::new_v4()));
    }

    #[test]
    fn test_rename_updates_slug() {
        let mut group = test_group();
        group.rename("Hill Country Beekeepers".to_string(), "hill-country-beekeepers".to_string());
        assert_eq!(group.slug, "hill-country-beekeepers");
        assert_eq!(group.slug_base(), "hill-country-beekeepers");
    }

    #[test]
    fn test_deactivate() {
        let mut group = test_group();
        group.deactivate();
        assert!(!group.is_active);
    }
}
