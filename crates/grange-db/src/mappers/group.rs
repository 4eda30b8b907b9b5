//! Group entity <-> model mapper

use grange_core::error::DomainError;
use grange_core::Group;

use crate::models::GroupModel;

impl TryFrom<GroupModel> for Group {
    type Error = DomainError;

    fn try_from(model: GroupModel) -> Result<Self, Self::Error> {
        let privacy = model
            .privacy
            .parse()
            .map_err(DomainError::DatabaseError)?;

        Ok(Group {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            privacy,
            owner_id: model.owner_id,
            member_count: model.member_count,
            post_count: model.post_count,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grange_core::GroupPrivacy;
    use uuid::Uuid;

    fn model(privacy: &str) -> GroupModel {
        GroupModel {
            id: Uuid::new_v4(),
            name: "Orchard Keepers".to_string(),
            slug: "orchard-keepers".to_string(),
            description: None,
            privacy: privacy.to_string(),
            owner_id: Uuid::new_v4(),
            member_count: 3,
            post_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_maps_privacy() {
        let group = Group::try_from(model("invite_only")).unwrap();
        assert_eq!(group.privacy, GroupPrivacy::InviteOnly);
        assert_eq!(group.member_count, 3);
    }

    #[test]
    fn test_rejects_unknown_privacy() {
        assert!(Group::try_from(model("secret")).is_err());
    }
}
