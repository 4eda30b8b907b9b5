//! User display mapper

use grange_core::UserDisplay;

use crate::models::UserDisplayModel;

impl From<UserDisplayModel> for UserDisplay {
    fn from(model: UserDisplayModel) -> Self {
        UserDisplay {
            user_id: model.id,
            display_name: model.display_name,
            avatar: model.avatar,
        }
    }
}
