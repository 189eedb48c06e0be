use crate::contract::model::User;
use crate::infra::storage::entity::Model as UserEntity;

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            login: entity.login,
            password: entity.password,
        }
    }
}
