//! User repository binding.

use sea_orm::DatabaseTransaction;

use super::entities::UserEntity;
use super::typed::{EntitySchemas, TypedRepository};
use crate::domain::{UserFilter, UserInsert, UserModel, UserUpdate};

pub struct UserSchemas;

impl EntitySchemas for UserSchemas {
    type Entity = UserEntity;
    type Model = UserModel;
    type Insert = UserInsert;
    type Filter = UserFilter;
    type Update = UserUpdate;
}

pub type UserRepository<'s, C = DatabaseTransaction> = TypedRepository<'s, UserSchemas, C>;
