use core_proc_macros::SeaOrmResource;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
#[sea_orm(table_name = "service_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub project_id: String,
    pub display_name: String,
    pub description: String,
    pub unique_id: String,
    pub disabled: bool,
    pub create_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::ServiceAccount {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            project_id: model.project_id,
            display_name: model.display_name,
            description: model.description,
            unique_id: model.unique_id,
            disabled: model.disabled,
            create_time: model.create_time.into(),
        }
    }
}

impl ActiveModel {
    pub fn from_domain(account: crate::models::ServiceAccount) -> Self {
        Self {
            id: Set(account.id),
            email: Set(account.email),
            project_id: Set(account.project_id),
            display_name: Set(account.display_name),
            description: Set(account.description),
            unique_id: Set(account.unique_id),
            disabled: Set(account.disabled),
            create_time: Set(account.create_time.into()),
        }
    }
}
