use core_proc_macros::SeaOrmResource;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub project_id: String,
    pub display_name: String,
    #[sea_orm(unique)]
    pub project_number: i64,
    pub create_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Project {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            display_name: model.display_name,
            project_number: model.project_number,
            create_time: model.create_time.into(),
        }
    }
}

impl From<crate::models::CreateProject> for ActiveModel {
    fn from(input: crate::models::CreateProject) -> Self {
        let project = crate::models::Project::new(input);
        ActiveModel {
            id: Set(project.id),
            project_id: Set(project.project_id),
            display_name: Set(project.display_name),
            project_number: Set(project.project_number),
            create_time: Set(project.create_time.into()),
        }
    }
}
