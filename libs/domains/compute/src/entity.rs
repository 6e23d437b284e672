use core_proc_macros::SeaOrmResource;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod instance {
    use super::*;
    use crate::models::InstanceStatus;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "instances")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub project_id: String,
        pub zone: String,
        pub name: String,
        pub machine_type: String,
        pub status: String,
        pub container_id: Option<String>,
        pub container_name: String,
        pub network_name: String,
        pub subnet_name: Option<String>,
        pub internal_ip: Option<String>,
        pub create_time: DateTimeWithTimeZone,
        pub update_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    fn status_from_str(value: &str) -> InstanceStatus {
        match value {
            "PROVISIONING" => InstanceStatus::Provisioning,
            "RUNNING" => InstanceStatus::Running,
            "STOPPING" => InstanceStatus::Stopping,
            "TERMINATED" => InstanceStatus::Terminated,
            _ => InstanceStatus::Unknown,
        }
    }

    impl From<Model> for crate::models::Instance {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                project_id: model.project_id,
                zone: model.zone,
                name: model.name,
                machine_type: model.machine_type,
                status: status_from_str(&model.status),
                container_id: model.container_id,
                container_name: model.container_name,
                network_name: model.network_name,
                subnet_name: model.subnet_name,
                internal_ip: model.internal_ip,
                create_time: model.create_time.into(),
                update_time: model.update_time.into(),
            }
        }
    }

    impl From<crate::models::Instance> for ActiveModel {
        fn from(instance: crate::models::Instance) -> Self {
            ActiveModel {
                id: Set(instance.id),
                project_id: Set(instance.project_id),
                zone: Set(instance.zone),
                name: Set(instance.name),
                machine_type: Set(instance.machine_type),
                status: Set(instance.status.to_string()),
                container_id: Set(instance.container_id),
                container_name: Set(instance.container_name),
                network_name: Set(instance.network_name),
                subnet_name: Set(instance.subnet_name),
                internal_ip: Set(instance.internal_ip),
                create_time: Set(instance.create_time.into()),
                update_time: Set(instance.update_time.into()),
            }
        }
    }
}
