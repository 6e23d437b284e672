use core_proc_macros::SeaOrmResource;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod network {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "networks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub project_id: String,
        pub name: String,
        pub cidr: String,
        pub driver_network_id: String,
        pub auto_create_subnetworks: bool,
        pub create_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Network {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                project_id: model.project_id,
                name: model.name,
                cidr: model.cidr,
                driver_network_id: model.driver_network_id,
                auto_create_subnetworks: model.auto_create_subnetworks,
                create_time: model.create_time.into(),
            }
        }
    }

    impl From<crate::models::Network> for ActiveModel {
        fn from(network: crate::models::Network) -> Self {
            ActiveModel {
                id: Set(network.id),
                project_id: Set(network.project_id),
                name: Set(network.name),
                cidr: Set(network.cidr),
                driver_network_id: Set(network.driver_network_id),
                auto_create_subnetworks: Set(network.auto_create_subnetworks),
                create_time: Set(network.create_time.into()),
            }
        }
    }
}

pub mod subnet {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "subnets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub project_id: String,
        pub region: String,
        pub network_name: String,
        pub name: String,
        pub cidr: String,
        pub gateway_ip: String,
        pub next_offset: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Subnet {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                project_id: model.project_id,
                region: model.region,
                network_name: model.network_name,
                name: model.name,
                cidr: model.cidr,
                gateway_ip: model.gateway_ip,
                next_offset: model.next_offset,
            }
        }
    }

    impl From<crate::models::Subnet> for ActiveModel {
        fn from(subnet: crate::models::Subnet) -> Self {
            ActiveModel {
                id: Set(subnet.id),
                project_id: Set(subnet.project_id),
                region: Set(subnet.region),
                network_name: Set(subnet.network_name),
                name: Set(subnet.name),
                cidr: Set(subnet.cidr),
                gateway_ip: Set(subnet.gateway_ip),
                next_offset: Set(subnet.next_offset),
            }
        }
    }
}

pub mod route {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "routes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub project_id: String,
        pub name: String,
        pub network: String,
        pub dest_range: String,
        pub next_hop_gateway: String,
        pub priority: i32,
        pub create_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Route {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                project_id: model.project_id,
                name: model.name,
                network: model.network,
                dest_range: model.dest_range,
                next_hop_gateway: model.next_hop_gateway,
                priority: model.priority,
                create_time: model.create_time.into(),
            }
        }
    }

    impl From<crate::models::Route> for ActiveModel {
        fn from(route: crate::models::Route) -> Self {
            ActiveModel {
                id: Set(route.id),
                project_id: Set(route.project_id),
                name: Set(route.name),
                network: Set(route.network),
                dest_range: Set(route.dest_range),
                next_hop_gateway: Set(route.next_hop_gateway),
                priority: Set(route.priority),
                create_time: Set(route.create_time.into()),
            }
        }
    }
}
