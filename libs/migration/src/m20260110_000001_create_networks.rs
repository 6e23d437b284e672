use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Networks::Table)
                    .if_not_exists()
                    .col(pk_uuid(Networks::Id))
                    .col(string(Networks::ProjectId))
                    .col(string(Networks::Name))
                    .col(string(Networks::Cidr))
                    .col(string(Networks::DriverNetworkId))
                    .col(boolean(Networks::AutoCreateSubnetworks).default(true))
                    .col(
                        timestamp_with_time_zone(Networks::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_networks_project_name")
                    .table(Networks::Table)
                    .col(Networks::ProjectId)
                    .col(Networks::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subnets::Table)
                    .if_not_exists()
                    .col(pk_uuid(Subnets::Id))
                    .col(string(Subnets::ProjectId))
                    .col(string(Subnets::Region))
                    .col(string(Subnets::NetworkName))
                    .col(string(Subnets::Name))
                    .col(string(Subnets::Cidr))
                    .col(string(Subnets::GatewayIp))
                    .col(big_integer(Subnets::NextOffset).default(2))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subnets_project_network_name")
                    .table(Subnets::Table)
                    .col(Subnets::ProjectId)
                    .col(Subnets::NetworkName)
                    .col(Subnets::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Routes::Table)
                    .if_not_exists()
                    .col(pk_uuid(Routes::Id))
                    .col(string(Routes::ProjectId))
                    .col(string(Routes::Name))
                    .col(string(Routes::Network))
                    .col(string(Routes::DestRange))
                    .col(string(Routes::NextHopGateway))
                    .col(integer(Routes::Priority).default(1000))
                    .col(
                        timestamp_with_time_zone(Routes::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_routes_project_name")
                    .table(Routes::Table)
                    .col(Routes::ProjectId)
                    .col(Routes::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Routes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subnets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Networks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Networks {
    Table,
    Id,
    ProjectId,
    Name,
    Cidr,
    DriverNetworkId,
    AutoCreateSubnetworks,
    CreateTime,
}

#[derive(DeriveIden)]
enum Subnets {
    Table,
    Id,
    ProjectId,
    Region,
    NetworkName,
    Name,
    Cidr,
    GatewayIp,
    NextOffset,
}

#[derive(DeriveIden)]
enum Routes {
    Table,
    Id,
    ProjectId,
    Name,
    Network,
    DestRange,
    NextHopGateway,
    Priority,
    CreateTime,
}
