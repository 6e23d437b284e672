use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Instances::Table)
                    .if_not_exists()
                    .col(pk_uuid(Instances::Id))
                    .col(string(Instances::ProjectId))
                    .col(string(Instances::Zone))
                    .col(string(Instances::Name))
                    .col(string(Instances::MachineType))
                    .col(string(Instances::Status))
                    .col(string_null(Instances::ContainerId))
                    .col(string(Instances::ContainerName))
                    .col(string(Instances::NetworkName))
                    .col(string_null(Instances::SubnetName))
                    .col(string_null(Instances::InternalIp))
                    .col(
                        timestamp_with_time_zone(Instances::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Instances::UpdateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_instances_project_zone_name")
                    .table(Instances::Table)
                    .col(Instances::ProjectId)
                    .col(Instances::Zone)
                    .col(Instances::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_instances_container_id")
                    .table(Instances::Table)
                    .col(Instances::ContainerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_instances_network_internal_ip")
                    .table(Instances::Table)
                    .col(Instances::NetworkName)
                    .col(Instances::InternalIp)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER instances_touch_updated_at
                    BEFORE UPDATE ON instances
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS instances_touch_updated_at ON instances")
            .await?;

        manager
            .drop_table(Table::drop().table(Instances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Instances {
    Table,
    Id,
    ProjectId,
    Zone,
    Name,
    MachineType,
    Status,
    ContainerId,
    ContainerName,
    NetworkName,
    SubnetName,
    InternalIp,
    CreateTime,
    UpdateTime,
}
