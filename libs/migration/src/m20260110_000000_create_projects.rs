use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_uuid(Projects::Id))
                    .col(
                        ColumnDef::new(Projects::ProjectId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Projects::DisplayName))
                    .col(
                        ColumnDef::new(Projects::ProjectNumber)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        timestamp_with_time_zone(Projects::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_create_time")
                    .table(Projects::Table)
                    .col(Projects::CreateTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    ProjectId,
    DisplayName,
    ProjectNumber,
    CreateTime,
}
