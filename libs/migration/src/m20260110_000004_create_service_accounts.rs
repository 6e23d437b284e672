use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceAccounts::Table)
                    .if_not_exists()
                    .col(pk_uuid(ServiceAccounts::Id))
                    .col(
                        ColumnDef::new(ServiceAccounts::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(ServiceAccounts::ProjectId))
                    .col(string(ServiceAccounts::DisplayName))
                    .col(string(ServiceAccounts::Description).default(""))
                    .col(string(ServiceAccounts::UniqueId))
                    .col(boolean(ServiceAccounts::Disabled).default(false))
                    .col(
                        timestamp_with_time_zone(ServiceAccounts::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_accounts_project_id")
                    .table(ServiceAccounts::Table)
                    .col(ServiceAccounts::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceAccounts {
    Table,
    Id,
    Email,
    ProjectId,
    DisplayName,
    Description,
    UniqueId,
    Disabled,
    CreateTime,
}
