use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Buckets::Table)
                    .if_not_exists()
                    .col(pk_uuid(Buckets::Id))
                    .col(string(Buckets::ProjectId))
                    .col(
                        ColumnDef::new(Buckets::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Buckets::Location))
                    .col(string(Buckets::StorageClass))
                    .col(boolean(Buckets::VersioningEnabled).default(false))
                    .col(string(Buckets::DefaultObjectAcl).default("private"))
                    .col(
                        timestamp_with_time_zone(Buckets::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Buckets::UpdateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER buckets_touch_updated_at
                    BEFORE UPDATE ON buckets
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Objects::Table)
                    .if_not_exists()
                    .col(pk_uuid(Objects::Id))
                    .col(string(Objects::Bucket))
                    .col(string(Objects::Name))
                    .col(big_integer(Objects::Generation))
                    .col(big_integer(Objects::Size))
                    .col(string(Objects::ContentType))
                    .col(string(Objects::Md5Base64))
                    .col(string(Objects::Crc32cBase64))
                    .col(string(Objects::FilePath))
                    .col(big_integer(Objects::Metageneration).default(1))
                    .col(string(Objects::StorageClass))
                    .col(string(Objects::Acl).default("private"))
                    .col(boolean(Objects::IsLatest).default(true))
                    .col(boolean(Objects::Deleted).default(false))
                    .col(
                        timestamp_with_time_zone(Objects::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_objects_bucket_name_generation")
                    .table(Objects::Table)
                    .col(Objects::Bucket)
                    .col(Objects::Name)
                    .col(Objects::Generation)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_objects_bucket_name_latest")
                    .table(Objects::Table)
                    .col(Objects::Bucket)
                    .col(Objects::Name)
                    .col(Objects::IsLatest)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SignedUrlSessions::Table)
                    .if_not_exists()
                    .col(pk_uuid(SignedUrlSessions::Id))
                    .col(
                        ColumnDef::new(SignedUrlSessions::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(SignedUrlSessions::Bucket))
                    .col(string(SignedUrlSessions::ObjectName))
                    .col(string(SignedUrlSessions::Method))
                    .col(timestamp_with_time_zone(SignedUrlSessions::ExpiresAt))
                    .col(big_integer(SignedUrlSessions::AccessCount).default(0))
                    .col(
                        timestamp_with_time_zone(SignedUrlSessions::CreateTime)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signed_url_sessions_expires_at")
                    .table(SignedUrlSessions::Table)
                    .col(SignedUrlSessions::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SignedUrlSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Objects::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS buckets_touch_updated_at ON buckets")
            .await?;
        manager
            .drop_table(Table::drop().table(Buckets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Buckets {
    Table,
    Id,
    ProjectId,
    Name,
    Location,
    StorageClass,
    VersioningEnabled,
    DefaultObjectAcl,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum Objects {
    Table,
    Id,
    Bucket,
    Name,
    Generation,
    Size,
    ContentType,
    Md5Base64,
    Crc32cBase64,
    FilePath,
    Metageneration,
    StorageClass,
    Acl,
    IsLatest,
    Deleted,
    CreateTime,
}

#[derive(DeriveIden)]
enum SignedUrlSessions {
    Table,
    Id,
    Token,
    Bucket,
    ObjectName,
    Method,
    ExpiresAt,
    AccessCount,
    CreateTime,
}
