use core_proc_macros::SeaOrmResource;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::Acl;

fn acl_to_string(acl: Acl) -> String {
    acl.as_str().to_string()
}

fn acl_from_string(value: &str) -> Acl {
    Acl::parse(value).unwrap_or(Acl::Private)
}

pub mod bucket {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "buckets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub project_id: String,
        #[sea_orm(unique)]
        pub name: String,
        pub location: String,
        pub storage_class: String,
        pub versioning_enabled: bool,
        pub default_object_acl: String,
        pub create_time: DateTimeWithTimeZone,
        pub update_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Bucket {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                project_id: model.project_id,
                name: model.name,
                location: model.location,
                storage_class: model.storage_class,
                versioning_enabled: model.versioning_enabled,
                default_object_acl: acl_from_string(&model.default_object_acl),
                create_time: model.create_time.into(),
                update_time: model.update_time.into(),
            }
        }
    }

    impl From<crate::models::Bucket> for ActiveModel {
        fn from(bucket: crate::models::Bucket) -> Self {
            ActiveModel {
                id: Set(bucket.id),
                project_id: Set(bucket.project_id),
                name: Set(bucket.name),
                location: Set(bucket.location),
                storage_class: Set(bucket.storage_class),
                versioning_enabled: Set(bucket.versioning_enabled),
                default_object_acl: Set(acl_to_string(bucket.default_object_acl)),
                create_time: Set(bucket.create_time.into()),
                update_time: Set(bucket.update_time.into()),
            }
        }
    }
}

pub mod object {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "objects")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub bucket: String,
        pub name: String,
        pub generation: i64,
        pub size: i64,
        pub content_type: String,
        pub md5_base64: String,
        pub crc32c_base64: String,
        pub file_path: String,
        pub metageneration: i64,
        pub storage_class: String,
        pub acl: String,
        pub is_latest: bool,
        pub deleted: bool,
        pub create_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Object {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                bucket: model.bucket,
                name: model.name,
                generation: model.generation,
                size: model.size,
                content_type: model.content_type,
                md5_base64: model.md5_base64,
                crc32c_base64: model.crc32c_base64,
                file_path: model.file_path,
                metageneration: model.metageneration,
                storage_class: model.storage_class,
                acl: acl_from_string(&model.acl),
                is_latest: model.is_latest,
                deleted: model.deleted,
                create_time: model.create_time.into(),
            }
        }
    }

    impl From<crate::models::Object> for ActiveModel {
        fn from(object: crate::models::Object) -> Self {
            ActiveModel {
                id: Set(object.id),
                bucket: Set(object.bucket),
                name: Set(object.name),
                generation: Set(object.generation),
                size: Set(object.size),
                content_type: Set(object.content_type),
                md5_base64: Set(object.md5_base64),
                crc32c_base64: Set(object.crc32c_base64),
                file_path: Set(object.file_path),
                metageneration: Set(object.metageneration),
                storage_class: Set(object.storage_class),
                acl: Set(acl_to_string(object.acl)),
                is_latest: Set(object.is_latest),
                deleted: Set(object.deleted),
                create_time: Set(object.create_time.into()),
            }
        }
    }
}

pub mod signed_url_session {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
    #[sea_orm(table_name = "signed_url_sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub token: String,
        pub bucket: String,
        pub object_name: String,
        pub method: String,
        pub expires_at: DateTimeWithTimeZone,
        pub access_count: i64,
        pub create_time: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::SignedUrlSession {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                token: model.token,
                bucket: model.bucket,
                object_name: model.object_name,
                method: model.method,
                expires_at: model.expires_at.into(),
                access_count: model.access_count,
                create_time: model.create_time.into(),
            }
        }
    }

    impl From<crate::models::SignedUrlSession> for ActiveModel {
        fn from(session: crate::models::SignedUrlSession) -> Self {
            ActiveModel {
                id: Set(session.id),
                token: Set(session.token),
                bucket: Set(session.bucket),
                object_name: Set(session.object_name),
                method: Set(session.method),
                expires_at: Set(session.expires_at.into()),
                access_count: Set(session.access_count),
                create_time: Set(session.create_time.into()),
            }
        }
    }
}
