//! SeaORM Entity for the calls table.
//! One row per uploaded recording, mutated only by the call pipeline.

use crate::call_status::CallStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::calls::Model)]
#[sea_orm(table_name = "calls")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub organization_id: Id,

    /// The user who uploaded the file
    pub user_id: Id,

    /// Original file name as uploaded
    pub file_name: String,

    /// Where the raw media lives on disk
    pub storage_path: String,

    /// Full transcript text, set once transcription succeeds
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript: Option<String>,

    /// Current status of the call in the pipeline
    pub status: CallStatus,

    /// Fraction of speaking time attributed to the rep (0.0 - 1.0)
    pub talk_ratio_rep: Option<f64>,

    /// Fraction of speaking time attributed to the prospect (0.0 - 1.0)
    pub talk_ratio_prospect: Option<f64>,

    /// Error marker if processing failed
    pub error_message: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organizations,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(has_one = "super::call_analyses::Entity")]
    CallAnalyses,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::call_analyses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallAnalyses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
