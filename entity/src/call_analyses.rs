//! SeaORM Entity for the call_analyses table.
//! Exactly one row per analyzed call; failed calls carry an error marker on
//! the call row instead.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_analyses::Model)]
#[sea_orm(table_name = "call_analyses")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub call_id: Id,

    /// Executive summary: the opening words of the transcript
    #[sea_orm(column_type = "Text")]
    pub summary: String,

    /// 1 - 10
    pub sentiment_score: i32,

    /// 1 - 10
    pub buying_intent_score: i32,

    /// 1 - 100
    pub closing_probability: i32,

    /// 1 - 10
    pub engagement_score: i32,

    /// The full structured insight payload produced by the analysis engine
    #[schema(value_type = Object)]
    pub payload: Json,

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
        belongs_to = "super::calls::Entity",
        from = "Column::CallId",
        to = "super::calls::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Calls,
}

impl Related<super::calls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
