use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repair_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub repair_request_id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repair_requests::Entity",
        from = "Column::RepairRequestId",
        to = "super::repair_requests::Column::Id"
    )]
    RepairRequests,
}

impl Related<super::repair_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepairRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
