use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repair_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub device_type: Option<String>,
    pub issue_description: Option<String>,
    pub status: String,
    pub cover_image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::repair_images::Entity")]
    RepairImages,
}

impl Related<super::repair_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepairImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
