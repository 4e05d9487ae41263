use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "global_options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub value: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_options::Entity")]
    ProductOptions,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_options::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_options::Relation::GlobalOptions.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
