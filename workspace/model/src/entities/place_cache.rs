use sea_orm::entity::prelude::*;

/// A memoized geocoding result, keyed by the canonical display name
/// ("place, region, country"). `hit_count` is a popularity counter
/// incremented on every cache hit; lost updates under concurrent hits are
/// tolerated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "place_cache")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub hit_count: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
