use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::HashedPassword))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create analytics_events table
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(pk_auto(AnalyticsEvents::Id))
                    .col(integer_null(AnalyticsEvents::UserId))
                    .col(string(AnalyticsEvents::EventName))
                    .col(text_null(AnalyticsEvents::MetaJson))
                    .col(timestamp_with_time_zone(AnalyticsEvents::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analytics_event_user")
                            .from(AnalyticsEvents::Table, AnalyticsEvents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create place_cache table
        manager
            .create_table(
                Table::create()
                    .table(PlaceCache::Table)
                    .if_not_exists()
                    .col(pk_auto(PlaceCache::Id))
                    .col(string(PlaceCache::DisplayName).unique_key())
                    .col(double(PlaceCache::Latitude))
                    .col(double(PlaceCache::Longitude))
                    .col(integer(PlaceCache::HitCount).default(0))
                    .col(timestamp_with_time_zone(PlaceCache::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create crop_rules table
        manager
            .create_table(
                Table::create()
                    .table(CropRules::Table)
                    .if_not_exists()
                    .col(pk_auto(CropRules::Id))
                    .col(string(CropRules::Name))
                    .col(string(CropRules::SeasonsCsv))
                    .col(double(CropRules::TempMin))
                    .col(double(CropRules::TempMax))
                    .col(double(CropRules::RainMin))
                    .col(double(CropRules::RainMax))
                    .col(boolean(CropRules::Active).default(true))
                    .col(timestamp_with_time_zone(CropRules::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CropRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlaceCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    HashedPassword,
    IsAdmin,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    Table,
    Id,
    UserId,
    EventName,
    MetaJson,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlaceCache {
    Table,
    Id,
    DisplayName,
    Latitude,
    Longitude,
    HitCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CropRules {
    Table,
    Id,
    Name,
    SeasonsCsv,
    TempMin,
    TempMax,
    RainMin,
    RainMax,
    Active,
    CreatedAt,
}
