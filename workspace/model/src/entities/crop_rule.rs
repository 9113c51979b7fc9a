use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set};

/// A crop tolerance rule used for suitability scoring.
///
/// Season membership is stored as a comma-joined string in the order the
/// caller supplied it (e.g. "Kharif,Rabi"). Temperature and rainfall bounds
/// are assumed valid (min <= max) and are not validated on write; a
/// degenerate rule simply produces degenerate scores.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crop_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub seasons_csv: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rain_min: f64,
    pub rain_max: f64,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Joins season labels into the stored CSV form, preserving caller order.
pub fn join_seasons(seasons: &[String]) -> String {
    seasons.join(",")
}

impl Model {
    /// Parses the stored CSV back into season labels, discarding empty
    /// segments.
    pub fn seasons(&self) -> Vec<String> {
        self.seasons_csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether this rule applies to the given season label.
    pub fn applies_to(&self, season: &str) -> bool {
        self.seasons().iter().any(|s| s == season)
    }

    /// Seeds the default rule set if the table is empty. Called once at
    /// server startup so a fresh deployment can score crops immediately.
    pub async fn seed_defaults(db: &DatabaseConnection) -> Result<(), DbErr> {
        if Entity::find().one(db).await?.is_some() {
            return Ok(());
        }

        let defaults: &[(&str, &[&str], f64, f64, f64, f64)] = &[
            ("Rice", &["Kharif"], 20.0, 35.0, 50.0, 300.0),
            ("Wheat", &["Rabi"], 10.0, 25.0, 20.0, 100.0),
            ("Maize", &["Kharif", "Rabi"], 18.0, 32.0, 25.0, 150.0),
            ("Pulses", &["Rabi", "Kharif"], 18.0, 30.0, 20.0, 120.0),
            ("Cotton", &["Kharif"], 21.0, 30.0, 50.0, 150.0),
            ("Groundnut", &["Kharif", "Summer"], 20.0, 30.0, 25.0, 100.0),
            ("Sorghum", &["Kharif", "Rabi", "Summer"], 18.0, 32.0, 10.0, 100.0),
        ];

        for (name, seasons, temp_min, temp_max, rain_min, rain_max) in defaults {
            let rule = ActiveModel {
                name: Set(ToString::to_string(name)),
                seasons_csv: Set(seasons.join(",")),
                temp_min: Set(*temp_min),
                temp_max: Set(*temp_max),
                rain_min: Set(*rain_min),
                rain_max: Set(*rain_max),
                active: Set(true),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            rule.insert(db).await?;
        }

        Ok(())
    }
}
