use chrono::Utc;
use model::entities::place_cache;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::weather::Geocoder;

/// Resolves a free-text place name to cached coordinates.
///
/// An exact display-name hit bumps the popularity counter and returns the
/// cached row; the increment is best-effort read-modify-write, so
/// concurrent hits on the same place may lose counts. On a miss the name
/// is geocoded (country bias applied, up to 5 candidates) and the result
/// cached under its canonical display name.
pub async fn resolve_place<G: Geocoder + ?Sized>(
    db: &DatabaseConnection,
    geocoder: &G,
    place: &str,
) -> Result<place_cache::Model, ApiError> {
    if let Some(cached) = place_cache::Entity::find()
        .filter(place_cache::Column::DisplayName.eq(place))
        .one(db)
        .await?
    {
        let hit_count = cached.hit_count + 1;
        debug!(place, hit_count, "place cache hit");
        let mut row: place_cache::ActiveModel = cached.into();
        row.hit_count = Set(hit_count);
        return Ok(row.update(db).await?);
    }

    info!(place, "place cache miss, geocoding upstream");
    let candidates = geocoder.geocode(place, 5).await?;
    if candidates.is_empty() {
        return Err(ApiError::NotFound("Place not found".to_string()));
    }

    // Prefer the candidate whose name matches the part of the input
    // before the first comma; otherwise take the upstream's first.
    let needle = place
        .split(',')
        .next()
        .unwrap_or(place)
        .trim()
        .to_lowercase();
    let best = candidates
        .iter()
        .find(|candidate| candidate.name.trim().to_lowercase() == needle)
        .unwrap_or(&candidates[0]);

    let row = place_cache::ActiveModel {
        display_name: Set(best.display_name()),
        latitude: Set(best.lat),
        longitude: Set(best.lon),
        hit_count: Set(1),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(row.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::GeoPlace;
    use async_trait::async_trait;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{Database, DbBackend, Schema, Statement};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Geocoder returning a fixed candidate list and counting calls.
    struct ScriptedGeocoder {
        results: Vec<GeoPlace>,
        calls: AtomicUsize,
    }

    impl ScriptedGeocoder {
        fn new(results: Vec<GeoPlace>) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn geocode(&self, _query: &str, _limit: usize) -> Result<Vec<GeoPlace>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    fn candidate(name: &str, state: Option<&str>, lat: f64, lon: f64) -> GeoPlace {
        GeoPlace {
            name: name.to_string(),
            state: state.map(str::to_string),
            country: Some("IN".to_string()),
            lat,
            lon,
        }
    }

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        let schema = Schema::new(DbBackend::Sqlite);
        let stmt = schema.create_table_from_entity(place_cache::Entity);
        let statement =
            Statement::from_string(DbBackend::Sqlite, stmt.to_string(SqliteQueryBuilder));
        db.execute(statement).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_miss_geocodes_and_caches_with_one_hit() {
        let db = setup_test_db().await;
        let geocoder =
            ScriptedGeocoder::new(vec![candidate("Guntur", Some("Andhra Pradesh"), 16.3, 80.44)]);

        let place = resolve_place(&db, &geocoder, "Guntur").await.unwrap();
        assert_eq!(place.display_name, "Guntur, Andhra Pradesh, IN");
        assert_eq!(place.hit_count, 1);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hit_increments_counter_without_upstream_call() {
        let db = setup_test_db().await;
        let geocoder =
            ScriptedGeocoder::new(vec![candidate("Guntur", Some("Andhra Pradesh"), 16.3, 80.44)]);

        let first = resolve_place(&db, &geocoder, "Guntur").await.unwrap();
        assert_eq!(first.hit_count, 1);
        assert_eq!(geocoder.call_count(), 1);

        // Looking up the cached display name exactly must not touch the
        // upstream again.
        let second = resolve_place(&db, &geocoder, "Guntur, Andhra Pradesh, IN")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.hit_count, 2);
        assert_eq!(geocoder.call_count(), 1);

        let third = resolve_place(&db, &geocoder, "Guntur, Andhra Pradesh, IN")
            .await
            .unwrap();
        assert_eq!(third.hit_count, 3);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let db = setup_test_db().await;
        let geocoder = ScriptedGeocoder::new(vec![]);

        let err = resolve_place(&db, &geocoder, "Atlantis").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_exact_first_segment_match_is_preferred() {
        let db = setup_test_db().await;
        let geocoder = ScriptedGeocoder::new(vec![
            candidate("Gunturu", Some("Telangana"), 17.0, 79.0),
            candidate("Guntur", Some("Andhra Pradesh"), 16.3, 80.44),
        ]);

        // The first candidate does not match "guntur" exactly; the second
        // does and wins despite its position.
        let place = resolve_place(&db, &geocoder, "guntur, AP").await.unwrap();
        assert_eq!(place.display_name, "Guntur, Andhra Pradesh, IN");
    }

    #[tokio::test]
    async fn test_falls_back_to_first_candidate() {
        let db = setup_test_db().await;
        let geocoder = ScriptedGeocoder::new(vec![
            candidate("Vijayawada", Some("Andhra Pradesh"), 16.5, 80.6),
            candidate("Vijayapura", Some("Karnataka"), 16.8, 75.7),
        ]);

        let place = resolve_place(&db, &geocoder, "Bezawada").await.unwrap();
        assert_eq!(place.display_name, "Vijayawada, Andhra Pradesh, IN");
        assert_eq!(place.latitude, 16.5);
    }
}
