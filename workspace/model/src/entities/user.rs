use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter};

/// Represents a registered account.
/// Administrator privilege is decided at creation time and never revoked
/// through the API surface.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub hashed_password: String,
    pub is_admin: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // A user can be attributed on multiple analytics events.
    #[sea_orm(has_many = "super::analytics_event::Entity")]
    AnalyticsEvent,
}

impl Related<super::analytics_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalyticsEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Looks up a user by exact username.
    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{Database, DbBackend, Schema, Set, Statement};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        let schema = Schema::new(DbBackend::Sqlite);
        let stmt = schema.create_table_from_entity(Entity);
        let statement =
            Statement::from_string(DbBackend::Sqlite, stmt.to_string(SqliteQueryBuilder));
        db.execute(statement).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let db = setup_test_db().await;

        let user = ActiveModel {
            username: Set("ravi".to_string()),
            hashed_password: Set("$2b$12$hash".to_string()),
            is_admin: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        user.insert(&db).await.unwrap();

        let found = Model::find_by_username(&db, "ravi").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().username, "ravi");

        let missing = Model::find_by_username(&db, "nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let db = setup_test_db().await;

        let first = ActiveModel {
            username: Set("ravi".to_string()),
            hashed_password: Set("h1".to_string()),
            is_admin: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        first.insert(&db).await.unwrap();

        let duplicate = ActiveModel {
            username: Set("ravi".to_string()),
            hashed_password: Set("h2".to_string()),
            is_admin: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        assert!(duplicate.insert(&db).await.is_err());
    }
}
