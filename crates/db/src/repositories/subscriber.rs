//! Subscriber registry repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::subscribers;

/// Repository for subscriber identities.
#[derive(Debug, Clone)]
pub struct SubscriberRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriberRepository {
    /// Creates a new subscriber repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Idempotently registers a subscriber.
    ///
    /// Safe under concurrent first-time registration: the insert carries
    /// an ON CONFLICT DO NOTHING, so whichever caller loses the race
    /// simply reads the winner's row.
    pub async fn ensure_exists(&self, subscriber_no: &str) -> Result<subscribers::Model, DbErr> {
        if let Some(existing) = subscribers::Entity::find_by_id(subscriber_no)
            .one(self.db.as_ref())
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now().into();
        let subscriber = subscribers::ActiveModel {
            subscriber_no: Set(subscriber_no.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let insert = subscribers::Entity::insert(subscriber).on_conflict(
            OnConflict::column(subscribers::Column::SubscriberNo)
                .do_nothing()
                .to_owned(),
        );

        match insert.exec(self.db.as_ref()).await {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }

        subscribers::Entity::find_by_id(subscriber_no)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("subscriber {subscriber_no} after upsert"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn subscriber(no: &str) -> subscribers::Model {
        let now = Utc::now().into();
        subscribers::Model {
            subscriber_no: no.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_ensure_exists_returns_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![subscriber("5551234567")]])
            .into_connection();

        let repo = SubscriberRepository::new(Arc::new(db));
        let model = repo.ensure_exists("5551234567").await.unwrap();
        assert_eq!(model.subscriber_no, "5551234567");
    }
}
