use sea_orm::{
    ColumnTrait, DatabaseConnection, Order, QueryFilter, Set, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{opening_progress, prelude::OpeningProgress};

#[derive(Clone)]
pub struct OpeningProgressDao {
    db: DatabaseConnection,
}

impl DaoBase for OpeningProgressDao {
    type Entity = OpeningProgress;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Scheduling fields written after a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub ease_permille: i32,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_at: DateTimeWithTimeZone,
    pub reviewed_at: DateTimeWithTimeZone,
}

impl OpeningProgressDao {
    pub async fn find_for_opening(
        &self,
        user_id: &Uuid,
        opening_id: &str,
    ) -> DaoResult<Option<opening_progress::Model>> {
        let (user_id, opening_id) = (*user_id, opening_id.to_string());
        self.find_one(move |query| {
            query
                .filter(opening_progress::Column::UserId.eq(user_id))
                .filter(opening_progress::Column::OpeningId.eq(opening_id))
        })
        .await
    }

    pub async fn insert_reviewed(
        &self,
        user_id: &Uuid,
        opening_id: &str,
        schedule: ScheduleUpdate,
    ) -> DaoResult<opening_progress::Model> {
        let model = opening_progress::ActiveModel {
            user_id: Set(*user_id),
            opening_id: Set(opening_id.to_string()),
            ease_permille: Set(schedule.ease_permille),
            interval_days: Set(schedule.interval_days),
            repetitions: Set(schedule.repetitions),
            next_review_at: Set(schedule.next_review_at),
            last_reviewed_at: Set(Some(schedule.reviewed_at)),
            total_reviews: Set(1),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn apply_review(
        &self,
        existing: &opening_progress::Model,
        schedule: ScheduleUpdate,
    ) -> DaoResult<opening_progress::Model> {
        let total_reviews = existing.total_reviews.saturating_add(1);
        self.update(existing.id, move |active| {
            active.ease_permille = Set(schedule.ease_permille);
            active.interval_days = Set(schedule.interval_days);
            active.repetitions = Set(schedule.repetitions);
            active.next_review_at = Set(schedule.next_review_at);
            active.last_reviewed_at = Set(Some(schedule.reviewed_at));
            active.total_reviews = Set(total_reviews);
        })
        .await
    }

    /// Soonest due first, capped at `limit` rows.
    pub async fn due_for_user(
        &self,
        user_id: &Uuid,
        now: DateTimeWithTimeZone,
        limit: u64,
    ) -> DaoResult<Vec<opening_progress::Model>> {
        let user_id = *user_id;
        self.find(
            1,
            limit,
            Some((opening_progress::Column::NextReviewAt, Order::Asc)),
            move |query| {
                query
                    .filter(opening_progress::Column::UserId.eq(user_id))
                    .filter(opening_progress::Column::NextReviewAt.lte(now))
            },
        )
        .await
        .map(|response| response.data)
    }

    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        limit: u64,
    ) -> DaoResult<Vec<opening_progress::Model>> {
        let user_id = *user_id;
        self.find(
            1,
            limit,
            Some((opening_progress::Column::OpeningId, Order::Asc)),
            move |query| query.filter(opening_progress::Column::UserId.eq(user_id)),
        )
        .await
        .map(|response| response.data)
    }
}
