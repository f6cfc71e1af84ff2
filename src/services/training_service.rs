use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, OpeningProgressDao, ScheduleUpdate},
    db::entities::opening_progress,
    error::AppError,
    training::{Quality, ReviewState, review},
};

const OPENING_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

static OPENING_ID_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(OPENING_ID_PATTERN).ok());

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub opening_id: String,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_at: DateTime<FixedOffset>,
    pub last_reviewed_at: Option<DateTime<FixedOffset>>,
    pub total_reviews: i32,
}

impl From<opening_progress::Model> for ProgressView {
    fn from(model: opening_progress::Model) -> Self {
        Self {
            opening_id: model.opening_id,
            ease_factor: f64::from(model.ease_permille) / 1000.0,
            interval_days: model.interval_days,
            repetitions: model.repetitions,
            next_review_at: model.next_review_at,
            last_reviewed_at: model.last_reviewed_at,
            total_reviews: model.total_reviews,
        }
    }
}

fn schedule_after(
    state: ReviewState,
    quality: Quality,
    now: DateTime<FixedOffset>,
) -> Result<ScheduleUpdate, AppError> {
    let next = review(state, quality);
    let next_review_at = Duration::try_days(i64::from(next.interval_days))
        .and_then(|interval| now.checked_add_signed(interval))
        .ok_or_else(|| AppError::internal("review interval out of range"))?;
    Ok(ScheduleUpdate {
        ease_permille: next.ease_permille,
        interval_days: next.interval_days,
        repetitions: next.repetitions,
        next_review_at,
        reviewed_at: now,
    })
}

#[derive(Clone)]
pub struct TrainingService {
    progress_dao: OpeningProgressDao,
}

impl TrainingService {
    pub fn new(progress_dao: OpeningProgressDao) -> Self {
        Self { progress_dao }
    }

    /// Grades one recall of `opening_id` and reschedules it. The first
    /// review creates the progress row; `(user_id, opening_id)` is unique, so
    /// a first review that loses an insert race is applied to the winner's row.
    pub async fn record_review(
        &self,
        user_id: &Uuid,
        opening_id: &str,
        quality: u8,
    ) -> Result<ProgressView, AppError> {
        if !OPENING_ID_RE.as_ref().is_some_and(|re| re.is_match(opening_id)) {
            return Err(AppError::field(
                "opening_id",
                "Opening id must be 1-64 letters, digits, '-' or '_'",
            ));
        }
        let quality = Quality::try_from(quality)?;
        let now = Utc::now().fixed_offset();

        if let Some(row) = self.progress_dao.find_for_opening(user_id, opening_id).await? {
            return self.regrade(&row, quality, now).await;
        }

        let schedule = schedule_after(ReviewState::default(), quality, now)?;
        match self
            .progress_dao
            .insert_reviewed(user_id, opening_id, schedule)
            .await
        {
            Ok(row) => Ok(row.into()),
            Err(err) if err.is_unique_violation() => {
                let row = self
                    .progress_dao
                    .find_for_opening(user_id, opening_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::conflict("Review conflicted with another update, retry")
                    })?;
                self.regrade(&row, quality, now).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn regrade(
        &self,
        row: &opening_progress::Model,
        quality: Quality,
        now: DateTime<FixedOffset>,
    ) -> Result<ProgressView, AppError> {
        let state = ReviewState {
            ease_permille: row.ease_permille,
            interval_days: row.interval_days,
            repetitions: row.repetitions,
        };
        let schedule = schedule_after(state, quality, now)?;
        Ok(self.progress_dao.apply_review(row, schedule).await?.into())
    }

    pub async fn due_reviews(&self, user_id: &Uuid) -> Result<Vec<ProgressView>, AppError> {
        let rows = self
            .progress_dao
            .due_for_user(
                user_id,
                Utc::now().fixed_offset(),
                OpeningProgressDao::MAX_PAGE_SIZE,
            )
            .await?;
        Ok(rows.into_iter().map(ProgressView::from).collect())
    }

    pub async fn list_progress(&self, user_id: &Uuid) -> Result<Vec<ProgressView>, AppError> {
        let rows = self
            .progress_dao
            .list_for_user(user_id, OpeningProgressDao::MAX_PAGE_SIZE)
            .await?;
        Ok(rows.into_iter().map(ProgressView::from).collect())
    }
}
