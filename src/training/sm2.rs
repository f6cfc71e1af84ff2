//! SM-2 spaced repetition with the ease factor kept in permille
//! (2500 == 2.5), so every step is exact integer arithmetic.

use crate::error::AppError;

pub const INITIAL_EASE_PERMILLE: i32 = 2500;
pub const MIN_EASE_PERMILLE: i32 = 1300;
/// Longest gap between reviews, about a century.
pub const MAX_INTERVAL_DAYS: i32 = 36_500;
const PASSING_QUALITY: u8 = 3;

/// Self-graded recall quality, 0 (blackout) to 5 (perfect).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<u8> for Quality {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 5 {
            Ok(Self(value))
        } else {
            Err(AppError::field("quality", "Quality must be between 0 and 5"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewState {
    pub ease_permille: i32,
    pub interval_days: i32,
    pub repetitions: i32,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            ease_permille: INITIAL_EASE_PERMILLE,
            interval_days: 0,
            repetitions: 0,
        }
    }
}

/// ef' = ef + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
fn next_ease(ease_permille: i32, quality: Quality) -> i32 {
    let d = 5 - i32::from(quality.value());
    let delta = 100 - d * (80 + d * 20);
    ease_permille.saturating_add(delta).max(MIN_EASE_PERMILLE)
}

pub fn review(state: ReviewState, quality: Quality) -> ReviewState {
    let ease_permille = next_ease(state.ease_permille, quality);

    if !quality.is_passing() {
        return ReviewState {
            ease_permille,
            interval_days: 1,
            repetitions: 0,
        };
    }

    // The interval grows with the ease factor in effect before this review.
    let interval_days = match state.repetitions {
        0 => 1,
        1 => 6,
        _ => {
            let scaled = i64::from(state.interval_days) * i64::from(state.ease_permille) + 500;
            i32::try_from(scaled / 1000).unwrap_or(i32::MAX).max(1)
        }
    }
    .min(MAX_INTERVAL_DAYS);

    ReviewState {
        ease_permille,
        interval_days,
        repetitions: state.repetitions.saturating_add(1),
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_INTERVAL_DAYS, MIN_EASE_PERMILLE, Quality, ReviewState, review};

    fn q(value: u8) -> Quality {
        Quality::try_from(value).expect("quality should be valid")
    }

    #[test]
    fn quality_above_five_is_rejected() {
        assert!(Quality::try_from(5).is_ok());
        let err = Quality::try_from(6).expect_err("6 is out of range");
        assert_eq!(err.field_errors()[0].field, "quality");
    }

    #[test]
    fn passing_reviews_follow_one_six_then_scaled_intervals() {
        let first = review(ReviewState::default(), q(4));
        assert_eq!(first.interval_days, 1);
        assert_eq!(first.repetitions, 1);
        assert_eq!(first.ease_permille, 2500);

        let second = review(first, q(4));
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.repetitions, 2);

        let third = review(second, q(4));
        assert_eq!(third.interval_days, 15);
        assert_eq!(third.repetitions, 3);
    }

    #[test]
    fn ease_moves_with_quality() {
        let start = ReviewState::default();
        assert_eq!(review(start, q(5)).ease_permille, 2600);
        assert_eq!(review(start, q(4)).ease_permille, 2500);
        assert_eq!(review(start, q(3)).ease_permille, 2360);
        assert_eq!(review(start, q(0)).ease_permille, 1700);
    }

    #[test]
    fn failed_review_resets_progress() {
        let learned = ReviewState {
            ease_permille: 2500,
            interval_days: 40,
            repetitions: 6,
        };

        let after = review(learned, q(2));
        assert_eq!(after.repetitions, 0);
        assert_eq!(after.interval_days, 1);
        assert_eq!(after.ease_permille, 2180);
    }

    #[test]
    fn ease_never_drops_below_floor() {
        let mut state = ReviewState::default();
        for _ in 0..10 {
            state = review(state, q(0));
        }
        assert_eq!(state.ease_permille, MIN_EASE_PERMILLE);
    }

    #[test]
    fn long_perfect_streak_is_capped() {
        let mut state = ReviewState::default();
        for _ in 0..30 {
            state = review(state, q(5));
            assert!(state.interval_days <= MAX_INTERVAL_DAYS, "{state:?}");
        }
        assert_eq!(state.interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(state.repetitions, 30);
    }

    #[test]
    fn stored_interval_beyond_cap_is_pulled_back() {
        let runaway = ReviewState {
            ease_permille: 4000,
            interval_days: 30_216_170,
            repetitions: 15,
        };
        assert_eq!(review(runaway, q(5)).interval_days, MAX_INTERVAL_DAYS);
    }
}
