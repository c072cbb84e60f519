//! Progress tracking over a user's session history.
//!
//! All calendar arithmetic uses UTC dates of [`SessionRecord::created_at`].

use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::store::SessionRecord;

/// Sessions per week the progress screen aims for unless told otherwise.
pub const DEFAULT_WEEKLY_GOAL: u32 = 5;

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    /// 7-day streak.
    FirstWeek,
    /// 5 sessions started before noon.
    EarlyBird,
    /// 10 sessions aimed at sleep.
    NightOwl,
    /// 50 sessions in total.
    ZenMaster,
}

impl Achievement {
    pub const ALL: [Achievement; 4] = [
        Achievement::FirstWeek,
        Achievement::EarlyBird,
        Achievement::NightOwl,
        Achievement::ZenMaster,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstWeek => "First Week",
            Achievement::EarlyBird => "Early Bird",
            Achievement::NightOwl => "Night Owl",
            Achievement::ZenMaster => "Zen Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstWeek => "7 day streak",
            Achievement::EarlyBird => "5 morning sessions",
            Achievement::NightOwl => "10 sleep sessions",
            Achievement::ZenMaster => "50 total sessions",
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub current_streak: u32,
    /// Sessions since Monday of the current week.
    pub sessions_this_week: u32,
    pub weekly_goal: u32,
    pub morning_sessions: u32,
    pub sleep_sessions: u32,
}

impl ProgressStats {
    pub fn compute(sessions: &[SessionRecord], today: NaiveDate, weekly_goal: u32) -> Self {
        let week_start =
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        let mut stats = Self {
            total_sessions: 0,
            total_minutes: 0,
            current_streak: calculate_streak(
                sessions.iter().map(|s| s.created_at.date_naive()),
                today,
            ),
            sessions_this_week: 0,
            weekly_goal,
            morning_sessions: 0,
            sleep_sessions: 0,
        };

        for s in sessions {
            stats.total_sessions += 1;
            stats.total_minutes += s.duration_seconds / 60;
            let day = s.created_at.date_naive();
            if day >= week_start && day <= today {
                stats.sessions_this_week += 1;
            }
            if s.created_at.hour() < 12 {
                stats.morning_sessions += 1;
            }
            if s.outcome_tags.iter().any(|t| t == "sleep") {
                stats.sleep_sessions += 1;
            }
        }
        stats
    }

    pub fn is_earned(&self, achievement: Achievement) -> bool {
        match achievement {
            Achievement::FirstWeek => self.current_streak >= 7,
            Achievement::EarlyBird => self.morning_sessions >= 5,
            Achievement::NightOwl => self.sleep_sessions >= 10,
            Achievement::ZenMaster => self.total_sessions >= 50,
        }
    }

    pub fn achievements(&self) -> Vec<(Achievement, bool)> {
        Achievement::ALL
            .iter()
            .map(|a| (*a, self.is_earned(*a)))
            .collect()
    }

    /// Weekly goal completion, 0 – 100.
    pub fn weekly_percent(&self) -> f64 {
        if self.weekly_goal == 0 {
            return 100.0;
        }
        (f64::from(self.sessions_this_week) / f64::from(self.weekly_goal) * 100.0).min(100.0)
    }
}

/// Count consecutive meditation days ending today.
///
/// Today may still be empty: a streak that ends yesterday is kept. Several
/// sessions on one day count once.
pub fn calculate_streak(days: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = days.into_iter().filter(|d| *d <= today).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    // The streak ends today, or yesterday when today has no session yet.
    let Some(anchor) = days
        .first()
        .copied()
        .filter(|d| (today - *d).num_days() <= 1)
    else {
        return 0;
    };

    let mut streak: u32 = 0;
    for day in days {
        if (anchor - day).num_days() == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Human-readable length: `"45s"`, `"15m"`, `"2m 5s"`.
pub fn format_duration(seconds: u32) -> String {
    let (m, s) = (seconds / 60, seconds % 60);
    match (m, s) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
