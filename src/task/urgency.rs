//! Urgency scoring.
//!
//! The approach (and the coefficients) follow the Taskwarrior urgency
//! model: independent terms for the due, scheduled and start dates plus a
//! priority term, summed. Absent dates contribute zero. The score is pure:
//! it depends only on the task's fields and the injected `today`.

use chrono::NaiveDate;

use super::{Priority, Task};

const DUE_COEFFICIENT: f64 = 12.0;
const SCHEDULED_COEFFICIENT: f64 = 5.0;
const STARTED_COEFFICIENT: f64 = -3.0;
const PRIORITY_COEFFICIENT: f64 = 6.0;

/// Per-level priority multipliers, strictly decreasing from Highest to
/// Lowest. `None` sits between Medium and Low: an unmarked task outranks an
/// explicitly deprioritized one.
fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::Highest => 1.5,
        Priority::High => 1.0,
        Priority::Medium => 0.65,
        Priority::None => 0.325,
        Priority::Low => 0.0,
        Priority::Lowest => -0.3,
    }
}

/// Compute the urgency score of a task relative to `today`.
///
/// The due-date term maps a 21-day window onto a 0.2–1.0 multiplier: 0.2
/// when the due date is 14 or more days away, rising linearly to 1.0 at
/// seven days overdue and capped there.
pub fn calculate(task: &Task, today: NaiveDate) -> f64 {
    let mut urgency = 0.0;

    if let Some(due) = task.due_date() {
        let days_overdue = today.signed_duration_since(due).num_days();

        let due_multiplier = if days_overdue >= 7 {
            1.0
        } else if days_overdue >= -14 {
            ((days_overdue as f64 + 14.0) * 0.8) / 21.0 + 0.2
        } else {
            0.2
        };

        urgency += due_multiplier * DUE_COEFFICIENT;
    }

    if let Some(scheduled) = task.scheduled_date() {
        if today >= scheduled {
            urgency += SCHEDULED_COEFFICIENT;
        }
    }

    if let Some(start) = task.start_date() {
        if today < start {
            urgency += STARTED_COEFFICIENT;
        }
    }

    urgency += priority_multiplier(task.priority()) * PRIORITY_COEFFICIENT;

    urgency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TaskBuilder;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_no_dates_no_priority() {
        let task = TaskBuilder::new("plain").build();
        // Only the None-priority term applies.
        assert_close(calculate(&task, date(2024, 1, 10)), 0.325 * 6.0);
    }

    #[test]
    fn test_eight_days_overdue_medium_priority() {
        // Worked example: due term 12.0, priority term 3.9, total 15.9.
        let task = TaskBuilder::new("late")
            .due(date(2024, 1, 2))
            .priority(Priority::Medium)
            .build();
        assert_close(calculate(&task, date(2024, 1, 10)), 15.9);
    }

    #[test]
    fn test_due_today() {
        let task = TaskBuilder::new("due now").due(date(2024, 1, 10)).build();
        let expected = ((14.0 * 0.8) / 21.0 + 0.2) * 12.0 + 0.325 * 6.0;
        assert_close(calculate(&task, date(2024, 1, 10)), expected);
    }

    #[test]
    fn test_due_far_future_floors_at_point_two() {
        let task = TaskBuilder::new("later").due(date(2024, 3, 1)).build();
        assert_close(calculate(&task, date(2024, 1, 10)), 0.2 * 12.0 + 0.325 * 6.0);
    }

    #[test]
    fn test_scheduled_today_or_earlier_adds_five() {
        let today = date(2024, 1, 10);
        let scheduled_today = TaskBuilder::new("s").scheduled(today).build();
        let scheduled_future = TaskBuilder::new("s").scheduled(date(2024, 1, 11)).build();
        let diff = calculate(&scheduled_today, today) - calculate(&scheduled_future, today);
        assert_close(diff, 5.0);
    }

    #[test]
    fn test_future_start_subtracts_three() {
        let today = date(2024, 1, 10);
        let not_startable = TaskBuilder::new("s").start(date(2024, 1, 15)).build();
        let startable = TaskBuilder::new("s").start(today).build();
        let diff = calculate(&startable, today) - calculate(&not_startable, today);
        assert_close(diff, 3.0);
    }

    #[test]
    fn test_priority_scores_strictly_decreasing() {
        let today = date(2024, 1, 10);
        let scores: Vec<f64> = Priority::ALL
            .iter()
            .map(|&p| calculate(&TaskBuilder::new("p").priority(p).build(), today))
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "priority scores must strictly decrease");
        }
    }

    #[test]
    fn test_urgency_monotonic_in_due_date() {
        // Within the -14..+inf window, an earlier due date never scores
        // lower than a later one.
        let today = date(2024, 1, 10);
        let mut previous = f64::INFINITY;
        for offset in -3..20 {
            let due = today + chrono::Days::new((offset + 3) as u64);
            let task = TaskBuilder::new("d").due(due).build();
            let score = calculate(&task, today);
            assert!(score <= previous + 1e-9);
            previous = score;
        }
    }
}
