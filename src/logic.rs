/*
Task view-model: filtering, search and ordering logic.
Module was independently written from HTTP / Axum for testing
*/


use std::cmp::Ordering;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use crate::models::{Priority, Task};


// Date bucket selected in the task list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Week,
    Completed,
}

// Transient UI selection passed in on every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub date_filter: DateFilter,
    pub search_title: String,   // case-insensitive substring, "" matches all
    pub search_subject: String, // case-insensitive substring, "" matches all
}

// Counters over the whole task list, not the filtered view
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub nearest_due: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub display: Vec<Task>,
    pub stats: TaskStats,
}

// Compute statistics over all tasks.
//
// Rules:
// - overdue: not done, has due date, due date < today
// - nearest_due: min due date among not done tasks due today or later
pub fn task_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let open_due = || {
        tasks
            .iter()
            .filter(|t| !t.done)
            .filter_map(|t| t.due_date)
    };

    TaskStats {
        total: tasks.len(),
        completed: tasks.iter().filter(|t| t.done).count(),
        overdue: open_due().filter(|d| *d < today).count(),
        nearest_due: open_due().filter(|d| *d >= today).min(),
    }
}

// First and last day (inclusive) of the Sunday-based week containing `today`.
// Clamped to the representable date range at either end.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from_sunday = u64::from(today.weekday().num_days_from_sunday());
    let start = today
        .checked_sub_days(Days::new(from_sunday))
        .unwrap_or(NaiveDate::MIN);
    let end = start
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);
    (start, end)
}

// Whether a task belongs to the selected date bucket
pub fn in_bucket(task: &Task, filter: DateFilter, today: NaiveDate) -> bool {
    match filter {
        DateFilter::All => true,
        DateFilter::Today => task.due_date == Some(today),
        DateFilter::Week => {
            let (start, end) = week_bounds(today);
            task.due_date.is_some_and(|d| start <= d && d <= end)
        }
        DateFilter::Completed => task.done,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Both search fields must match; an empty query always matches
pub fn matches_search(task: &Task, filter: &FilterState) -> bool {
    contains_ci(&task.subject, &filter.search_subject)
        && contains_ci(&task.title, &filter.search_title)
}

// Composite display order:
// 1) High priority before Low
// 2) Dated before undated, earlier date first
// 3) Otherwise equal (stable sort keeps input order)
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    let rank = |p: Priority| match p {
        Priority::High => 0,
        Priority::Low => 1,
    };

    rank(a.priority)
        .cmp(&rank(b.priority))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Build the list shown to the user plus summary statistics.
///
/// Pipeline:
/// - Search filter (subject AND title)
/// - Date bucket filter
/// - Stable sort by `display_order`
pub fn compute_view(tasks: &[Task], filter: &FilterState, today: NaiveDate) -> TaskView {
    let mut display: Vec<Task> = tasks
        .iter()
        .filter(|t| matches_search(t, filter))
        .filter(|t| in_bucket(t, filter.date_filter, today))
        .cloned()
        .collect();

    display.sort_by(display_order);

    TaskView {
        display,
        stats: task_stats(tasks, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stamp() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T09:00:00+03:00").unwrap()
    }

    fn task(title: &str, priority: Priority, due: Option<&str>, done: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            subject: "General".to_string(),
            title: title.to_string(),
            due_date: due.map(date),
            priority,
            notes: None,
            done,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn titles(view: &TaskView) -> Vec<&str> {
        view.display.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn priority_wins_over_date() {
        let tasks = vec![
            task("low", Priority::Low, Some("2024-03-10"), false),
            task("high", Priority::High, Some("2024-03-20"), false),
        ];
        let view = compute_view(&tasks, &FilterState::default(), date("2024-03-01"));
        assert_eq!(titles(&view), ["high", "low"]);
    }

    #[test]
    fn dated_before_undated_and_earlier_first() {
        let tasks = vec![
            task("none", Priority::Low, None, false),
            task("late", Priority::Low, Some("2024-05-01"), false),
            task("early", Priority::Low, Some("2024-04-01"), false),
        ];
        let view = compute_view(&tasks, &FilterState::default(), date("2024-03-01"));
        assert_eq!(titles(&view), ["early", "late", "none"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let tasks = vec![
            task("a", Priority::High, None, false),
            task("b", Priority::Low, Some("2024-03-05"), false),
            task("c", Priority::High, None, false),
            task("d", Priority::Low, Some("2024-03-05"), false),
            task("e", Priority::High, None, true),
        ];
        let view = compute_view(&tasks, &FilterState::default(), date("2024-03-01"));
        assert_eq!(titles(&view), ["a", "c", "e", "b", "d"]);
    }

    #[test]
    fn due_today_is_not_overdue() {
        let tasks = vec![task("t", Priority::Low, Some("2024-03-01"), false)];
        let stats = task_stats(&tasks, date("2024-03-01"));
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.nearest_due, Some(date("2024-03-01")));
    }

    #[test]
    fn past_due_is_overdue_without_nearest() {
        let tasks = vec![task("t", Priority::Low, Some("2024-02-28"), false)];
        let stats = task_stats(&tasks, date("2024-03-01"));
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.nearest_due, None);
    }

    #[test]
    fn stats_ignore_done_tasks_and_filters() {
        let tasks = vec![
            task("done-past", Priority::Low, Some("2024-02-01"), true),
            task("done-soon", Priority::Low, Some("2024-03-02"), true),
            task("open-later", Priority::High, Some("2024-03-09"), false),
            task("open-sooner", Priority::Low, Some("2024-03-04"), false),
            task("undated", Priority::Low, None, false),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Completed,
            search_title: "zzz".to_string(),
            ..FilterState::default()
        };
        let view = compute_view(&tasks, &filter, date("2024-03-01"));

        assert!(view.display.is_empty());
        assert_eq!(
            view.stats,
            TaskStats {
                total: 5,
                completed: 2,
                overdue: 0,
                nearest_due: Some(date("2024-03-04")),
            }
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut math = task("Homework", Priority::Low, None, false);
        math.subject = "Mathematics".to_string();
        let mut history = task("Homework", Priority::Low, None, false);
        history.subject = "History".to_string();

        let filter = FilterState {
            search_subject: "math".to_string(),
            ..FilterState::default()
        };
        let view = compute_view(&[math.clone(), history], &filter, date("2024-03-01"));
        assert_eq!(view.display, vec![math]);
    }

    #[test]
    fn search_requires_both_fields() {
        let mut t = task("Контрольная работа", Priority::Low, None, false);
        t.subject = "Физика".to_string();

        let both = FilterState {
            search_title: "КОНТРОЛЬНАЯ".to_string(),
            search_subject: "физ".to_string(),
            ..FilterState::default()
        };
        assert!(matches_search(&t, &both));

        let wrong_subject = FilterState {
            search_subject: "химия".to_string(),
            ..both
        };
        assert!(!matches_search(&t, &wrong_subject));
    }

    #[test]
    fn week_runs_sunday_through_saturday() {
        // 2024-03-06 is a Wednesday
        let (start, end) = week_bounds(date("2024-03-06"));
        assert_eq!(start, date("2024-03-03"));
        assert_eq!(end, date("2024-03-09"));

        // Sunday is the first day of its own week
        assert_eq!(week_bounds(date("2024-03-03")).0, date("2024-03-03"));
        // Saturday is the last
        assert_eq!(week_bounds(date("2024-03-09")).1, date("2024-03-09"));
    }

    #[test]
    fn week_bounds_clamp_at_calendar_limits() {
        let (start, end) = week_bounds(NaiveDate::MIN);
        assert_eq!(start, NaiveDate::MIN);
        assert!(end >= NaiveDate::MIN && end <= NaiveDate::MIN + chrono::Duration::days(6));

        let (start, end) = week_bounds(NaiveDate::MAX);
        assert!(start <= NaiveDate::MAX);
        assert_eq!(end, NaiveDate::MAX);
    }

    #[test]
    fn week_view_at_calendar_limits_does_not_panic() {
        let tasks = vec![
            task("dated", Priority::Low, Some("2024-03-06"), false),
            task("undated", Priority::High, None, false),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Week,
            ..FilterState::default()
        };
        for today in [NaiveDate::MIN, NaiveDate::MAX] {
            let view = compute_view(&tasks, &filter, today);
            assert!(view.display.is_empty());
            assert_eq!(view.stats.total, 2);
        }
    }

    #[test]
    fn week_filter_includes_sunday_excludes_next_monday() {
        let tasks = vec![
            task("sunday", Priority::Low, Some("2024-03-03"), false),
            task("saturday", Priority::Low, Some("2024-03-09"), false),
            task("next-monday", Priority::Low, Some("2024-03-11"), false),
            task("prev-saturday", Priority::Low, Some("2024-03-02"), false),
            task("undated", Priority::Low, None, false),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Week,
            ..FilterState::default()
        };
        let view = compute_view(&tasks, &filter, date("2024-03-06"));
        assert_eq!(titles(&view), ["sunday", "saturday"]);
    }

    #[test]
    fn today_filter_matches_exact_date() {
        let tasks = vec![
            task("today", Priority::Low, Some("2024-03-01"), true),
            task("tomorrow", Priority::Low, Some("2024-03-02"), false),
            task("undated", Priority::Low, None, false),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Today,
            ..FilterState::default()
        };
        let view = compute_view(&tasks, &filter, date("2024-03-01"));
        assert_eq!(titles(&view), ["today"]);
    }

    #[test]
    fn completed_filter_only_done() {
        let tasks = vec![
            task("open", Priority::High, Some("2024-03-01"), false),
            task("done-undated", Priority::Low, None, true),
            task("done-dated", Priority::Low, Some("2023-01-01"), true),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Completed,
            ..FilterState::default()
        };
        let view = compute_view(&tasks, &filter, date("2024-03-01"));
        assert!(view.display.iter().all(|t| t.done));
        assert_eq!(titles(&view), ["done-dated", "done-undated"]);
    }

    #[test]
    fn all_filter_drops_nothing_but_search() {
        let tasks = vec![
            task("one", Priority::Low, None, true),
            task("two", Priority::High, Some("1999-01-01"), false),
            task("three", Priority::Low, Some("2100-01-01"), false),
        ];
        let view = compute_view(&tasks, &FilterState::default(), date("2024-03-01"));
        assert_eq!(view.display.len(), tasks.len());
        for t in &tasks {
            assert!(view.display.contains(t));
        }
    }

    #[test]
    fn high_never_follows_low() {
        let tasks = vec![
            task("l1", Priority::Low, Some("2024-01-01"), false),
            task("h1", Priority::High, None, true),
            task("l2", Priority::Low, None, false),
            task("h2", Priority::High, Some("2030-01-01"), false),
        ];
        let view = compute_view(&tasks, &FilterState::default(), date("2024-03-01"));
        for pair in view.display.windows(2) {
            assert!(!(pair[0].priority == Priority::Low && pair[1].priority == Priority::High));
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tasks = vec![
            task("x", Priority::Low, Some("2024-03-04"), false),
            task("y", Priority::High, None, false),
        ];
        let filter = FilterState {
            date_filter: DateFilter::Week,
            ..FilterState::default()
        };
        let first = compute_view(&tasks, &filter, date("2024-03-06"));
        let second = compute_view(&tasks, &filter, date("2024-03-06"));
        assert_eq!(first, second);
    }

    #[test]
    fn date_filter_wire_names() {
        let f: DateFilter = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(f, DateFilter::Completed);
        assert_eq!(serde_json::to_string(&DateFilter::Week).unwrap(), "\"week\"");
    }
}
