// Date grouping and ordering of todos for display

use crate::models::Todo;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Todos created on one calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    /// Date plus weekday name, e.g. `Sunday, October 18 2026`
    pub label: String,
    pub todos: Vec<Todo>,
}

impl DateGroup {
    /// Latest creation time in the group
    pub fn latest_created(&self) -> Option<DateTime<Utc>> {
        self.todos.iter().map(|t| t.time_created).max()
    }
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d %Y").to_string()
}

/// Group by creation date in the local timezone
pub fn group_by_date(todos: &[Todo]) -> Vec<DateGroup> {
    group_by_date_in(todos, &Local)
}

/// Group by creation date as seen in `tz`
///
/// Groups are ordered newest date first; inside a group incomplete todos come
/// before completed ones, then most recently modified first. The sort is stable,
/// so ties keep list order.
pub fn group_by_date_in<Tz: TimeZone>(todos: &[Todo], tz: &Tz) -> Vec<DateGroup> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Todo>> = BTreeMap::new();
    for todo in todos {
        let date = todo.time_created.with_timezone(tz).date_naive();
        buckets.entry(date).or_default().push(todo.clone());
    }

    let mut groups: Vec<DateGroup> = buckets
        .into_iter()
        .map(|(date, mut todos)| {
            todos.sort_by(display_order);
            DateGroup {
                date,
                label: date_label(date),
                todos,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.latest_created().cmp(&a.latest_created()));
    groups
}

/// Incomplete first, then most recently modified first
pub fn display_order(a: &Todo, b: &Todo) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.time_modified.cmp(&a.time_modified))
}

/// Todos to show given the "hide completed" preference
pub fn visible(todos: &[Todo], hide_completed: bool) -> Vec<&Todo> {
    todos.iter().filter(|t| !(hide_completed && t.completed)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoType;
    use chrono::{FixedOffset, TimeDelta};

    fn todo(id: &str, created: DateTime<Utc>, modified: DateTime<Utc>, completed: bool) -> Todo {
        Todo {
            id: id.to_string(),
            text: format!("todo {}", id),
            completed,
            time_created: created,
            time_modified: modified,
            target_date: None,
            todo_type: TodoType::Work,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn ids(group: &DateGroup) -> Vec<&str> {
        group.todos.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_incomplete_sorts_before_completed_on_same_day() {
        // Completed one was modified later, still sorts last
        let todos = vec![
            todo("done", at(18, 8), at(18, 20), true),
            todo("open", at(18, 9), at(18, 9), false),
        ];

        let groups = group_by_date_in(&todos, &Utc);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["open", "done"]);
    }

    #[test]
    fn test_most_recently_modified_first() {
        let todos = vec![
            todo("a", at(18, 8), at(18, 8), false),
            todo("b", at(18, 9), at(18, 9), false),
            todo("c", at(18, 7), at(18, 11), false),
        ];

        let groups = group_by_date_in(&todos, &Utc);
        assert_eq!(ids(&groups[0]), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_groups_ordered_newest_date_first() {
        let todos = vec![
            todo("old", at(16, 8), at(16, 8), false),
            todo("new", at(18, 8), at(18, 8), false),
            todo("mid", at(17, 8), at(17, 8), false),
        ];

        let groups = group_by_date_in(&todos, &Utc);
        let dates: Vec<u32> = groups.iter().map(|g| chrono::Datelike::day(&g.date)).collect();
        assert_eq!(dates, vec![18, 17, 16]);
        assert_eq!(groups[0].label, "Sunday, October 18 2026");
    }

    #[test]
    fn test_grouping_uses_given_timezone() {
        // 23:30 UTC on the 17th is already the 18th at UTC+2
        let late = Utc.with_ymd_and_hms(2026, 10, 17, 23, 30, 0).unwrap();
        let todos = vec![todo("a", late, late, false), todo("b", at(18, 6), at(18, 6), false)];

        assert_eq!(group_by_date_in(&todos, &Utc).len(), 2);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let groups = group_by_date_in(&todos, &plus_two);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["b", "a"]);
    }

    #[test]
    fn test_stable_for_identical_keys() {
        let ts = at(18, 8);
        let todos = vec![todo("x", ts, ts, false), todo("y", ts, ts, false)];
        let groups = group_by_date_in(&todos, &Utc);
        assert_eq!(ids(&groups[0]), vec!["x", "y"]);
    }

    #[test]
    fn test_empty_list_has_no_groups() {
        assert!(group_by_date(&[]).is_empty());
    }

    #[test]
    fn test_visible_hides_completed_on_request() {
        let todos = vec![
            todo("open", at(18, 8), at(18, 8), false),
            todo("done", at(18, 8), at(18, 9), true),
        ];
        assert_eq!(visible(&todos, false).len(), 2);

        let shown = visible(&todos, true);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "open");
    }

    #[test]
    fn test_latest_created() {
        let group = DateGroup {
            date: at(18, 0).date_naive(),
            label: String::new(),
            todos: vec![
                todo("a", at(18, 8), at(18, 8), false),
                todo("b", at(18, 9), at(18, 9) + TimeDelta::minutes(1), true),
            ],
        };
        assert_eq!(group.latest_created(), Some(at(18, 9)));
    }
}
