use crate::error::{ScheduleError, ScheduleResult};
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest duration a task or template phase may declare (about a century).
pub const MAX_DURATION_DAYS: i64 = 36_600;

/// `start + days`, or `None` when the result leaves chrono's date range.
pub fn add_days(start: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|delta| start.checked_add_signed(delta))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not-started",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "not-started" => Ok(TaskStatus::NotStarted),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Phase tasks summarize a template phase; sub-tasks carry the crew work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Phase,
    #[default]
    Subtask,
}

impl TaskKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Phase => "phase",
            TaskKind::Subtask => "subtask",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Written by the critical path engine; never set by hand.
    #[serde(default)]
    pub is_on_critical_path: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default)]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        duration_days: i64,
    ) -> Self {
        // An unrepresentable end is left at the start date so validation
        // rejects the task instead of panicking here.
        Self {
            id: id.into(),
            name: name.into(),
            duration_days,
            start_date,
            end_date: add_days(start_date, duration_days).unwrap_or(start_date),
            dependencies: Vec::new(),
            resource_id: None,
            status: TaskStatus::NotStarted,
            is_on_critical_path: false,
            phase: None,
            kind: TaskKind::Subtask,
            parent_id: None,
        }
    }

    /// Creates a task with a fresh UUID v4 identifier.
    pub fn with_generated_id(
        name: impl Into<String>,
        start_date: NaiveDate,
        duration_days: i64,
    ) -> Self {
        Self::new(Uuid::new_v4().to_string(), name, start_date, duration_days)
    }

    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.add_dependency(id);
        self
    }

    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn add_dependency(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.dependencies.contains(&id) {
            self.dependencies.push(id);
        }
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) -> ScheduleResult<()> {
        self.end_date = self.end_after(start_date, self.duration_days)?;
        self.start_date = start_date;
        Ok(())
    }

    pub fn set_duration(&mut self, duration_days: i64) -> ScheduleResult<()> {
        self.end_date = self.end_after(self.start_date, duration_days)?;
        self.duration_days = duration_days;
        Ok(())
    }

    /// Moves the task by `days` (negative values move it earlier). The task
    /// is left untouched when the new dates are out of range.
    pub fn shift_days(&mut self, days: i64) -> ScheduleResult<()> {
        let start_date = add_days(self.start_date, days).ok_or_else(|| {
            ScheduleError::InvalidTask(format!(
                "task {} cannot move {days} days from {}",
                self.id, self.start_date
            ))
        })?;
        self.set_start_date(start_date)
    }

    pub fn end_date_is_consistent(&self) -> bool {
        add_days(self.start_date, self.duration_days) == Some(self.end_date)
    }

    fn end_after(&self, start_date: NaiveDate, duration_days: i64) -> ScheduleResult<NaiveDate> {
        add_days(start_date, duration_days).ok_or_else(|| {
            ScheduleError::InvalidTask(format!(
                "task {} cannot last {duration_days} days from {start_date}",
                self.id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_date_follows_start_and_duration() {
        let mut task = Task::new("t1", "Pour footings", d(2025, 3, 3), 4);
        assert_eq!(task.end_date, d(2025, 3, 7));

        task.set_duration(6).unwrap();
        assert_eq!(task.end_date, d(2025, 3, 9));

        task.shift_days(-2).unwrap();
        assert_eq!(task.start_date, d(2025, 3, 1));
        assert_eq!(task.end_date, d(2025, 3, 7));
        assert!(task.end_date_is_consistent());
    }

    #[test]
    fn out_of_range_edits_leave_task_unchanged() {
        let mut task = Task::new("t1", "Pour footings", d(2025, 3, 3), 4);
        let before = task.clone();
        assert!(matches!(task.set_duration(200_000_000), Err(ScheduleError::InvalidTask(_))));
        assert!(matches!(task.shift_days(i64::MAX), Err(ScheduleError::InvalidTask(_))));
        assert_eq!(task, before);
    }

    #[test]
    fn unrepresentable_end_is_inconsistent() {
        let task = Task::new("t1", "Forever", d(2025, 3, 3), 9_000_000_000_000_000);
        assert_eq!(task.end_date, task.start_date);
        assert!(!task.end_date_is_consistent());
    }

    #[test]
    fn add_dependency_skips_duplicates() {
        let task = Task::new("b", "B", d(2025, 1, 1), 1)
            .depends_on("a")
            .depends_on("a");
        assert_eq!(task.dependencies, vec!["a".to_string()]);
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(
            "not_started".parse::<TaskStatus>().unwrap(),
            TaskStatus::NotStarted
        );
        assert!("paused".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let task = Task::new("t1", "Frame walls", d(2025, 5, 1), 3).with_resource("framing-crew");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["duration"], 3);
        assert_eq!(value["startDate"], "2025-05-01");
        assert_eq!(value["endDate"], "2025-05-04");
        assert_eq!(value["resourceId"], "framing-crew");
        assert_eq!(value["isOnCriticalPath"], false);
        assert_eq!(value["status"], "not-started");
    }
}
