use crate::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};

const COMPLETED_WEIGHT: f64 = 1.0;
const IN_PROGRESS_WEIGHT: f64 = 0.5;

impl TaskStatus {
    /// Share of a task counted as done when rolling up progress.
    pub const fn progress_weight(&self) -> f64 {
        match self {
            TaskStatus::Completed => COMPLETED_WEIGHT,
            TaskStatus::InProgress => IN_PROGRESS_WEIGHT,
            TaskStatus::NotStarted => 0.0,
        }
    }
}

/// Weighted completion percentage, 0 to 100. An empty list is 0.
pub fn calculate_project_progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let weighted: f64 = tasks.iter().map(|t| t.status.progress_weight()).sum();
    let percent = (100.0 * weighted / tasks.len() as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.not_started + self.in_progress + self.completed
    }
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    tasks.iter().fold(StatusCounts::default(), |mut counts, task| {
        match task.status {
            TaskStatus::NotStarted => counts.not_started += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
        }
        counts
    })
}
