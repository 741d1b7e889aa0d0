use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{MAX_DURATION_DAYS, Task};
use std::collections::HashSet;

pub fn validate_task(task: &Task) -> ScheduleResult<()> {
    if task.id.trim().is_empty() {
        return Err(ScheduleError::InvalidTask(format!(
            "task '{}' requires a non-empty id",
            task.name
        )));
    }

    if task.duration_days < 0 {
        return Err(ScheduleError::InvalidTask(format!(
            "task {} has negative duration {}",
            task.id, task.duration_days
        )));
    }

    if task.duration_days > MAX_DURATION_DAYS {
        return Err(ScheduleError::InvalidTask(format!(
            "task {} duration {} exceeds {MAX_DURATION_DAYS} days",
            task.id, task.duration_days
        )));
    }

    if !task.end_date_is_consistent() {
        return Err(ScheduleError::InvalidTask(format!(
            "task {} ends {} but starts {} with duration {}",
            task.id, task.end_date, task.start_date, task.duration_days
        )));
    }

    for dependency in &task.dependencies {
        if dependency.trim().is_empty() {
            return Err(ScheduleError::InvalidTask(format!(
                "task {} lists an empty dependency id",
                task.id
            )));
        }
    }

    if let Some(resource) = &task.resource_id {
        if resource.trim().is_empty() {
            return Err(ScheduleError::InvalidTask(format!(
                "task {} has a blank resource id",
                task.id
            )));
        }
    }

    Ok(())
}

/// Checks every task and rejects duplicate ids.
pub fn validate_tasks(tasks: &[Task]) -> ScheduleResult<()> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(ScheduleError::InvalidTask(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        validate_task(task)?;
    }
    Ok(())
}
