use crate::config::MissingDependencyPolicy;
use crate::conflicts::{ScheduleConflict, detect_schedule_conflicts};
use crate::critical_path::{CriticalPath, CriticalPathEngine, ScheduleAnalysis};
use crate::error::{ScheduleError, ScheduleResult};
use crate::progress::calculate_project_progress;
use crate::task::{MAX_DURATION_DAYS, Task, TaskStatus, add_days};
use crate::task_validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<String>,
    pub total_duration: i64,
    pub end_date: NaiveDate,
    pub conflict_count: usize,
    pub progress: u8,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("duration={}d", self.total_duration));
        parts.push(format!("finish={}", self.end_date));
        parts.push(format!("progress={}%", self.progress));
        if self.conflict_count > 0 {
            parts.push(format!("conflicts={}", self.conflict_count));
        }
        parts.join(", ")
    }
}

/// A schedule of tasks. Critical flags, conflicts and the end date are
/// derived and recomputed after every edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub conflicts: Vec<ScheduleConflict>,
    #[serde(skip)]
    missing_dependencies: MissingDependencyPolicy,
}

impl Project {
    /// Builds a project from a hand-made task list. Fails on invalid tasks
    /// or a circular dependency.
    pub fn from_tasks(
        name: impl Into<String>,
        start_date: NaiveDate,
        tasks: Vec<Task>,
    ) -> ScheduleResult<Self> {
        Self::assemble(name.into(), None, start_date, tasks, MissingDependencyPolicy::default())
    }

    pub(crate) fn assemble(
        name: String,
        template: Option<String>,
        start_date: NaiveDate,
        tasks: Vec<Task>,
        missing_dependencies: MissingDependencyPolicy,
    ) -> ScheduleResult<Self> {
        task_validation::validate_tasks(&tasks)?;
        let mut project = Self {
            id: Uuid::new_v4().to_string(),
            name,
            template,
            start_date,
            end_date: start_date,
            tasks,
            created_at: Utc::now(),
            conflicts: Vec::new(),
            missing_dependencies,
        };
        project.refresh()?;
        tracing::info!(
            project = %project.id,
            name = %project.name,
            tasks = project.tasks.len(),
            "project created"
        );
        Ok(project)
    }

    pub fn missing_dependency_policy(&self) -> MissingDependencyPolicy {
        self.missing_dependencies
    }

    pub fn set_missing_dependency_policy(&mut self, policy: MissingDependencyPolicy) {
        self.missing_dependencies = policy;
    }

    fn engine(&self) -> CriticalPathEngine {
        CriticalPathEngine::new(self.missing_dependencies)
    }

    /// Re-derives critical flags, conflicts and the end date. Conflicts
    /// are refreshed even when the critical path cannot be computed; in
    /// that case every critical flag is cleared and the error returned.
    pub fn refresh(&mut self) -> ScheduleResult<RefreshSummary> {
        self.conflicts = detect_schedule_conflicts(&self.tasks);
        self.end_date = self
            .tasks
            .iter()
            .map(|t| t.end_date)
            .max()
            .unwrap_or(self.start_date);

        let analysis = match self.engine().apply_critical_flags(&mut self.tasks) {
            Ok(analysis) => analysis,
            Err(err) => {
                for task in &mut self.tasks {
                    task.is_on_critical_path = false;
                }
                return Err(err);
            }
        };

        let critical_path = analysis.critical_ids();
        Ok(RefreshSummary {
            task_count: self.tasks.len(),
            critical_count: critical_path.len(),
            critical_path,
            total_duration: analysis.project_finish,
            end_date: self.end_date,
            conflict_count: self.conflicts.len(),
            progress: self.progress(),
        })
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn task_mut(&mut self, task_id: &str) -> ScheduleResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))
    }

    /// Inserts a new task or replaces the one with the same id.
    pub fn upsert_task(&mut self, task: Task) -> ScheduleResult<RefreshSummary> {
        task_validation::validate_task(&task)?;
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.refresh()
    }

    /// Removes a task and strips it from every dependency list. Returns
    /// `Ok(None)` when no task has that id.
    pub fn remove_task(&mut self, task_id: &str) -> ScheduleResult<Option<Task>> {
        let Some(position) = self.tasks.iter().position(|t| t.id == task_id) else {
            return Ok(None);
        };
        let removed = self.tasks.remove(position);
        for task in &mut self.tasks {
            task.dependencies.retain(|dep| dep != task_id);
            if task.parent_id.as_deref() == Some(task_id) {
                task.parent_id = None;
            }
        }
        self.refresh()?; // Recompute schedule after structural change
        Ok(Some(removed))
    }

    pub fn set_task_status(&mut self, task_id: &str, status: TaskStatus) -> ScheduleResult<RefreshSummary> {
        self.task_mut(task_id)?.status = status;
        self.refresh()
    }

    pub fn update_task_duration(&mut self, task_id: &str, duration_days: i64) -> ScheduleResult<RefreshSummary> {
        if !(0..=MAX_DURATION_DAYS).contains(&duration_days) {
            return Err(ScheduleError::InvalidTask(format!(
                "task {task_id} duration {duration_days} is outside 0..={MAX_DURATION_DAYS} days"
            )));
        }
        self.task_mut(task_id)?.set_duration(duration_days)?;
        self.refresh()
    }

    pub fn shift_task(&mut self, task_id: &str, days: i64) -> ScheduleResult<RefreshSummary> {
        self.task_mut(task_id)?.shift_days(days)?;
        self.refresh()
    }

    pub fn set_task_dependencies(
        &mut self,
        task_id: &str,
        dependencies: Vec<String>,
    ) -> ScheduleResult<RefreshSummary> {
        let task = self.task_mut(task_id)?;
        task.dependencies.clear();
        for dependency in dependencies {
            task.add_dependency(dependency);
        }
        self.refresh()
    }

    /// Moves every task to its earliest feasible start relative to the
    /// project start date.
    pub fn reschedule(&mut self) -> ScheduleResult<RefreshSummary> {
        let analysis: ScheduleAnalysis = self.engine().analyze(&self.tasks)?;
        let mut rescheduled = self.tasks.clone();
        for (task, timing) in rescheduled.iter_mut().zip(&analysis.timings) {
            let start_date = add_days(self.start_date, timing.early_start).ok_or_else(|| {
                ScheduleError::InvalidTask(format!(
                    "task {} cannot start {} days after {}",
                    task.id, timing.early_start, self.start_date
                ))
            })?;
            task.set_start_date(start_date)?;
        }
        self.tasks = rescheduled;
        self.refresh()
    }

    pub fn critical_path(&self) -> ScheduleResult<CriticalPath> {
        self.engine().critical_path_from(&self.tasks, self.start_date)
    }

    pub fn progress(&self) -> u8 {
        calculate_project_progress(&self.tasks)
    }
}
