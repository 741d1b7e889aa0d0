use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::config::MissingDependencyPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::ScheduleDag;
use crate::task::{Task, add_days};
use crate::task_validation;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// CPM values for one task, in days from project start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTiming {
    pub task_id: String,
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAnalysis {
    /// One entry per task, in input order.
    pub timings: Vec<TaskTiming>,
    /// Task ids in the order the forward pass visited them.
    pub topological_order: Vec<String>,
    pub project_finish: i64,
}

impl ScheduleAnalysis {
    pub fn timing(&self, task_id: &str) -> Option<&TaskTiming> {
        self.timings.iter().find(|t| t.task_id == task_id)
    }

    /// Critical task indices sorted by early start, then input order.
    pub fn critical_indices(&self) -> Vec<usize> {
        let mut critical: Vec<usize> = self
            .timings
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_critical)
            .map(|(idx, _)| idx)
            .collect();
        critical.sort_by_key(|&idx| (self.timings[idx].early_start, idx));
        critical
    }

    pub fn critical_ids(&self) -> Vec<String> {
        self.critical_indices()
            .into_iter()
            .map(|idx| self.timings[idx].task_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    pub tasks: Vec<Task>,
    pub total_duration: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub struct CriticalPathEngine {
    missing_dependencies: MissingDependencyPolicy,
}

impl Default for CriticalPathEngine {
    fn default() -> Self {
        Self::new(MissingDependencyPolicy::default())
    }
}

impl CriticalPathEngine {
    pub fn new(missing_dependencies: MissingDependencyPolicy) -> Self {
        Self {
            missing_dependencies,
        }
    }

    /// Runs validation, Kahn ordering and both passes. A cycle fails the
    /// call before any timing is computed.
    pub fn analyze(&self, tasks: &[Task]) -> ScheduleResult<ScheduleAnalysis> {
        task_validation::validate_tasks(tasks)?;
        let dag = ScheduleDag::build(tasks, self.missing_dependencies)?;
        let order = dag.topological_order(tasks)?;

        let early = ForwardPass::new(&dag).execute(&order);
        let project_finish = early.iter().map(|(_, ef)| *ef).max().unwrap_or(0);
        let late = BackwardPass::new(&dag).execute(&order, project_finish);

        let timings: Vec<TaskTiming> = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let (early_start, early_finish) = early[idx];
                let (late_start, late_finish) = late[idx];
                TaskTiming {
                    task_id: task.id.clone(),
                    early_start,
                    early_finish,
                    late_start,
                    late_finish,
                    total_float: late_start - early_start,
                    is_critical: early_start == late_start && early_finish == late_finish,
                }
            })
            .collect();

        let topological_order = order
            .iter()
            .map(|node| tasks[dag.graph[*node]].id.clone())
            .collect();

        tracing::debug!(
            tasks = tasks.len(),
            project_finish,
            critical = timings.iter().filter(|t| t.is_critical).count(),
            "critical path analysis complete"
        );

        Ok(ScheduleAnalysis {
            timings,
            topological_order,
            project_finish,
        })
    }

    /// Critical path with its date window anchored at today's local date.
    pub fn critical_path(&self, tasks: &[Task]) -> ScheduleResult<CriticalPath> {
        self.critical_path_from(tasks, Local::now().date_naive())
    }

    pub fn critical_path_from(
        &self,
        tasks: &[Task],
        anchor: NaiveDate,
    ) -> ScheduleResult<CriticalPath> {
        let analysis = self.analyze(tasks)?;
        Self::assemble(tasks, &analysis, anchor)
    }

    /// Writes `is_on_critical_path` on every task and returns the analysis.
    pub fn apply_critical_flags(&self, tasks: &mut [Task]) -> ScheduleResult<ScheduleAnalysis> {
        let analysis = self.analyze(tasks)?;
        for (task, timing) in tasks.iter_mut().zip(&analysis.timings) {
            task.is_on_critical_path = timing.is_critical;
        }
        Ok(analysis)
    }

    fn assemble(
        tasks: &[Task],
        analysis: &ScheduleAnalysis,
        anchor: NaiveDate,
    ) -> ScheduleResult<CriticalPath> {
        let end_date = add_days(anchor, analysis.project_finish).ok_or_else(|| {
            ScheduleError::InvalidTask(format!(
                "a {}-day schedule from {anchor} ends past the last representable date",
                analysis.project_finish
            ))
        })?;
        let critical_tasks = analysis
            .critical_indices()
            .into_iter()
            .map(|idx| {
                let mut task = tasks[idx].clone();
                task.is_on_critical_path = true;
                task
            })
            .collect();

        Ok(CriticalPath {
            tasks: critical_tasks,
            total_duration: analysis.project_finish,
            start_date: anchor,
            end_date,
        })
    }
}
