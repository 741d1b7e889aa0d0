//! JSON snapshots of projects and the flat CSV task table consumed by the
//! Gantt/PDF export layer.

use crate::config::MissingDependencyPolicy;
use crate::error::ScheduleError;
use crate::project::Project;
use crate::task::Task;
use crate::task_validation;
use crate::template::{ProjectTemplate, TemplateCatalog};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> ExportResult<()> {
    task_validation::validate_tasks(&project.tasks)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, project)?;
    Ok(())
}

/// Loads a project and re-derives critical flags and conflicts, so stored
/// derived fields are never trusted. Unknown dependencies are ignored.
pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> ExportResult<Project> {
    load_project_with_policy(path, MissingDependencyPolicy::default())
}

/// Like [`load_project_from_json`], re-deriving under `policy`. The policy
/// is not stored in the snapshot, so callers with a configured policy load
/// through here.
pub fn load_project_with_policy<P: AsRef<Path>>(path: P, policy: MissingDependencyPolicy) -> ExportResult<Project> {
    let file = File::open(path)?;
    let mut project: Project = serde_json::from_reader(BufReader::new(file))?;
    task_validation::validate_tasks(&project.tasks)?;
    project.set_missing_dependency_policy(policy);
    project.refresh()?;
    Ok(project)
}

/// Registers every template in a JSON array file. Returns how many were
/// added.
pub fn load_templates_from_json<P: AsRef<Path>>(catalog: &mut TemplateCatalog, path: P) -> ExportResult<usize> {
    let file = File::open(path)?;
    let templates: Vec<ProjectTemplate> = serde_json::from_reader(BufReader::new(file))?;
    let count = templates.len();
    for template in templates {
        catalog.register(template)?;
    }
    Ok(count)
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    phase: String,
    kind: String,
    start_date: String,
    end_date: String,
    duration_days: i64,
    dependencies: String,
    resource_id: String,
    status: String,
    critical: bool,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            phase: task.phase.clone().unwrap_or_default(),
            kind: task.kind.as_str().to_string(),
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            duration_days: task.duration_days,
            dependencies: task.dependencies.join(";"),
            resource_id: task.resource_id.clone().unwrap_or_default(),
            status: task.status.as_str().to_string(),
            critical: task.is_on_critical_path,
        }
    }
}

pub fn write_tasks_csv<W: Write>(tasks: &[Task], writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> ExportResult<()> {
    task_validation::validate_tasks(tasks)?;
    let file = File::create(path)?;
    write_tasks_csv(tasks, file)
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
