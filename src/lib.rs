pub mod calculations;
pub mod config;
pub mod conflicts;
pub mod critical_path;
pub mod error;
pub mod export;
pub mod generator;
pub mod graph;
pub mod planner;
pub mod progress;
pub mod project;
pub mod task;
pub(crate) mod task_validation;
pub mod template;

pub use config::{MissingDependencyPolicy, PlannerConfig, SchedulingConfig};
pub use conflicts::{ConflictType, ScheduleConflict, Severity, detect_schedule_conflicts};
pub use critical_path::{CriticalPath, CriticalPathEngine, ScheduleAnalysis, TaskTiming};
pub use error::{ConfigError, ScheduleError, ScheduleResult};
pub use export::{
    ExportError, load_project_from_json, load_project_with_policy, load_templates_from_json,
    save_project_to_json, save_tasks_to_csv, write_tasks_csv,
};
pub use generator::TaskGenerator;
pub use planner::{
    SchedulePlanner, calculate_critical_path, create_sample_project, generate_tasks_from_template,
};
pub use progress::{StatusCounts, calculate_project_progress, status_counts};
pub use project::{Project, RefreshSummary};
pub use task::{Task, TaskKind, TaskStatus};
pub use task_validation::{validate_task, validate_tasks};
pub use template::{PhaseTemplate, ProjectTemplate, TemplateCatalog, resource_for_phase};
