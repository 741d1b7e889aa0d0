use thiserror::Error;

/// Errors raised while building or analyzing a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The dependency graph contains a cycle. `task_id` lies on the cycle and
    /// `cycle` lists its members in dependency order.
    #[error("circular dependency detected at task {task_id} ({})", .cycle.join(" -> "))]
    CircularDependency { task_id: String, cycle: Vec<String> },

    #[error("unknown template type '{0}'")]
    UnknownTemplate(String),

    #[error("task {task_id} depends on unknown task {dependency_id}")]
    MissingDependency {
        task_id: String,
        dependency_id: String,
    },

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("task {0} not found")]
    TaskNotFound(String),
}

/// Errors raised while loading planner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
