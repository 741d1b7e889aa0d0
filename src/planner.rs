use crate::config::PlannerConfig;
use crate::conflicts::{self, ScheduleConflict};
use crate::critical_path::{CriticalPath, CriticalPathEngine, ScheduleAnalysis};
use crate::error::ScheduleResult;
use crate::generator::TaskGenerator;
use crate::progress;
use crate::project::Project;
use crate::task::Task;
use crate::template::TemplateCatalog;
use chrono::NaiveDate;

/// Scheduling operations bound to a template catalog and configuration.
pub struct SchedulePlanner {
    catalog: TemplateCatalog,
    config: PlannerConfig,
    engine: CriticalPathEngine,
}

impl Default for SchedulePlanner {
    fn default() -> Self {
        Self::new(TemplateCatalog::builtin(), PlannerConfig::default())
    }
}

impl SchedulePlanner {
    pub fn new(catalog: TemplateCatalog, config: PlannerConfig) -> Self {
        let engine = CriticalPathEngine::new(config.scheduling.missing_dependencies);
        Self {
            catalog,
            config,
            engine,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn generate_tasks(&self, template_id: &str, start_date: NaiveDate) -> ScheduleResult<Vec<Task>> {
        TaskGenerator::new(&self.catalog, &self.engine, self.config.scheduling.max_subtask_days)
            .generate(template_id, start_date)
    }

    pub fn analyze(&self, tasks: &[Task]) -> ScheduleResult<ScheduleAnalysis> {
        self.engine.analyze(tasks)
    }

    pub fn critical_path(&self, tasks: &[Task]) -> ScheduleResult<CriticalPath> {
        self.engine.critical_path(tasks)
    }

    pub fn critical_path_from(&self, tasks: &[Task], anchor: NaiveDate) -> ScheduleResult<CriticalPath> {
        self.engine.critical_path_from(tasks, anchor)
    }

    pub fn detect_conflicts(&self, tasks: &[Task]) -> Vec<ScheduleConflict> {
        conflicts::detect_schedule_conflicts(tasks)
    }

    pub fn progress(&self, tasks: &[Task]) -> u8 {
        progress::calculate_project_progress(tasks)
    }

    pub fn create_project(
        &self,
        template_id: &str,
        project_name: &str,
        start_date: NaiveDate,
    ) -> ScheduleResult<Project> {
        let tasks = self.generate_tasks(template_id, start_date)?;
        Project::assemble(
            project_name.to_string(),
            Some(template_id.to_string()),
            start_date,
            tasks,
            self.config.scheduling.missing_dependencies,
        )
    }
}

/// Expands a built-in template with default settings.
pub fn generate_tasks_from_template(template_id: &str, start_date: NaiveDate) -> ScheduleResult<Vec<Task>> {
    SchedulePlanner::default().generate_tasks(template_id, start_date)
}

/// Critical path of `tasks`, with its window anchored at today's date.
pub fn calculate_critical_path(tasks: &[Task]) -> ScheduleResult<CriticalPath> {
    CriticalPathEngine::default().critical_path(tasks)
}

pub fn create_sample_project(
    template_id: &str,
    project_name: &str,
    start_date: NaiveDate,
) -> ScheduleResult<Project> {
    SchedulePlanner::default().create_project(template_id, project_name, start_date)
}
