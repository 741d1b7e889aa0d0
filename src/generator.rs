use crate::critical_path::CriticalPathEngine;
use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{Task, TaskKind, add_days};
use crate::template::{ProjectTemplate, TemplateCatalog, resource_for_phase};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Expands catalog templates into concrete task lists.
pub struct TaskGenerator<'a> {
    catalog: &'a TemplateCatalog,
    engine: &'a CriticalPathEngine,
    max_subtask_days: i64,
}

impl<'a> TaskGenerator<'a> {
    pub fn new(catalog: &'a TemplateCatalog, engine: &'a CriticalPathEngine, max_subtask_days: i64) -> Self {
        Self {
            catalog,
            engine,
            max_subtask_days: max_subtask_days.max(1),
        }
    }

    pub fn generate(&self, template_id: &str, project_start: NaiveDate) -> ScheduleResult<Vec<Task>> {
        let template = self.catalog.get(template_id)?;
        self.expand(template, project_start)
    }

    /// Phase tasks followed by their sub-task chains, critical flags set.
    pub fn expand(&self, template: &ProjectTemplate, project_start: NaiveDate) -> ScheduleResult<Vec<Task>> {
        template.validate()?;

        let mut tasks: Vec<Task> = Vec::new();
        // phase name -> (phase task id, phase end date)
        let mut phase_tasks: HashMap<&str, (String, NaiveDate)> = HashMap::new();
        let mut cursor = project_start;

        for phase in template.ordered_phases() {
            let resolved: Vec<&(String, NaiveDate)> = phase
                .dependencies
                .iter()
                .filter_map(|name| phase_tasks.get(name.as_str()))
                .collect();
            if resolved.len() < phase.dependencies.len() {
                tracing::debug!(
                    template = %template.id,
                    phase = %phase.name,
                    "phase dependency not yet created; falling back to cursor"
                );
            }

            let phase_start = resolved.iter().map(|(_, end)| *end).max().unwrap_or(cursor);
            if add_days(phase_start, phase.estimated_duration).is_none() {
                return Err(ScheduleError::InvalidTemplate(format!(
                    "template {} phase '{}' would end past the last representable date",
                    template.id, phase.name
                )));
            }

            let mut phase_task = Task::with_generated_id(&phase.name, phase_start, phase.estimated_duration)
                .with_phase(&phase.name);
            phase_task.kind = TaskKind::Phase;
            for (id, _) in &resolved {
                phase_task.add_dependency(id.clone());
            }

            let subtasks = self.subdivide(&phase_task, &phase.name);
            cursor = phase_task.end_date;
            phase_tasks.insert(phase.name.as_str(), (phase_task.id.clone(), phase_task.end_date));
            tasks.push(phase_task);
            tasks.extend(subtasks);
        }

        self.engine.apply_critical_flags(&mut tasks)?;
        tracing::debug!(template = %template.id, tasks = tasks.len(), "template expanded");
        Ok(tasks)
    }

    /// Splits a phase into chained chunks of at most `max_subtask_days`.
    fn subdivide(&self, phase_task: &Task, phase_name: &str) -> Vec<Task> {
        let resource = resource_for_phase(phase_name);
        let mut subtasks: Vec<Task> = Vec::new();
        let mut remaining = phase_task.duration_days;
        let mut start = phase_task.start_date;

        while remaining > 0 {
            let chunk = remaining.min(self.max_subtask_days);
            let part = subtasks.len() + 1;
            let mut subtask = Task::with_generated_id(format!("{phase_name} - Part {part}"), start, chunk)
                .with_resource(resource)
                .with_phase(phase_name);
            subtask.parent_id = Some(phase_task.id.clone());
            match subtasks.last() {
                Some(previous) => subtask.add_dependency(previous.id.clone()),
                None => subtask.dependencies = phase_task.dependencies.clone(),
            }
            remaining -= chunk;
            start = subtask.end_date;
            subtasks.push(subtask);
        }

        subtasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PhaseTemplate;
    use rstest::rstest;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn single_phase(duration: i64) -> ProjectTemplate {
        ProjectTemplate::new("single", "Single", vec![PhaseTemplate::new("Framing", 1, duration)])
    }

    #[rstest]
    #[case(10, vec![3, 3, 3, 1])]
    #[case(9, vec![3, 3, 3])]
    #[case(2, vec![2])]
    #[case(0, vec![])]
    fn phase_is_split_into_three_day_chunks(#[case] duration: i64, #[case] expected: Vec<i64>) {
        let catalog = TemplateCatalog::empty();
        let engine = CriticalPathEngine::default();
        let generator = TaskGenerator::new(&catalog, &engine, 3);
        let tasks = generator.expand(&single_phase(duration), d(2025, 3, 3)).unwrap();

        let chunks: Vec<i64> = tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Subtask)
            .map(|t| t.duration_days)
            .collect();
        assert_eq!(chunks, expected);
        assert_eq!(chunks.iter().sum::<i64>(), duration);
    }

    #[test]
    fn subtasks_chain_and_use_phase_crew() {
        let catalog = TemplateCatalog::empty();
        let engine = CriticalPathEngine::default();
        let tasks = TaskGenerator::new(&catalog, &engine, 3)
            .expand(&single_phase(7), d(2025, 3, 3))
            .unwrap();
        let phase = &tasks[0];
        let subtasks = &tasks[1..];

        assert_eq!(phase.kind, TaskKind::Phase);
        assert!(phase.resource_id.is_none());
        assert!(subtasks[0].dependencies.is_empty());
        for pair in subtasks.windows(2) {
            assert_eq!(pair[1].dependencies, vec![pair[0].id.clone()]);
            assert_eq!(pair[1].start_date, pair[0].end_date);
        }
        for subtask in subtasks {
            assert_eq!(subtask.resource_id.as_deref(), Some("framing-crew"));
            assert_eq!(subtask.parent_id.as_deref(), Some(phase.id.as_str()));
        }
        assert_eq!(subtasks.last().unwrap().end_date, phase.end_date);
    }

    #[test]
    fn phase_without_resolvable_dependency_starts_at_cursor() {
        let template = ProjectTemplate::new(
            "cursor",
            "Cursor",
            vec![
                PhaseTemplate::new("Design", 1, 4),
                PhaseTemplate::new("Painting", 2, 2).after("Nonexistent"),
            ],
        );
        let catalog = TemplateCatalog::empty();
        let engine = CriticalPathEngine::default();
        let tasks = TaskGenerator::new(&catalog, &engine, 3)
            .expand(&template, d(2025, 3, 3))
            .unwrap();
        let painting = tasks
            .iter()
            .find(|t| t.kind == TaskKind::Phase && t.name == "Painting")
            .unwrap();
        assert_eq!(painting.start_date, d(2025, 3, 7));
        assert!(painting.dependencies.is_empty());
    }

    #[test]
    fn parallel_phases_start_after_shared_predecessor() {
        let catalog = TemplateCatalog::builtin();
        let engine = CriticalPathEngine::default();
        let tasks = TaskGenerator::new(&catalog, &engine, 3)
            .generate("kitchen-remodel", d(2025, 3, 3))
            .unwrap();
        let phase = |name: &str| {
            tasks
                .iter()
                .find(|t| t.kind == TaskKind::Phase && t.name == name)
                .unwrap()
        };
        // Planning 5 days, Demolition 3 days.
        assert_eq!(phase("Plumbing").start_date, d(2025, 3, 11));
        assert_eq!(phase("Electrical").start_date, d(2025, 3, 11));
        assert_eq!(phase("Drywall").start_date, d(2025, 3, 15));
        assert_eq!(phase("Drywall").dependencies.len(), 2);
    }

    #[test]
    fn phase_past_the_calendar_end_is_an_error() {
        let template = ProjectTemplate::new(
            "endless",
            "Endless",
            vec![
                PhaseTemplate::new("Design", 1, 36_000),
                PhaseTemplate::new("Framing", 2, 36_000).after("Design"),
            ],
        );
        let catalog = TemplateCatalog::empty();
        let engine = CriticalPathEngine::default();
        let err = TaskGenerator::new(&catalog, &engine, 3)
            .expand(&template, d(262_000, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTemplate(_)));
    }
}
