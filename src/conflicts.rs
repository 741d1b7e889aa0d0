//! Advisory schedule diagnostics. Detection never fails; an empty list
//! means the schedule is clean.

use crate::graph::ScheduleDag;
use crate::task::Task;
use petgraph::algo::tarjan_scc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    ResourceConflict,
    DependencyCycle,
    MissingDependency,
}

impl ConflictType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConflictType::ResourceConflict => "resource-conflict",
            ConflictType::DependencyCycle => "dependency-cycle",
            ConflictType::MissingDependency => "missing-dependency",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    pub id: String,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub description: String,
    pub affected_tasks: Vec<String>,
    pub severity: Severity,
    pub suggested_resolution: String,
}

impl ScheduleConflict {
    fn new(
        conflict_type: ConflictType,
        severity: Severity,
        affected_tasks: Vec<String>,
        description: String,
        suggested_resolution: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conflict_type,
            description,
            affected_tasks,
            severity,
            suggested_resolution,
        }
    }
}

/// Resource overlaps, dependency cycles and unknown dependency ids, in
/// that order.
pub fn detect_schedule_conflicts(tasks: &[Task]) -> Vec<ScheduleConflict> {
    let mut conflicts = resource_conflicts(tasks);
    let dag = ScheduleDag::build_lenient(tasks);
    conflicts.extend(dependency_cycles(tasks, &dag));
    conflicts.extend(missing_dependencies(tasks, &dag));
    if !conflicts.is_empty() {
        tracing::debug!(count = conflicts.len(), "schedule conflicts detected");
    }
    conflicts
}

/// Interval sweep per resource. Every pair of tasks on the same resource
/// whose date ranges overlap produces one conflict, including overlaps
/// between tasks that are not neighbours after sorting.
pub fn resource_conflicts(tasks: &[Task]) -> Vec<ScheduleConflict> {
    let mut by_resource: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, task) in tasks.iter().enumerate() {
        if let Some(resource) = task.resource_id.as_deref() {
            by_resource.entry(resource).or_default().push(idx);
        }
    }

    let mut conflicts = Vec::new();
    for (resource, mut indices) in by_resource {
        indices.sort_by_key(|&idx| (tasks[idx].start_date, tasks[idx].end_date, idx));

        let mut active: Vec<usize> = Vec::new();
        for idx in indices {
            let later = &tasks[idx];
            active.retain(|&busy| tasks[busy].end_date > later.start_date);
            for &busy in &active {
                let earlier = &tasks[busy];
                conflicts.push(ScheduleConflict::new(
                    ConflictType::ResourceConflict,
                    Severity::High,
                    vec![earlier.id.clone(), later.id.clone()],
                    format!(
                        "{resource} is booked on '{}' ({} to {}) and '{}' ({} to {})",
                        earlier.name,
                        earlier.start_date,
                        earlier.end_date,
                        later.name,
                        later.start_date,
                        later.end_date
                    ),
                    format!(
                        "Move '{}' to start on {} after '{}' finishes",
                        later.name, earlier.end_date, earlier.name
                    ),
                ));
            }
            active.push(idx);
        }
    }
    conflicts
}

/// Strongly connected components of the dependency graph. Every task in a
/// component of two or more tasks, or with a dependency on itself, lies on
/// a cycle and is reported once.
pub fn dependency_cycles(tasks: &[Task], dag: &ScheduleDag) -> Vec<ScheduleConflict> {
    let mut conflicts = Vec::new();
    for component in tarjan_scc(&dag.graph) {
        let cyclic = match component.as_slice() {
            [node] => dag.graph.contains_edge(*node, *node),
            nodes => nodes.len() > 1,
        };
        if !cyclic {
            continue;
        }

        let mut members: Vec<usize> = component.iter().map(|node| dag.graph[*node]).collect();
        members.sort_unstable();
        let ids: Vec<String> = members.iter().map(|&m| tasks[m].id.clone()).collect();
        conflicts.extend(members.iter().map(|&m| cycle_conflict(&tasks[m], &ids)));
    }
    conflicts
}

fn cycle_conflict(task: &Task, cycle_ids: &[String]) -> ScheduleConflict {
    ScheduleConflict::new(
        ConflictType::DependencyCycle,
        Severity::High,
        cycle_ids.to_vec(),
        format!(
            "'{}' is part of a dependency cycle among {}",
            task.name,
            cycle_ids.join(", ")
        ),
        format!("Remove one of the dependencies of '{}' to break the cycle", task.name),
    )
}

pub fn missing_dependencies(tasks: &[Task], dag: &ScheduleDag) -> Vec<ScheduleConflict> {
    dag.missing
        .iter()
        .map(|(idx, dependency_id)| {
            let task = &tasks[*idx];
            ScheduleConflict::new(
                ConflictType::MissingDependency,
                Severity::Medium,
                vec![task.id.clone()],
                format!("'{}' depends on unknown task {dependency_id}", task.name),
                format!("Remove {dependency_id} from the dependencies of '{}'", task.name),
            )
        })
        .collect()
}
