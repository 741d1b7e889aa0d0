use crate::config::MissingDependencyPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::task::Task;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

/// Dependency graph over a task slice. Node `i` is `tasks[i]`; an edge
/// `u -> v` means `v` cannot start before `u` finishes.
pub struct ScheduleDag {
    pub graph: DiGraph<usize, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
    pub durations: Vec<i64>,
    /// `(task index, dependency id)` pairs that resolved to no task.
    pub missing: Vec<(usize, String)>,
}

impl ScheduleDag {
    /// Builds the graph, applying `policy` to unresolved dependency ids.
    pub fn build(tasks: &[Task], policy: MissingDependencyPolicy) -> ScheduleResult<Self> {
        let dag = Self::build_lenient(tasks);
        if let Some((idx, dependency_id)) = dag.missing.first() {
            match policy {
                MissingDependencyPolicy::Reject => {
                    return Err(ScheduleError::MissingDependency {
                        task_id: tasks[*idx].id.clone(),
                        dependency_id: dependency_id.clone(),
                    });
                }
                MissingDependencyPolicy::Ignore => {
                    for (idx, dependency_id) in &dag.missing {
                        tracing::warn!(
                            task = %tasks[*idx].id,
                            dependency = %dependency_id,
                            "ignoring dependency on unknown task"
                        );
                    }
                }
            }
        }
        Ok(dag)
    }

    /// Never fails: unknown dependencies are recorded in `missing` and
    /// duplicate ids resolve to their first occurrence.
    pub fn build_lenient(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut durations = Vec::with_capacity(tasks.len());

        // Add nodes first
        for (idx, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(idx);
            id_to_index.entry(task.id.clone()).or_insert(node_ix);
            durations.push(task.duration_days);
        }

        // Add edges: dependency -> task
        let mut missing = Vec::new();
        for (idx, task) in tasks.iter().enumerate() {
            let mut seen = HashSet::new();
            for dependency_id in &task.dependencies {
                if !seen.insert(dependency_id.as_str()) {
                    continue;
                }
                match id_to_index.get(dependency_id) {
                    Some(&u) => {
                        graph.add_edge(u, NodeIndex::new(idx), ());
                    }
                    None => missing.push((idx, dependency_id.clone())),
                }
            }
        }

        Self {
            graph,
            id_to_index,
            durations,
            missing,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    pub fn successors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    /// Kahn's algorithm. Ties are broken by input order so the result is
    /// stable for a given task list. A cycle yields
    /// `ScheduleError::CircularDependency`.
    pub fn topological_order(&self, tasks: &[Task]) -> ScheduleResult<Vec<NodeIndex>> {
        let node_count = self.graph.node_count();
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.predecessors(node).count())
            .collect();

        let mut ready: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|node| in_degree[node.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(node_count);

        while let Some(node) = ready.pop_front() {
            order.push(node);
            let mut released: Vec<NodeIndex> = Vec::new();
            for succ in self.successors(node) {
                let degree = &mut in_degree[succ.index()];
                *degree -= 1;
                if *degree == 0 {
                    released.push(succ);
                }
            }
            released.sort();
            ready.extend(released);
        }

        if order.len() == node_count {
            return Ok(order);
        }

        let cycle = self.find_cycle(&in_degree);
        let cycle_ids: Vec<String> = cycle
            .iter()
            .map(|node| tasks[self.graph[*node]].id.clone())
            .collect();
        let task_id = cycle_ids.first().cloned().unwrap_or_default();
        tracing::warn!(task = %task_id, cycle = ?cycle_ids, "circular dependency detected");
        Err(ScheduleError::CircularDependency {
            task_id,
            cycle: cycle_ids,
        })
    }

    /// Walks predecessors among the nodes Kahn could not release until one
    /// repeats. Every such node has an unreleased predecessor, so the walk
    /// always closes a loop. The returned path starts and ends on the same
    /// node; each member depends on the next.
    fn find_cycle(&self, remaining_in_degree: &[usize]) -> Vec<NodeIndex> {
        let blocked = |node: &NodeIndex| remaining_in_degree[node.index()] > 0;
        let Some(start) = self.graph.node_indices().find(|node| blocked(node)) else {
            return Vec::new();
        };

        let mut path: Vec<NodeIndex> = Vec::new();
        let mut position: HashMap<NodeIndex, usize> = HashMap::new();
        let mut current = start;
        loop {
            if let Some(&pos) = position.get(&current) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(current);
                return cycle;
            }
            position.insert(current, path.len());
            path.push(current);
            match self.predecessors(current).filter(|p| blocked(p)).min() {
                Some(next) => current = next,
                None => return path,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, duration: i64, deps: &[&str]) -> Task {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut task = Task::new(id, id, start, duration);
        for dep in deps {
            task.add_dependency(*dep);
        }
        task
    }

    #[test]
    fn topological_order_respects_dependencies() {
        let tasks = vec![
            task("d", 1, &["b", "c"]),
            task("b", 1, &["a"]),
            task("c", 1, &["a"]),
            task("a", 1, &[]),
        ];
        let dag = ScheduleDag::build(&tasks, MissingDependencyPolicy::Ignore).unwrap();
        let order: Vec<&str> = dag
            .topological_order(&tasks)
            .unwrap()
            .into_iter()
            .map(|n| tasks[dag.graph[n]].id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn cycle_is_reported_with_members_only() {
        // "z" depends on the cycle but is not part of it.
        let tasks = vec![
            task("z", 1, &["a"]),
            task("a", 1, &["b"]),
            task("b", 1, &["a"]),
        ];
        let dag = ScheduleDag::build_lenient(&tasks);
        match dag.topological_order(&tasks) {
            Err(ScheduleError::CircularDependency { task_id, cycle }) => {
                assert!(task_id == "a" || task_id == "b");
                assert_eq!(cycle.first(), cycle.last());
                assert!(!cycle.contains(&"z".to_string()));
                assert_eq!(cycle.len(), 3);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let tasks = vec![task("a", 2, &["a"])];
        let dag = ScheduleDag::build_lenient(&tasks);
        let err = dag.topological_order(&tasks).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CircularDependency {
                task_id: "a".into(),
                cycle: vec!["a".into(), "a".into()],
            }
        );
    }

    #[test]
    fn missing_dependencies_follow_policy() {
        let tasks = vec![task("a", 1, &["ghost"])];
        let dag = ScheduleDag::build(&tasks, MissingDependencyPolicy::Ignore).unwrap();
        assert_eq!(dag.missing, vec![(0, "ghost".to_string())]);
        assert_eq!(dag.graph.edge_count(), 0);

        let err = ScheduleDag::build(&tasks, MissingDependencyPolicy::Reject)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ScheduleError::MissingDependency {
                task_id: "a".into(),
                dependency_id: "ghost".into(),
            }
        );
    }
}
