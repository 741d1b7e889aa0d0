use crate::graph::ScheduleDag;
use petgraph::graph::NodeIndex;

/// Late start/finish in days from project start, indexed by node.
pub struct BackwardPass<'a> {
    dag: &'a ScheduleDag,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag) -> Self {
        Self { dag }
    }

    /// Walks `order` in reverse. Sinks finish at `project_finish`.
    pub fn execute(&self, order: &[NodeIndex], project_finish: i64) -> Vec<(i64, i64)> {
        let mut late: Vec<(i64, i64)> = vec![(project_finish, project_finish); self.dag.len()];

        for &node in order.iter().rev() {
            // Late finish is the earliest late start among successors
            let late_finish = self
                .dag
                .successors(node)
                .map(|succ| late[succ.index()].0)
                .min()
                .unwrap_or(project_finish);
            let late_start = late_finish - self.dag.durations[node.index()];
            late[node.index()] = (late_start, late_finish);
        }

        late
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::forward_pass::ForwardPass;
    use crate::config::MissingDependencyPolicy;
    use crate::task::Task;
    use chrono::NaiveDate;

    #[test]
    fn backward_pass_sets_late_dates_and_float() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        // Graph: 1 -> {2,3} -> 4 with durations 2,3,1,2
        let tasks = vec![
            Task::new("1", "T1", start, 2),
            Task::new("2", "T2", start, 3).depends_on("1"),
            Task::new("3", "T3", start, 1).depends_on("1"),
            Task::new("4", "T4", start, 2).depends_on("2").depends_on("3"),
        ];
        let dag = ScheduleDag::build(&tasks, MissingDependencyPolicy::Ignore).unwrap();
        let order = dag.topological_order(&tasks).unwrap();
        let early = ForwardPass::new(&dag).execute(&order);
        let finish = early.iter().map(|(_, ef)| *ef).max().unwrap();
        let late = BackwardPass::new(&dag).execute(&order, finish);

        assert_eq!(late, vec![(0, 2), (2, 5), (4, 5), (5, 7)]);
        // T3 has two days of slack
        assert_eq!(late[2].0 - early[2].0, 2);
    }
}
