use crate::graph::ScheduleDag;
use petgraph::graph::NodeIndex;

/// Early start/finish in days from project start, indexed by node.
pub struct ForwardPass<'a> {
    dag: &'a ScheduleDag,
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag) -> Self {
        Self { dag }
    }

    /// `order` must be a topological order of the whole graph.
    pub fn execute(&self, order: &[NodeIndex]) -> Vec<(i64, i64)> {
        let mut early: Vec<(i64, i64)> = vec![(0, 0); self.dag.len()];

        for &node in order {
            // Early start is max of all predecessor finishes
            let early_start = self
                .dag
                .predecessors(node)
                .map(|pred| early[pred.index()].1)
                .max()
                .unwrap_or(0);
            let early_finish = early_start + self.dag.durations[node.index()];
            early[node.index()] = (early_start, early_finish);
        }

        early
    }
}
