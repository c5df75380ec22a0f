//! Plan-to-clause alignment
//!
//! Binds plan operators to clause fragments so the renderer can annotate each
//! stage with a cost. The matching is a greedy heuristic: SQL clause order and
//! physical operator order need not coincide, so a fragment takes the first
//! remaining operator of the corresponding kind wherever it sits in the plan.

use crate::extract::{ClauseFragment, ClauseKind};
use pipeql_analyzer::{Operation, PlanNode};
use std::collections::VecDeque;

/// Plan operators not yet bound to a fragment, in pre-order
#[derive(Debug, Clone)]
pub struct PlanQueue<'p> {
    nodes: VecDeque<&'p PlanNode>,
}

impl<'p> PlanQueue<'p> {
    /// Flattens the tree, parents before their children
    pub fn new(root: &'p PlanNode) -> Self {
        Self {
            nodes: root.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes the operator bound to a clause of `kind`
    ///
    /// Takes the first remaining node that corresponds to the clause kind,
    /// otherwise the first remaining node, otherwise nothing.
    pub fn take_matching(&mut self, kind: &ClauseKind) -> Option<&'p PlanNode> {
        let position = self
            .nodes
            .iter()
            .position(|node| corresponds(kind, node))
            .unwrap_or(0);
        self.nodes.remove(position)
    }
}

/// Whether `node` is the operator that implements a clause of `kind`
fn corresponds(kind: &ClauseKind, node: &PlanNode) -> bool {
    match kind {
        ClauseKind::From => node.operation == Operation::Scan,
        ClauseKind::Join(_) => node.operation == Operation::Join,
        ClauseKind::Where => node.filter().is_some(),
        ClauseKind::Aggregate => node.operation == Operation::Aggregate,
        ClauseKind::OrderBy => node.operation == Operation::Sort,
        ClauseKind::Limit => node.operation == Operation::Limit,
        ClauseKind::Select | ClauseKind::Having => false,
    }
}

/// Binds plan operators to the fragments of the outer statement
///
/// Fragments are visited in emission order and each binds at most one node.
/// Fragments spliced in from subqueries are left unbound.
pub fn align<'p>(fragments: Vec<ClauseFragment<'p>>, root: &'p PlanNode) -> Vec<ClauseFragment<'p>> {
    let mut queue = PlanQueue::new(root);

    let aligned: Vec<ClauseFragment<'p>> = fragments
        .into_iter()
        .map(|mut fragment| {
            if fragment.depth == 0 {
                fragment.plan = queue.take_matching(&fragment.kind);
                if fragment.plan.is_none() {
                    tracing::trace!(clause = %fragment.kind, "no plan operator left to bind");
                }
            }
            fragment
        })
        .collect();

    if !queue.is_empty() {
        tracing::debug!(unbound = queue.len(), "plan operators left unbound after alignment");
    }
    aligned
}
