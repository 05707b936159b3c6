//! dependency graph
use crate::resource::ResourceCore;
use crate::tree::{NodeId, Tree};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

pub(crate) type Graph = IndexMap<NodeId, IndexSet<NodeId>>;

/// Edges from every element to the elements it depends on
///
/// Explicit `depends_on` entries and references to other elements of the tree both count.
pub(crate) fn dependency_graph(tree: &Tree, elements: &[&ResourceCore]) -> Graph {
    let mut graph = Graph::new();

    for core in elements {
        let edges: IndexSet<NodeId> = core
            .depends_on()
            .chain(core.references().iter().map(|token| token.owner()))
            .filter(|dependency| tree.lookup(*dependency).is_some())
            .map(|dependency| dependency.node)
            .collect();

        graph.insert(core.id().node, edges);
    }

    graph
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Every cycle found by a depth first walk, nodes are visited in graph order
///
/// A cycle lists its nodes in dependency order and repeats the first one at the end.
pub(crate) fn find_cycles(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut finder = CycleFinder {
        graph,
        marks: HashMap::new(),
        stack: vec![],
        cycles: vec![],
    };

    for node in graph.keys() {
        finder.visit(*node);
    }

    finder.cycles
}

struct CycleFinder<'g> {
    graph: &'g Graph,
    marks: HashMap<NodeId, Mark>,
    stack: Vec<NodeId>,
    cycles: Vec<Vec<NodeId>>,
}

impl CycleFinder<'_> {
    fn visit(&mut self, node: NodeId) {
        match self.marks.get(&node) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                let start = self
                    .stack
                    .iter()
                    .position(|entry| *entry == node)
                    .unwrap_or_default();
                let mut cycle = self.stack[start..].to_vec();
                cycle.push(node);
                tracing::trace!(?cycle, "cycle found");
                self.cycles.push(cycle);
                return;
            }
            None => {}
        }

        self.marks.insert(node, Mark::Visiting);
        self.stack.push(node);

        let graph = self.graph;
        for next in graph.get(&node).into_iter().flatten() {
            self.visit(*next);
        }

        self.stack.pop();
        self.marks.insert(node, Mark::Done);
    }
}
