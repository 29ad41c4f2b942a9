//! Bottom-up status rollup
//!
//! Stage A classifies every L3 node from the group tags of its L4 children.
//! Stage B classifies every L2 node from the Stage A statuses of its L3
//! children; an L2 node's status2 comes from its children's status2. Each stage returns its results as a [`LevelRollup`]; Stage B
//! reads Stage A's map, never the node fields, and each map is written onto
//! its own level's nodes exactly once.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::TraceConfig;
use crate::models::{Level, RecordStore, TraceGraph};
use crate::status::{classify, Category, ChildCounts, Classification, Coverage, Status};

/// Aggregated children and derived status of one parent node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeRollup {
    pub counts: ChildCounts,
    /// Children whose own status2 is ADDRESSED
    pub addressed: usize,
    /// Children whose own status2 is NOT_ADDRESSED
    pub not_addressed: usize,
    pub classification: Classification,
}

/// Rollup results for every node of one level
#[derive(Debug, Clone, Serialize)]
pub struct LevelRollup {
    pub level: Level,
    results: HashMap<String, NodeRollup>,
}

impl LevelRollup {
    fn new(level: Level) -> Self {
        Self {
            level,
            results: HashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodeRollup> {
        self.results.get(id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of nodes per primary status
    pub fn status_histogram(&self) -> Vec<(Status, usize)> {
        let mut histogram: HashMap<Status, usize> = HashMap::new();
        for rollup in self.results.values() {
            *histogram.entry(rollup.classification.status).or_default() += 1;
        }
        let mut histogram: Vec<_> = histogram.into_iter().collect();
        histogram.sort();
        histogram
    }
}

/// Results of both stages
#[derive(Debug, Clone, Serialize)]
pub struct Rollup {
    pub l3: LevelRollup,
    pub l2: LevelRollup,
}

/// Stage A: classifies L3 nodes from their L4 children's group tags
pub fn stage_a(graph: &TraceGraph, config: &TraceConfig) -> LevelRollup {
    let mut rollup = LevelRollup::new(Level::L3);

    for parent in graph.l3.in_order() {
        let counts: ChildCounts = parent
            .inbound_links
            .iter()
            .filter_map(|id| graph.l4.get(id))
            .map(|child| config.category_for_group(child.group.as_deref()))
            .collect();

        let classification = classify(&counts, &parent.text, &config.shall_marker);
        log::debug!(
            "L3 {} -> {} ({} children)",
            parent.id,
            classification.status,
            counts.total
        );

        rollup.results.insert(
            parent.id.clone(),
            NodeRollup {
                counts,
                addressed: 0,
                not_addressed: 0,
                classification,
            },
        );
    }

    log::info!("Classified {} L3 requirements", rollup.len());
    rollup
}

/// Stage B: classifies L2 nodes from the Stage A results of their L3 children
pub fn stage_b(graph: &TraceGraph, l3: &LevelRollup, config: &TraceConfig) -> LevelRollup {
    let mut rollup = LevelRollup::new(Level::L2);

    for parent in graph.l2.in_order() {
        let mut counts = ChildCounts::default();
        let mut addressed = 0;
        let mut not_addressed = 0;

        for child_id in &parent.inbound_links {
            if !graph.l3.contains(child_id) {
                continue;
            }
            let child = l3.get(child_id).map(|r| r.classification);
            let category = child.map_or(Category::Other, |c| c.status.category());
            counts.add(category);

            match child.map(|c| c.status2) {
                Some(Coverage::Addressed) => addressed += 1,
                Some(Coverage::NotAddressed) => not_addressed += 1,
                Some(Coverage::Empty) | None => {}
            }
        }

        let mut classification = classify(&counts, &parent.text, &config.shall_marker);
        classification.status2 = l2_coverage(counts.total, addressed);
        log::debug!(
            "L2 {} -> {} ({} children)",
            parent.id,
            classification.status,
            counts.total
        );

        rollup.results.insert(
            parent.id.clone(),
            NodeRollup {
                counts,
                addressed,
                not_addressed,
                classification,
            },
        );
    }

    log::info!("Classified {} L2 requirements", rollup.len());
    rollup
}

/// L2 coverage follows the children's own coverage: addressed as soon as
/// one L3 child is addressed, blank without children
fn l2_coverage(children: usize, addressed: usize) -> Coverage {
    if children == 0 {
        Coverage::Empty
    } else if addressed > 0 {
        Coverage::Addressed
    } else {
        Coverage::NotAddressed
    }
}

/// Writes a stage's classifications onto the nodes of its level
fn apply(store: &mut RecordStore, rollup: &LevelRollup) {
    for (id, result) in &rollup.results {
        if let Some(node) = store.get_mut(id) {
            node.classification = Some(result.classification);
        }
    }
}

/// Runs Stage A to completion, then Stage B, annotating the graph's nodes
pub fn run(graph: &mut TraceGraph, config: &TraceConfig) -> Rollup {
    let l3 = stage_a(graph, config);
    apply(&mut graph.l3, &l3);

    let l2 = stage_b(graph, &l3, config);
    apply(&mut graph.l2, &l2);

    Rollup { l3, l2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::links::link_graph;
    use crate::models::RequirementNode;

    fn l4(id: &str, order: usize, parent: &str, group: &str) -> RequirementNode {
        RequirementNode::new(id, Level::L4, "", order)
            .with_links(vec![parent.to_string()])
            .with_group(group)
    }

    fn l3(id: &str, order: usize, parents: &[&str]) -> RequirementNode {
        RequirementNode::new(id, Level::L3, "The unit shall do X", order)
            .with_links(parents.iter().map(|p| p.to_string()).collect())
    }

    fn linked(mut graph: TraceGraph) -> TraceGraph {
        let mut diagnostics = Diagnostics::new();
        link_graph(&mut graph, &mut diagnostics);
        graph
    }

    #[test]
    fn test_stage_a_partial_scenario() {
        let mut graph = TraceGraph::new();
        graph.l3.insert(l3("P", 0, &[]));
        graph.l4.insert(l4("a", 0, "P", "0"));
        graph.l4.insert(l4("b", 1, "P", "0"));
        graph.l4.insert(l4("c", 2, "P", "1"));
        graph.l4.insert(l4("d", 3, "P", "7"));
        let graph = linked(graph);

        let result = *stage_a(&graph, &TraceConfig::default()).get("P").unwrap();

        assert_eq!(result.counts.total, 4);
        assert_eq!(result.counts.verified, 2);
        assert_eq!(result.counts.expected_near, 1);
        assert_eq!(result.counts.expected_far, 0);
        assert_eq!(result.counts.out, 0);
        assert_eq!(result.counts.other(), 1);
        assert_eq!(result.classification.status, Status::Partial);
        assert_eq!(result.classification.status2, Coverage::Addressed);
        assert_eq!(result.classification.percent_complete, Some(75));
    }

    #[test]
    fn test_stage_a_all_verified() {
        let mut graph = TraceGraph::new();
        graph.l3.insert(l3("P", 0, &[]));
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            graph.l4.insert(l4(id, i, "P", "0"));
        }
        let graph = linked(graph);

        let result = stage_a(&graph, &TraceConfig::default());
        let c = result.get("P").unwrap().classification;
        assert_eq!(c.status, Status::Verified);
        assert_eq!(c.status2, Coverage::Addressed);
        assert_eq!(c.percent_complete, Some(100));
    }

    #[test]
    fn test_stage_b_uses_stage_a_statuses() {
        let mut graph = TraceGraph::new();
        graph.l2.insert(RequirementNode::new("TOP", Level::L2, "", 0));
        graph.l3.insert(l3("V", 0, &["TOP"]));
        graph.l3.insert(l3("N", 1, &["TOP"]));
        graph.l3.insert(l3("E", 2, &["TOP"]));
        graph.l4.insert(l4("v1", 0, "V", "0"));
        graph.l4.insert(l4("n1", 1, "N", "5"));
        let mut graph = linked(graph);

        let rollup = run(&mut graph, &TraceConfig::default());

        assert_eq!(rollup.l3.get("V").unwrap().classification.status, Status::Verified);
        assert_eq!(rollup.l3.get("N").unwrap().classification.status, Status::Out);
        assert_eq!(
            rollup.l3.get("E").unwrap().classification.status,
            Status::MissingChildren
        );

        let top = rollup.l2.get("TOP").unwrap();
        assert_eq!(top.counts.total, 3);
        assert_eq!(top.counts.verified, 1);
        assert_eq!(top.counts.out, 1);
        assert_eq!(top.counts.other(), 1);
        assert_eq!(top.addressed, 1);
        assert_eq!(top.not_addressed, 1);
        assert_eq!(top.classification.status, Status::Partial);
        assert_eq!(top.classification.percent_complete, Some(33));

        // results are written back onto the nodes
        assert_eq!(
            graph.l2.get("TOP").unwrap().classification,
            Some(top.classification)
        );
        assert_eq!(
            graph.l3.get("V").unwrap().classification.map(|c| c.status),
            Some(Status::Verified)
        );
        assert_eq!(graph.l4.get("v1").unwrap().classification, None);
    }

    #[test]
    fn test_l2_addressed_through_partial_children() {
        let mut graph = TraceGraph::new();
        graph.l2.insert(RequirementNode::new("TOP", Level::L2, "", 0));
        graph.l3.insert(l3("P1", 0, &["TOP"]));
        graph.l3.insert(l3("P2", 1, &["TOP"]));
        graph.l4.insert(l4("a", 0, "P1", "0"));
        graph.l4.insert(l4("b", 1, "P1", "9"));
        graph.l4.insert(l4("c", 2, "P2", "0"));
        graph.l4.insert(l4("d", 3, "P2", "9"));
        let mut graph = linked(graph);

        let rollup = run(&mut graph, &TraceConfig::default());

        let p1 = rollup.l3.get("P1").unwrap().classification;
        assert_eq!(p1.status, Status::Partial);
        assert_eq!(p1.status2, Coverage::Addressed);
        assert_eq!(p1.percent_complete, Some(50));

        // both children count as other, yet both are addressed
        let top = rollup.l2.get("TOP").unwrap();
        assert_eq!(top.counts.other(), 2);
        assert_eq!(top.addressed, 2);
        assert_eq!(top.classification.status, Status::Out);
        assert_eq!(top.classification.status2, Coverage::Addressed);
        assert_eq!(top.classification.percent_complete, Some(0));
    }

    #[test]
    fn test_l2_not_addressed_when_no_child_is() {
        let mut graph = TraceGraph::new();
        graph.l2.insert(RequirementNode::new("TOP", Level::L2, "", 0));
        graph.l3.insert(l3("F", 0, &["TOP"]));
        graph.l4.insert(l4("a", 0, "F", "2"));
        let mut graph = linked(graph);

        let rollup = run(&mut graph, &TraceConfig::default());
        let top = rollup.l2.get("TOP").unwrap();
        assert_eq!(top.classification.status, Status::ExpectedFar);
        assert_eq!(top.not_addressed, 1);
        assert_eq!(top.classification.status2, Coverage::NotAddressed);
    }

    #[test]
    fn test_childless_l2_with_shall() {
        let mut graph = TraceGraph::new();
        graph.l2.insert(RequirementNode::new(
            "TOP",
            Level::L2,
            "The observatory shall publish data",
            0,
        ));

        let rollup = run(&mut graph, &TraceConfig::default());
        let c = rollup.l2.get("TOP").unwrap().classification;
        assert_eq!(c.status, Status::MissingChildren);
        assert_eq!(c.status2, Coverage::Empty);
        assert_eq!(c.percent_complete, None);
    }

    #[test]
    fn test_dangling_links_do_not_count() {
        let mut graph = TraceGraph::new();
        graph.l3.insert(l3("P", 0, &[]));
        graph.l4.insert(l4("a", 0, "P", "0"));
        graph.l4.insert(l4("b", 1, "GONE", "1"));
        let graph = linked(graph);

        let result = stage_a(&graph, &TraceConfig::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("P").unwrap().counts.total, 1);
        assert_eq!(result.get("P").unwrap().classification.status, Status::Verified);
    }

    #[test]
    fn test_duplicate_link_counts_twice() {
        let mut graph = TraceGraph::new();
        graph.l3.insert(l3("P", 0, &[]));
        graph.l4.insert(
            RequirementNode::new("a", Level::L4, "", 0)
                .with_links(vec!["P".to_string(), "P".to_string()])
                .with_group("0"),
        );
        graph.l4.insert(l4("b", 1, "P", "5"));
        let graph = linked(graph);

        let result = *stage_a(&graph, &TraceConfig::default()).get("P").unwrap();
        assert_eq!(result.counts.total, 3);
        assert_eq!(result.counts.verified, 2);
        assert_eq!(result.classification.percent_complete, Some(66));
    }

    #[test]
    fn test_status_histogram() {
        let mut graph = TraceGraph::new();
        graph.l3.insert(l3("A", 0, &[]));
        graph.l3.insert(l3("B", 1, &[]));
        graph.l3.insert(RequirementNode::new("C", Level::L3, "", 2));

        let rollup = stage_a(&graph, &TraceConfig::default());
        assert_eq!(
            rollup.status_histogram(),
            vec![(Status::Empty, 1), (Status::MissingChildren, 2)]
        );
    }
}
