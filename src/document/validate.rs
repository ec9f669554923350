use crate::document::deserialize::parse_config;
use crate::document::FlowDocument;
use crate::graph::parse_button_port;
use petgraph::graph::NodeIndex;
use petgraph::prelude::StableDiGraph;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The runtime will misbehave on this document.
    Error,
    /// Loadable and runnable, but probably not what the operator meant.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
    fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }
}

/// Structural lint over a persisted document, run before deploying or after
/// an export. Never aborts: every finding is reported as an issue and the
/// document stays loadable regardless.
pub fn validate_document(document: &FlowDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut seen_nodes: HashSet<&str> = HashSet::new();
    for node in &document.nodes {
        if !seen_nodes.insert(&node.id) {
            issues.push(ValidationIssue::error(format!(
                "duplicate node id `{}`",
                node.id
            )));
        }
        if node.node_type == "wait" {
            // same normalization the deserializer applies, so a legacy
            // string-encoded config is judged on its decoded value
            let config = parse_config(&node.data.config);
            let seconds = config.get("seconds").and_then(|v| v.as_u64());
            if seconds.is_none_or(|s| s < 1) {
                issues.push(ValidationIssue::error(format!(
                    "wait node `{}` must wait at least 1 second",
                    node.id
                )));
            }
        }
    }

    let start_count = document
        .nodes
        .iter()
        .filter(|n| n.node_type == "start")
        .count();
    if !document.nodes.is_empty() && start_count != 1 {
        issues.push(ValidationIssue::error(format!(
            "expected exactly one start node, found {start_count}"
        )));
    }

    let mut seen_edges: HashSet<&str> = HashSet::new();
    let mut seen_button_ports: HashSet<(&str, u32)> = HashSet::new();
    for edge in &document.edges {
        if !seen_edges.insert(&edge.id) {
            issues.push(ValidationIssue::error(format!(
                "duplicate edge id `{}`",
                edge.id
            )));
        }
        for (label, node_id) in [("source", &edge.source_node_id), ("target", &edge.target_node_id)] {
            if !seen_nodes.contains(node_id.as_str()) {
                issues.push(ValidationIssue::error(format!(
                    "edge `{}` {label} references missing node `{}`",
                    edge.id, node_id
                )));
            }
        }
        if let Some(index) = edge.source_handle.as_deref().and_then(parse_button_port) {
            if !seen_button_ports.insert((edge.source_node_id.as_str(), index)) {
                issues.push(ValidationIssue::warning(format!(
                    "node `{}` routes button {} through more than one edge; the last one wins",
                    edge.source_node_id, index
                )));
            }
        }
    }

    issues.extend(unreachable_nodes(document));
    issues
}

/// Walk the graph from the start node and flag everything it cannot reach.
/// Unreachable blocks still render, they just never run.
fn unreachable_nodes(document: &FlowDocument) -> Vec<ValidationIssue> {
    let Some(start) = document.nodes.iter().find(|n| n.node_type == "start") else {
        return Vec::new();
    };

    let mut graph: StableDiGraph<&str, ()> = StableDiGraph::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    for node in &document.nodes {
        let idx = graph.add_node(node.id.as_str());
        index_of.insert(node.id.as_str(), idx);
    }
    for edge in &document.edges {
        if let (Some(&from), Some(&to)) = (
            index_of.get(edge.source_node_id.as_str()),
            index_of.get(edge.target_node_id.as_str()),
        ) {
            graph.add_edge(from, to, ());
        }
    }

    let mut reachable = HashSet::new();
    let mut stack = vec![index_of[start.id.as_str()]];
    while let Some(n) = stack.pop() {
        if reachable.insert(n) {
            for succ in graph.neighbors_directed(n, petgraph::Direction::Outgoing) {
                stack.push(succ);
            }
        }
    }

    document
        .nodes
        .iter()
        .filter(|n| !reachable.contains(&index_of[n.id.as_str()]))
        .map(|n| {
            ValidationIssue::warning(format!(
                "node `{}` is not reachable from the start node",
                n.id
            ))
        })
        .collect()
}
