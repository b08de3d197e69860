//! Transmission-chain linkage analysis.
//!
//! Nodes live in a petgraph arena addressed by `NodeIndex`; edges run
//! parent → child. Every traversal is iterative with an explicit stack, so
//! pathological chains cannot exhaust the call stack.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use super::result::{ErrorCode, ValidationIssue};
use crate::model::TransmissionNode;

/// A chain element as seen by the linkage analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Position of the node in the chain array.
    pub position: usize,
    pub node_id: String,
    pub parent_id: Option<String>,
}

impl ChainLink {
    pub fn new(position: usize, node_id: &str, parent_id: Option<&str>) -> Self {
        Self {
            position,
            node_id: node_id.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// Links for a typed chain.
pub fn links_from_nodes(nodes: &[TransmissionNode]) -> Vec<ChainLink> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| ChainLink {
            position: i,
            node_id: n.node_id.to_string(),
            parent_id: n.parent().map(|p| p.to_string()),
        })
        .collect()
}

/// Result of the linkage analysis.
#[derive(Debug, Clone, Default)]
pub struct LinkageReport {
    /// The single root, when exactly one exists.
    pub root: Option<String>,
    /// Node ids reachable from the root (root included).
    pub reachable: usize,
    pub issues: Vec<ValidationIssue>,
}

impl LinkageReport {
    pub fn is_sound(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, code: ErrorCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

fn node_path(position: usize) -> String {
    format!("transmission_chain[{}]", position)
}

/// Check that the chain is a single-rooted, acyclic, connected graph.
pub fn analyze_links(links: &[ChainLink]) -> LinkageReport {
    let mut report = LinkageReport::default();
    let mut graph: DiGraph<&ChainLink, ()> = DiGraph::with_capacity(links.len(), links.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(links.len());

    for link in links {
        if index.contains_key(link.node_id.as_str()) {
            report.issues.push(ValidationIssue::new(
                ErrorCode::SanadDuplicateNode,
                &format!("{}.node_id", node_path(link.position)),
                &format!("node_id {} appears more than once", link.node_id),
            ));
            continue;
        }
        let ix = graph.add_node(link);
        index.insert(link.node_id.as_str(), ix);
    }

    let mut has_parent_ref = false;
    let mut roots: Vec<NodeIndex> = Vec::new();
    for ix in graph.node_indices().collect::<Vec<_>>() {
        let link = graph[ix];
        match link.parent_id.as_deref() {
            None => roots.push(ix),
            Some(parent) => {
                has_parent_ref = true;
                match index.get(parent) {
                    Some(&parent_ix) => {
                        graph.add_edge(parent_ix, ix, ());
                    }
                    None => report.issues.push(ValidationIssue::new(
                        ErrorCode::SanadOrphanReference,
                        &node_path(link.position),
                        &format!(
                            "node {} references parent {} which is not in the chain",
                            link.node_id, parent
                        ),
                    )),
                }
            }
        }
    }

    match roots.len() {
        0 if has_parent_ref => report.issues.push(ValidationIssue::new(
            ErrorCode::SanadNoRoot,
            "transmission_chain",
            "every node references a parent; the chain has no root",
        )),
        0 | 1 => {}
        n => {
            let ids: Vec<&str> = roots.iter().map(|r| graph[*r].node_id.as_str()).collect();
            report.issues.push(ValidationIssue::new(
                ErrorCode::SanadMultipleRoots,
                "transmission_chain",
                &format!("{} parentless nodes: {}", n, ids.join(", ")),
            ));
        }
    }

    detect_cycles(&graph, &mut report);

    if let [root] = roots.as_slice() {
        let root = *root;
        report.root = Some(graph[root].node_id.clone());
        let mut reached = vec![false; graph.node_count()];
        let mut dfs = Dfs::new(&graph, root);
        while let Some(ix) = dfs.next(&graph) {
            reached[ix.index()] = true;
            report.reachable += 1;
        }
        for ix in graph.node_indices() {
            if !reached[ix.index()] {
                let link = graph[ix];
                report.issues.push(ValidationIssue::new(
                    ErrorCode::SanadOrphanedNode,
                    &node_path(link.position),
                    &format!(
                        "node {} is not reachable from root {}",
                        link.node_id, graph[root].node_id
                    ),
                ));
            }
        }
    }

    report
}

/// Three-colour DFS from every unvisited node. A back edge to a node that
/// is still on the stack closes a cycle.
fn detect_cycles(graph: &DiGraph<&ChainLink, ()>, report: &mut LinkageReport) {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];

    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        marks[start.index()] = Mark::OnStack;
        let mut stack = vec![(start, graph.neighbors(start))];

        loop {
            let (node, next) = match stack.last_mut() {
                Some((node, children)) => (*node, children.next()),
                None => break,
            };
            match next {
                Some(child) => match marks[child.index()] {
                    Mark::Unvisited => {
                        marks[child.index()] = Mark::OnStack;
                        stack.push((child, graph.neighbors(child)));
                    }
                    Mark::OnStack => {
                        let from = stack
                            .iter()
                            .position(|(ix, _)| *ix == child)
                            .unwrap_or(0);
                        let mut cycle: Vec<&str> = stack[from..]
                            .iter()
                            .map(|(ix, _)| graph[*ix].node_id.as_str())
                            .collect();
                        cycle.push(graph[child].node_id.as_str());
                        report.issues.push(ValidationIssue::new(
                            ErrorCode::SanadCycleDetected,
                            &node_path(graph[child].position),
                            &format!("cycle: {}", cycle.join(" -> ")),
                        ));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }
}
