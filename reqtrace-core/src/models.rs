use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::status::Classification;

/// Represents a tier of the requirements hierarchy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// Coarse business requirements
    L2,
    /// Intermediate system requirements
    L3,
    /// Fine-grained implementation and verification items
    L4,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::L2 => write!(f, "L2"),
            Level::L3 => write!(f, "L3"),
            Level::L4 => write!(f, "L4"),
        }
    }
}

/// Represents a single requirement record at one level of the hierarchy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirementNode {
    /// Identifier, unique within its level only
    pub id: String,

    /// Hierarchy tier of this node
    pub level: Level,

    /// Requirement statement (may be empty)
    pub text: String,

    /// Position of the source row within its sheet
    pub order: usize,

    /// Fully qualified ids of the parent-level nodes this node references
    pub outbound_links: Vec<String>,

    /// Ids of child-level nodes referencing this node, filled by link registration
    #[serde(default)]
    pub inbound_links: Vec<String>,

    /// Raw classification tag (L4 only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Raw item type (L4 only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    /// Derived status, written once by the rollup stage owning this level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl RequirementNode {
    /// Creates a node with no links and no derived status
    pub fn new(id: impl Into<String>, level: Level, text: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            level,
            text: text.into(),
            order,
            outbound_links: Vec::new(),
            inbound_links: Vec::new(),
            group: None,
            item_type: None,
            classification: None,
        }
    }

    /// Sets the outbound links
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.outbound_links = links;
        self
    }

    /// Sets the group tag
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Nodes of one hierarchy level, keyed by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStore {
    pub level: Level,
    nodes: HashMap<String, RequirementNode>,
}

impl RecordStore {
    /// Creates an empty store for the given level
    pub fn new(level: Level) -> Self {
        Self {
            level,
            nodes: HashMap::new(),
        }
    }

    /// Inserts a node, replacing any node with the same id.
    /// Returns the replaced node so callers can report the duplicate.
    pub fn insert(&mut self, node: RequirementNode) -> Option<RequirementNode> {
        self.nodes.insert(node.id.clone(), node)
    }

    /// Gets a node by id
    pub fn get(&self, id: &str) -> Option<&RequirementNode> {
        self.nodes.get(id)
    }

    /// Gets a mutable reference to a node by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut RequirementNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all nodes sorted by their input order
    pub fn in_order(&self) -> Vec<&RequirementNode> {
        let mut nodes: Vec<_> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        nodes
    }
}

/// The three record stores making up one traceability run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceGraph {
    pub l2: RecordStore,
    pub l3: RecordStore,
    pub l4: RecordStore,
}

impl TraceGraph {
    /// Creates a graph with three empty stores
    pub fn new() -> Self {
        Self {
            l2: RecordStore::new(Level::L2),
            l3: RecordStore::new(Level::L3),
            l4: RecordStore::new(Level::L4),
        }
    }

    /// Gets the store for a level
    pub fn store(&self, level: Level) -> &RecordStore {
        match level {
            Level::L2 => &self.l2,
            Level::L3 => &self.l3,
            Level::L4 => &self.l4,
        }
    }

    /// Gets a mutable reference to the store for a level
    pub fn store_mut(&mut self, level: Level) -> &mut RecordStore {
        match level {
            Level::L2 => &mut self.l2,
            Level::L3 => &mut self.l3,
            Level::L4 => &mut self.l4,
        }
    }
}

impl Default for TraceGraph {
    fn default() -> Self {
        Self::new()
    }
}
