//! Plan Node Model - the canonical operator tree shared by every plan parser
//!
//! Both the text and JSON parsers map engine-specific operator labels onto the
//! closed [`Operation`] vocabulary exactly once, while parsing. Nothing
//! downstream inspects labels by substring again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single operator in a query execution plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Canonical operator kind
    pub operation: Operation,
    /// Relation name, only set for scans
    pub table: Option<String>,
    /// Estimated cost range
    pub cost: Option<NodeCost>,
    /// Operator-specific properties
    pub properties: NodeProperties,
    /// Child operators, in plan order
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new node with the given operation and no properties
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            table: None,
            cost: None,
            properties: NodeProperties::default(),
            children: Vec::new(),
        }
    }

    /// Creates a node from a raw engine label such as `Hash Join` or `Seq Scan`
    pub fn from_label(label: &str) -> Self {
        let (operation, method) = Operation::classify(label);
        let mut node = Self::new(operation);
        node.properties.method = method;
        node
    }

    /// Sets the relation name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets the cost range
    pub fn with_cost(mut self, startup: f64, total: f64) -> Self {
        self.cost = Some(NodeCost::new(startup, total));
        self
    }

    /// Sets the operator method
    pub fn with_method(mut self, method: PlanMethod) -> Self {
        self.properties.method = Some(method);
        self
    }

    /// Sets the filter predicate
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.properties.filter = Some(filter.into());
        self
    }

    /// Sets the join condition
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.properties.condition = Some(condition.into());
        self
    }

    /// Sets the grouping key
    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.properties.group_key = Some(key.into());
        self
    }

    /// Sets the sort key and infers the order from it
    pub fn with_sort_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.properties.sort_order = Some(SortOrder::infer(&key));
        self.properties.sort_key = Some(key);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child and returns a handle to it
    pub fn add_child(&mut self, child: PlanNode) -> &mut PlanNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn startup_cost(&self) -> Option<f64> {
        self.cost.map(|c| c.startup)
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.cost.map(|c| c.total)
    }

    /// Join predicate, only meaningful on join operators
    pub fn join_condition(&self) -> Option<&str> {
        match self.operation {
            Operation::Join => self.properties.condition.as_deref(),
            _ => None,
        }
    }

    /// Grouping key, only meaningful on aggregates
    pub fn group_key(&self) -> Option<&str> {
        match self.operation {
            Operation::Aggregate => self.properties.group_key.as_deref(),
            _ => None,
        }
    }

    /// Sort key and direction, only meaningful on sorts
    pub fn sort_spec(&self) -> Option<(&str, SortOrder)> {
        match self.operation {
            Operation::Sort => {
                let key = self.properties.sort_key.as_deref()?;
                Some((key, self.properties.sort_order.unwrap_or_default()))
            }
            _ => None,
        }
    }

    /// Filter predicate applied by this operator
    pub fn filter(&self) -> Option<&str> {
        self.properties.filter.as_deref()
    }

    pub fn method(&self) -> Option<PlanMethod> {
        self.properties.method
    }

    /// Label shown for this node by tree views, e.g. `HASH JOIN`
    pub fn display_label(&self) -> String {
        match self.properties.method {
            Some(method) => format!("{} {}", method, self.operation),
            None => self.operation.to_string(),
        }
    }

    /// Cost range as `startup..total`
    pub fn cost_range(&self) -> Option<String> {
        self.cost.map(|c| c.to_string())
    }

    /// Set properties as ordered `(name, value)` pairs
    pub fn property_map(&self) -> Vec<(&'static str, String)> {
        let props = &self.properties;
        let mut map = Vec::new();
        if let Some(condition) = &props.condition {
            map.push(("condition", condition.clone()));
        }
        if let Some(key) = &props.group_key {
            map.push(("group_key", key.clone()));
        }
        if let Some(key) = &props.sort_key {
            map.push(("sort_key", key.clone()));
        }
        if let Some(order) = props.sort_order {
            map.push(("sort_order", order.to_string()));
        }
        if let Some(filter) = &props.filter {
            map.push(("filter", filter.clone()));
        }
        if let Some(method) = props.method {
            map.push(("method", method.to_string()));
        }
        map
    }

    /// Iterates over this node and its descendants in pre-order
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self)
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First scanned relation in pre-order
    pub fn first_table(&self) -> Option<&str> {
        self.iter().find_map(|n| n.table.as_deref())
    }
}

/// Canonical operator kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Scan,
    Join,
    Aggregate,
    Sort,
    Limit,
    /// Operator with no canonical kind, keeps the engine's label
    Other(String),
}

impl Operation {
    /// Maps an engine operator label onto the canonical vocabulary
    ///
    /// Returns the operation together with the method implied by the label.
    pub fn classify(label: &str) -> (Operation, Option<PlanMethod>) {
        let label = label.trim();

        if label.contains("Scan") {
            let method = if label.contains("Index") {
                Some(PlanMethod::Index)
            } else if label.contains("Seq") {
                Some(PlanMethod::Sequential)
            } else {
                None
            };
            (Operation::Scan, method)
        } else if label.contains("Join") || label.starts_with("Nested Loop") {
            let method = if label.contains("Hash") {
                Some(PlanMethod::Hash)
            } else if label.contains("Merge") {
                Some(PlanMethod::Merge)
            } else if label.contains("Nested") {
                Some(PlanMethod::NestedLoop)
            } else {
                None
            };
            (Operation::Join, method)
        } else if label.contains("Aggregate") {
            let method = if label.contains("Partial") {
                Some(PlanMethod::Partial)
            } else if label.contains("Final") {
                Some(PlanMethod::Final)
            } else if label.contains("Hash") {
                Some(PlanMethod::Hash)
            } else {
                None
            };
            (Operation::Aggregate, method)
        } else if label.contains("Sort") {
            (Operation::Sort, None)
        } else if label == "Limit" {
            (Operation::Limit, None)
        } else {
            (Operation::Other(label.to_string()), None)
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Scan => f.write_str("SCAN"),
            Operation::Join => f.write_str("JOIN"),
            Operation::Aggregate => f.write_str("AGGREGATE"),
            Operation::Sort => f.write_str("SORT"),
            Operation::Limit => f.write_str("LIMIT"),
            Operation::Other(label) => f.write_str(label),
        }
    }
}

/// Cost information for a plan node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeCost {
    /// Startup cost (time to return first row)
    pub startup: f64,
    /// Total cost (time to return all rows)
    pub total: f64,
}

impl NodeCost {
    pub fn new(startup: f64, total: f64) -> Self {
        Self { startup, total }
    }
}

impl fmt::Display for NodeCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}..{:.2}", self.startup, self.total)
    }
}

/// Operator-specific properties; unset fields do not apply to the operator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeProperties {
    /// Join predicate
    pub condition: Option<String>,
    pub group_key: Option<String>,
    pub sort_key: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filter: Option<String>,
    /// Physical method, e.g. hash vs merge join
    pub method: Option<PlanMethod>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `DESC` when the key mentions it, `ASC` otherwise
    pub fn infer(text: &str) -> Self {
        if text.contains("DESC") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical method used by an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMethod {
    Hash,
    Merge,
    NestedLoop,
    Sequential,
    Index,
    Partial,
    Final,
}

impl PlanMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "HASH",
            Self::Merge => "MERGE",
            Self::NestedLoop => "NESTED LOOP",
            Self::Sequential => "SEQUENTIAL",
            Self::Index => "INDEX",
            Self::Partial => "PARTIAL",
            Self::Final => "FINAL",
        }
    }
}

impl fmt::Display for PlanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Iterator for traversing plan nodes in pre-order
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
