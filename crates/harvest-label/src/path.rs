//! Path expressions evaluated against a [`LabelTree`].
//!
//! Supported syntax:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `a \| b` | union, results in document order |
//! | `/A/B` | absolute path from the document |
//! | `//A`, `A//B` | descendants |
//! | `A/B` | relative to the context node |
//! | `.`, `..` | self, parent |
//! | `*Member_Entry`, `File_Area*` | `*` wildcards inside a name test |
//! | `pds:A` | namespace-qualified name test |
//! | `A[child='v']` | keep nodes whose child `child` has value `v` |
//!
//! Unprefixed name tests match on local name in any namespace.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::PathError;
use crate::tree::{LabelTree, NodeId, NodeRef};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    source: String,
    branches: Vec<LocationPath>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    SelfNode,
    Parent,
    Select {
        axis: Axis,
        test: NameTest,
        predicate: Option<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NameTest {
    namespace: Option<String>,
    pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    child: String,
    value: String,
}

/// Evaluation position: the virtual document above the root, or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    Document,
    Node(NodeId),
}

impl PathExpr {
    /// Compile an expression that uses no namespace prefixes.
    ///
    /// # Errors
    /// Returns [`PathError`] for empty or malformed expressions.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        Self::parse_with(expr, &BTreeMap::new())
    }

    /// Compile an expression, resolving `prefix:` through `namespaces`.
    ///
    /// # Errors
    /// Returns [`PathError`] for empty or malformed expressions and unknown
    /// prefixes.
    pub fn parse_with(expr: &str, namespaces: &BTreeMap<String, String>) -> Result<Self, PathError> {
        if expr.trim().is_empty() {
            return Err(PathError::Empty);
        }
        let mut parser = Parser {
            expr,
            pos: 0,
            namespaces,
        };
        let branches = parser.parse_union()?;
        Ok(Self {
            source: expr.to_string(),
            branches,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// All matching nodes in document order, without duplicates.
    #[must_use]
    pub fn select<'a>(&self, context: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let tree = context.tree();
        let mut found: Vec<Position> = self
            .branches
            .iter()
            .flat_map(|branch| branch.evaluate(tree, context.id()))
            .collect();
        found.sort_unstable();
        found.dedup();
        found
            .into_iter()
            .filter_map(|pos| match pos {
                Position::Node(id) => Some(tree.node(id)),
                Position::Document => None,
            })
            .collect()
    }

    /// Evaluate with the tree's root as the context node.
    #[must_use]
    pub fn select_in<'a>(&self, tree: &'a LabelTree) -> Vec<NodeRef<'a>> {
        self.select(tree.root())
    }

    #[must_use]
    pub fn first<'a>(&self, context: NodeRef<'a>) -> Option<NodeRef<'a>> {
        self.select(context).into_iter().next()
    }

    /// Trimmed value of the first match, when it is non-empty.
    #[must_use]
    pub fn first_value<'a>(&self, context: NodeRef<'a>) -> Option<&'a str> {
        self.first(context)
            .map(|node| node.value())
            .filter(|value| !value.is_empty())
    }

    /// Trimmed, non-empty values of every match.
    #[must_use]
    pub fn values(&self, context: NodeRef<'_>) -> Vec<String> {
        self.select(context)
            .into_iter()
            .map(|node| node.value())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

impl LocationPath {
    fn evaluate(&self, tree: &LabelTree, context: NodeId) -> Vec<Position> {
        let mut current = if self.absolute {
            vec![Position::Document]
        } else {
            vec![Position::Node(context)]
        };
        for step in &self.steps {
            let mut next: Vec<Position> = current
                .iter()
                .flat_map(|&pos| step.apply(tree, pos))
                .collect();
            next.sort_unstable();
            next.dedup();
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

impl Step {
    fn apply(&self, tree: &LabelTree, pos: Position) -> Vec<Position> {
        match self {
            Self::SelfNode => vec![pos],
            Self::Parent => match pos {
                Position::Document => Vec::new(),
                Position::Node(id) => vec![
                    tree.node(id)
                        .parent()
                        .map_or(Position::Document, |parent| Position::Node(parent.id())),
                ],
            },
            Self::Select {
                axis,
                test,
                predicate,
            } => candidates(tree, pos, *axis)
                .into_iter()
                .filter(|node| test.matches(*node))
                .filter(|node| predicate.as_ref().is_none_or(|p| p.matches(*node)))
                .map(|node| Position::Node(node.id()))
                .collect(),
        }
    }
}

fn candidates(tree: &LabelTree, pos: Position, axis: Axis) -> Vec<NodeRef<'_>> {
    match (pos, axis) {
        (Position::Document, Axis::Child) => vec![tree.root()],
        (Position::Document, Axis::Descendant) => tree.iter().collect(),
        (Position::Node(id), Axis::Child) => tree.node(id).children().collect(),
        (Position::Node(id), Axis::Descendant) => tree.node(id).descendants().collect(),
    }
}

impl NameTest {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        if let Some(namespace) = &self.namespace
            && node.namespace() != Some(namespace.as_str())
        {
            return false;
        }
        wildcard_match(&self.pattern, node.name())
    }
}

impl Predicate {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        node.children()
            .any(|child| child.name() == self.child && child.value() == self.value)
    }
}

/// Match `name` against a pattern where `*` stands for any run of characters.
pub(crate) fn wildcard_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return false;
    };
    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    for part in &parts[1..parts.len() - 1] {
        match remaining.find(part) {
            Some(index) => remaining = &remaining[index + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct Parser<'a> {
    expr: &'a str,
    pos: usize,
    namespaces: &'a BTreeMap<String, String>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.expr[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek()
            && c.is_whitespace()
        {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::Syntax {
            expr: self.expr.to_string(),
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn parse_union(&mut self) -> Result<Vec<LocationPath>, PathError> {
        let mut branches = vec![self.parse_path()?];
        loop {
            self.skip_ws();
            if self.eat("|") {
                branches.push(self.parse_path()?);
            } else {
                break;
            }
        }
        if self.pos < self.expr.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(branches)
    }

    fn parse_path(&mut self) -> Result<LocationPath, PathError> {
        self.skip_ws();
        let (absolute, first_axis) = if self.eat("//") {
            (true, Axis::Descendant)
        } else if self.eat("/") {
            (true, Axis::Child)
        } else {
            (false, Axis::Child)
        };

        let mut steps = vec![self.parse_step(first_axis)?];
        loop {
            let axis = if self.eat("//") {
                Axis::Descendant
            } else if self.eat("/") {
                Axis::Child
            } else {
                break;
            };
            steps.push(self.parse_step(axis)?);
        }
        Ok(LocationPath { absolute, steps })
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step, PathError> {
        if self.rest().starts_with('.') {
            if axis == Axis::Descendant {
                return Err(self.error("'.' and '..' cannot follow '//'"));
            }
            return Ok(if self.eat("..") {
                Step::Parent
            } else {
                self.pos += 1;
                Step::SelfNode
            });
        }

        let token = self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '*' | ':'));
        if token.is_empty() {
            return Err(self.error("expected a name test"));
        }
        let test = self.name_test(token)?;

        self.skip_ws();
        let predicate = if self.eat("[") {
            Some(self.parse_predicate()?)
        } else {
            None
        };
        Ok(Step::Select {
            axis,
            test,
            predicate,
        })
    }

    fn name_test(&self, token: &str) -> Result<NameTest, PathError> {
        match token.split_once(':') {
            None => Ok(NameTest {
                namespace: None,
                pattern: token.to_string(),
            }),
            Some((prefix, local)) => {
                if local.is_empty() || local.contains(':') {
                    return Err(self.error(format!("malformed qualified name '{token}'")));
                }
                let uri = self
                    .namespaces
                    .get(prefix)
                    .ok_or_else(|| PathError::UnknownPrefix {
                        expr: self.expr.to_string(),
                        prefix: prefix.to_string(),
                    })?;
                Ok(NameTest {
                    namespace: Some(uri.clone()),
                    pattern: local.to_string(),
                })
            }
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate, PathError> {
        self.skip_ws();
        let child = self
            .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
            .to_string();
        if child.is_empty() {
            return Err(self.error("expected a child name in predicate"));
        }
        self.skip_ws();
        if !self.eat("=") {
            return Err(self.error("expected '=' in predicate"));
        }
        self.skip_ws();
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quoted value in predicate")),
        };
        self.pos += 1;
        let Some(len) = self.rest().find(quote) else {
            return Err(self.error("unterminated string in predicate"));
        };
        let value = self.rest()[..len].to_string();
        self.pos += len + 1;
        self.skip_ws();
        if !self.eat("]") {
            return Err(self.error("expected ']' to close predicate"));
        }
        Ok(Predicate { child, value })
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek()
            && keep(c)
        {
            self.pos += c.len_utf8();
        }
        &self.expr[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LabelParser, ModernParser};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const LABEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Collection xmlns="http://pds.nasa.gov/pds4/pds/v1"
                    xmlns:disp="http://pds.nasa.gov/pds4/disp/v1">
  <Identification_Area>
    <logical_identifier>urn:nasa:pds:ladee:data</logical_identifier>
    <title>LADEE   data</title>
  </Identification_Area>
  <Collection>
    <collection_type>Data</collection_type>
  </Collection>
  <Inventory>
    <reference_type>inventory_has_member_product</reference_type>
  </Inventory>
  <Bundle_Member_Entry><lid_reference>urn:a</lid_reference></Bundle_Member_Entry>
  <Internal_Reference><lid_reference>urn:b</lid_reference></Internal_Reference>
  <disp:Display_Settings><disp:title>shown</disp:title></disp:Display_Settings>
</Product_Collection>
"#;

    fn tree() -> LabelTree {
        ModernParser.parse(LABEL).expect("fixture parses")
    }

    fn names(expr: &str) -> Vec<String> {
        let tree = tree();
        let path = PathExpr::parse_with(expr, &namespaces()).expect("valid expression");
        path.select_in(&tree)
            .iter()
            .map(|n| n.name().to_string())
            .collect()
    }

    fn namespaces() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("pds".to_string(), "http://pds.nasa.gov/pds4/pds/v1".to_string()),
            ("disp".to_string(), "http://pds.nasa.gov/pds4/disp/v1".to_string()),
        ])
    }

    #[rstest]
    #[case("/Product_Collection/Identification_Area/logical_identifier", &["logical_identifier"])]
    #[case("Identification_Area/title", &["title"])]
    #[case("//title", &["title", "title"])]
    #[case("//pds:title", &["title"])]
    #[case("//disp:title", &["title"])]
    #[case("//*Member_Entry | //Internal_Reference", &["Bundle_Member_Entry", "Internal_Reference"])]
    #[case("//Identification_Area*/logical_identifier", &["logical_identifier"])]
    #[case("//Inventory[reference_type='inventory_has_member_product']", &["Inventory"])]
    #[case("//Inventory[reference_type=\"other\"]", &[])]
    #[case("/Identification_Area", &[])]
    #[case("//lid_reference/..", &["Bundle_Member_Entry", "Internal_Reference"])]
    #[case("/Product_Collection//collection_type", &["collection_type"])]
    fn selects_expected_nodes(#[case] expr: &str, #[case] expected: &[&str]) {
        assert_eq!(names(expr), expected);
    }

    #[test]
    fn union_results_are_in_document_order_without_duplicates() {
        assert_eq!(
            names("//Internal_Reference | //Bundle_Member_Entry | //Internal_Reference"),
            vec!["Bundle_Member_Entry", "Internal_Reference"]
        );
    }

    #[test]
    fn first_value_and_values_trim_text() {
        let tree = tree();
        let path = PathExpr::parse("//lid_reference").expect("valid");
        assert_eq!(path.first_value(tree.root()), Some("urn:a"));
        assert_eq!(path.values(tree.root()), vec!["urn:a", "urn:b"]);
        let missing = PathExpr::parse("//nothing").expect("valid");
        assert_eq!(missing.first_value(tree.root()), None);
    }

    #[rstest]
    #[case("")]
    #[case("//")]
    #[case("a/[x='1']")]
    #[case("a[x='1'")]
    #[case("a[x=1]")]
    #[case("a[='1']")]
    #[case("a b")]
    #[case("//..")]
    fn rejects_malformed_expressions(#[case] expr: &str) {
        assert!(PathExpr::parse(expr).is_err(), "{expr} should not compile");
    }

    #[test]
    fn unknown_prefix_is_reported() {
        let err = PathExpr::parse("//cart:Cartography").unwrap_err();
        assert_eq!(
            err,
            PathError::UnknownPrefix {
                expr: "//cart:Cartography".into(),
                prefix: "cart".into(),
            }
        );
    }

    #[rstest]
    #[case("*Member_Entry", "Bundle_Member_Entry", true)]
    #[case("*Member_Entry", "Member_Entry", true)]
    #[case("File_Area*", "File_Area_Observational", true)]
    #[case("File_Area*", "Document_File", false)]
    #[case("*", "anything", true)]
    #[case("a*c*e", "abcde", true)]
    #[case("a*c*e", "abde", false)]
    #[case("title", "title", true)]
    fn wildcard_cases(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(wildcard_match(pattern, name), expected);
    }
}
