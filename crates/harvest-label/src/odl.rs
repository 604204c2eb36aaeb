//! Reader for fixed-keyword (ODL) labels.
//!
//! Every `KEY = VALUE` statement becomes a node named `KEY` holding `VALUE`
//! as text. `OBJECT = X` / `GROUP = X` blocks become a node named `X` with a
//! `kind` attribute of `OBJECT` or `GROUP`. Set values produce one node per
//! member. A trailing `<UNIT>` is kept as a `unit` attribute. Reading stops at
//! a bare `END` statement.

use crate::error::LabelError;
use crate::parser::Dialect;
use crate::tree::{LabelTree, NodeData, NodeId};

/// Name of the synthetic root node.
pub const ROOT_NAME: &str = "LABEL";

/// Attribute naming the block type of an `OBJECT` or `GROUP` node.
pub const BLOCK_KIND: &str = "kind";

const OBJECT: &str = "OBJECT";
const GROUP: &str = "GROUP";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scalar {
    text: String,
    unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Scalar(Scalar),
    Set(Vec<Scalar>),
}

struct OpenBlock {
    kind: &'static str,
    name: String,
    line: u32,
    node: NodeId,
}

pub(crate) fn parse(text: &str) -> Result<LabelTree, LabelError> {
    let mut tree = LabelTree::with_root(Dialect::Legacy, NodeData::new(ROOT_NAME, 1, 1));
    let root = tree.root().id();
    let mut scanner = Scanner::new(text);
    let mut blocks: Vec<OpenBlock> = Vec::new();

    loop {
        scanner.skip_blank()?;
        if scanner.at_end() {
            break;
        }

        let (line, column) = (scanner.line, scanner.column);
        let keyword = scanner.keyword();
        if keyword.is_empty() {
            return Err(LabelError::parse(
                line,
                format!("expected a keyword, found '{}'", scanner.peek().unwrap_or(' ')),
            ));
        }

        scanner.skip_inline_space();
        let has_value = scanner.peek() == Some('=');

        if !has_value {
            match keyword.as_str() {
                "END" => break,
                "END_OBJECT" | "END_GROUP" => {
                    close_block(&mut blocks, &keyword, None, line)?;
                    continue;
                }
                _ => {
                    return Err(LabelError::parse(
                        line,
                        format!("missing '=' after '{keyword}'"),
                    ));
                }
            }
        }

        scanner.advance();
        scanner.skip_inline_space();
        if matches!(scanner.peek(), Some('\n' | '\r') | None) {
            // Only quoted strings and sets may start on the following line.
            scanner.skip_blank()?;
            if !matches!(scanner.peek(), Some('"' | '\'' | '{' | '(')) {
                return Err(LabelError::parse(
                    line,
                    format!("missing value for '{keyword}'"),
                ));
            }
        }
        let value = scanner.value(&keyword)?;
        let parent = blocks.last().map_or(root, |block| block.node);

        match keyword.as_str() {
            OBJECT | GROUP => {
                let Value::Scalar(name) = value else {
                    return Err(LabelError::parse(
                        line,
                        format!("{keyword} name must be a single value"),
                    ));
                };
                let mut data = NodeData::new(name.text.clone(), line, column);
                data.attributes
                    .push((BLOCK_KIND.to_string(), keyword.clone()));
                let node = tree.append(parent, data);
                blocks.push(OpenBlock {
                    kind: if keyword == OBJECT { OBJECT } else { GROUP },
                    name: name.text,
                    line,
                    node,
                });
            }
            "END_OBJECT" | "END_GROUP" => {
                let name = match value {
                    Value::Scalar(scalar) => scalar.text,
                    Value::Set(_) => {
                        return Err(LabelError::parse(
                            line,
                            format!("{keyword} name must be a single value"),
                        ));
                    }
                };
                close_block(&mut blocks, &keyword, Some(&name), line)?;
            }
            _ => match value {
                Value::Scalar(scalar) => {
                    tree.append(parent, statement(&keyword, scalar, line, column));
                }
                Value::Set(members) => {
                    for member in members {
                        tree.append(parent, statement(&keyword, member, line, column));
                    }
                }
            },
        }
    }

    if let Some(open) = blocks.last() {
        return Err(LabelError::parse(
            open.line,
            format!("{} = {} is never closed", open.kind, open.name),
        ));
    }

    Ok(tree)
}

fn statement(keyword: &str, value: Scalar, line: u32, column: u32) -> NodeData {
    let mut data = NodeData::new(keyword, line, column);
    data.text = Some(value.text);
    if let Some(unit) = value.unit {
        data.attributes.push(("unit".to_string(), unit));
    }
    data
}

fn close_block(
    blocks: &mut Vec<OpenBlock>,
    keyword: &str,
    name: Option<&str>,
    line: u32,
) -> Result<(), LabelError> {
    let expected = if keyword == "END_OBJECT" { OBJECT } else { GROUP };
    let Some(open) = blocks.last() else {
        return Err(LabelError::parse(
            line,
            format!("{keyword} without a matching {expected}"),
        ));
    };
    if open.kind != expected {
        return Err(LabelError::parse(
            line,
            format!(
                "{keyword} cannot close {} = {} opened at line {}",
                open.kind, open.name, open.line
            ),
        ));
    }
    if let Some(name) = name
        && name != open.name
    {
        return Err(LabelError::parse(
            line,
            format!(
                "{keyword} = {name} does not match {} = {} opened at line {}",
                open.kind, open.name, open.line
            ),
        ));
    }
    blocks.pop();
    Ok(())
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_at(1) == Some('*')
    }

    /// Skip whitespace, newlines and comments.
    fn skip_blank(&mut self) -> Result<(), LabelError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.starts_comment() => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_inline_space(&mut self) {
        while let Some(c) = self.peek()
            && (c == ' ' || c == '\t')
        {
            self.advance();
        }
    }

    fn skip_comment(&mut self) -> Result<(), LabelError> {
        let line = self.line;
        self.advance();
        self.advance();
        while !self.at_end() {
            if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }
        Err(LabelError::parse(line, "unterminated comment"))
    }

    fn keyword(&mut self) -> String {
        let mut keyword = String::new();
        while let Some(c) = self.peek()
            && !c.is_whitespace()
            && c != '='
            && !self.starts_comment()
        {
            keyword.push(c);
            self.advance();
        }
        keyword
    }

    fn value(&mut self, keyword: &str) -> Result<Value, LabelError> {
        match self.peek() {
            Some('{' | '(') => self.set(),
            Some(_) => Ok(Value::Scalar(self.scalar(keyword, &[])?)),
            None => Err(LabelError::parse(
                self.line,
                format!("missing value for '{keyword}'"),
            )),
        }
    }

    /// A quoted string, or a bare token ending at end of line or at one of
    /// `stops`, followed by an optional `<UNIT>`.
    fn scalar(&mut self, keyword: &str, stops: &[char]) -> Result<Scalar, LabelError> {
        let (text, quoted) = match self.peek() {
            Some(quote @ ('"' | '\'')) => (self.quoted(quote)?, true),
            _ => (self.bare(stops), false),
        };
        self.skip_inline_space();

        let mut unit = None;
        if self.peek() == Some('<') {
            unit = Some(self.unit()?);
        }

        // A bare token may already have swallowed its unit when written
        // without a space, as in `12.5<KM>`.
        let (text, unit) = match unit {
            None if !quoted => match split_unit(&text) {
                Some((value, parsed)) => (value, Some(parsed)),
                None => (text, None),
            },
            unit => (text, unit),
        };

        if text.is_empty() && unit.is_none() {
            return Err(LabelError::parse(
                self.line,
                format!("missing value for '{keyword}'"),
            ));
        }
        Ok(Scalar { text, unit })
    }

    fn quoted(&mut self, quote: char) -> Result<String, LabelError> {
        let line = self.line;
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
                None => return Err(LabelError::parse(line, "unterminated string")),
            }
        }
    }

    fn bare(&mut self, stops: &[char]) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek()
            && c != '\n'
            && c != '\r'
            && !stops.contains(&c)
            && !self.starts_comment()
        {
            text.push(c);
            self.advance();
        }
        text.trim().to_string()
    }

    fn unit(&mut self) -> Result<String, LabelError> {
        let line = self.line;
        self.advance();
        let mut unit = String::new();
        loop {
            match self.advance() {
                Some('>') => return Ok(unit.trim().to_string()),
                Some('\n') | None => return Err(LabelError::parse(line, "unterminated unit")),
                Some(c) => unit.push(c),
            }
        }
    }

    fn set(&mut self) -> Result<Value, LabelError> {
        let line = self.line;
        let mut members = Vec::new();
        self.set_members(&mut members, line)?;
        Ok(Value::Set(members))
    }

    /// Read one (possibly nested) set, flattening members into `out`.
    fn set_members(&mut self, out: &mut Vec<Scalar>, line: u32) -> Result<(), LabelError> {
        let close = match self.advance() {
            Some('{') => '}',
            _ => ')',
        };
        loop {
            self.skip_blank()?;
            match self.peek() {
                None => return Err(LabelError::parse(line, "unterminated set")),
                Some(c) if c == close => {
                    self.advance();
                    return Ok(());
                }
                Some('{' | '(') => self.set_members(out, line)?,
                Some(_) => {
                    let member = self.scalar("set member", &[',', close, '}', ')'])?;
                    out.push(member);
                }
            }
            self.skip_blank()?;
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some(c) if c == close => {}
                None => return Err(LabelError::parse(line, "unterminated set")),
                Some(c) => {
                    return Err(LabelError::parse(
                        self.line,
                        format!("unexpected '{c}' in set"),
                    ));
                }
            }
        }
    }
}

/// Split `12.5 <KM>` into value and unit.
fn split_unit(text: &str) -> Option<(String, String)> {
    let body = text.strip_suffix('>')?;
    let open = body.rfind('<')?;
    Some((body[..open].trim().to_string(), body[open + 1..].trim().to_string()))
}
