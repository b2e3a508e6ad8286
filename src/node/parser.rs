//! Line-oriented parser for the brace-delimited config dialect.
//!
//! Each line is split around `{` and `}`. Text containing `=` is an
//! assignment, any other text is a block header that must be followed by
//! `{` (on the same line or a later one). `//` starts a comment; on a line
//! with an assignment it becomes that value's trailing comment.

use crate::node::errors::{ParseError, SyntaxError};
use crate::node::tree::ConfigNode;
use crate::node::value::{Operator, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Open,
    Close,
}

/// Parsed block header: `<prefix><name>[<selector>]<filter>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub prefix: Option<Operator>,
    pub name: String,
    pub selector: Option<String>,
    pub filter: Option<String>,
}

impl Header {
    fn into_node(self) -> ConfigNode {
        let mut node = ConfigNode::new(self.name);
        node.set_prefix(self.prefix);
        node.set_selector(self.selector);
        node.set_filter(self.filter);
        node
    }
}

struct Frame {
    node: ConfigNode,
    opened: usize,
}

struct PendingHeader {
    header: Header,
    line: usize,
}

pub(crate) fn parse_document(text: &str) -> Result<ConfigNode, ParseError> {
    let mut stack = vec![Frame {
        node: ConfigNode::root(),
        opened: 0,
    }];
    let mut pending: Option<PendingHeader> = None;
    let mut last_line = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        last_line = line;
        let (code, comment) = split_comment(raw);
        let tokens = tokenize(code);
        let last_assignment = tokens
            .iter()
            .rposition(|t| matches!(t, Token::Text(text) if text.contains('=')));

        for (pos, token) in tokens.into_iter().enumerate() {
            match token {
                Token::Text(text) => {
                    if let Some(p) = pending.take() {
                        return Err(ParseError::syntax(
                            p.line,
                            SyntaxError::DanglingHeader {
                                name: p.header.name,
                            },
                        ));
                    }
                    if text.contains('=') {
                        let trailing = if Some(pos) == last_assignment {
                            comment
                        } else {
                            None
                        };
                        let value = parse_assignment(text, trailing)
                            .map_err(|kind| ParseError::syntax(line, kind))?;
                        current(&mut stack).add_value_item(value);
                    } else {
                        let header = parse_header(text).ok_or_else(|| {
                            ParseError::syntax(
                                line,
                                SyntaxError::UnparseableLine {
                                    text: raw.trim().to_string(),
                                },
                            )
                        })?;
                        pending = Some(PendingHeader { header, line });
                    }
                }
                Token::Open => {
                    let p = pending
                        .take()
                        .ok_or_else(|| ParseError::syntax(line, SyntaxError::MissingHeader))?;
                    stack.push(Frame {
                        node: p.header.into_node(),
                        opened: p.line,
                    });
                }
                Token::Close => {
                    if let Some(p) = pending.take() {
                        return Err(ParseError::syntax(
                            p.line,
                            SyntaxError::DanglingHeader {
                                name: p.header.name,
                            },
                        ));
                    }
                    if stack.len() == 1 {
                        return Err(ParseError::syntax(line, SyntaxError::UnbalancedClose));
                    }
                    if let Some(frame) = stack.pop() {
                        current(&mut stack).add_child(frame.node);
                    }
                }
            }
        }
    }

    if let Some(p) = pending {
        return Err(ParseError::syntax(
            p.line,
            SyntaxError::DanglingHeader {
                name: p.header.name,
            },
        ));
    }

    if stack.len() > 1 {
        let open = &stack[stack.len() - 1];
        return Err(ParseError::syntax(
            last_line,
            SyntaxError::UnclosedNode {
                name: open.node.header(),
                opened: open.opened,
            },
        ));
    }

    Ok(stack.pop().map(|frame| frame.node).unwrap_or_default())
}

fn current(stack: &mut [Frame]) -> &mut ConfigNode {
    let last = stack.len() - 1;
    &mut stack[last].node
}

/// Split a raw line into code and the text of a `//` comment.
fn split_comment(raw: &str) -> (&str, Option<&str>) {
    match raw.find("//") {
        Some(idx) => {
            let comment = raw[idx + 2..].trim();
            let comment = (!comment.is_empty()).then_some(comment);
            (&raw[..idx], comment)
        }
        None => (raw, None),
    }
}

fn tokenize(code: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (idx, ch) in code.char_indices() {
        if ch != '{' && ch != '}' {
            continue;
        }
        push_text(&mut tokens, &code[start..idx]);
        tokens.push(if ch == '{' { Token::Open } else { Token::Close });
        start = idx + ch.len_utf8();
    }
    push_text(&mut tokens, &code[start..]);
    tokens
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}

fn parse_assignment(text: &str, comment: Option<&str>) -> Result<Value, SyntaxError> {
    let (lhs, rhs) = text
        .split_once('=')
        .ok_or_else(|| SyntaxError::UnparseableLine {
            text: text.to_string(),
        })?;
    let (prefix, key) = Operator::split_prefix(lhs.trim());
    let key = key.trim();
    if key.is_empty() {
        return Err(SyntaxError::EmptyKey);
    }
    let mut value = match prefix {
        Some(op) => Value::with_operator(op, key, rhs.trim()),
        None => Value::new(key, rhs.trim()),
    };
    value.set_comment(comment.map(str::to_string));
    Ok(value)
}

/// Parse block header text; `None` when it is not a valid header.
pub(crate) fn parse_header(text: &str) -> Option<Header> {
    let (prefix, rest) = Operator::split_prefix(text.trim());
    let name_end = rest.find(['[', ':']).unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }

    let mut tail = &rest[name_end..];
    let mut selector = None;
    if tail.starts_with('[') {
        let close = matching_bracket(tail)?;
        selector = Some(tail[1..close].to_string());
        tail = &tail[close + 1..];
    }

    let tail = tail.trim();
    let filter = if tail.is_empty() {
        None
    } else if tail.starts_with(':') {
        Some(tail.to_string())
    } else {
        return None;
    };

    Some(Header {
        prefix,
        name: name.to_string(),
        selector,
        filter,
    })
}

/// Byte index of the `]` closing the `[` at the start of `text`.
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
