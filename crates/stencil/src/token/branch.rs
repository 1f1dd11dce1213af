//! `{% if %}` / `{% elif %}` / `{% else %}` branch tags.

use serde_json::Value;
use stencil_rope::{FragmentId, Rope};

use crate::block::TemplateBlock;
use crate::error::{ParseError, RenderError};
use crate::manager::TokenManager;
use crate::path;
use crate::token::{skip_nested, trim_one_newline, Token, TokenSpan, TokenType};

const ELIF: &str = "{% elif ";
const ELSE: &str = "{% else %}";

/// How a branch condition is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondKind {
    /// Non-empty resolved text.
    Truthy,
    /// Membership of a literal key/value in a direct child of the root.
    In,
    NotIn,
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    /// An `else` branch, always true.
    Else,
}

/// One branch condition: an operator over up to two operands. Comparisons
/// are byte-wise over the operands' resolved text.
#[derive(Debug, Clone)]
pub struct IfCondition {
    kind: CondKind,
    arg: String,
    cmp: String,
}

impl IfCondition {
    fn otherwise() -> Self {
        Self {
            kind: CondKind::Else,
            arg: String::new(),
            cmp: String::new(),
        }
    }

    /// Classify by literal operator search: `<=`/`>=` before bare `<`/`>`,
    /// then `!=`, `==`, `" not in "`, `" in "`, else plain truthiness.
    pub(crate) fn parse(src: &str) -> Self {
        let src = src.trim_matches(' ');
        let (kind, at, op_len) = if let Some(p) = src.find('<') {
            if src[p + 1..].starts_with('=') {
                (CondKind::Le, p, 2)
            } else {
                (CondKind::Lt, p, 1)
            }
        } else if let Some(p) = src.find('>') {
            if src[p + 1..].starts_with('=') {
                (CondKind::Ge, p, 2)
            } else {
                (CondKind::Gt, p, 1)
            }
        } else if let Some(p) = src.find("!=") {
            (CondKind::Ne, p, 2)
        } else if let Some(p) = src.find("==") {
            (CondKind::Eq, p, 2)
        } else if let Some(p) = src.find(" not in ") {
            (CondKind::NotIn, p, 8)
        } else if let Some(p) = src.find(" in ") {
            (CondKind::In, p, 4)
        } else {
            return Self {
                kind: CondKind::Truthy,
                arg: src.to_string(),
                cmp: String::new(),
            };
        };
        Self {
            kind,
            arg: src[..at].trim_matches(' ').to_string(),
            cmp: src[at + op_len..].trim_matches(' ').to_string(),
        }
    }

    pub fn kind(&self) -> CondKind {
        self.kind
    }

    /// Evaluate against the data root. Lookup misses resolve to empty
    /// text, which compares like any other value and is never truthy.
    pub(crate) fn holds(&self, data: &Value) -> Result<bool, RenderError> {
        match self.kind {
            CondKind::Else => Ok(true),
            CondKind::Truthy => {
                let text = path::eval(data, &self.arg)?;
                Ok(text.is_some_and(|t| !t.is_empty()))
            }
            CondKind::In | CondKind::NotIn => {
                // a missing or scalar right operand satisfies neither form
                let found = match data.get(self.cmp.as_str()) {
                    Some(Value::Object(map)) => map.contains_key(&self.arg),
                    Some(Value::Array(items)) => {
                        items.iter().any(|item| path::scalar_text(item) == self.arg)
                    }
                    _ => return Ok(false),
                };
                Ok(if self.kind == CondKind::In {
                    found
                } else {
                    !found
                })
            }
            _ => {
                let lhs = path::eval(data, &self.arg)?.unwrap_or_default();
                let rhs = path::eval(data, &self.cmp)?.unwrap_or_default();
                Ok(match self.kind {
                    CondKind::Eq => lhs == rhs,
                    CondKind::Ne => lhs != rhs,
                    CondKind::Lt => lhs < rhs,
                    CondKind::Gt => lhs > rhs,
                    CondKind::Le => lhs <= rhs,
                    _ => lhs >= rhs,
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CondBlock {
    condition: IfCondition,
    block: TemplateBlock,
}

/// An `{% if %}...{% endif %}` tag with its ordered branches.
///
/// The first branch reuses the tag's entry fragment; every other branch
/// gets its own fragment spliced in right after the previous one, so
/// branches render and clear independently.
#[derive(Debug, Clone)]
pub struct IfToken {
    pub(crate) span: TokenSpan,
    branches: Vec<CondBlock>,
}

impl TokenType for IfToken {
    const START: &'static str = "{% if ";
    const END: &'static str = "{% endif %}";
    const PLACEHOLDER: &'static str = "<<<if>>>";

    fn parse(span: TokenSpan, rope: &mut Rope) -> Result<Token, ParseError> {
        let raw = scan_branches(&span.full)?;
        let mut branches = Vec::with_capacity(raw.len());
        let mut prev = span.entry;
        for (i, (condition, body)) in raw.into_iter().enumerate() {
            let body = trim_one_newline(body).to_string();
            let entry = if i == 0 {
                rope.replace(span.entry, &body);
                span.entry
            } else {
                prev = rope.insert_after(prev, &body);
                prev
            };
            branches.push(CondBlock {
                condition,
                block: TemplateBlock::new(entry, body),
            });
        }
        Ok(Token::If(IfToken { span, branches }))
    }
}

impl IfToken {
    pub(crate) fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub(crate) fn branch_block(&self, i: usize) -> Option<&TemplateBlock> {
        self.branches.get(i).map(|b| &b.block)
    }

    pub(crate) fn branch_block_mut(&mut self, i: usize) -> Option<&mut TemplateBlock> {
        self.branches.get_mut(i).map(|b| &mut b.block)
    }

    pub fn branch_conditions(&self) -> impl Iterator<Item = &IfCondition> {
        self.branches.iter().map(|b| &b.condition)
    }

    /// Render the first true branch and clear every other one.
    pub(crate) fn render(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
    ) -> Result<FragmentId, RenderError> {
        let mut chosen = None;
        for (i, branch) in self.branches.iter().enumerate() {
            if branch.condition.holds(data)? {
                chosen = Some(i);
                break;
            }
        }
        let mut last = self.span.entry;
        for (i, branch) in self.branches.iter().enumerate() {
            if chosen == Some(i) {
                if let Some(frag) = branch.block.render(tokens, data, rope)? {
                    last = frag;
                }
            } else {
                branch.block.clear(tokens, rope);
            }
        }
        Ok(last)
    }

    /// Stamp a copy of the first true branch after `after`. A copy with no
    /// true branch stamps nothing.
    pub(crate) fn duplicate(
        &self,
        tokens: &TokenManager,
        data: &mut Value,
        rope: &mut Rope,
        after: FragmentId,
    ) -> Result<FragmentId, RenderError> {
        for branch in &self.branches {
            if branch.condition.holds(data)? {
                return branch.block.duplicate(tokens, data, rope, after);
            }
        }
        Ok(after)
    }

    pub(crate) fn clear(&self, tokens: &TokenManager, rope: &mut Rope) {
        for branch in &self.branches {
            branch.block.clear(tokens, rope);
        }
    }
}

/// Split the full tag text into per-branch conditions and raw bodies,
/// skipping nested if regions.
fn scan_branches(full: &str) -> Result<Vec<(IfCondition, &str)>, ParseError> {
    let mut branches = Vec::new();
    let (mut condition, mut body_start) = scan_condition(full, IfToken::START.len())?;
    let mut at = body_start;
    loop {
        let rem = &full[at..];
        let found = [IfToken::END, ELSE, ELIF, IfToken::START]
            .iter()
            .filter_map(|marker| rem.find(marker).map(|p| (p, *marker)))
            .min_by_key(|(p, _)| *p);
        let Some((p, marker)) = found else {
            return Err(ParseError::MalformedIf {
                reason: "branch is missing its `{% endif %}`".to_string(),
            });
        };
        let marker_at = at + p;
        if marker == IfToken::START {
            // hop over the whole nested region
            let after = skip_nested(&full[marker_at + marker.len()..], IfToken::START, IfToken::END)?;
            at = full.len() - after.len();
            continue;
        }
        branches.push((condition, &full[body_start..marker_at]));
        if marker == IfToken::END {
            break;
        }
        if marker == ELSE {
            condition = IfCondition::otherwise();
            body_start = marker_at + ELSE.len();
        } else {
            let (cond, start) = scan_condition(full, marker_at + ELIF.len())?;
            condition = cond;
            body_start = start;
        }
        at = body_start;
    }
    Ok(branches)
}

/// Read a condition starting at `from`, up to its closing `%}`. Returns
/// the condition and the offset right after the closer.
fn scan_condition(full: &str, from: usize) -> Result<(IfCondition, usize), ParseError> {
    let rem = &full[from..];
    let close = rem.find("%}").ok_or_else(|| ParseError::MalformedIf {
        reason: "condition is missing its closing `%}`".to_string(),
    })?;
    let condition = IfCondition::parse(&rem[..close]);
    Ok((condition, from + close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_operators() {
        assert_eq!(IfCondition::parse("a").kind(), CondKind::Truthy);
        assert_eq!(IfCondition::parse("a == b").kind(), CondKind::Eq);
        assert_eq!(IfCondition::parse("a != b").kind(), CondKind::Ne);
        assert_eq!(IfCondition::parse("a < b").kind(), CondKind::Lt);
        assert_eq!(IfCondition::parse("a <= b").kind(), CondKind::Le);
        assert_eq!(IfCondition::parse("a > b").kind(), CondKind::Gt);
        assert_eq!(IfCondition::parse("a >= b").kind(), CondKind::Ge);
        assert_eq!(IfCondition::parse("a in b").kind(), CondKind::In);
        assert_eq!(IfCondition::parse("a not in b").kind(), CondKind::NotIn);
    }

    #[test]
    fn truthiness_is_non_empty_text() {
        let cond = IfCondition::parse("foo");
        assert!(cond.holds(&json!({"foo": "x"})).unwrap());
        assert!(cond.holds(&json!({"foo": 0})).unwrap());
        assert!(!cond.holds(&json!({"foo": ""})).unwrap());
        assert!(!cond.holds(&json!({"foo": null})).unwrap());
        assert!(!cond.holds(&json!({})).unwrap());
    }

    #[test]
    fn comparisons_are_byte_wise() {
        let data = json!({"a": "abc", "b": "abd", "n": 10});
        assert!(IfCondition::parse("a < b").holds(&data).unwrap());
        assert!(IfCondition::parse("a != b").holds(&data).unwrap());
        assert!(IfCondition::parse("a == 'abc'").holds(&data).unwrap());
        assert!(IfCondition::parse("n == 10").holds(&data).unwrap());
        // "10" < "9" byte-wise
        assert!(IfCondition::parse("n < 9").holds(&data).unwrap());
    }

    #[test]
    fn membership_over_maps_and_sequences() {
        let data = json!({"m": {"k": 1}, "s": ["x", "y"]});
        assert!(IfCondition::parse("k in m").holds(&data).unwrap());
        assert!(!IfCondition::parse("q in m").holds(&data).unwrap());
        assert!(IfCondition::parse("x in s").holds(&data).unwrap());
        assert!(IfCondition::parse("z not in s").holds(&data).unwrap());
        assert!(!IfCondition::parse("k in missing").holds(&data).unwrap());
    }

    #[test]
    fn membership_needs_a_container_operand() {
        let data = json!({"m": "scalar", "n": 3});
        assert!(!IfCondition::parse("k in m").holds(&data).unwrap());
        assert!(!IfCondition::parse("k not in m").holds(&data).unwrap());
        assert!(!IfCondition::parse("k in n").holds(&data).unwrap());
        assert!(!IfCondition::parse("k not in missing").holds(&data).unwrap());
    }

    #[test]
    fn scan_splits_branches() {
        let full = "{% if a %}A{% elif b %}B{% else %}C{% endif %}";
        let branches = scan_branches(full).unwrap();
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0].1, "A");
        assert_eq!(branches[1].1, "B");
        assert_eq!(branches[2].1, "C");
        assert_eq!(branches[0].0.kind(), CondKind::Truthy);
        assert_eq!(branches[2].0.kind(), CondKind::Else);
    }

    #[test]
    fn scan_hops_nested_ifs() {
        let full = "{% if a %}{% if b %}X{% endif %}{% endif %}";
        let branches = scan_branches(full).unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].1, "{% if b %}X{% endif %}");
    }

    #[test]
    fn nested_else_belongs_to_the_inner_if() {
        let full = "{% if a %}{% if b %}X{% else %}Y{% endif %}Z{% endif %}";
        let branches = scan_branches(full).unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].1, "{% if b %}X{% else %}Y{% endif %}Z");
    }
}
