// Policy rule language: a small subset of the oslo check-string grammar
//
//   expr  := and ("or" and)*
//   and   := not ("and" not)*
//   not   := "not" not | atom
//   atom  := "(" expr ")" | "@" | "!" | kind ":" match

use std::collections::HashMap;

use super::Target;
use crate::context::RequestContext;

const MAX_RULE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Allow,
    Deny,
    /// `rule:<name>`, resolved against the enforcer's rule table
    Rule(String),
    /// `role:<name>`
    Role(String),
    /// `<credential>:<match>`, e.g. `project_id:%(project_id)s` or `is_admin:True`
    Generic { key: String, value: MatchValue },
    Not(Box<Check>),
    And(Vec<Check>),
    Or(Vec<Check>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchValue {
    Literal(String),
    /// `%(field)s` substituted from the target
    TargetField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Atom(String),
}

fn tokenize(rule: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if current.is_empty() {
            return;
        }
        let word = std::mem::take(current);
        tokens.push(match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Atom(word),
        });
    };

    // Inside a `%(field)s` substitution parentheses belong to the atom
    let mut in_substitution = false;

    for c in rule.chars() {
        match c {
            '(' if current.ends_with('%') => {
                in_substitution = true;
                current.push(c);
            }
            ')' if in_substitution => {
                in_substitution = false;
                current.push(c);
            }
            '(' | ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(if c == '(' { Token::Open } else { Token::Close });
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Check, String> {
        let mut branches = vec![self.and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            branches.push(self.and()?);
        }
        Ok(collapse(branches, Check::Or))
    }

    fn and(&mut self) -> Result<Check, String> {
        let mut branches = vec![self.not()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            branches.push(self.not()?);
        }
        Ok(collapse(branches, Check::And))
    }

    fn not(&mut self) -> Result<Check, String> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Check::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Check, String> {
        match self.next() {
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err("unbalanced parentheses".to_string()),
                }
            }
            Some(Token::Atom(word)) => parse_check(&word),
            Some(other) => Err(format!("unexpected token {:?}", other)),
            None => Err("unexpected end of rule".to_string()),
        }
    }
}

fn collapse(mut branches: Vec<Check>, combine: fn(Vec<Check>) -> Check) -> Check {
    if branches.len() == 1 {
        branches.remove(0)
    } else {
        combine(branches)
    }
}

fn parse_check(word: &str) -> Result<Check, String> {
    match word {
        "@" => return Ok(Check::Allow),
        "!" => return Ok(Check::Deny),
        _ => {}
    }

    let (kind, rest) = word
        .split_once(':')
        .ok_or_else(|| format!("check '{}' is missing a ':'", word))?;
    if kind.is_empty() || rest.is_empty() {
        return Err(format!("check '{}' is incomplete", word));
    }

    Ok(match kind {
        "rule" => Check::Rule(rest.to_string()),
        "role" => Check::Role(rest.to_string()),
        _ => {
            let value = match rest.strip_prefix("%(").and_then(|r| r.strip_suffix(")s")) {
                Some(field) => MatchValue::TargetField(field.to_string()),
                None => MatchValue::Literal(rest.to_string()),
            };
            Check::Generic { key: kind.to_string(), value }
        }
    })
}

/// Parse a check string; the empty rule always allows
pub fn parse(rule: &str) -> Result<Check, String> {
    let tokens = tokenize(rule);
    if tokens.is_empty() {
        return Ok(Check::Allow);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let check = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!("trailing tokens after position {}", parser.pos));
    }
    Ok(check)
}

fn credential(ctx: &RequestContext, key: &str) -> Option<String> {
    match key {
        "project_id" => ctx.project_id.clone(),
        "user_id" => ctx.user_id.clone(),
        "is_admin" => Some(if ctx.is_admin { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

impl Check {
    /// Whether `ctx` passes this check. Rules nested deeper than
    /// `MAX_RULE_DEPTH` deny the whole evaluation.
    pub fn evaluate(
        &self,
        rules: &HashMap<String, Check>,
        target: &Target,
        ctx: &RequestContext,
    ) -> bool {
        self.evaluate_at(rules, target, ctx, 0).unwrap_or_else(|| {
            tracing::warn!("Policy rule nesting exceeded {} levels, denying", MAX_RULE_DEPTH);
            false
        })
    }

    /// `None` once the depth limit is hit, so `not` cannot turn it into an allow
    fn evaluate_at(
        &self,
        rules: &HashMap<String, Check>,
        target: &Target,
        ctx: &RequestContext,
        depth: usize,
    ) -> Option<bool> {
        if depth > MAX_RULE_DEPTH {
            return None;
        }

        match self {
            Check::Allow => Some(true),
            Check::Deny => Some(false),
            Check::Rule(name) => match rules.get(name) {
                Some(rule) => rule.evaluate_at(rules, target, ctx, depth + 1),
                None => Some(false),
            },
            Check::Role(role) => Some(ctx.has_role(role)),
            Check::Generic { key, value } => {
                let expected = match value {
                    MatchValue::Literal(v) => Some(v.as_str()),
                    MatchValue::TargetField(field) => target.get(field),
                };
                Some(match (expected, credential(ctx, key)) {
                    (Some(expected), Some(actual)) => expected == actual,
                    _ => false,
                })
            }
            Check::Not(inner) => inner.evaluate_at(rules, target, ctx, depth + 1).map(|allowed| !allowed),
            Check::And(branches) => {
                for branch in branches {
                    if !branch.evaluate_at(rules, target, ctx, depth + 1)? {
                        return Some(false);
                    }
                }
                Some(true)
            }
            Check::Or(branches) => {
                for branch in branches {
                    if branch.evaluate_at(rules, target, ctx, depth + 1)? {
                        return Some(true);
                    }
                }
                Some(false)
            }
        }
    }
}
