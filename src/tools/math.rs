//! Arithmetic over a closed grammar. Nothing here executes user-provided code:
//! input is tokenized against a fixed character set and evaluated by a
//! recursive-descent parser.
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/' | '//') unary)*
//! unary := ('+' | '-') unary | power
//! power := atom ('**' unary)?
//! atom  := number | '(' expr ')'
//! ```

use async_trait::async_trait;

use super::names;
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::ToolError;

const MAX_DEPTH: usize = 64;
const MAX_INPUT_CHARS: usize = 256;

#[derive(Clone, Default)]
pub struct MathTool;

impl ToolSpec for MathTool {
    fn name(&self) -> &'static str {
        names::MATH
    }
    fn description(&self) -> &'static str {
        "Performs basic mathematical calculations. Input: mathematical expression using +, -, *, /, ()."
    }
}

#[async_trait]
impl Tool for MathTool {
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let value = evaluate(input.trim().trim_matches(|c| c == '"' || c == '\''))?;
        Ok(format_number(value))
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.') || c.is_whitespace()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    FloorDiv,
    Pow,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ToolError> {
    if let Some(bad) = input.chars().find(|c| !is_allowed(*c)) {
        return Err(ToolError::InvalidInput(format!(
            "Invalid mathematical expression: character '{bad}' is not allowed. Only basic operations are allowed."
        )));
    }
    let chars: Vec<char> = input.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let lit: String = chars[start..i].iter().collect();
                if lit.matches('.').count() > 1 || lit == "." {
                    return Err(ToolError::InvalidInput(format!("malformed number '{lit}'")));
                }
                let v = lit
                    .parse::<f64>()
                    .map_err(|_| ToolError::InvalidInput(format!("malformed number '{lit}'")))?;
                out.push(Token::Num(v));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push(Token::Pow);
                i += 2;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                out.push(Token::FloorDiv);
                i += 2;
            }
            '+' => {
                out.push(Token::Plus);
                i += 1;
            }
            '-' => {
                out.push(Token::Minus);
                i += 1;
            }
            '*' => {
                out.push(Token::Star);
                i += 1;
            }
            '/' => {
                out.push(Token::Slash);
                i += 1;
            }
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            _ => {
                out.push(Token::RParen);
                i += 1;
            }
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn descend(&mut self) -> Result<(), ToolError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ToolError::InvalidInput("expression nested too deeply".into()));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, ToolError> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, ToolError> {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::FloorDiv)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = match op {
                Token::Star => acc * rhs,
                _ if rhs == 0.0 => return Err(ToolError::InvalidInput("division by zero".into())),
                Token::Slash => acc / rhs,
                _ => (acc / rhs).floor(),
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, ToolError> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) => {
                let neg = self.bump() == Some(Token::Minus);
                self.descend()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(if neg { -v } else { v })
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, ToolError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            self.descend()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, ToolError> {
        match self.bump() {
            Some(Token::Num(v)) => Ok(v),
            Some(Token::LParen) => {
                self.descend()?;
                let v = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some(Token::RParen) => Ok(v),
                    _ => Err(ToolError::InvalidInput("unbalanced parentheses".into())),
                }
            }
            Some(t) => Err(ToolError::InvalidInput(format!("unexpected token {t:?}"))),
            None => Err(ToolError::InvalidInput("unexpected end of expression".into())),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, ToolError> {
    if input.chars().count() > MAX_INPUT_CHARS {
        return Err(ToolError::InvalidInput("expression too long".into()));
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ToolError::InvalidInput("empty expression".into()));
    }
    let mut p = Parser { tokens, pos: 0, depth: 0 };
    let v = p.expr()?;
    if p.pos != p.tokens.len() {
        return Err(ToolError::InvalidInput("unexpected trailing input".into()));
    }
    if !v.is_finite() {
        return Err(ToolError::InvalidInput("result is not a finite number".into()));
    }
    Ok(v)
}

/// Integral values print without a fraction; everything else uses shortest float form.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let i = v as i64;
        // Avoid "-0".
        if i == 0 {
            "0".into()
        } else {
            i.to_string()
        }
    } else {
        format!("{v}")
    }
}

/// Find the longest arithmetic expression embedded in free text, e.g. `"What is (3 + 4) * 2?"`.
/// Only runs that contain a binary operator and evaluate cleanly qualify.
pub fn extract_expression(text: &str) -> Option<String> {
    let mut best: Option<String> = None;
    for run in text.split(|c: char| !is_allowed(c)) {
        let candidate = run.trim().trim_end_matches('.').trim();
        if !has_binary_operator(candidate) || evaluate(candidate).is_err() {
            continue;
        }
        if best.as_ref().map_or(true, |b| candidate.len() > b.len()) {
            best = Some(candidate.to_string());
        }
    }
    best
}

fn has_binary_operator(s: &str) -> bool {
    let mut seen_operand = false;
    for c in s.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '0'..='9' | '.' | ')' => seen_operand = true,
            '+' | '-' | '*' | '/' if seen_operand => return true,
            _ => {}
        }
    }
    false
}
