//! Boolean prerequisite expression parser.
//!
//! Catalogue prerequisite fields are boolean expressions over module codes
//! joined by `and`/`or`/parentheses, with an optional `co-requisite`
//! qualifier before a code:
//!
//! ```text
//! MT3502 and (MT3503 or co-requisite MT3504)
//! ```
//!
//! The expression is tokenized and parsed with a recursive-descent parser,
//! then evaluated against a membership resolver. Strings are never
//! rewritten into executable code.

use anyhow::{bail, Result};

use crate::catalogue::is_module_code;

/// One token of a prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Code(String),
    And,
    Or,
    CoRequisite,
    Open,
    Close,
}

/// A parsed prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A single module requirement. `co_requisite` requirements are
    /// satisfiable by concurrent enrolment as well as prior passes.
    Requirement { code: String, co_requisite: bool },
    /// All sub-expressions must hold (`and`).
    All(Vec<Expr>),
    /// At least one sub-expression must hold (`or`).
    Any(Vec<Expr>),
}

impl Expr {
    /// Evaluate the expression. The resolver receives each module code
    /// together with its co-requisite flag and decides membership.
    pub fn evaluate(&self, resolve: &dyn Fn(&str, bool) -> bool) -> bool {
        match self {
            Self::Requirement { code, co_requisite } => resolve(code, *co_requisite),
            Self::All(parts) => parts.iter().all(|part| part.evaluate(resolve)),
            Self::Any(parts) => parts.iter().any(|part| part.evaluate(resolve)),
        }
    }
}

/// Split a raw prerequisite string into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let push_word = |word: &mut String, tokens: &mut Vec<Token>| -> Result<()> {
        if word.is_empty() {
            return Ok(());
        }
        let token = match word.as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "co-requisite" => Token::CoRequisite,
            code if is_module_code(code) => Token::Code(code.to_string()),
            other => bail!("unexpected token '{}' in prerequisite expression", other),
        };
        tokens.push(token);
        word.clear();
        Ok(())
    };

    for ch in input.chars() {
        match ch {
            '(' => {
                push_word(&mut word, &mut tokens)?;
                tokens.push(Token::Open);
            }
            ')' => {
                push_word(&mut word, &mut tokens)?;
                tokens.push(Token::Close);
            }
            c if c.is_whitespace() || c == ',' => {
                push_word(&mut word, &mut tokens)?;
            }
            c => word.push(c),
        }
    }
    push_word(&mut word, &mut tokens)?;

    Ok(tokens)
}

/// Parse a raw prerequisite string into an expression tree.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        bail!("empty prerequisite expression");
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        bail!("trailing tokens in prerequisite expression '{}'", input);
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut parts = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            parts.push(self.parse_and()?);
        }
        if parts.len() == 1 {
            Ok(parts.pop().unwrap())
        } else {
            Ok(Expr::Any(parts))
        }
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut parts = vec![self.parse_atom()?];
        while self.peek() == Some(&Token::And) {
            self.advance();
            parts.push(self.parse_atom()?);
        }
        if parts.len() == 1 {
            Ok(parts.pop().unwrap())
        } else {
            Ok(Expr::All(parts))
        }
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Open) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    _ => bail!("unbalanced parentheses in prerequisite expression"),
                }
            }
            Some(Token::CoRequisite) => match self.advance() {
                Some(Token::Code(code)) => Ok(Expr::Requirement {
                    code,
                    co_requisite: true,
                }),
                _ => bail!("'co-requisite' must be followed by a module code"),
            },
            Some(Token::Code(code)) => Ok(Expr::Requirement {
                code,
                co_requisite: false,
            }),
            other => bail!("unexpected token {:?} in prerequisite expression", other),
        }
    }
}

/// Render the expression with each module code replaced by the truth value
/// the resolver assigns it. Used in finding messages so the adviser can see
/// how the expression was decided.
pub fn substitute(input: &str, resolve: &dyn Fn(&str, bool) -> bool) -> Result<String> {
    let tokens = tokenize(input)?;
    let mut rendered = String::new();
    let mut pending_coreq = false;

    for (index, token) in tokens.iter().enumerate() {
        let piece = match token {
            Token::Code(code) => {
                let value = resolve(code, pending_coreq);
                pending_coreq = false;
                if value { "true" } else { "false" }.to_string()
            }
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::CoRequisite => {
                // Qualifier is consumed into the next code's truth value.
                pending_coreq = true;
                continue;
            }
            Token::Open => "(".to_string(),
            Token::Close => ")".to_string(),
        };

        let after_open = rendered.ends_with('(');
        let is_close = matches!(token, Token::Close);
        if index > 0 && !rendered.is_empty() && !after_open && !is_close {
            rendered.push(' ');
        }
        rendered.push_str(&piece);
    }

    Ok(rendered)
}
