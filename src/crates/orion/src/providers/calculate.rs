//! Restricted arithmetic evaluator
//!
//! Input passes an allow-list gate first; anything outside
//! `0123456789+-*/(). ` is rejected without being looked at further. What
//! passes is tokenized and evaluated by a small recursive-descent parser:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```

use super::{ToolError, ToolResult};

const ALLOWED: &str = "0123456789+-*/(). ";
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate `expression` under the restricted grammar
pub fn calculate(expression: &str) -> ToolResult<f64> {
    if let Some(bad) = expression.chars().find(|c| !ALLOWED.contains(*c)) {
        return Err(ToolError::InputRejected(format!(
            "character '{}' is not allowed",
            bad
        )));
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ToolError::Evaluation("empty expression".into()));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(ToolError::Evaluation(format!(
            "unexpected {} at position {}",
            describe(token),
            parser.pos + 1
        )));
    }

    if !value.is_finite() {
        return Err(ToolError::Evaluation("result is not a finite number".into()));
    }
    Ok(value)
}

/// Print integral values without a fractional part
///
/// ```rust
/// use orion::providers::format_number;
///
/// assert_eq!(format_number(43.0), "43");
/// assert_eq!(format_number(3.5), "3.5");
/// ```
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn tokenize(input: &str) -> ToolResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            ' ' => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let value = literal.parse::<f64>().map_err(|_| {
                    ToolError::Evaluation(format!("invalid number '{}'", literal))
                })?;
                Token::Number(value)
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn describe(token: Token) -> String {
    match token {
        Token::Number(n) => format!("number {}", format_number(n)),
        Token::Plus => "'+'".into(),
        Token::Minus => "'-'".into(),
        Token::Star => "'*'".into(),
        Token::Slash => "'/'".into(),
        Token::LParen => "'('".into(),
        Token::RParen => "')'".into(),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> ToolResult<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> ToolResult<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ToolError::Evaluation("division by zero".into()));
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> ToolResult<f64> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(|p| p.unary())
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(|p| p.unary()).map(|v| -v)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> ToolResult<f64> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.nested(|p| p.expr())?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ToolError::Evaluation(format!(
                        "expected ')' but found {}",
                        describe(other)
                    ))),
                    None => Err(ToolError::Evaluation("missing ')'".into())),
                }
            }
            Some(other) => Err(ToolError::Evaluation(format!(
                "unexpected {}",
                describe(other)
            ))),
            None => Err(ToolError::Evaluation("unexpected end of expression".into())),
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> ToolResult<f64>) -> ToolResult<f64> {
        if self.depth >= MAX_DEPTH {
            return Err(ToolError::Evaluation("expression nested too deeply".into()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(calculate("5 * 8 + 3").unwrap(), 43.0);
        assert_eq!(calculate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(calculate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(calculate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(calculate("20 / 4 / 5").unwrap(), 1.0);
    }

    #[test]
    fn test_unary_and_decimals() {
        assert_eq!(calculate("-3 + 5").unwrap(), 2.0);
        assert_eq!(calculate("-(2 * -3)").unwrap(), 6.0);
        assert_eq!(calculate("1.5 * 2").unwrap(), 3.0);
        assert_eq!(calculate(".5 + .25").unwrap(), 0.75);
        assert_eq!(calculate("7 / 2").unwrap(), 3.5);
    }

    #[test]
    fn test_rejected_before_evaluation() {
        assert!(matches!(calculate("rm -rf /"), Err(ToolError::InputRejected(_))));
        assert!(matches!(calculate("2**1000; exit"), Err(ToolError::InputRejected(_))));
        assert!(matches!(calculate("__import__('os')"), Err(ToolError::InputRejected(_))));
    }

    #[test]
    fn test_grammar_errors_are_evaluation_failures() {
        for expr in ["", "   ", "2 +", "(1 + 2", "1 + 2)", "2 ** 3", "1.2.3", "()", "4 5"] {
            assert!(
                matches!(calculate(expr), Err(ToolError::Evaluation(_))),
                "expression: {:?}",
                expr
            );
        }
    }

    #[test]
    fn test_division_by_zero() {
        let err = calculate("1 / (2 - 2)").unwrap_err();
        assert!(matches!(err, ToolError::Evaluation(_)));
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let expr = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(matches!(calculate(&expr), Err(ToolError::Evaluation(_))));

        let unary = format!("{}1", "-".repeat(500));
        assert!(matches!(calculate(&unary), Err(ToolError::Evaluation(_))));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(43.0), "43");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(0.75), "0.75");
    }
}
