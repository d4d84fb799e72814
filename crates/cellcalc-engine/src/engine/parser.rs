//! Formula parser.
//!
//! A recursive descent parser over a pre-scanned token list. Precedence,
//! lowest to highest:
//!
//! ```text
//! expr           := relational
//! relational     := additive (('>' | '<' | '=') additive)?
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := ('+' | '-' | 'not' | 'inc' | 'dec') unary | primary
//! primary        := NUMBER | COORDINATE | '(' expr ')'
//! ```
//!
//! Comparisons are non-associative: `1 < 2 < 3` is a syntax error.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::cell_ref::is_coordinate_syntax;
use super::error::CellError;

/// Parse formula text (without the leading `=`) into an expression tree.
pub fn parse(formula: &str) -> Result<Expr, CellError> {
    let tokens = tokenize(formula)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;

    if parser.peek() != &Token::Eof {
        return Err(CellError::Syntax(format!(
            "unexpected {} after expression",
            parser.peek().describe()
        )));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Coordinate(String),
    Not,
    Inc,
    Dec,
    Plus,
    Minus,
    Star,
    Slash,
    Greater,
    Less,
    Equal,
    LeftParen,
    RightParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Coordinate(c) => format!("reference {c}"),
            Token::Not => "'not'".to_string(),
            Token::Inc => "'inc'".to_string(),
            Token::Dec => "'dec'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Greater => "'>'".to_string(),
            Token::Less => "'<'".to_string(),
            Token::Equal => "'='".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Eof => "end of formula".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CellError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '>' => Some(Token::Greater),
            '<' => Some(Token::Less),
            '=' => Some(Token::Equal),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let (token, next) = scan_number(&chars, i)?;
            tokens.push(token);
            i = next;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(classify_word(word)?);
            continue;
        }

        return Err(CellError::Syntax(format!("unexpected character '{c}'")));
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

fn scan_number(chars: &[char], start: usize) -> Result<(Token, usize), CellError> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exponent only when digits follow, so `2e` stays a syntax error downstream.
    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| CellError::Syntax(format!("invalid number '{text}'")))?;
    if !value.is_finite() {
        return Err(CellError::Syntax(format!("number out of range '{text}'")));
    }
    Ok((Token::Number(value), i))
}

fn classify_word(word: String) -> Result<Token, CellError> {
    if word.eq_ignore_ascii_case("not") {
        Ok(Token::Not)
    } else if word.eq_ignore_ascii_case("inc") {
        Ok(Token::Inc)
    } else if word.eq_ignore_ascii_case("dec") {
        Ok(Token::Dec)
    } else if is_coordinate_syntax(&word) {
        Ok(Token::Coordinate(word.to_ascii_uppercase()))
    } else {
        Err(CellError::Syntax(format!("unknown identifier '{word}'")))
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(&mut self) -> Result<Expr, CellError> {
        self.parse_relational()
    }

    fn parse_relational(&mut self) -> Result<Expr, CellError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Token::Greater => BinaryOp::Gt,
            Token::Less => BinaryOp::Lt,
            Token::Equal => BinaryOp::Eq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(Expr::binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, CellError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, CellError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, CellError> {
        let op = match self.peek() {
            Token::Plus => UnaryOp::Pos,
            Token::Minus => UnaryOp::Neg,
            Token::Not => UnaryOp::Not,
            Token::Inc => UnaryOp::Inc,
            Token::Dec => UnaryOp::Dec,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_primary(&mut self) -> Result<Expr, CellError> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Coordinate(addr) => Ok(Expr::Reference(addr)),
            Token::LeftParen => {
                let inner = self.parse_expression()?;
                match self.advance() {
                    Token::RightParen => Ok(Expr::Group(Box::new(inner))),
                    other => Err(CellError::Syntax(format!(
                        "expected ')' but found {}",
                        other.describe()
                    ))),
                }
            }
            Token::Eof => Err(CellError::Syntax("missing operand".to_string())),
            other => Err(CellError::Syntax(format!(
                "expected a value but found {}",
                other.describe()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn cell(addr: &str) -> Expr {
        Expr::Reference(addr.to_string())
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                num(1.0),
                Expr::binary(BinaryOp::Mul, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        let expr = parse("8-4-2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(8.0), num(4.0)),
                num(2.0)
            )
        );
    }

    #[test]
    fn test_parse_relational_binds_loosest() {
        let expr = parse("A1+1 > b2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Gt,
                Expr::binary(BinaryOp::Add, cell("A1"), num(1.0)),
                cell("B2")
            )
        );
    }

    #[test]
    fn test_parse_relational_is_non_associative() {
        assert!(matches!(parse("1 < 2 < 3"), Err(CellError::Syntax(_))));
        assert!(matches!(parse("1 = 1 = 1"), Err(CellError::Syntax(_))));
    }

    #[test]
    fn test_parse_prefix_functions() {
        assert_eq!(
            parse("inc(C1)").unwrap(),
            Expr::unary(UnaryOp::Inc, Expr::Group(Box::new(cell("C1"))))
        );
        assert_eq!(
            parse("NOT dec 2").unwrap(),
            Expr::unary(UnaryOp::Not, Expr::unary(UnaryOp::Dec, num(2.0)))
        );
        assert_eq!(
            parse("--1").unwrap(),
            Expr::unary(UnaryOp::Neg, Expr::unary(UnaryOp::Neg, num(1.0)))
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse("0.25").unwrap(), num(0.25));
        assert_eq!(parse(".5").unwrap(), num(0.5));
        assert_eq!(parse("1e3").unwrap(), num(1000.0));
        assert_eq!(parse("2.5E-1").unwrap(), num(0.25));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in [
            "", "   ", "(1+2", "1+2)", "1+", "*2", "1 2", "A1 B1", "foo", "A1B2", "1,5", "2e",
            "1e400", "()", "$A$1",
        ] {
            assert!(matches!(parse(bad), Err(CellError::Syntax(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_references_in_order() {
        let expr = parse("a1 * (B2 - inc Z9)").unwrap();
        assert_eq!(expr.references(), vec!["A1", "B2", "Z9"]);
    }
}
