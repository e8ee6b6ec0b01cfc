//! Small arithmetic evaluator for array indices and table expressions.
//!
//! Supports numbers, named variables, `+ - * /`, `^` and `**` powers, unary
//! signs, parentheses, the constant `pi` and the common one- and two-argument
//! functions. Integer operands stay integers under `+ - *` and non-negative
//! integer powers so array indices come out exact.

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// The value as a float.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(i) => i as f64,
            Value::Float(x) => x,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::Float(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Evaluation failure with the byte offset it was detected at.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at offset {offset}")]
pub struct ArithError {
    pub offset: usize,
    pub message: String,
}

impl ArithError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Value),
    Ident(String),
    Op(char),
    Pow,
    OpenParen,
    CloseParen,
    Comma,
}

/// Expression evaluator with a set of bound variables.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    vars: HashMap<String, Value>,
}

impl Evaluator {
    /// Create an evaluator without variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method binding a variable.
    pub fn with_var(mut self, name: &str, value: Value) -> Self {
        self.set_var(name, value);
        self
    }

    /// Bind or rebind a variable.
    pub fn set_var(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Evaluate an expression.
    pub fn eval(&self, expr: &str) -> Result<Value, ArithError> {
        let tokens = tokenize(expr)?;
        let mut parser = ExprParser {
            tokens,
            pos: 0,
            vars: &self.vars,
            end: expr.len(),
        };
        let value = parser.expression()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(value),
            Some((offset, _)) => Err(ArithError::new(*offset, "unexpected trailing input")),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<(usize, Token)>, ArithError> {
    let mut chars: Peekable<CharIndices<'_>> = expr.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => read_number(expr, &mut chars)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                Token::Ident(expr[pos..end].to_string())
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '*'))) {
                    chars.next();
                    Token::Pow
                } else {
                    Token::Op('*')
                }
            }
            '^' => {
                chars.next();
                Token::Pow
            }
            '+' | '-' | '/' => {
                chars.next();
                Token::Op(ch)
            }
            '(' => {
                chars.next();
                Token::OpenParen
            }
            ')' => {
                chars.next();
                Token::CloseParen
            }
            ',' => {
                chars.next();
                Token::Comma
            }
            other => return Err(ArithError::new(pos, format!("unexpected character '{other}'"))),
        };
        tokens.push((pos, token));
    }

    Ok(tokens)
}

fn read_number(expr: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ArithError> {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(expr.len());
    let mut end = start;
    let mut is_float = false;
    let mut prev = '\0';

    while let Some(&(i, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' => true,
            '.' => {
                is_float = true;
                true
            }
            'e' | 'E' => {
                is_float = true;
                true
            }
            '+' | '-' => prev == 'e' || prev == 'E',
            _ => false,
        };
        if !accept {
            break;
        }
        prev = c;
        end = i + c.len_utf8();
        chars.next();
    }

    let text = &expr[start..end];
    let value = if is_float {
        text.parse::<f64>().map(Value::Float).ok()
    } else {
        text.parse::<i64>().map(Value::Int).ok()
    };
    value
        .map(Token::Number)
        .ok_or_else(|| ArithError::new(start, format!("invalid number '{text}'")))
}

struct ExprParser<'a> {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    vars: &'a HashMap<String, Value>,
    end: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(o, _)| *o).unwrap_or(self.end)
    }

    fn expect(&mut self, token: Token) -> Result<(), ArithError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ArithError::new(self.offset(), format!("expected {token:?}")))
        }
    }

    fn expression(&mut self) -> Result<Value, ArithError> {
        let mut lhs = self.term()?;
        while let Some(&Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Value, ArithError> {
        let mut lhs = self.unary()?;
        while let Some(&Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Value, ArithError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(match self.unary()? {
                    Value::Int(i) => i.checked_neg().map_or(Value::Float(-(i as f64)), Value::Int),
                    Value::Float(x) => Value::Float(-x),
                })
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Value, ArithError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(pow(base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Value, ArithError> {
        let offset = self.offset();
        let token = match self.tokens.get(self.pos) {
            Some((_, token)) => token.clone(),
            None => return Err(ArithError::new(offset, "unexpected end of expression")),
        };
        self.pos += 1;

        match token {
            Token::Number(value) => Ok(value),
            Token::OpenParen => {
                let value = self.expression()?;
                self.expect(Token::CloseParen)?;
                Ok(value)
            }
            Token::Ident(name) => {
                if self.peek() == Some(&Token::OpenParen) {
                    self.pos += 1;
                    let mut args = vec![self.expression()?];
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        args.push(self.expression()?);
                    }
                    self.expect(Token::CloseParen)?;
                    return call(&name, &args).ok_or_else(|| {
                        ArithError::new(offset, format!("unknown function '{name}'"))
                    });
                }
                if let Some(value) = self.vars.get(&name) {
                    return Ok(*value);
                }
                match name.as_str() {
                    "pi" => Ok(Value::Float(std::f64::consts::PI)),
                    _ => Err(ArithError::new(offset, format!("unknown variable '{name}'"))),
                }
            }
            other => Err(ArithError::new(offset, format!("unexpected {other:?}"))),
        }
    }
}

fn binary(op: char, lhs: Value, rhs: Value) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let exact = match op {
            '+' => a.checked_add(b),
            '-' => a.checked_sub(b),
            '*' => a.checked_mul(b),
            _ => None,
        };
        if let Some(value) = exact {
            return Value::Int(value);
        }
    }
    let (a, b) = (lhs.as_f64(), rhs.as_f64());
    Value::Float(match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        _ => a / b,
    })
}

fn pow(base: Value, exponent: Value) -> Value {
    if let (Value::Int(b), Value::Int(e)) = (base, exponent) {
        if let Some(value) = u32::try_from(e).ok().and_then(|e| b.checked_pow(e)) {
            return Value::Int(value);
        }
    }
    Value::Float(base.as_f64().powf(exponent.as_f64()))
}

fn to_int(x: f64) -> Value {
    if x.is_finite() && x.abs() < i64::MAX as f64 {
        Value::Int(x as i64)
    } else {
        Value::Float(x)
    }
}

fn call(name: &str, args: &[Value]) -> Option<Value> {
    let x = args[0].as_f64();
    let value = match (name, args.len()) {
        ("abs", 1) => match args[0] {
            Value::Int(i) => return i.checked_abs().map(Value::Int),
            Value::Float(x) => Value::Float(x.abs()),
        },
        ("flr" | "floor", 1) => to_int(x.floor()),
        ("ceil", 1) => to_int(x.ceil()),
        ("round", 1) => to_int(x.round()),
        ("sqrt", 1) => Value::Float(x.sqrt()),
        ("exp", 1) => Value::Float(x.exp()),
        ("ln" | "log", 1) => Value::Float(x.ln()),
        ("log10", 1) => Value::Float(x.log10()),
        ("sin", 1) => Value::Float(x.sin()),
        ("cos", 1) => Value::Float(x.cos()),
        ("tan", 1) => Value::Float(x.tan()),
        ("asin", 1) => Value::Float(x.asin()),
        ("acos", 1) => Value::Float(x.acos()),
        ("atan", 1) => Value::Float(x.atan()),
        ("sinh", 1) => Value::Float(x.sinh()),
        ("cosh", 1) => Value::Float(x.cosh()),
        ("tanh", 1) => Value::Float(x.tanh()),
        ("heav", 1) => Value::Int(i64::from(x >= 0.0)),
        ("sign", 1) => Value::Int(if x > 0.0 {
            1
        } else if x < 0.0 {
            -1
        } else {
            0
        }),
        ("atan2", 2) => Value::Float(x.atan2(args[1].as_f64())),
        ("max", 2) => match (args[0], args[1]) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.max(b)),
            (a, b) => Value::Float(a.as_f64().max(b.as_f64())),
        },
        ("min", 2) => match (args[0], args[1]) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.min(b)),
            (a, b) => Value::Float(a.as_f64().min(b.as_f64())),
        },
        ("mod", 2) => match (args[0], args[1]) {
            (Value::Int(a), Value::Int(b)) => return a.checked_rem_euclid(b).map(Value::Int),
            (a, b) => Value::Float(a.as_f64().rem_euclid(b.as_f64())),
        },
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_arithmetic_stays_exact() {
        let eval = Evaluator::new().with_var("j", Value::Int(3));
        assert_eq!(eval.eval("j").unwrap(), Value::Int(3));
        assert_eq!(eval.eval("j+1").unwrap(), Value::Int(4));
        assert_eq!(eval.eval("2*j-1").unwrap(), Value::Int(5));
        assert_eq!(eval.eval("j^2").unwrap(), Value::Int(9));
        assert_eq!(eval.eval("-(j-5)").unwrap(), Value::Int(2));
        assert_eq!(eval.eval("mod(j+1,3)").unwrap(), Value::Int(1));
        assert_eq!(eval.eval("flr(j/2)").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_division_yields_float() {
        let eval = Evaluator::new();
        assert_eq!(eval.eval("4/2").unwrap(), Value::Float(2.0));
        assert!(eval.eval("3/2").unwrap().as_int().is_none());
    }

    #[test]
    fn test_float_expressions() {
        let eval = Evaluator::new().with_var("t", Value::Float(0.5));
        assert_relative_eq!(eval.eval("t**2").unwrap().as_f64(), 0.25);
        assert_relative_eq!(eval.eval("exp(-t)").unwrap().as_f64(), (-0.5f64).exp());
        assert_relative_eq!(eval.eval("sin(pi*t)").unwrap().as_f64(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(eval.eval("1.5e-3*2").unwrap().as_f64(), 3e-3);
        assert_relative_eq!(eval.eval("-2^2").unwrap().as_f64(), -4.0);
    }

    #[test]
    fn test_errors() {
        let eval = Evaluator::new();
        assert_eq!(eval.eval("k+1").unwrap_err().offset, 0);
        assert_eq!(eval.eval("1+").unwrap_err().offset, 2);
        assert_eq!(eval.eval("(1+2").unwrap_err().offset, 4);
        assert!(eval.eval("foo(1)").is_err());
        assert!(eval.eval("1 2").is_err());
        assert!(eval.eval("1#2").is_err());
    }
}
