//! Arithmetic expression evaluator
//!
//! Recursive-descent parser for the calculator tool. Supports + - * / % ^,
//! parentheses and unary minus. Evaluation is local; no LLM round trip.

use crate::error::{Result, UstaadError};

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64> {
    let mut parser = Parser { input: expression.as_bytes(), pos: 0 };
    parser.skip_whitespace();
    let value = parser.parse_expression()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(UstaadError::Validation(format!(
            "Unexpected character at position {} in expression: {}",
            parser.pos, expression
        )));
    }
    Ok(value)
}

/// Format an evaluation result the way a person would write it.
pub fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_expression(&mut self) -> Result<f64> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.parse_term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.parse_term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64> {
        let mut value = self.parse_power()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.parse_power()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.parse_power()?;
                }
                Some(b'%') => {
                    self.pos += 1;
                    value %= self.parse_power()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // Right-associative exponentiation
    fn parse_power(&mut self) -> Result<f64> {
        let base = self.parse_unary()?;
        self.skip_whitespace();
        if self.peek() == Some(b'^') {
            self.pos += 1;
            let exponent = self.parse_power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<f64> {
        self.skip_whitespace();
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(-self.parse_unary()?);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<f64> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.parse_expression()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return Err(UstaadError::Validation(
                        "Unbalanced parentheses in expression".to_string(),
                    ));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.parse_number(),
            _ => Err(UstaadError::Validation(format!(
                "Expected a number at position {}",
                self.pos
            ))),
        }
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| UstaadError::Validation("Invalid number".to_string()))?;
        text.parse::<f64>()
            .map_err(|_| UstaadError::Validation(format!("Invalid number: {}", text)))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(b' ') || self.peek() == Some(b'\t') {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2+2").unwrap(), 4.0);
        assert_eq!(evaluate("10 - 3 * 2").unwrap(), 4.0);
        assert_eq!(evaluate("(10 - 3) * 2").unwrap(), 14.0);
        assert_eq!(evaluate("7 / 2").unwrap(), 3.5);
        assert_eq!(evaluate("10 % 3").unwrap(), 1.0);
    }

    #[test]
    fn test_unary_and_power() {
        assert_eq!(evaluate("-4 + 6").unwrap(), 2.0);
        assert_eq!(evaluate("2^10").unwrap(), 1024.0);
        // Right-associative: 2^(3^2)
        assert_eq!(evaluate("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(evaluate("two plus two").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 + ").is_err());
        assert!(evaluate("").is_err());
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(4.0), "4");
        assert_eq!(format_result(3.5), "3.5");
    }
}
