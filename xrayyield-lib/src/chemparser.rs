use std::collections::BTreeMap;

use crate::elements;
use crate::error::{Result, XrayYieldError};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(u16),
    Num(f64),
    LParen,
    RParen,
    Eos,
}

struct Tokenizer<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(chars: &'a [char]) -> Self {
        Tokenizer { chars, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next_token(&mut self) -> Result<Token> {
        let Some(ch) = self.peek() else {
            return Ok(Token::Eos);
        };

        match ch {
            '(' => {
                self.pos += 1;
                Ok(Token::LParen)
            }
            ')' => {
                self.pos += 1;
                Ok(Token::RParen)
            }
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_ascii_uppercase() => {
                let start = self.pos;
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_lowercase()) {
                    self.pos += 1;
                }
                let sym: String = self.chars[start..self.pos].iter().collect();
                elements::atomic_number(&sym)
                    .map(Token::Symbol)
                    .ok_or_else(|| {
                        XrayYieldError::InvalidFormula(format!("'{sym}' is not an element symbol"))
                    })
            }
            c => Err(XrayYieldError::InvalidFormula(format!(
                "unrecognized character '{c}' at position {}",
                self.pos
            ))),
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.pos;
        self.skip_digits();
        if self.peek() == Some('.') {
            self.pos += 1;
            self.skip_digits();
        }
        // An exponent needs digits after it; otherwise `E` starts Er, Es or Eu.
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut end = self.pos + 1;
            if matches!(self.chars.get(end), Some('+' | '-')) {
                end += 1;
            }
            if self.chars.get(end).is_some_and(|c| c.is_ascii_digit()) {
                self.pos = end;
                self.skip_digits();
            }
        }

        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| XrayYieldError::InvalidFormula(format!("invalid number '{s}'")))
    }
}

/// Parse a chemical formula into atom counts keyed by atomic number.
///
/// Supports nested parentheses, fractional stoichiometry (`Fe.7Mg.3O`) and
/// scientific notation (`Zn1.e-5Fe3O4`). `D` counts as hydrogen.
pub fn chemparse(formula: &str) -> Result<BTreeMap<u16, f64>> {
    let chars = preprocess_formula(formula);
    if chars.is_empty() {
        return Err(XrayYieldError::InvalidFormula("empty formula".to_string()));
    }

    let mut tokenizer = Tokenizer::new(&chars);
    let mut counts = BTreeMap::new();
    let first = tokenizer.next_token()?;
    let next = parse_sequence(&mut tokenizer, first, 1.0, &mut counts)?;

    if next != Token::Eos {
        return Err(XrayYieldError::InvalidFormula(format!(
            "unexpected token after formula: {formula}"
        )));
    }
    if counts.is_empty() {
        return Err(XrayYieldError::InvalidFormula(format!(
            "no elements in formula: {formula}"
        )));
    }
    Ok(counts)
}

/// Whitespace is dropped and a bare leading `.` in a number gets a `0`.
fn preprocess_formula(formula: &str) -> Vec<char> {
    let mut out: Vec<char> = Vec::with_capacity(formula.len() + 4);
    for ch in formula.chars().filter(|c| !c.is_whitespace()) {
        if ch == '.' && !out.last().is_some_and(|c| c.is_ascii_digit()) {
            out.push('0');
        }
        out.push(ch);
    }
    out
}

/// Parses `item*` where item is `Symbol count?` or `( sequence ) count?`,
/// accumulating `weight * count` into `counts`. Returns the first token that
/// does not start an item.
fn parse_sequence(
    tokenizer: &mut Tokenizer<'_>,
    mut current: Token,
    weight: f64,
    counts: &mut BTreeMap<u16, f64>,
) -> Result<Token> {
    loop {
        match current {
            Token::LParen => {
                // Group multiplier is only known after the closing paren.
                let mut inner = BTreeMap::new();
                let first = tokenizer.next_token()?;
                let next = parse_sequence(tokenizer, first, 1.0, &mut inner)?;
                if next != Token::RParen {
                    return Err(XrayYieldError::InvalidFormula(
                        "expected closing parenthesis".to_string(),
                    ));
                }
                let (count, after) = read_count(tokenizer)?;
                for (z, n) in inner {
                    *counts.entry(z).or_insert(0.0) += weight * count * n;
                }
                current = after;
            }
            Token::Symbol(z) => {
                let (count, after) = read_count(tokenizer)?;
                *counts.entry(z).or_insert(0.0) += weight * count;
                current = after;
            }
            other => return Ok(other),
        }
    }
}

fn read_count(tokenizer: &mut Tokenizer<'_>) -> Result<(f64, Token)> {
    match tokenizer.next_token()? {
        Token::Num(n) => Ok((n, tokenizer.next_token()?)),
        other => Ok((1.0, other)),
    }
}
