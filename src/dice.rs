//! Dice notation: `3d6+2d4-1`, `d20`, `-3` ...
use serde::Deserialize;

/// Upper bound on the number of dice a single expression may ask for.
pub const MAX_DICE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieSpec {
    pub sides: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    #[default]
    Normal,
    #[serde(alias = "fortune")]
    Advantage,
    #[serde(alias = "misfortune")]
    Disadvantage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    pub dice:     Vec<DieSpec>,
    pub modifier: i32,
    pub mode:     RollMode,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid number of sides in `{0}`")]
    InvalidSides(String),

    #[error("invalid modifier `{0}`")]
    InvalidModifier(String),

    #[error("invalid dice expression `{0}`")]
    InvalidExpression(String),

    #[error("too many dice (at most 1000 per roll)")]
    TooManyDice,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} only applies to a single d20 roll")]
pub struct ModeError(pub RollMode);

/// Parses `expression` into a normal-mode request.
pub fn parse(expression: &str) -> Result<RollRequest, ParseError> {
    let expr: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if expr.is_empty() {
        return Err(ParseError::InvalidExpression(expression.into()));
    }

    let mut dice     = Vec::new();
    let mut modifier = 0i32;
    let mut total    = 0u32;

    for (negative, term) in terms(&expr, expression)? {
        match term.find(|c: char| c == 'd' || c == 'D') {
            Some(at) => {
                if negative {
                    return Err(ParseError::InvalidExpression(expression.into()));
                }
                let spec = die_term(&term[..at], &term[at + 1..], term)?;
                total = total.saturating_add(spec.count);
                if total > MAX_DICE {
                    return Err(ParseError::TooManyDice);
                }
                dice.push(spec);
            }
            None => {
                let bad = || ParseError::InvalidModifier(term.into());
                if !term.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(bad());
                }
                let value: i32 = term.parse().map_err(|_| bad())?;
                let signed = if negative { -value } else { value };
                modifier = modifier.checked_add(signed).ok_or_else(bad)?;
            }
        }
    }

    Ok(RollRequest { dice, modifier, mode: RollMode::Normal })
}

/// Parses and then switches the request into `mode`.
pub fn parse_with_mode(expression: &str, mode: RollMode) -> Result<RollRequest, crate::error::AppErr> {
    Ok(parse(expression)?.with_mode(mode)?)
}

impl RollRequest {
    /// Advantage/disadvantage need exactly one d20 term (`d20`, `1d20` or `2d20`).
    pub fn with_mode(mut self, mode: RollMode) -> Result<Self, ModeError> {
        if mode != RollMode::Normal {
            match self.dice.as_slice() {
                [DieSpec { sides: 20, count: 1 | 2 }] => {}
                _ => return Err(ModeError(mode)),
            }
        }
        self.mode = mode;
        Ok(self)
    }

    pub fn dice_count(&self) -> u32 {
        self.dice.iter().map(|d| d.count).sum()
    }
}

/* split on +/-, keeping each term's sign; an empty term is an error */
fn terms<'a>(expr: &'a str, original: &str) -> Result<Vec<(bool, &'a str)>, ParseError> {
    let mut out      = Vec::new();
    let mut negative = false;
    let mut start    = 0;

    for (i, c) in expr.char_indices() {
        if c == '+' || c == '-' {
            if i == 0 {
                negative = c == '-';
                start = 1;
                continue;
            }
            out.push((negative, &expr[start..i]));
            negative = c == '-';
            start = i + 1;
        }
    }
    out.push((negative, &expr[start..]));

    if out.iter().any(|(_, t)| t.is_empty()) {
        return Err(ParseError::InvalidExpression(original.into()));
    }
    Ok(out)
}

fn die_term(count: &str, sides: &str, term: &str) -> Result<DieSpec, ParseError> {
    let count = if count.is_empty() {
        1
    } else {
        // digits only: "0d6" falls back to one die, "xd6" is garbage
        if !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidExpression(term.into()));
        }
        match count.parse::<u32>() {
            Ok(0) => 1,
            Ok(n) => n,
            Err(_) => return Err(ParseError::TooManyDice),
        }
    };

    let bad = || ParseError::InvalidSides(term.into());
    if sides.is_empty() || !sides.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let sides: u32 = sides.parse().map_err(|_| bad())?;
    if sides < 2 {
        return Err(bad());
    }

    Ok(DieSpec { sides, count })
}
