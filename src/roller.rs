use rand::Rng;
use serde::Serialize;

use crate::dice::{RollMode, RollRequest};

/// Where die faces come from.
pub trait DieSource {
    /// A uniform face in `1..=sides`.
    fn draw(&mut self, sides: u32) -> u32;
}

/// Any `rand` generator; the service uses one per call via `thread_rng`.
pub struct RandomDice<R>(pub R);

impl<R: Rng> DieSource for RandomDice<R> {
    fn draw(&mut self, sides: u32) -> u32 {
        self.0.gen_range(1..=sides)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Critical {
    Success,
    Failure,
}

impl Critical {
    /* any 20 wins over any 1 */
    fn scan(d20s: &[u32]) -> Option<Self> {
        if d20s.contains(&20) {
            Some(Critical::Success)
        } else if d20s.contains(&1) {
            Some(Critical::Failure)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Critical::Success => "Critical Success!",
            Critical::Failure => "Critical Failure!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    /// Every face drawn, in order. Advantage/disadvantage report both d20s.
    pub results:  Vec<u32>,
    pub modifier: i32,
    pub total:    i64,
    pub text:     String,
    pub critical: Option<Critical>,
}

pub fn roll(req: &RollRequest, dice: &mut impl DieSource) -> RollOutcome {
    match req.mode {
        RollMode::Normal => roll_normal(req, dice),
        RollMode::Advantage | RollMode::Disadvantage => roll_twice(req, dice),
    }
}

fn roll_normal(req: &RollRequest, dice: &mut impl DieSource) -> RollOutcome {
    let mut results = Vec::with_capacity(req.dice_count() as usize);
    let mut d20s    = Vec::new();

    for spec in &req.dice {
        for _ in 0..spec.count {
            let face = dice.draw(spec.sides);
            if spec.sides == 20 {
                d20s.push(face);
            }
            results.push(face);
        }
    }

    let total    = results.iter().map(|&r| r as i64).sum::<i64>() + req.modifier as i64;
    let critical = Critical::scan(&d20s);
    let terms: Vec<String> = if results.is_empty() && req.modifier == 0 {
        vec!["0".into()]
    } else {
        results.iter().map(u32::to_string).collect()
    };

    RollOutcome {
        text: render(terms, req.modifier, total, critical),
        results,
        modifier: req.modifier,
        total,
        critical,
    }
}

fn roll_twice(req: &RollRequest, dice: &mut impl DieSource) -> RollOutcome {
    let (a, b) = (dice.draw(20), dice.draw(20));
    let (kept, label) = match req.mode {
        RollMode::Disadvantage => (a.min(b), "Disadvantage"),
        _                      => (a.max(b), "Advantage"),
    };

    let total    = kept as i64 + req.modifier as i64;
    let critical = Critical::scan(&[a, b]);
    let term     = format!("{a} / {b} ({label}: {kept})");

    RollOutcome {
        text: render(vec![term], req.modifier, total, critical),
        results: vec![a, b],
        modifier: req.modifier,
        total,
        critical,
    }
}

/* "4 + 2 + +1 = 7 (Critical Success!)" */
fn render(mut terms: Vec<String>, modifier: i32, total: i64, critical: Option<Critical>) -> String {
    if modifier != 0 {
        terms.push(format!("{modifier:+}"));
    }
    let mut text = format!("{} = {total}", terms.join(" + "));
    if let Some(c) = critical {
        text.push_str(&format!(" ({})", c.label()));
    }
    text
}
