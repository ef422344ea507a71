//! Operand range specifications.
//!
//! A spec is a comma-separated list of integers and inclusive `lo~hi`
//! ranges, optionally wrapped in one pair of parentheses:
//!
//! ```text
//! (2~9)        every integer from 2 to 9
//! 3, 7, 11~13  the values 3 and 7 plus 11, 12, 13
//! -5~5         negative bounds are fine
//! ```
//!
//! Parsing yields a [`RangeSpec`]. Only an accepted [`OperandSpec`] can be
//! sampled: acceptance requires that some component can produce a value
//! other than 1, since 1 is never handed out as an operand.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Largest digit count accepted by [`OperandSpec::digits`].
pub const MAX_DIGITS: u32 = 9;

/// One term of a range specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Component {
    /// A single literal value.
    Value { value: i32 },
    /// Every integer in `lo..=hi`. Always `lo <= hi`.
    Range { lo: i32, hi: i32 },
}

impl Component {
    /// Build a range, normalizing the bound order.
    pub fn range(a: i32, b: i32) -> Self {
        Component::Range {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// Whether this component can produce anything other than 1.
    pub fn covers_non_one(&self) -> bool {
        match *self {
            Component::Value { value } => value != 1,
            Component::Range { lo, hi } => !(lo == 1 && hi == 1),
        }
    }

    pub fn contains(&self, n: i32) -> bool {
        match *self {
            Component::Value { value } => value == n,
            Component::Range { lo, hi } => (lo..=hi).contains(&n),
        }
    }

    /// Inclusive bounds of the values this component can produce.
    pub fn bounds(&self) -> (i32, i32) {
        match *self {
            Component::Value { value } => (value, value),
            Component::Range { lo, hi } => (lo, hi),
        }
    }

    /// Draw one value, uniform over the component.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        match *self {
            Component::Value { value } => value,
            Component::Range { lo, hi } => rng.random_range(lo..=hi),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Value { value } => write!(f, "{value}"),
            Component::Range { lo, hi } => write!(f, "{lo}~{hi}"),
        }
    }
}

/// A parsed, not yet accepted, operand specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    components: Vec<Component>,
}

impl RangeSpec {
    /// Build a spec from components. Returns `SpecError::Empty` for an empty list.
    pub fn new(components: Vec<Component>) -> Result<Self, SpecError> {
        if components.is_empty() {
            return Err(SpecError::Empty);
        }
        Ok(Self { components })
    }

    /// Parse the textual form. Only syntax is checked here.
    pub fn parse(input: &str) -> Result<Self, SpecError> {
        let trimmed = input.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);

        if inner.trim().is_empty() {
            return Err(SpecError::Empty);
        }

        let components = inner
            .split(',')
            .enumerate()
            .map(|(i, term)| parse_term(term.trim(), i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Structural check: some component can produce a value other than 1.
    pub fn covers_non_one(&self) -> bool {
        self.components.iter().any(Component::covers_non_one)
    }

    /// Whether `n` belongs to the union of the declared components.
    pub fn contains(&self, n: i32) -> bool {
        self.components.iter().any(|c| c.contains(n))
    }

    /// Promote to a sampleable operand spec, enforcing non-1 coverage.
    pub fn accept(self) -> Result<OperandSpec, SpecError> {
        OperandSpec::new(self)
    }
}

impl FromStr for RangeSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

fn parse_term(term: &str, position: usize) -> Result<Component, SpecError> {
    if term.is_empty() {
        return Err(SpecError::EmptyTerm { position });
    }

    if term.contains('~') {
        let mut sides = term.split('~');
        let (Some(a), Some(b), None) = (sides.next(), sides.next(), sides.next()) else {
            return Err(SpecError::Syntax {
                term: term.to_string(),
                reason: "expected exactly one '~'".into(),
            });
        };
        let a = parse_int(a.trim(), term, "lower bound")?;
        let b = parse_int(b.trim(), term, "upper bound")?;
        return Ok(Component::range(a, b));
    }

    let value = parse_int(term, term, "value")?;
    Ok(Component::Value { value })
}

fn parse_int(text: &str, term: &str, what: &str) -> Result<i32, SpecError> {
    if text.is_empty() {
        return Err(SpecError::Syntax {
            term: term.to_string(),
            reason: format!("missing {what}"),
        });
    }
    text.parse::<i32>().map_err(|e| SpecError::Syntax {
        term: term.to_string(),
        reason: format!("{what} '{text}' is not an integer ({e})"),
    })
}

/// An accepted spec: guaranteed to be able to produce a value other than 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeSpec", into = "RangeSpec")]
pub struct OperandSpec {
    spec: RangeSpec,
}

impl OperandSpec {
    /// Accept a parsed spec, rejecting specs that can only produce 1.
    pub fn new(spec: RangeSpec) -> Result<Self, SpecError> {
        if !spec.covers_non_one() {
            return Err(SpecError::OnlyOnes {
                spec: spec.to_string(),
            });
        }
        Ok(Self { spec })
    }

    /// Parse and accept in one step.
    pub fn parse(input: &str) -> Result<Self, SpecError> {
        RangeSpec::parse(input)?.accept()
    }

    /// The range covering every `n`-digit positive integer.
    pub fn digits(n: u32) -> Result<Self, SpecError> {
        if !(1..=MAX_DIGITS).contains(&n) {
            return Err(SpecError::Syntax {
                term: n.to_string(),
                reason: format!("digit count must be between 1 and {MAX_DIGITS}"),
            });
        }
        let lo = 10i64.pow(n - 1);
        let hi = 10i64.pow(n) - 1;
        // MAX_DIGITS keeps both bounds inside i32.
        let component = Component::range(lo as i32, hi as i32);
        Self::new(RangeSpec {
            components: vec![component],
        })
    }

    pub fn spec(&self) -> &RangeSpec {
        &self.spec
    }

    /// Draw an operand: pick a component uniformly, then a value within it.
    ///
    /// A draw of 1 is discarded and the whole trial repeats, component
    /// included. The loop has no cap; acceptance guarantees a non-1 outcome
    /// has positive probability, so it ends almost surely.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let components = self.spec.components();
        loop {
            let component = &components[rng.random_range(0..components.len())];
            let value = component.sample(rng);
            if value != 1 {
                return value;
            }
            tracing::trace!(spec = %self.spec, "drew 1, redrawing");
        }
    }

    /// Number of distinct values `sample` can return.
    pub fn distinct_values(&self) -> u64 {
        let mut bounds: Vec<(i64, i64)> = self
            .spec
            .components()
            .iter()
            .map(|c| {
                let (lo, hi) = c.bounds();
                (i64::from(lo), i64::from(hi))
            })
            .collect();
        bounds.sort_unstable();

        let mut total: u64 = 0;
        let mut current: Option<(i64, i64)> = None;
        for (lo, hi) in bounds {
            match current {
                Some((cl, ch)) if lo <= ch + 1 => current = Some((cl, ch.max(hi))),
                Some((cl, ch)) => {
                    total += (ch - cl + 1) as u64;
                    current = Some((lo, hi));
                }
                None => current = Some((lo, hi)),
            }
        }
        if let Some((cl, ch)) = current {
            total += (ch - cl + 1) as u64;
        }

        if self.spec.contains(1) {
            total - 1
        } else {
            total
        }
    }
}

impl TryFrom<RangeSpec> for OperandSpec {
    type Error = SpecError;

    fn try_from(spec: RangeSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<OperandSpec> for RangeSpec {
    fn from(spec: OperandSpec) -> Self {
        spec.spec
    }
}

impl FromStr for OperandSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OperandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.spec, f)
    }
}
