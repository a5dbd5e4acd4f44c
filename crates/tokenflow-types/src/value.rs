//! Token payload values.
//!
//! A token carries an opaque [`Value`]: an integer, a real, a string,
//! or a tuple of values. The engine never interprets payloads itself;
//! guards, effects, and policies do. Process scenarios conventionally
//! shape case tokens as `(case-id, counter)` pairs, where the counter
//! records how many milestones the case has passed -- the weighted
//! conflict policy reads that layout through [`Value::milestone_count`],
//! and tasks advance it with [`Value::bump_milestone`].

use serde::{Deserialize, Serialize};

/// An opaque token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A signed integer (counters, serial numbers).
    Int(i64),
    /// A real number.
    Real(f64),
    /// A string (case and resource identifiers).
    Str(String),
    /// An ordered tuple of values.
    Tuple(Vec<Value>),
}

impl Value {
    /// Build a two-element tuple.
    pub fn pair(first: Self, second: Self) -> Self {
        Self::Tuple(vec![first, second])
    }

    /// Build a string value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Sum the counters this payload carries for the named milestone.
    ///
    /// Two layouts are recognized, matching how case tokens are built:
    ///
    /// - flat: `(name, counter, ..)` -- counted when `name` is a string
    ///   containing `target`;
    /// - one level of nesting: a tuple whose elements include
    ///   `(name, counter, ..)` tuples -- every matching entry is
    ///   counted.
    ///
    /// Anything else (scalars, tuples shorter than two elements,
    /// non-string names) contributes zero.
    pub fn milestone_count(&self, target: &str) -> i64 {
        let Self::Tuple(items) = self else { return 0 };
        if items.len() < 2 {
            return 0;
        }
        let nested = items.iter().any(|item| matches!(item, Self::Tuple(_)));
        if nested {
            items
                .iter()
                .filter_map(|item| match item {
                    Self::Tuple(inner) => entry_count(inner, target),
                    _ => None,
                })
                .fold(0_i64, i64::saturating_add)
        } else {
            entry_count(items, target).unwrap_or(0)
        }
    }

    /// Advance the milestone counter of a case payload.
    ///
    /// A tuple with at least two elements collapses to
    /// `(first, counter + 1)` (a non-integer second element restarts
    /// the counter at 1). A one-element tuple gains a counter of 1,
    /// and a scalar becomes `(scalar, 1)`.
    pub fn bump_milestone(self) -> Self {
        match self {
            Self::Tuple(mut items) if items.len() > 1 => {
                let bumped = match items.get(1) {
                    Some(Self::Int(count)) => count.saturating_add(1),
                    _ => 1,
                };
                items.truncate(1);
                items.push(Self::Int(bumped));
                Self::Tuple(items)
            }
            Self::Tuple(mut items) => {
                items.push(Self::Int(1));
                Self::Tuple(items)
            }
            other => Self::Tuple(vec![other, Self::Int(1)]),
        }
    }
}

/// Counter of a single `(name, counter, ..)` entry, if it matches.
fn entry_count(entry: &[Value], target: &str) -> Option<i64> {
    match (entry.first(), entry.get(1)) {
        (Some(Value::Str(name)), Some(Value::Int(count))) if name.contains(target) => Some(*count),
        _ => None,
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Real(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flat_pair_counts_matching_name() {
        let case = Value::pair(Value::text("intake7"), Value::Int(3));
        assert_eq!(case.milestone_count("intake"), 3);
        assert_eq!(case.milestone_count("review"), 0);
    }

    #[test]
    fn nested_pairs_sum_matching_entries() {
        let busy = Value::Tuple(vec![
            Value::pair(Value::text("intake7"), Value::Int(2)),
            Value::text("clerk-0"),
            Value::pair(Value::text("intake9"), Value::Int(4)),
        ]);
        assert_eq!(busy.milestone_count("intake"), 6);
    }

    #[test]
    fn nested_layout_ignores_flat_reading() {
        // Once any element is a tuple, only nested entries count: the
        // top-level (Str, Int) prefix is no longer a flat pair.
        let mixed = Value::Tuple(vec![
            Value::text("intake1"),
            Value::Int(9),
            Value::pair(Value::text("intake2"), Value::Int(1)),
        ]);
        assert_eq!(mixed.milestone_count("intake"), 1);
    }

    #[test]
    fn scalars_and_short_tuples_count_zero() {
        assert_eq!(Value::Int(5).milestone_count("x"), 0);
        assert_eq!(Value::text("x3").milestone_count("x"), 0);
        assert_eq!(
            Value::Tuple(vec![Value::text("x3")]).milestone_count("x"),
            0
        );
    }

    #[test]
    fn bump_increments_existing_counter() {
        let case = Value::pair(Value::text("intake7"), Value::Int(3));
        assert_eq!(
            case.bump_milestone(),
            Value::pair(Value::text("intake7"), Value::Int(4))
        );
    }

    #[test]
    fn bump_collapses_wider_tuples() {
        let wide = Value::Tuple(vec![
            Value::text("intake7"),
            Value::Int(3),
            Value::text("extra"),
        ]);
        assert_eq!(
            wide.bump_milestone(),
            Value::pair(Value::text("intake7"), Value::Int(4))
        );
    }

    #[test]
    fn bump_starts_counter_on_scalars() {
        assert_eq!(
            Value::text("intake7").bump_milestone(),
            Value::pair(Value::text("intake7"), Value::Int(1))
        );
        assert_eq!(
            Value::Tuple(vec![Value::text("intake7")]).bump_milestone(),
            Value::pair(Value::text("intake7"), Value::Int(1))
        );
    }

    #[test]
    fn display_is_compact() {
        let busy = Value::pair(
            Value::pair(Value::text("intake7"), Value::Int(2)),
            Value::text("clerk-0"),
        );
        assert_eq!(busy.to_string(), "((intake7, 2), clerk-0)");
    }

    #[test]
    fn value_roundtrip_serde() {
        let original = Value::pair(Value::text("intake7"), Value::Int(3));
        let json = serde_json::to_string(&original).unwrap();
        let restored: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }
}
