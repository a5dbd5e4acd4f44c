//! Timestamped tokens.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An immutable timestamped value held by a place.
///
/// A token becomes available for consumption once the global clock
/// reaches its `time`. Tokens are created by initial seeding or by a
/// firing, and destroyed when a later firing consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The payload.
    pub value: Value,
    /// Availability time on the simulation clock.
    pub time: f64,
}

impl Token {
    /// Create a token that becomes available at `time`.
    pub const fn new(value: Value, time: f64) -> Self {
        Self { value, time }
    }
}

impl core::fmt::Display for Token {
    /// Renders as `value@time`, e.g. `(intake7, 2)@3.5`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.value, self.time)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn token_displays_value_at_time() {
        let token = Token::new(Value::Int(1), 2.0);
        assert_eq!(token.to_string(), "1@2");
    }

    #[test]
    fn token_roundtrip_serde() {
        let original = Token::new(Value::pair(Value::text("intake1"), Value::Int(0)), 4.25);
        let json = serde_json::to_string(&original).unwrap();
        let restored: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }
}
