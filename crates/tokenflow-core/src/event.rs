//! Event definitions.
//!
//! An event declares the places it consumes from and produces into,
//! an optional guard over the consumed values, and an effect that
//! builds the produced tokens. Guards and effects are opaque caller
//! contracts: the engine invokes them with one value per incoming
//! place in arc order and treats any `Err` they return as fatal,
//! surfacing the event name and the offending values. What a guard
//! means in domain terms is entirely the caller's business.

use tokenflow_types::{PlaceId, Value};

/// Output of an effect for one outgoing place.
#[derive(Debug, Clone, PartialEq)]
pub struct Produced {
    /// Payload of the produced token.
    pub value: Value,
    /// Delay added to the commit-time clock reading; must be finite
    /// and non-negative.
    pub delay: f64,
}

impl Produced {
    /// Produce `value` with no delay.
    pub const fn new(value: Value) -> Self {
        Self { value, delay: 0.0 }
    }

    /// Produce this token `delay` time units after the firing.
    pub const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Guard predicate over the consumed values, in incoming-arc order.
pub type GuardFn = Box<dyn Fn(&[Value]) -> Result<bool, String> + Send + Sync>;

/// Effect function: consumed values in, one output slot per outgoing
/// place out. `None` in a slot produces nothing on that arc.
pub type EffectFn = Box<dyn Fn(&[Value]) -> Result<Vec<Option<Produced>>, String> + Send + Sync>;

/// A named action over places.
///
/// Structure is immutable after registration; only the markings of
/// the referenced places change as the simulation runs.
pub struct Event {
    name: String,
    incoming: Vec<PlaceId>,
    outgoing: Vec<PlaceId>,
    guard: Option<GuardFn>,
    effect: EffectFn,
}

impl Event {
    /// Declare an event consuming one token from each place in
    /// `incoming` and producing into `outgoing` according to `effect`.
    pub fn new(
        name: impl Into<String>,
        incoming: Vec<PlaceId>,
        outgoing: Vec<PlaceId>,
        effect: impl Fn(&[Value]) -> Result<Vec<Option<Produced>>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            incoming,
            outgoing,
            guard: None,
            effect: Box::new(effect),
        }
    }

    /// Attach a guard; only token combinations the guard accepts
    /// become bindings.
    pub fn with_guard(
        mut self,
        guard: impl Fn(&[Value]) -> Result<bool, String> + Send + Sync + 'static,
    ) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// The event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Incoming places, in arc order.
    pub fn incoming(&self) -> &[PlaceId] {
        &self.incoming
    }

    /// Outgoing places, in arc order.
    pub fn outgoing(&self) -> &[PlaceId] {
        &self.outgoing
    }

    /// The guard, when present.
    pub(crate) const fn guard(&self) -> Option<&GuardFn> {
        self.guard.as_ref()
    }

    /// The effect function.
    pub(crate) const fn effect(&self) -> &EffectFn {
        &self.effect
    }
}

impl core::fmt::Debug for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("incoming", &self.incoming)
            .field("outgoing", &self.outgoing)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn produced_defaults_to_zero_delay() {
        let out = Produced::new(Value::Int(1));
        assert!(out.delay.abs() < f64::EPSILON);
        let delayed = Produced::new(Value::Int(1)).after(3.0);
        assert!((delayed.delay - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn event_reports_structure() {
        let event = Event::new(
            "pack",
            vec![PlaceId(0), PlaceId(1)],
            vec![PlaceId(2)],
            |_| Ok(vec![None]),
        )
        .with_guard(|_| Ok(true));

        assert_eq!(event.name(), "pack");
        assert_eq!(event.incoming(), &[PlaceId(0), PlaceId(1)]);
        assert_eq!(event.outgoing(), &[PlaceId(2)]);
        assert!(event.guard().is_some());
        let rendered = format!("{event:?}");
        assert!(rendered.contains("pack"));
    }
}
