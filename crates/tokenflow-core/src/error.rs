//! Error types for the tokenflow engine.
//!
//! Two layers: [`ModelError`] covers configuration mistakes caught at
//! registration and seeding time, before the simulation may step, and
//! [`StepError`] covers fatal faults raised while stepping. Transient
//! conditions -- an empty incoming place, a guard rejecting every
//! combination -- are not errors; the affected event simply
//! contributes no bindings that step. Nothing here is retried: step
//! faults propagate to the caller, which decides whether to log and
//! halt the driver.

use tokenflow_types::PlaceId;

/// Errors raised while declaring the model or seeding initial tokens.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A place with this name already exists.
    #[error("place already declared: {name}")]
    DuplicatePlace {
        /// The duplicated place name.
        name: String,
    },

    /// An event with this name already exists.
    #[error("event already declared: {name}")]
    DuplicateEvent {
        /// The duplicated event name.
        name: String,
    },

    /// A place id was referenced that this engine never issued.
    #[error("unknown place id {place} referenced by {referrer}")]
    UnknownPlace {
        /// The unknown id.
        place: PlaceId,
        /// What referenced it (an event name, or "seed").
        referrer: String,
    },

    /// An event without incoming places can never be evaluated for
    /// readiness.
    #[error("event {event} has no incoming places")]
    NoIncomingPlaces {
        /// The offending event name.
        event: String,
    },

    /// Seed timestamps must be finite and non-negative.
    #[error("invalid seed time {time} for place {place}")]
    InvalidSeedTime {
        /// The place being seeded.
        place: String,
        /// The rejected timestamp.
        time: f64,
    },

    /// Model structure is frozen once the first step runs.
    #[error("cannot {operation} after the simulation has started")]
    SimulationStarted {
        /// The rejected operation.
        operation: String,
    },
}

/// Fatal faults raised while stepping.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A caller-supplied guard failed on the given values.
    #[error("guard of event {event} failed on {values}: {message}")]
    GuardFault {
        /// The event whose guard failed.
        event: String,
        /// The values the guard was called with.
        values: String,
        /// The guard's own failure message.
        message: String,
    },

    /// A caller-supplied effect failed on the given values.
    #[error("effect of event {event} failed on {values}: {message}")]
    EffectFault {
        /// The event whose effect failed.
        event: String,
        /// The values the effect was called with.
        values: String,
        /// The effect's own failure message.
        message: String,
    },

    /// The effect must return one output slot per outgoing place.
    #[error("effect of event {event} returned {actual} outputs, expected {expected}")]
    EffectArity {
        /// The offending event.
        event: String,
        /// The event's outgoing arc count.
        expected: usize,
        /// The number of outputs the effect returned.
        actual: usize,
    },

    /// Produced delays must be finite and non-negative.
    #[error("effect of event {event} produced invalid delay {delay} for place {place}")]
    InvalidDelay {
        /// The producing event.
        event: String,
        /// The destination place.
        place: String,
        /// The rejected delay.
        delay: f64,
    },

    /// The conflict policy chose a binding outside the offered list.
    #[error("conflict policy chose index {chosen} out of {offered} offered bindings")]
    PolicyContract {
        /// The out-of-range index.
        chosen: usize,
        /// How many bindings were offered.
        offered: usize,
    },

    /// A selected token disappeared between enumeration and commit.
    ///
    /// The engine serializes enumeration and commit, so this can only
    /// mean the same physical token was selected twice within one
    /// binding (an event listing one place on two incoming arcs) or an
    /// internal bookkeeping bug.
    #[error("token {token} vanished from place {place} before event {event} fired")]
    TokenVanished {
        /// The firing event.
        event: String,
        /// The place that no longer holds the token.
        place: String,
        /// The missing token.
        token: String,
    },

    /// An engine invariant was broken.
    #[error("engine invariant violated: {message}")]
    InvariantViolation {
        /// What went wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_render_their_context() {
        let err = ModelError::NoIncomingPlaces {
            event: String::from("collect"),
        };
        assert_eq!(err.to_string(), "event collect has no incoming places");
    }

    #[test]
    fn step_errors_render_their_context() {
        let err = StepError::PolicyContract {
            chosen: 4,
            offered: 2,
        };
        assert_eq!(
            err.to_string(),
            "conflict policy chose index 4 out of 2 offered bindings"
        );
    }
}
