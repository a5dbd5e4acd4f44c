//! The firing executor.
//!
//! Committing a binding consumes the selected tokens, invokes the
//! event's effect with the consumed values in arc order, and inserts
//! every produced token with timestamp `clock + delay`. The commit is
//! atomic from an observer's viewpoint: the effect runs and its
//! output is validated before any marking changes, and a mid-commit
//! invariant breach rolls the consumed tokens back before the fault
//! surfaces.

use serde::Serialize;
use tokenflow_types::{EventId, PlaceId, Token, Value};

use crate::binding::{Binding, render_values};
use crate::error::StepError;
use crate::event::Event;
use crate::place::Place;

/// One committed firing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firing {
    /// The event that fired.
    pub event: EventId,
    /// Name of the event that fired.
    pub event_name: String,
    /// Clock reading at commit.
    pub time: f64,
    /// Tokens consumed, one per incoming place in arc order.
    pub consumed: Vec<(PlaceId, Token)>,
    /// Tokens produced into outgoing places.
    pub produced: Vec<(PlaceId, Token)>,
}

/// Commit `binding` against the current markings at clock reading `now`.
pub(crate) fn commit(
    event: &Event,
    binding: Binding,
    places: &mut [Place],
    now: f64,
) -> Result<Firing, StepError> {
    let values: Vec<Value> = binding.values();

    // Run the effect and validate everything it returned before any
    // marking changes, so a fault leaves the model untouched.
    let outputs = (event.effect())(&values).map_err(|message| StepError::EffectFault {
        event: event.name().to_owned(),
        values: render_values(&values),
        message,
    })?;
    if outputs.len() != event.outgoing().len() {
        return Err(StepError::EffectArity {
            event: event.name().to_owned(),
            expected: event.outgoing().len(),
            actual: outputs.len(),
        });
    }

    let mut produced: Vec<(PlaceId, Token)> = Vec::new();
    for (arc, output) in event.outgoing().iter().zip(outputs) {
        let Some(out) = output else { continue };
        if !out.delay.is_finite() || out.delay < 0.0 {
            return Err(StepError::InvalidDelay {
                event: event.name().to_owned(),
                place: place_name(places, *arc),
                delay: out.delay,
            });
        }
        produced.push((*arc, Token::new(out.value, now + out.delay)));
    }

    // Consume the selected tokens; roll back on a missing one so no
    // partial firing is ever observable.
    let mut removed: Vec<(PlaceId, Token)> = Vec::new();
    for (arc, token) in &binding.selection {
        let taken = places
            .get_mut(arc.into_inner())
            .is_some_and(|place| place.remove(token));
        if !taken {
            for (undo_arc, undo_token) in removed {
                if let Some(place) = places.get_mut(undo_arc.into_inner()) {
                    place.insert(undo_token);
                }
            }
            return Err(StepError::TokenVanished {
                event: event.name().to_owned(),
                place: place_name(places, *arc),
                token: token.to_string(),
            });
        }
        removed.push((*arc, token.clone()));
    }

    // Produce.
    for (arc, token) in &produced {
        if let Some(place) = places.get_mut(arc.into_inner()) {
            place.insert(token.clone());
        }
    }

    Ok(Firing {
        event: binding.event,
        event_name: event.name().to_owned(),
        time: now,
        consumed: binding.selection,
        produced,
    })
}

/// Place name for fault messages; falls back to the raw id.
fn place_name(places: &[Place], id: PlaceId) -> String {
    places
        .get(id.into_inner())
        .map_or_else(|| id.to_string(), |place| place.name().to_owned())
}
