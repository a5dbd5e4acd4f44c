//! Binding enumeration.
//!
//! A binding is one candidate firing of one event: one token selected
//! from each incoming place, with the binding time at which all of
//! them are simultaneously available. Enumeration walks the Cartesian
//! product of the incoming markings in arc order -- intentionally
//! combinatorial, callers bound their place sizes -- and filters the
//! combinations through the guard when one is present. Identical
//! combinations are not deduplicated.

use tokenflow_types::{EventId, PlaceId, Token, Value};

use crate::error::StepError;
use crate::event::Event;
use crate::place::Place;

/// One candidate firing of one event.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The event this binding would fire.
    pub event: EventId,
    /// One selected token per incoming place, in arc order.
    pub selection: Vec<(PlaceId, Token)>,
    /// The moment all selected tokens are available (the maximum of
    /// their timestamps).
    pub time: f64,
}

impl Binding {
    /// The selected payload values, in arc order.
    pub fn values(&self) -> Vec<Value> {
        self.selection
            .iter()
            .map(|(_, token)| token.value.clone())
            .collect()
    }
}

/// Enumerate every guard-satisfying binding of `event`, ignoring time.
///
/// Any empty incoming place yields the empty list (a transient
/// non-event, not an error). A guard `Err` is fatal and carries the
/// event name and the values it was called with.
pub(crate) fn event_bindings(
    event_id: EventId,
    event: &Event,
    places: &[Place],
) -> Result<Vec<Binding>, StepError> {
    let mut arcs: Vec<(PlaceId, &[Token])> = Vec::with_capacity(event.incoming().len());
    for arc in event.incoming() {
        let Some(place) = places.get(arc.into_inner()) else {
            return Err(StepError::InvariantViolation {
                message: format!("event {} references unregistered place {arc}", event.name()),
            });
        };
        if place.is_empty() {
            return Ok(Vec::new());
        }
        arcs.push((*arc, place.marking()));
    }

    let mut bindings = Vec::new();
    let mut cursor = vec![0_usize; arcs.len()];
    loop {
        let mut selection = Vec::with_capacity(arcs.len());
        let mut time = f64::NEG_INFINITY;
        for (slot, (place, marking)) in cursor.iter().zip(&arcs) {
            let Some(token) = marking.get(*slot) else {
                return Err(StepError::InvariantViolation {
                    message: format!("binding cursor left marking of place {place}"),
                });
            };
            time = time.max(token.time);
            selection.push((*place, token.clone()));
        }

        let keep = match event.guard() {
            Some(guard) => {
                let values: Vec<Value> =
                    selection.iter().map(|(_, token)| token.value.clone()).collect();
                guard(&values).map_err(|message| StepError::GuardFault {
                    event: event.name().to_owned(),
                    values: render_values(&values),
                    message,
                })?
            }
            None => true,
        };
        if keep {
            bindings.push(Binding {
                event: event_id,
                selection,
                time,
            });
        }

        if !next_combination(&mut cursor, &arcs) {
            return Ok(bindings);
        }
    }
}

/// Advance the product cursor, rightmost arc fastest.
///
/// Returns `false` once every combination has been visited.
fn next_combination(cursor: &mut [usize], arcs: &[(PlaceId, &[Token])]) -> bool {
    for position in (0..cursor.len()).rev() {
        let width = arcs.get(position).map_or(0, |(_, marking)| marking.len());
        let Some(slot) = cursor.get_mut(position) else {
            return false;
        };
        *slot = slot.saturating_add(1);
        if *slot < width {
            return true;
        }
        *slot = 0;
    }
    false
}

/// Render values for fault messages.
pub(crate) fn render_values(values: &[Value]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn store(id: usize, name: &str, tokens: &[(i64, f64)]) -> Place {
        let mut place = Place::new(PlaceId(id), name);
        for (value, time) in tokens {
            place.insert(Token::new(Value::Int(*value), *time));
        }
        place
    }

    #[test]
    fn product_covers_every_combination() {
        let places = vec![
            store(0, "a", &[(1, 2.0)]),
            store(1, "b", &[(2, 3.0), (3, 1.0)]),
        ];
        let event = Event::new("join", vec![PlaceId(0), PlaceId(1)], vec![], |_| Ok(vec![]));

        let bindings = event_bindings(EventId(0), &event, &places).unwrap();
        assert_eq!(bindings.len(), 2);
        // Binding time is the max of the selected timestamps; the
        // marking of `b` is time-sorted, so 3@1 pairs first.
        let times: Vec<f64> = bindings.iter().map(|b| b.time).collect();
        assert_eq!(times, vec![2.0, 3.0]);
    }

    #[test]
    fn empty_incoming_place_yields_no_bindings() {
        let places = vec![store(0, "a", &[(1, 0.0)]), store(1, "b", &[])];
        let event = Event::new("join", vec![PlaceId(0), PlaceId(1)], vec![], |_| Ok(vec![]));

        let bindings = event_bindings(EventId(0), &event, &places).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn guard_filters_combinations() {
        let places = vec![store(0, "a", &[(1, 0.0), (11, 0.0)])];
        let event = Event::new("big", vec![PlaceId(0)], vec![], |_| Ok(vec![]))
            .with_guard(|values| match values.first() {
                Some(Value::Int(n)) => Ok(*n > 10),
                _ => Ok(false),
            });

        let bindings = event_bindings(EventId(0), &event, &places).unwrap();
        assert_eq!(bindings.len(), 1);
        let values = bindings.first().unwrap().values();
        assert_eq!(values, vec![Value::Int(11)]);
    }

    #[test]
    fn guard_fault_identifies_event_and_values() {
        let places = vec![store(0, "a", &[(7, 0.0)])];
        let event = Event::new("checked", vec![PlaceId(0)], vec![], |_| Ok(vec![]))
            .with_guard(|_| Err(String::from("bad shape")));

        let err = event_bindings(EventId(0), &event, &places).unwrap_err();
        match err {
            StepError::GuardFault {
                event,
                values,
                message,
            } => {
                assert_eq!(event, "checked");
                assert_eq!(values, "[7]");
                assert_eq!(message, "bad shape");
            }
            other => panic!("expected GuardFault, got {other:?}"),
        }
    }

    #[test]
    fn identical_tokens_are_not_deduplicated() {
        let places = vec![store(0, "a", &[(1, 0.0), (1, 0.0)])];
        let event = Event::new("pick", vec![PlaceId(0)], vec![], |_| Ok(vec![]));

        let bindings = event_bindings(EventId(0), &event, &places).unwrap();
        assert_eq!(bindings.len(), 2);
    }
}
