//! Sources, tasks, sinks, and exclusive gateways.
//!
//! Each constructor registers plain places and events on a
//! [`Simulation`] and hands back the ids it created. Case tokens
//! minted by a [`source`] are `(case-id, counter)` pairs whose id
//! embeds the source name -- that is the layout the milestone
//! conflict policy scores, and what tasks advance via
//! [`Value::bump_milestone`].
//!
//! [`Simulation`]: tokenflow_core::Simulation

use tokenflow_core::{Event, ModelError, Produced, Simulation};
use tokenflow_types::{EventId, PlaceId, Value};

/// Declare an arrival source named `name`, emitting case tokens into
/// `outgoing`.
///
/// A private timer place (`"{name}-timer"`) holds the next case
/// serial. Each firing emits a fresh case token
/// `("{name}{serial}", 0)` immediately and re-arms the timer
/// `interarrival()` time units later, so the source keeps producing
/// for as long as the simulation runs.
pub fn source(
    sim: &mut Simulation,
    name: &str,
    outgoing: PlaceId,
    interarrival: impl Fn() -> f64 + Send + Sync + 'static,
) -> Result<EventId, ModelError> {
    let timer = sim.add_place(format!("{name}-timer"))?;
    sim.seed(timer, Value::Int(0), 0.0)?;
    let stem = name.to_owned();
    sim.add_event(Event::new(
        name,
        vec![timer],
        vec![timer, outgoing],
        move |values| {
            let Some(Value::Int(serial)) = values.first() else {
                return Err(String::from("source timer token must hold a serial number"));
            };
            let case = Value::pair(Value::Str(format!("{stem}{serial}")), Value::Int(0));
            Ok(vec![
                Some(Produced::new(Value::Int(serial.saturating_add(1))).after(interarrival())),
                Some(Produced::new(case)),
            ])
        },
    ))
}

/// Ids created by [`task`].
#[derive(Debug, Clone, Copy)]
pub struct TaskHandles {
    /// The hidden in-progress place (`"{name}-busy"`).
    pub busy: PlaceId,
    /// The event that claims a case and a resource.
    pub start: EventId,
    /// The event that releases both when the work ends.
    pub complete: EventId,
}

/// Declare a task named `name` serving cases from `queue` with
/// resources from `pool`, delivering finished cases into `done`.
///
/// Two events carry a case through the task. `"{name}-start"`
/// consumes one case and one resource and stores the pair `service`
/// builds -- including the service delay -- in the hidden busy place.
/// `"{name}-complete"` becomes feasible once that delay elapses,
/// returns the case to `done`, and releases the resource back to the
/// pool.
pub fn task(
    sim: &mut Simulation,
    name: &str,
    queue: PlaceId,
    pool: PlaceId,
    done: PlaceId,
    service: impl Fn(&Value, &Value) -> Result<Produced, String> + Send + Sync + 'static,
) -> Result<TaskHandles, ModelError> {
    let busy = sim.add_place(format!("{name}-busy"))?;
    let start = sim.add_event(Event::new(
        format!("{name}-start"),
        vec![queue, pool],
        vec![busy],
        move |values| {
            let (Some(case), Some(resource)) = (values.first(), values.get(1)) else {
                return Err(String::from("task start expects a case and a resource"));
            };
            Ok(vec![Some(service(case, resource)?)])
        },
    ))?;
    let complete = sim.add_event(Event::new(
        format!("{name}-complete"),
        vec![busy],
        vec![done, pool],
        |values| {
            let Some(Value::Tuple(parts)) = values.first() else {
                return Err(String::from("busy token must be a (case, resource) pair"));
            };
            let (Some(case), Some(resource)) = (parts.first(), parts.get(1)) else {
                return Err(String::from("busy token must hold a case and a resource"));
            };
            Ok(vec![
                Some(Produced::new(case.clone())),
                Some(Produced::new(resource.clone())),
            ])
        },
    ))?;
    Ok(TaskHandles {
        busy,
        start,
        complete,
    })
}

/// Declare a plain intermediate event: consume one token from each
/// place in `incoming`, produce into `outgoing` according to `effect`.
///
/// Thin sugar over the core API for steps that need no resource and
/// no hidden state.
pub fn handoff(
    sim: &mut Simulation,
    name: &str,
    incoming: Vec<PlaceId>,
    outgoing: Vec<PlaceId>,
    effect: impl Fn(&[Value]) -> Result<Vec<Option<Produced>>, String> + Send + Sync + 'static,
) -> Result<EventId, ModelError> {
    sim.add_event(Event::new(name, incoming, outgoing, effect))
}

/// Declare a sink consuming finished cases from `incoming`.
///
/// Captured cases land in a `"{name}-done"` place that nothing
/// consumes, so the marking doubles as the completed-case record for
/// inspection after a run. Returns the capture place and the event.
pub fn sink(
    sim: &mut Simulation,
    name: &str,
    incoming: PlaceId,
) -> Result<(PlaceId, EventId), ModelError> {
    let captures = sim.add_place(format!("{name}-done"))?;
    let event = sim.add_event(Event::new(name, vec![incoming], vec![captures], |values| {
        let Some(case) = values.first() else {
            return Err(String::from("sink expects one consumed value"));
        };
        Ok(vec![Some(Produced::new(case.clone()))])
    }))?;
    Ok((captures, event))
}

/// Declare an exclusive split gateway routing cases from `incoming`
/// to exactly one of the `outgoing` branches.
///
/// `choice` receives the case value and returns one output slot per
/// branch; the convention is a single `Some` (possibly delayed) and
/// `None` everywhere else. The engine only checks the arity -- a
/// choice producing several branches is an inclusive split, at the
/// caller's own risk.
pub fn exclusive_split(
    sim: &mut Simulation,
    name: &str,
    incoming: PlaceId,
    outgoing: Vec<PlaceId>,
    choice: impl Fn(&Value) -> Result<Vec<Option<Produced>>, String> + Send + Sync + 'static,
) -> Result<EventId, ModelError> {
    sim.add_event(Event::new(name, vec![incoming], outgoing, move |values| {
        let Some(case) = values.first() else {
            return Err(String::from("split expects one consumed value"));
        };
        choice(case)
    }))
}

/// Declare an exclusive join gateway merging the `incoming` branches
/// into `outgoing`.
///
/// One pass-through event per branch (`"{name}-in{index}"`): whichever
/// branch a case arrives on, it is forwarded unchanged.
pub fn exclusive_join(
    sim: &mut Simulation,
    name: &str,
    incoming: &[PlaceId],
    outgoing: PlaceId,
) -> Result<Vec<EventId>, ModelError> {
    let mut events = Vec::with_capacity(incoming.len());
    for (index, branch) in incoming.iter().enumerate() {
        let id = sim.add_event(Event::new(
            format!("{name}-in{index}"),
            vec![*branch],
            vec![outgoing],
            |values| {
                let Some(case) = values.first() else {
                    return Err(String::from("join expects one consumed value"));
                };
                Ok(vec![Some(Produced::new(case.clone()))])
            },
        ))?;
        events.push(id);
    }
    Ok(events)
}
