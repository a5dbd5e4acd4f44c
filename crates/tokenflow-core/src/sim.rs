//! The simulation engine and driver.
//!
//! [`Simulation`] owns the places, the events, the clock, the
//! tie-breaking RNG, the conflict policy, and the registered
//! observers. Model structure is declared up front (registration and
//! seeding, while the driver is idle), then the driver steps:
//! enumerate the feasible bindings, advance the clock when nothing is
//! feasible yet, let the policy pick one binding, and commit it.
//!
//! Exactly one binding fires per step. The model is single-writer and
//! single-stepper: enumeration reads the markings, the commit mutates
//! them, and nothing overlaps -- firing one binding can change which
//! bindings are feasible for everything else, so bindings are
//! recomputed from scratch each step and stale ones are never reused.
//! Callers must not mutate markings while a step is in progress; the
//! inspection API hands out read-only views only.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use tokenflow_types::{EventId, PlaceId, Token, Value};

use crate::binding::{self, Binding};
use crate::clock::SimClock;
use crate::config::Settings;
use crate::error::{ModelError, StepError};
use crate::event::Event;
use crate::firing::{self, Firing};
use crate::observer::Observer;
use crate::place::Place;
use crate::policy::{ConflictPolicy, MilestonePolicy, UniformPolicy};

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Declared but not yet stepped; registration and seeding allowed.
    Idle,
    /// At least one step has run; model structure is frozen.
    Stepping,
    /// Quiescent or past the horizon. Terminal -- the driver does not
    /// auto-resume.
    Halted,
}

/// Why a [`Simulation::run`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No binding was feasible and no future enabling time remained.
    Quiescent,
    /// The clock passed the requested horizon.
    HorizonReached,
    /// The driver was already halted when `run` was called.
    AlreadyHalted,
}

/// Summary of a [`Simulation::run`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of firings committed during this run.
    pub steps: u64,
    /// Clock reading when the run ended.
    pub final_clock: f64,
    /// Why the run ended.
    pub reason: HaltReason,
}

/// The token-flow engine.
pub struct Simulation {
    places: Vec<Place>,
    place_index: BTreeMap<String, PlaceId>,
    events: Vec<Event>,
    event_index: BTreeMap<String, EventId>,
    clock: SimClock,
    rng: SmallRng,
    policy: Box<dyn ConflictPolicy>,
    observers: Vec<Box<dyn Observer>>,
    state: DriverState,
}

impl Simulation {
    /// A deterministic engine with the default seed (0).
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// An engine whose tie-breaking RNG is seeded with `seed`.
    ///
    /// Two engines built with the same seed, the same declarations,
    /// and the same seeding produce identical firing sequences.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            places: Vec::new(),
            place_index: BTreeMap::new(),
            events: Vec::new(),
            event_index: BTreeMap::new(),
            clock: SimClock::new(),
            rng: SmallRng::seed_from_u64(seed),
            policy: Box::new(UniformPolicy),
            observers: Vec::new(),
            state: DriverState::Idle,
        }
    }

    /// Build an engine from loaded [`Settings`]: the configured seed,
    /// and the milestone policy when a target is configured.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut sim = Self::with_seed(settings.run.seed);
        if let Some(target) = &settings.priority.milestone {
            sim.set_policy(Box::new(MilestonePolicy::new(target.clone())));
        }
        sim
    }

    // --- Registration ---

    /// Declare a place with an empty marking.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names and any declaration after the first
    /// step.
    pub fn add_place(&mut self, name: impl Into<String>) -> Result<PlaceId, ModelError> {
        self.ensure_idle("declare a place")?;
        let name = name.into();
        if self.place_index.contains_key(&name) {
            return Err(ModelError::DuplicatePlace { name });
        }
        let id = PlaceId(self.places.len());
        self.places.push(Place::new(id, name.clone()));
        self.place_index.insert(name, id);
        Ok(id)
    }

    /// Register an event.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names, arcs to unknown places, registration
    /// after the first step, and events without incoming places --
    /// those can never be evaluated for readiness, so the mistake is
    /// fatal here rather than surfacing mid-run.
    pub fn add_event(&mut self, event: Event) -> Result<EventId, ModelError> {
        self.ensure_idle("register an event")?;
        if self.event_index.contains_key(event.name()) {
            return Err(ModelError::DuplicateEvent {
                name: event.name().to_owned(),
            });
        }
        if event.incoming().is_empty() {
            return Err(ModelError::NoIncomingPlaces {
                event: event.name().to_owned(),
            });
        }
        for arc in event.incoming().iter().chain(event.outgoing()) {
            if arc.into_inner() >= self.places.len() {
                return Err(ModelError::UnknownPlace {
                    place: *arc,
                    referrer: event.name().to_owned(),
                });
            }
        }
        let id = EventId(self.events.len());
        self.event_index.insert(event.name().to_owned(), id);
        self.events.push(event);
        Ok(id)
    }

    // --- Seeding ---

    /// Insert an initial token into `place`, available at `time`.
    ///
    /// # Errors
    ///
    /// Rejects unknown places, non-finite or negative timestamps, and
    /// seeding after the first step.
    pub fn seed(&mut self, place: PlaceId, value: Value, time: f64) -> Result<(), ModelError> {
        self.ensure_idle("seed tokens")?;
        let Some(store) = self.places.get_mut(place.into_inner()) else {
            return Err(ModelError::UnknownPlace {
                place,
                referrer: String::from("seed"),
            });
        };
        if !time.is_finite() || time < 0.0 {
            return Err(ModelError::InvalidSeedTime {
                place: store.name().to_owned(),
                time,
            });
        }
        store.insert(Token::new(value, time));
        Ok(())
    }

    // --- Policy and observers ---

    /// Replace the conflict policy.
    pub fn set_policy(&mut self, policy: Box<dyn ConflictPolicy>) {
        self.policy = policy;
    }

    /// Register an observer; `run` forwards every firing to it.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Move the driver to its terminal state.
    ///
    /// For callers that abort after an error from [`step`] or
    /// [`run`]; the engine itself halts on quiescence and horizon.
    ///
    /// [`step`]: Simulation::step
    /// [`run`]: Simulation::run
    pub fn halt(&mut self) {
        self.state = DriverState::Halted;
    }

    // --- Inspection ---

    /// The current clock reading.
    pub const fn now(&self) -> f64 {
        self.clock.now()
    }

    /// The driver state.
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Read-only view of a place's marking, earliest token first.
    pub fn marking(&self, place: PlaceId) -> Option<&[Token]> {
        self.places.get(place.into_inner()).map(Place::marking)
    }

    /// Look up a place by name.
    pub fn find_place(&self, name: &str) -> Option<PlaceId> {
        self.place_index.get(name).copied()
    }

    /// Name of a registered place.
    pub fn place_name(&self, place: PlaceId) -> Option<&str> {
        self.places.get(place.into_inner()).map(Place::name)
    }

    /// Look up an event by name.
    pub fn find_event(&self, name: &str) -> Option<EventId> {
        self.event_index.get(name).copied()
    }

    /// Name of a registered event.
    pub fn event_name(&self, event: EventId) -> Option<&str> {
        self.events.get(event.into_inner()).map(Event::name)
    }

    // --- Stepping ---

    /// Perform exactly one firing attempt.
    ///
    /// Enumerates the feasible bindings (advancing the clock first if
    /// nothing is feasible at the current reading), lets the policy
    /// pick one, and commits it. Returns the committed [`Firing`], or
    /// `None` when the model is quiescent -- in which case the driver
    /// halts. Faults propagate without being retried; the caller
    /// decides whether to [`halt`](Simulation::halt).
    pub fn step(&mut self) -> Result<Option<Firing>, StepError> {
        if self.state == DriverState::Halted {
            return Ok(None);
        }
        self.state = DriverState::Stepping;

        let mut feasible = self.feasible_bindings()?;
        if feasible.is_empty() {
            debug!(clock = self.clock.now(), "no binding feasible; halting");
            self.state = DriverState::Halted;
            return Ok(None);
        }

        let offered = feasible.len();
        let chosen = self.policy.choose(&feasible, &mut self.rng);
        if chosen >= offered {
            return Err(StepError::PolicyContract { chosen, offered });
        }
        let binding = feasible.swap_remove(chosen);

        let Some(event) = self.events.get(binding.event.into_inner()) else {
            return Err(StepError::InvariantViolation {
                message: format!("chosen binding references unknown event {}", binding.event),
            });
        };
        let firing = firing::commit(event, binding, &mut self.places, self.clock.now())?;
        debug!(event = %firing.event_name, clock = firing.time, "fired");
        Ok(Some(firing))
    }

    /// Drive [`step`] until quiescence or until the clock passes
    /// `horizon`, forwarding every firing to the registered observers.
    ///
    /// The horizon is checked only between steps, so the final firing
    /// may legitimately land past it. A halted driver stays halted:
    /// calling `run` again reports [`HaltReason::AlreadyHalted`]
    /// without stepping.
    ///
    /// [`step`]: Simulation::step
    pub fn run(&mut self, horizon: f64) -> Result<RunSummary, StepError> {
        if self.state == DriverState::Halted {
            return Ok(RunSummary {
                steps: 0,
                final_clock: self.clock.now(),
                reason: HaltReason::AlreadyHalted,
            });
        }

        info!(horizon, "simulation run starting");
        let mut steps: u64 = 0;
        let reason = loop {
            if self.clock.now() > horizon {
                self.state = DriverState::Halted;
                break HaltReason::HorizonReached;
            }
            match self.step()? {
                Some(firing) => {
                    steps = steps.saturating_add(1);
                    for observer in &mut self.observers {
                        observer.on_firing(&firing);
                    }
                }
                None => break HaltReason::Quiescent,
            }
        };
        info!(steps, clock = self.clock.now(), ?reason, "simulation run ended");

        Ok(RunSummary {
            steps,
            final_clock: self.clock.now(),
            reason,
        })
    }

    /// Feasible bindings at the (possibly advanced) clock.
    ///
    /// When nothing is feasible at the current reading the clock jumps
    /// to the smallest earliest-possible time strictly ahead of it and
    /// the set is recomputed; the jump repeats until a binding is
    /// feasible or no future enabling time remains. The clock never
    /// advances while any binding is feasible at the old reading, and
    /// it never jumps past the next event that could fire -- so no
    /// binding fires early and no event is skipped.
    fn feasible_bindings(&mut self) -> Result<Vec<Binding>, StepError> {
        loop {
            let now = self.clock.now();

            let mut feasible = Vec::new();
            for (index, event) in self.events.iter().enumerate() {
                let Some(earliest) = self.earliest_possible(event) else {
                    continue;
                };
                if earliest > now {
                    continue;
                }
                for candidate in binding::event_bindings(EventId(index), event, &self.places)? {
                    if candidate.time <= now {
                        feasible.push(candidate);
                    }
                }
            }
            if !feasible.is_empty() {
                return Ok(feasible);
            }

            let next = self
                .events
                .iter()
                .filter_map(|event| self.earliest_possible(event))
                .filter(|time| *time > now)
                .fold(None, |best: Option<f64>, time| {
                    Some(best.map_or(time, |current| current.min(time)))
                });
            match next {
                Some(target) => {
                    debug!(from = now, to = target, "clock advanced");
                    self.clock.advance_to(target);
                }
                None => return Ok(feasible),
            }
        }
    }

    /// The earliest time at which `event` could have one token
    /// available in every incoming place: the maximum over its
    /// incoming places of each place's earliest token. `None` when any
    /// incoming place is empty -- the event cannot contribute to clock
    /// advancement.
    fn earliest_possible(&self, event: &Event) -> Option<f64> {
        let mut horizon = 0.0_f64;
        for arc in event.incoming() {
            let earliest = self.places.get(arc.into_inner())?.earliest()?;
            horizon = horizon.max(earliest.time);
        }
        Some(horizon)
    }

    fn ensure_idle(&self, operation: &str) -> Result<(), ModelError> {
        if self.state == DriverState::Idle {
            Ok(())
        } else {
            Err(ModelError::SimulationStarted {
                operation: operation.to_owned(),
            })
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("places", &self.places.len())
            .field("events", &self.events.len())
            .field("clock", &self.clock.now())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
