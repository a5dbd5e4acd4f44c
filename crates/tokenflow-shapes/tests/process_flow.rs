//! End-to-end contact-flow scenario.
//!
//! A source feeds cases through a triage task, an exclusive split, a
//! contact task sharing the single-clerk pool with triage, and a
//! notice handoff, into one sink. Durations are fixed so the whole
//! run is deterministic and the assertions can be exact.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use tokenflow_core::{FiringLog, HaltReason, MilestonePolicy, Produced, Simulation};
use tokenflow_shapes::{exclusive_split, handoff, resource_pool, sink, source, task};
use tokenflow_types::{PlaceId, Value};

/// Serial number of a `("load{n}", counter)` case token.
fn serial_of(case: &Value) -> Option<i64> {
    let Value::Tuple(parts) = case else {
        return None;
    };
    let Some(Value::Str(id)) = parts.first() else {
        return None;
    };
    id.strip_prefix("load").and_then(|digits| digits.parse().ok())
}

/// Milestone counter of a `(id, counter)` case token.
fn counter_of(case: &Value) -> Option<i64> {
    let Value::Tuple(parts) = case else {
        return None;
    };
    match parts.get(1) {
        Some(Value::Int(count)) => Some(*count),
        _ => None,
    }
}

fn build(seed: u64) -> (Simulation, FiringLog, PlaceId, PlaceId) {
    let mut sim = Simulation::with_seed(seed);
    sim.set_policy(Box::new(MilestonePolicy::new("load")));

    let clerks = resource_pool(&mut sim, "clerks", 1).unwrap();
    let triage_q = sim.add_place("triage-q").unwrap();
    let routed = sim.add_place("routed").unwrap();
    let contact_q = sim.add_place("contact-q").unwrap();
    let notice_q = sim.add_place("notice-q").unwrap();
    let resolved_q = sim.add_place("resolved-q").unwrap();

    source(&mut sim, "load", triage_q, || 1.0).unwrap();

    task(&mut sim, "triage", triage_q, clerks, routed, |case, clerk| {
        Ok(
            Produced::new(Value::pair(case.clone().bump_milestone(), clerk.clone()))
                .after(0.5),
        )
    })
    .unwrap();

    exclusive_split(
        &mut sim,
        "route",
        routed,
        vec![contact_q, notice_q],
        |case| {
            let serial =
                serial_of(case).ok_or_else(|| String::from("unroutable case token"))?;
            if serial % 2 == 0 {
                Ok(vec![Some(Produced::new(case.clone())), None])
            } else {
                Ok(vec![None, Some(Produced::new(case.clone()).after(0.25))])
            }
        },
    )
    .unwrap();

    task(
        &mut sim,
        "contact",
        contact_q,
        clerks,
        resolved_q,
        |case, clerk| {
            Ok(
                Produced::new(Value::pair(case.clone().bump_milestone(), clerk.clone()))
                    .after(0.75),
            )
        },
    )
    .unwrap();

    handoff(&mut sim, "notice", vec![notice_q], vec![resolved_q], |values| {
        let Some(case) = values.first() else {
            return Err(String::from("notice expects one case"));
        };
        Ok(vec![Some(Produced::new(case.clone().bump_milestone()))])
    })
    .unwrap();

    let (captures, _) = sink(&mut sim, "resolved", resolved_q).unwrap();

    let log = FiringLog::new();
    sim.add_observer(Box::new(log.clone()));
    (sim, log, captures, clerks)
}

#[test]
fn flow_resolves_cases_under_a_shared_clerk() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (mut sim, log, captures, clerks) = build(42);

    let summary = sim.run(20.0).unwrap();

    // The source never dries up, so only the horizon stops the run.
    assert_eq!(summary.reason, HaltReason::HorizonReached);
    assert!(summary.final_clock > 20.0);
    assert_eq!(summary.steps, u64::try_from(log.len()).unwrap());

    // Cases actually made it through the whole flow.
    let resolved = sim.marking(captures).unwrap();
    assert!(!resolved.is_empty(), "no case reached the sink");

    // Every resolved case passed exactly two milestone bumps: triage
    // plus contact on the even branch, triage plus notice on the odd.
    for token in resolved {
        let serial = serial_of(&token.value).unwrap();
        let count = counter_of(&token.value).unwrap();
        assert_eq!(count, 2, "case load{serial}");
    }

    // The single clerk is conserved: either idle in the pool or held
    // by exactly one busy token.
    let idle = sim.marking(clerks).unwrap().len();
    let busy = ["triage-busy", "contact-busy"]
        .iter()
        .map(|name| {
            let place = sim.find_place(name).unwrap();
            sim.marking(place).unwrap().len()
        })
        .sum::<usize>();
    assert_eq!(idle + busy, 1);
}

#[test]
fn firing_times_never_move_backward() {
    let (mut sim, log, _, _) = build(42);
    let _ = sim.run(20.0).unwrap();

    let times: Vec<f64> = log.records().iter().map(|firing| firing.time).collect();
    assert!(!times.is_empty());
    for window in times.windows(2) {
        let (earlier, later) = (window[0], window[1]);
        assert!(earlier <= later, "clock moved backward: {earlier} -> {later}");
    }
}

#[test]
fn identical_builds_replay_identical_runs() {
    let (mut first_sim, first_log, _, _) = build(42);
    let (mut second_sim, second_log, _, _) = build(42);

    let first_summary = first_sim.run(20.0).unwrap();
    let second_summary = second_sim.run(20.0).unwrap();

    assert_eq!(first_summary, second_summary);
    assert_eq!(first_log.records(), second_log.records());
}

#[test]
fn seeded_cases_drain_to_quiescence_without_a_source() {
    let mut sim = Simulation::new();
    let clerks = resource_pool(&mut sim, "clerks", 2).unwrap();
    let intake = sim.add_place("intake").unwrap();
    let finished = sim.add_place("finished").unwrap();
    task(&mut sim, "file", intake, clerks, finished, |case, clerk| {
        Ok(
            Produced::new(Value::pair(case.clone().bump_milestone(), clerk.clone()))
                .after(2.0),
        )
    })
    .unwrap();
    let (captures, _) = sink(&mut sim, "archived", finished).unwrap();

    for serial in 0..5 {
        sim.seed(
            intake,
            Value::pair(Value::Str(format!("case{serial}")), Value::Int(0)),
            0.0,
        )
        .unwrap();
    }

    let summary = sim.run(1000.0).unwrap();

    // Every case is archived, both clerks are back, and the model is
    // quiescent: 5 starts + 5 completes + 5 sink firings.
    assert_eq!(summary.reason, HaltReason::Quiescent);
    assert_eq!(summary.steps, 15);
    assert_eq!(sim.marking(captures).unwrap().len(), 5);
    assert_eq!(sim.marking(clerks).unwrap().len(), 2);
    assert!(sim.marking(intake).unwrap().is_empty());
}
