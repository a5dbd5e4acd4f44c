//! Shared resource pools.

use tokenflow_core::{ModelError, Simulation};
use tokenflow_types::{PlaceId, Value};

/// Declare a pool of `amount` interchangeable resources.
///
/// The pool is an ordinary place holding one token per resource,
/// available from time 0 and named `"{name}-{index}"`. Tasks consume
/// a resource token while work is in progress and return it on
/// completion, so the pool place doubles as the idle-resource gauge.
pub fn resource_pool(
    sim: &mut Simulation,
    name: &str,
    amount: u32,
) -> Result<PlaceId, ModelError> {
    let place = sim.add_place(name)?;
    for index in 0..amount {
        sim.seed(place, Value::Str(format!("{name}-{index}")), 0.0)?;
    }
    Ok(place)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pool_holds_one_token_per_resource() {
        let mut sim = Simulation::new();
        let clerks = resource_pool(&mut sim, "clerks", 3).unwrap();

        let marking = sim.marking(clerks).unwrap();
        assert_eq!(marking.len(), 3);
        let names: Vec<String> = marking.iter().map(|t| t.value.to_string()).collect();
        assert_eq!(names, vec!["clerks-0", "clerks-1", "clerks-2"]);
    }

    #[test]
    fn empty_pool_is_allowed() {
        let mut sim = Simulation::new();
        let clerks = resource_pool(&mut sim, "clerks", 0).unwrap();
        assert!(sim.marking(clerks).unwrap().is_empty());
    }
}
