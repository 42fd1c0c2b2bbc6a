//! Stress tests for coil-connections
//!
//! Random edit sequences checked against a from-scratch audit after every
//! step, plus larger chains, rings and merged stars.

use std::collections::HashSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use coil_connections::ConnectionManager;
use coil_core::Wire;

/// Power reached by a wire, computed by walking the direct connections
fn expected_power(manager: &ConnectionManager, wire: &Wire, powered: &HashSet<Wire>) -> bool {
    manager.component_of(wire).iter().any(|member| powered.contains(member))
}

/// Apply random connects, disconnects and power toggles, auditing after each
#[test]
fn test_random_edits_stay_consistent() {
    coil_logging::init_testing();
    const WIRES: usize = 24;
    const STEPS: usize = 2_000;

    for seed in [1u64, 7, 42] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut manager = ConnectionManager::new();
        let wires: Vec<Wire> = (0..WIRES).map(|_| Wire::new()).collect();
        let mut powered: HashSet<Wire> = HashSet::new();
        let mut edges: Vec<(usize, usize)> = Vec::new();

        for step in 0..STEPS {
            match rng.random_range(0..10) {
                0..=3 => {
                    let a = rng.random_range(0..WIRES);
                    let b = rng.random_range(0..WIRES);
                    if a == b {
                        assert!(manager.connect(&wires[a], &wires[b]).is_err());
                        continue;
                    }
                    manager.connect(&wires[a], &wires[b]).unwrap();
                    edges.push((a, b));
                }
                4..=7 if !edges.is_empty() => {
                    let (a, b) = edges.swap_remove(rng.random_range(0..edges.len()));
                    manager.disconnect(&wires[a], &wires[b]).unwrap();
                }
                _ => {
                    let wire = &wires[rng.random_range(0..WIRES)];
                    if powered.remove(wire) {
                        wire.retract_power();
                    } else {
                        wire.assert_power();
                        powered.insert(wire.clone());
                    }
                }
            }

            if let Err(err) = manager.audit(&wires) {
                panic!("seed {seed} step {step}: {err}");
            }
            for wire in &wires {
                assert_eq!(
                    wire.peek(),
                    expected_power(&manager, wire, &powered),
                    "seed {seed} step {step}: wrong power on {wire}"
                );
            }
        }

        // Tear everything down again
        for (a, b) in edges.drain(..) {
            manager.disconnect(&wires[a], &wires[b]).unwrap();
        }
        assert!(manager.is_empty());
        assert_eq!(manager.audit(&wires), Ok(()));
    }
}

fn chain(manager: &mut ConnectionManager, len: usize) -> Vec<Wire> {
    let wires: Vec<Wire> = (0..len).map(|_| Wire::new()).collect();
    for pair in wires.windows(2) {
        manager.connect(&pair[0], &pair[1]).unwrap();
    }
    wires
}

/// Build and cut a long chain
#[test]
fn test_long_chain() {
    const LEN: usize = 400;

    let start = Instant::now();
    let mut manager = ConnectionManager::new();
    let wires = chain(&mut manager, LEN);

    wires[0].assert_power();
    assert!(wires[LEN - 1].peek());

    manager.disconnect(&wires[LEN / 2 - 1], &wires[LEN / 2]).unwrap();
    assert!(wires[LEN / 2 - 1].peek());
    assert!(!wires[LEN / 2].peek());
    assert_eq!(manager.components().len(), 2);
    assert_eq!(manager.audit(&wires), Ok(()));

    println!("Built and split a {LEN}-wire chain in {:?}", start.elapsed());
}

/// Cutting every ring edge in turn only splits on the second cut
#[test]
fn test_ring_teardown() {
    const LEN: usize = 200;

    let mut manager = ConnectionManager::new();
    let wires = chain(&mut manager, LEN);
    manager.connect(&wires[LEN - 1], &wires[0]).unwrap();
    wires[0].assert_power();

    manager.disconnect(&wires[LEN - 1], &wires[0]).unwrap();
    assert_eq!(manager.components().len(), 1);
    assert!(wires[LEN - 1].peek());

    for i in 1..LEN {
        manager.disconnect(&wires[i - 1], &wires[i]).unwrap();
        assert!(wires[0].peek());
        assert!(!wires[i].peek());
    }
    assert!(manager.is_empty());
    assert_eq!(manager.audit(&wires), Ok(()));
}

/// Merging many small components into one
#[test]
fn test_star_of_components() {
    const ARMS: usize = 100;

    let mut manager = ConnectionManager::new();
    let hub = Wire::new();
    let mut arms = Vec::new();
    for _ in 0..ARMS {
        let (a, b) = (Wire::new(), Wire::new());
        manager.connect(&a, &b).unwrap();
        b.assert_power();
        arms.push((a, b));
    }

    for (a, _) in &arms {
        manager.connect(&hub, a).unwrap();
    }
    assert_eq!(hub.power_source().driver_count(), ARMS);
    assert_eq!(manager.component_of(&hub).len(), 2 * ARMS + 1);
    assert_eq!(manager.validate(), Ok(()));

    for (a, b) in &arms {
        manager.disconnect(&hub, a).unwrap();
        assert!(b.peek());
    }
    assert!(!hub.peek());
    assert_eq!(manager.validate(), Ok(()));
}
