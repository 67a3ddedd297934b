//! Property-based tests for the fuel state machine.
//!
//! Uses proptest to generate random sample and refill sequences, then
//! verify the fuel and engine-health invariants hold.

use fuelsim_core::event::EventKind;
use fuelsim_core::fuel::FuelType;
use fuelsim_core::math::Vec3;
use fuelsim_core::sim::UnchangedReason;
use fuelsim_core::state::FuelPhase;
use fuelsim_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum Op {
    /// Move to a position after `dt` seconds (dt may be zero or negative).
    Tick { x: f64, y: f64, dt: f64, engine_on: bool },
    Refill(Option<f64>),
    Toggle,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (-2000.0..2000.0f64, -2000.0..2000.0f64, -2.0..10.0f64, any::<bool>())
            .prop_map(|(x, y, dt, engine_on)| Op::Tick { x, y, dt, engine_on }),
        1 => proptest::option::of(0.0..60.0f64).prop_map(Op::Refill),
        1 => Just(Op::Toggle),
    ]
}

fn arb_ops(max: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(arb_op(), 1..=max)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Fuel stays within [0, max] for any operation sequence.
    #[test]
    fn fuel_stays_in_bounds(start in 0.0..50.0f64, ops in arb_ops(60)) {
        let mut sim = tracked_sim(start);
        let mut now = 0.0;
        for op in ops {
            match op {
                Op::Tick { x, y, dt, engine_on } => {
                    now += dt;
                    sim.tick(car(), Vec3::new(x, y, 0.0), now, engine_on);
                }
                Op::Refill(amount) => {
                    let _ = sim.refill(car(), amount, None);
                }
                Op::Toggle => {
                    let _ = sim.toggle_engine(car(), driver());
                }
            }
            let fuel = sim.fuel(car()).unwrap();
            prop_assert!(fuel >= 0.0, "negative fuel {}", fuel);
            prop_assert!(fuel <= 50.0, "overfilled to {}", fuel);
            let percent = sim.fuel_percent(car()).unwrap();
            prop_assert!((0.0..=100.0).contains(&percent));
        }
    }

    /// A tick whose timestamp does not advance leaves the state untouched.
    #[test]
    fn non_positive_elapsed_is_noop(x in -500.0..500.0f64, back in 0.0..5.0f64) {
        let mut sim = tracked_sim(30.0);
        sim.tick(car(), pos(10.0), 5.0, true);
        let before = sim.state(car()).cloned();

        let r = sim.tick(car(), pos(x), 5.0 - back, true);
        prop_assert_eq!(r.unchanged_reason(), Some(UnchangedReason::StaleTick));
        prop_assert_eq!(sim.state(car()).cloned(), before);
    }

    /// Zero distance never changes the fuel level.
    #[test]
    fn stationary_keeps_fuel(start in 1.0..50.0f64, dts in proptest::collection::vec(0.1..10.0f64, 1..20)) {
        let mut sim = tracked_sim(start);
        let expected = sim.fuel(car());
        let mut now = 0.0;
        for dt in dts {
            now += dt;
            let r = sim.tick(car(), pos(0.0), now, true);
            prop_assert_eq!(r.unchanged_reason(), Some(UnchangedReason::Stationary));
            prop_assert_eq!(sim.fuel(car()), expected);
        }
    }

    /// Refilling without an amount always fills the tank.
    #[test]
    fn full_refill_reaches_max(start in 0.0..50.0f64) {
        let mut sim = tracked_sim(start);
        prop_assert_eq!(sim.refill(car(), None, None), Ok(50.0));
        prop_assert_eq!(sim.fuel(car()), Some(50.0));
    }

    /// Refilling an amount never exceeds capacity.
    #[test]
    fn partial_refill_is_clamped(start in 0.0..50.0f64, amount in 0.0..200.0f64) {
        let mut sim = tracked_sim(start);
        let before = sim.fuel(car()).unwrap();
        let fuel = sim.refill(car(), Some(amount), None).unwrap();
        prop_assert!(fuel <= 50.0);
        prop_assert!(fuel >= before);
    }

    /// However the samples are spaced, a sustained mismatch breaks the
    /// engine after exactly 40 decrements of 25, never below zero health.
    #[test]
    fn breakdown_after_forty_decrements(dts in proptest::collection::vec(0.25..3.0f64, 200..400)) {
        let mut sim = tracked_sim(50.0);
        sim.refill(car(), None, Some(FuelType::Diesel)).unwrap();

        let mut now = 0.0;
        let mut decrements = 0;
        let mut breakdowns = 0;
        for dt in dts {
            now += dt;
            let r = sim.tick(car(), pos(0.0), now, true);
            decrements += r.count(EventKind::EngineDegraded);
            breakdowns += r.count(EventKind::EngineBreakdown);
            prop_assert!(sim.engine_health(car()).unwrap() >= 0.0);
            if breakdowns > 0 {
                break;
            }
        }
        prop_assert_eq!(breakdowns, 1);
        prop_assert_eq!(decrements, 40);
        prop_assert_eq!(sim.engine_health(car()), Some(0.0));
        prop_assert_eq!(sim.phase(car()), Some(FuelPhase::BrokenDown));
        prop_assert!(!sim.state(car()).unwrap().mismatch_active());
    }

    /// After switching back to the correct fuel, health only goes up and
    /// reaches the maximum again, even from a breakdown.
    #[test]
    fn health_regenerates_monotonically(degrade_secs in 2u32..60, ticks in 200usize..300) {
        let mut sim = tracked_sim(50.0);
        sim.refill(car(), None, Some(FuelType::Diesel)).unwrap();
        let mut now = 0.0;
        for _ in 0..=degrade_secs {
            now += 1.0;
            sim.tick(car(), pos(0.0), now, true);
        }
        prop_assert!(sim.engine_health(car()).unwrap() < 1000.0);

        sim.refill(car(), None, Some(FuelType::Gasoline)).unwrap();
        let mut last = sim.engine_health(car()).unwrap();
        for _ in 0..ticks {
            now += 1.0;
            sim.tick(car(), pos(0.0), now, true);
            let health = sim.engine_health(car()).unwrap();
            prop_assert!(health >= last);
            prop_assert!(health <= 1000.0);
            last = health;
        }
        prop_assert_eq!(last, 1000.0);
        prop_assert!(!sim.state(car()).unwrap().mismatch_active());
    }
}
