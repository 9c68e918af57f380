//! End-to-end scenarios driven through the public `Simulation` API.

use blockfall::{
    Cell, EngineConfig, FillPhase, Motion, Placement, ShapeKind, Simulation, SpawnMode,
    SpawnOutcome,
};

const DT: f64 = 1.0 / 60.0;

fn manual(motion: Motion, fall_rate: f64) -> Simulation {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Manual,
        motion,
        fall_rate,
        seed: Some(3),
        ..EngineConfig::default()
    };
    Simulation::new(10, 20, config).expect("valid config")
}

#[test]
fn test_i_piece_drops_to_bottom_row() {
    for (motion, rate) in [(Motion::Continuous, 6.0), (Motion::Stepped, 12.0)] {
        let mut sim = manual(motion, rate);
        assert_eq!(sim.spawn_piece(ShapeKind::I, 4, -4), SpawnOutcome::Spawned);

        let mut steps = 0;
        while sim.stats().pieces_merged == 0 {
            sim.step(DT);
            steps += 1;
            assert!(steps < 10_000, "{motion:?}: piece never landed");
        }
        assert_eq!(sim.active_count(), 0, "{motion:?}");

        let snap = sim.arena_snapshot();
        let tag = Cell::Occupied(ShapeKind::I.color());
        for x in 4..8 {
            assert_eq!(snap.get(x, 19), Some(tag), "{motion:?} column {x}");
        }
        assert_eq!(snap.occupied_count(), 4);
    }
}

#[test]
fn test_deterministic_fill_covers_arena_before_pausing() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::DeterministicFill { pause_ms: 500 },
        fall_rate: 60.0,
        seed: Some(11),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(12, 20, config).expect("valid config");

    let mut steps = 0;
    while !matches!(sim.phase(), Some(FillPhase::Pausing { .. })) {
        sim.step(DT);
        steps += 1;
        assert!(steps < 100_000, "fill never completed");
    }
    assert!(sim.arena().is_full());
    assert_eq!(sim.stats().pieces_merged, 120);
    assert_eq!(sim.stats().rows_cleared, 0);
    assert_eq!(sim.active_count(), 0);

    // pause runs out: arena wiped, cycle starts over
    while matches!(sim.phase(), Some(FillPhase::Pausing { .. })) {
        sim.step(DT);
    }
    assert_eq!(sim.phase(), Some(FillPhase::Filling { cursor: 0 }));
    assert!(sim.arena().is_empty());
    assert_eq!(sim.stats().cycles, 1);
}

#[test]
fn test_deterministic_fill_handles_odd_width() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::DeterministicFill { pause_ms: 0 },
        fall_rate: 60.0,
        seed: Some(5),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(7, 6, config).expect("valid config");
    while !matches!(sim.phase(), Some(FillPhase::Pausing { .. })) {
        sim.step(DT);
    }
    assert!(sim.arena().is_full());
    assert_eq!(sim.stats().pieces_merged, 6 * 4);
}

#[test]
fn test_stacked_spawns_overflow_and_wipe() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Immediate,
        placement: Placement::Centered,
        shapes: vec![ShapeKind::O],
        fall_rate: 30.0,
        seed: Some(9),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(4, 4, config).expect("valid config");

    let mut steps = 0;
    while sim.stats().overflows == 0 {
        sim.step(DT);
        steps += 1;
        assert!(steps < 10_000, "arena never overflowed");
    }
    assert!(sim.arena().is_empty());
    assert_eq!(sim.active_count(), 1);
    assert_eq!(sim.stats().pieces_merged, 2);
}

#[test]
fn test_snapshots_are_idempotent_between_steps() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Interval { interval_ms: 200 },
        seed: Some(21),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(12, 22, config).expect("valid config");
    for _ in 0..300 {
        sim.step(DT);
    }
    assert_eq!(sim.arena_snapshot(), sim.arena_snapshot());
    assert_eq!(sim.active_pieces(), sim.active_pieces());
}

#[test]
fn test_interval_spawning_respects_cap() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Interval { interval_ms: 50 },
        max_active_pieces: Some(3),
        fall_rate: 1.0,
        seed: Some(2),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(12, 22, config).expect("valid config");
    for _ in 0..600 {
        sim.step(DT);
        assert!(sim.active_count() <= 3);
    }
    assert!(sim.stats().pieces_spawned >= 3);
}

#[test]
fn test_huge_finite_delta_returns() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Interval { interval_ms: 600 },
        seed: Some(5),
        ..EngineConfig::default()
    };
    let mut sim = Simulation::new(12, 22, config).expect("valid config");
    sim.step(1.0e17);
    let stats = sim.stats();
    assert_eq!(stats.pieces_spawned, 1);
    assert_eq!(stats.pieces_merged, 1);
    assert_eq!(sim.active_count(), 0);
    assert_eq!(sim.arena().occupied_count(), 4);
}

#[test]
fn test_same_seed_replays_identically() {
    let config = EngineConfig {
        spawn_mode: SpawnMode::Interval { interval_ms: 120 },
        motion: Motion::Continuous,
        fall_rate: 9.0,
        fall_rate_spread: 0.3,
        seed: Some(77),
        ..EngineConfig::default()
    };
    let mut a = Simulation::new(12, 22, config.clone()).expect("valid config");
    let mut b = Simulation::new(12, 22, config).expect("valid config");
    for _ in 0..2_000 {
        a.step(DT);
        b.step(DT);
    }
    assert_eq!(a.arena_snapshot(), b.arena_snapshot());
    assert_eq!(a.active_pieces(), b.active_pieces());
    assert_eq!(a.stats(), b.stats());
}
