//! Drives whole sessions through the public API with a recording render sink.

use std::collections::BTreeSet;

use voxel_lod::{
    ConfigError, DetailLevel, DrawInstruction, EngineError, FrameView, PlayerAction, RenderSink, Session, SessionConfig,
    TerrainConfig, TerrainMethod, VoxelError, VoxelStore, WorldEdit,
};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Default)]
struct RecordingSink {
    frames: Vec<Vec<DrawInstruction>>,
    max_heights: Vec<u32>,
}

impl RenderSink for RecordingSink {
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), EngineError> {
        self.frames.push(frame.instructions.to_vec());
        self.max_heights.push(frame.max_height);
        Ok(())
    }
}

/// An 8x8 world of height-5 columns with the observer on column (4, 4) facing +Z.
fn small_world(min_view_dot: f32) -> Session {
    let config = SessionConfig::from_json(&format!(
        r#"{{
            "world_size": 8,
            "terrain": {{ "method": {{ "kind": "flat", "height": 5 }} }},
            "visibility": {{ "near_radius": 1, "mid_radius": 3, "far_radius": 5, "min_view_dot": {min_view_dot} }},
            "spawn": {{ "position": [4.0, 4.0], "yaw": 0.0, "pitch": 0.0 }}
        }}"#
    ))
    .unwrap();
    Session::new(config).unwrap()
}

fn columns(instructions: &[DrawInstruction], detail: DetailLevel) -> BTreeSet<(i32, i32)> {
    instructions
        .iter()
        .filter(|instruction| instruction.detail == detail)
        .map(|instruction| (instruction.x, instruction.z))
        .collect()
}

#[test]
fn tiers_around_a_standing_observer() {
    let mut session = small_world(-1.0);
    let summary = session.tick(&PlayerAction::default(), FRAME);
    assert!(summary.grounded);

    let mut sink = RecordingSink::default();
    session.render(&mut sink).unwrap();
    let frame = &sink.frames[0];

    let full = columns(frame, DetailLevel::FullColumn);
    let expected_full: BTreeSet<_> = [(4, 4), (3, 4), (5, 4), (4, 3), (4, 5)].into_iter().collect();
    assert_eq!(full, expected_full);
    assert_eq!(columns(frame, DetailLevel::TopBlockOnly).len(), 24);
    assert!(frame.iter().all(|instruction| instruction.height == 5));

    assert_eq!(summary.stats.candidates, 64);
    assert_eq!(summary.stats.cone_culled, 0);
    assert_eq!(summary.stats.cubes, 5 * 5 + 24);
    assert_eq!(sink.max_heights, vec![5]);
}

#[test]
fn narrow_cone_keeps_the_line_of_sight() {
    let mut session = small_world(0.99);
    session.tick(&PlayerAction::default(), FRAME);

    let selected: BTreeSet<_> = session
        .instructions()
        .iter()
        .map(|instruction| (instruction.x, instruction.z))
        .collect();
    let expected: BTreeSet<_> = [(4, 4), (4, 5), (4, 6), (4, 7)].into_iter().collect();
    assert_eq!(selected, expected);
    assert!(!selected.contains(&(4, 3)));
}

#[test]
fn walking_forward_moves_the_selection() {
    let mut session = small_world(-1.0);
    session.tick(&PlayerAction::default(), FRAME);
    let start_z = session.observer().position.z;

    let walk = PlayerAction {
        move_forward: true,
        ..PlayerAction::default()
    };
    for _ in 0..20 {
        session.tick(&walk, FRAME);
    }

    let observer = session.observer();
    assert!((observer.position.z - (start_z + 2.0)).abs() < 1e-3);
    assert!((observer.position.x - 4.0).abs() < 1e-4);
    assert!(session
        .instructions()
        .iter()
        .any(|instruction| (instruction.x, instruction.z) == (4, 6) && instruction.detail == DetailLevel::FullColumn));
}

#[test]
fn jump_rises_then_lands_on_the_clamp() {
    let mut session = small_world(-1.0);
    session.tick(&PlayerAction::default(), FRAME);
    let ground_eye = session.observer().position.y;

    let jump = PlayerAction {
        jump: true,
        ..PlayerAction::default()
    };
    session.tick(&jump, 1e-6);
    assert_eq!(session.observer().velocity_y, 6.5);

    let idle = PlayerAction::default();
    let mut previous = session.observer().position.y;
    let mut rising_frames = 0;
    loop {
        let summary = session.tick(&idle, FRAME);
        let y = session.observer().position.y;
        if y <= previous {
            break;
        }
        assert!(!summary.grounded);
        rising_frames += 1;
        previous = y;
    }
    assert!(rising_frames > 5);

    for _ in 0..120 {
        session.tick(&idle, FRAME);
    }
    assert!(session.grounded());
    assert!((session.observer().position.y - ground_eye).abs() < 1e-4);
}

#[test]
fn airborne_jump_is_ignored() {
    let mut session = small_world(-1.0);
    session.tick(&PlayerAction::default(), FRAME);

    let jump = PlayerAction {
        jump: true,
        ..PlayerAction::default()
    };
    session.tick(&jump, FRAME);
    assert_eq!(session.observer().velocity_y, 6.5);

    // airborne jump requests are ignored
    session.tick(&jump, FRAME);
    assert!(!session.grounded());
    assert!(session.observer().velocity_y < 6.5);
}

#[test]
fn edits_reshape_the_next_frame() {
    let mut session = small_world(-1.0);
    session.tick(&PlayerAction::default(), FRAME);

    session
        .apply_edit(WorldEdit::FillRect {
            x0: 5,
            z0: 3,
            x1: 100,
            z1: 5,
            height: 9,
        })
        .unwrap();
    session.apply_edit(WorldEdit::SetHeight { x: 4, z: 6, height: 0 }).unwrap();
    assert_eq!(
        session.apply_edit(WorldEdit::SetHeight { x: -1, z: 0, height: 3 }),
        Err(VoxelError::OutOfBounds { x: -1, z: 0, size: 8 })
    );

    session.tick(&PlayerAction::default(), FRAME);
    let mut sink = RecordingSink::default();
    session.render(&mut sink).unwrap();
    let frame = &sink.frames[0];

    let height_of = |x, z| frame.iter().find(|i| (i.x, i.z) == (x, z)).map(|i| i.height);
    assert_eq!(height_of(5, 4), Some(9));
    assert_eq!(height_of(6, 5), Some(9));
    assert_eq!(height_of(7, 5), None);
    assert_eq!(height_of(4, 6), None);
    assert_eq!(sink.max_heights, vec![9]);
    assert_eq!(session.store().height_at(5, 3), Some(9));
}

#[test]
fn prebuilt_world_spawns_at_its_center() {
    let store = VoxelStore::flat(10, 2).unwrap();
    let mut session = Session::with_store(SessionConfig::default(), store).unwrap();
    let summary = session.tick(&PlayerAction::default(), FRAME);

    let observer = session.observer();
    assert_eq!((observer.position.x, observer.position.z), (5.0, 5.0));
    assert!(summary.grounded);
    assert!(session.instructions().iter().all(|instruction| instruction.height == 2));
}

#[test]
fn generated_terrain_is_reproducible() {
    let config = SessionConfig {
        world_size: 32,
        ..SessionConfig::default()
    };
    assert_eq!(config.terrain.method, TerrainMethod::Hash);

    let mut first = Session::new(config.clone()).unwrap();
    let mut second = Session::new(config).unwrap();
    assert_eq!(first.store(), second.store());

    first.tick(&PlayerAction::default(), FRAME);
    second.tick(&PlayerAction::default(), FRAME);
    assert_eq!(first.instructions(), second.instructions());
}

#[test]
fn towering_terrain_is_rejected_before_the_session_starts() {
    let overflowing =
        SessionConfig::from_json(r#"{ "world_size": 8, "terrain": { "min_height": 4294967290, "height_span": 22 } }"#);
    assert!(matches!(overflowing, Err(ConfigError::TerrainHeight { .. })));

    let config = SessionConfig {
        world_size: 16,
        terrain: TerrainConfig {
            method: TerrainMethod::Flat { height: 100_000_000 },
            ..TerrainConfig::default()
        },
        ..SessionConfig::default()
    };
    assert!(matches!(
        Session::new(config),
        Err(EngineError::Config(ConfigError::TerrainHeight { .. }))
    ));
}

#[test]
fn towering_edits_are_rejected() {
    let mut session = small_world(-1.0);
    let edit = WorldEdit::Clear { height: 100_000_000 };
    assert!(matches!(session.apply_edit(edit), Err(VoxelError::TooTall { .. })));

    let summary = session.tick(&PlayerAction::default(), FRAME);
    assert_eq!(summary.stats.cubes, 5 * 5 + 24);
}

#[test]
fn malformed_config_is_rejected() {
    assert!(SessionConfig::from_json(r#"{ "world_size": 0 }"#).is_err());
    assert!(SessionConfig::from_json(r#"{ "visibility": { "near_radius": 40 } }"#).is_err());
    assert!(SessionConfig::from_json("not json").is_err());
}
