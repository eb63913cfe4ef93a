use battle_core::config::GameConfig;
use battle_core::obstacle::Bounds;
use battle_core::player::{InputData, Keys};
use battle_core::render::{DrawRecorder, ModelRegistry};
use battle_core::unit::UnitTag;
use battle_core::GameCore;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;

fn populated_core(units: usize) -> GameCore {
    // Wide arena so units spread out instead of piling into contact
    let mut config = GameConfig::default();
    config.boundary = Bounds::new(Vec2::splat(-100.0), Vec2::splat(100.0));
    let mut core = GameCore::new(config, 42);

    for i in 0..units {
        let player = core.add_player();
        let tag = if i % 2 == 0 {
            UnitTag::CollisionTank
        } else {
            UnitTag::TinyTank
        };
        let position = core.random_spawn_position().unwrap();
        core.spawn_unit(tag, player, position, 0.0).unwrap();
        let keys = Keys::FORWARD | Keys::TURN_LEFT | Keys::FIRE;
        core.set_input(player, InputData::new(keys, Vec2::ZERO)).unwrap();
    }
    core
}

fn bench_step(c: &mut Criterion) {
    let mut core = populated_core(64);
    c.bench_function("step_64_units", |b| {
        b.iter(|| black_box(core.step()))
    });
}

fn bench_step_large(c: &mut Criterion) {
    let mut core = populated_core(512);
    c.bench_function("step_512_units", |b| {
        b.iter(|| black_box(core.step()))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut core = populated_core(64);
    for _ in 0..30 {
        core.step();
    }
    let mut recorder = DrawRecorder::new();
    let mut models = ModelRegistry::new();

    c.bench_function("render_64_units", |b| {
        b.iter(|| {
            recorder.clear_commands();
            core.render(&mut recorder, &mut models);
            black_box(recorder.commands().len())
        })
    });
}

criterion_group!(benches, bench_step, bench_step_large, bench_render);
criterion_main!(benches);
