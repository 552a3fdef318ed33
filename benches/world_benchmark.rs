//! Benchmarks for the interpreter, world ticks, and mutation.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use critterworld::interpret::Environment;
use critterworld::loader::load_world;
use critterworld::{Constants, Interpreter, Memory, MutationConfig, Program, mutate, parse};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Program text of the seeker demo, past its header lines.
fn seeker() -> Program {
    let text = std::fs::read_to_string("demos/seeker.txt").unwrap();
    let body: Vec<&str> = text
        .lines()
        .skip_while(|line| line.contains(':') && !line.contains(":="))
        .collect();
    parse(&body.join("\n")).unwrap()
}

/// Fixed surroundings with a seeded random sensor.
struct Field {
    rng: SmallRng,
}

impl Environment for Field {
    fn nearby(&self, direction: i32) -> i32 {
        direction % 3 - 1
    }

    fn ahead(&self, distance: i32) -> i32 {
        if distance > 2 { -11 } else { 0 }
    }

    fn smell(&self) -> i32 {
        3002
    }

    fn random(&mut self, bound: i32) -> i32 {
        self.rng.gen_range(0..bound)
    }
}

fn bench_interpreter_turn(c: &mut Criterion) {
    let program = seeker();
    let mut field = Field {
        rng: SmallRng::seed_from_u64(42),
    };
    let memory = Memory::sanitize(&[9, 2, 3, 1, 500, 0, 0, 17], 8).0;

    c.bench_function("interpreter_turn", |b| {
        b.iter(|| {
            let mut memory = memory.clone();
            let fired = Interpreter::new(&program, &mut memory, &mut field).run_turn(999);
            black_box(fired)
        });
    });
}

fn bench_world_ticks(c: &mut Criterion) {
    let world = load_world(Path::new("demos/garden.world"), Constants::default(), 42).unwrap();

    c.bench_function("garden_100_ticks", |b| {
        b.iter(|| {
            let mut world = world.clone();
            world.advance_time(black_box(100)).unwrap();
            black_box(world.population())
        });
    });
}

fn bench_mutation(c: &mut Criterion) {
    let program = seeker();
    let config = MutationConfig::default();
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("mutate_seeker", |b| {
        b.iter(|| black_box(mutate(black_box(&program), &config, &mut rng)));
    });
}

criterion_group!(benches, bench_interpreter_turn, bench_world_ticks, bench_mutation);
criterion_main!(benches);
