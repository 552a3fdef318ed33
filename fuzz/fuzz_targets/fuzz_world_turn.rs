#![no_main]

use arbitrary::Arbitrary;
use critterworld::world::check_invariants;
use critterworld::{Constants, CritterSpec, Memory, World, parse};
use libfuzzer_sys::fuzz_target;

/// Structured input for world fuzzing.
#[derive(Arbitrary, Debug)]
struct WorldInput {
    /// Seed for the world's random source.
    seed: u64,
    /// Initial memory values.
    memory: [i32; 9],
    /// Critters to place.
    count: u8,
    /// Ticks to run.
    ticks: u8,
    /// Program text.
    program: String,
}

fuzz_target!(|input: WorldInput| {
    let Ok(program) = parse(&input.program) else {
        return;
    };
    // Cap inputs to keep runs short
    let mut memory = input.memory;
    memory[0] = memory[0].clamp(8, 64);
    memory[3] = memory[3].clamp(1, 10);
    let spec = CritterSpec {
        species: "fuzz".to_string(),
        memory: Memory::sanitize(&memory, 8).0,
        program,
    };

    let mut world = World::new(Constants::default(), "fuzz", 12, 16, input.seed).unwrap();
    world.add_critters_random(&spec, usize::from(input.count % 32), None);
    for _ in 0..input.ticks % 32 {
        world.advance_time(1).unwrap();
        let violations = check_invariants(&world);
        assert!(violations.is_empty(), "{violations:?}");
    }
});
