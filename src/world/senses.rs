//! What a critter perceives of the world during its turn.
//!
//! Hex readings are encoded as single integers: 0 for empty, `ROCK_VALUE`
//! for rocks and off-grid hexes, `-amount - 1` for food, and the occupant's
//! appearance for critters.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use rand::Rng;
use rand::rngs::SmallRng;

use crate::interpret::Environment;
use crate::world::{Constants, Content, Coord, Critter, CritterId, Direction, Grid};

/// Smell reading when no food is within range.
pub const NO_FOOD: i32 = 1_000_000;

/// Read-only view of the world from one critter's hex.
#[derive(Debug)]
pub(crate) struct Surroundings<'a> {
    pub(crate) grid: &'a Grid,
    pub(crate) critters: &'a [Option<Critter>],
    pub(crate) index: &'a HashMap<CritterId, usize>,
    pub(crate) constants: &'a Constants,
    pub(crate) rng: &'a mut SmallRng,
    pub(crate) position: Coord,
    pub(crate) facing: Direction,
}

/// Sensor encoding of the hex at `coord`.
pub(crate) fn reading(
    grid: &Grid,
    critters: &[Option<Critter>],
    index: &HashMap<CritterId, usize>,
    constants: &Constants,
    coord: Option<Coord>,
) -> i32 {
    match coord.and_then(|c| grid.content(c)) {
        None | Some(Content::Rock) => constants.rock_value,
        Some(Content::Empty) => 0,
        Some(Content::Food(amount)) => amount.saturating_neg().saturating_sub(1),
        Some(Content::Critter(id)) => index
            .get(&id)
            .and_then(|&slot| critters.get(slot))
            .and_then(Option::as_ref)
            .map_or(0, Critter::appearance),
    }
}

impl Surroundings<'_> {
    fn read(&self, coord: Option<Coord>) -> i32 {
        reading(self.grid, self.critters, self.index, self.constants, coord)
    }
}

impl Environment for Surroundings<'_> {
    fn nearby(&self, direction: i32) -> i32 {
        self.read(self.position.neighbor(Direction::new(direction)))
    }

    fn ahead(&self, distance: i32) -> i32 {
        self.read(self.position.step(self.facing, distance.max(0)))
    }

    fn smell(&self) -> i32 {
        smell(self.grid, self.position, self.facing, self.constants.max_smell_distance)
    }

    fn random(&mut self, bound: i32) -> i32 {
        self.rng.gen_range(0..bound)
    }
}

/// Best known route to a hex.
#[derive(Clone, Copy)]
struct Route {
    distance: i32,
    arrival: Direction,
    first_hop: Direction,
}

/// Distance and direction to the nearest food.
///
/// Dijkstra search outward from `origin`: each step costs 1 plus the number
/// of turns needed to face the new direction. Rocks and critters block the
/// search. The result is `(distance - 1) * 1000 + d` where `d` is the
/// absolute direction of the first step, or [`NO_FOOD`] if no food lies
/// within `max_distance`.
#[must_use]
pub fn smell(grid: &Grid, origin: Coord, facing: Direction, max_distance: i32) -> i32 {
    let mut best: HashMap<Coord, Route> = HashMap::new();
    let mut done: HashSet<Coord> = HashSet::new();
    let mut queue = BinaryHeap::new();
    let mut sequence = 0u64;

    best.insert(
        origin,
        Route {
            distance: 0,
            arrival: facing,
            first_hop: facing,
        },
    );
    queue.push(Reverse((0, sequence, origin)));

    while let Some(Reverse((distance, _, coord))) = queue.pop() {
        let Some(route) = best.get(&coord).copied() else {
            continue;
        };
        if route.distance != distance || !done.insert(coord) {
            continue;
        }
        if coord != origin && matches!(grid.content(coord), Some(Content::Food(_))) {
            return (distance - 1) * 1000 + route.first_hop.value();
        }
        if distance - 1 > max_distance {
            return NO_FOOD;
        }
        for dir in Direction::ALL {
            let Some(next) = coord.neighbor(dir) else {
                continue;
            };
            if done.contains(&next) {
                continue;
            }
            if !matches!(grid.content(next), Some(Content::Empty | Content::Food(_))) {
                continue;
            }
            let candidate = Route {
                distance: distance + 1 + route.arrival.turn_cost(dir),
                arrival: dir,
                first_hop: if coord == origin { dir } else { route.first_hop },
            };
            let improved = match best.entry(next) {
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                    true
                }
                Entry::Occupied(mut slot) if slot.get().distance > candidate.distance => {
                    slot.insert(candidate);
                    true
                }
                Entry::Occupied(_) => false,
            };
            if improved {
                sequence += 1;
                queue.push(Reverse((candidate.distance, sequence, next)));
            }
        }
    }
    NO_FOOD
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grid() -> Grid {
        Grid::new(12, 16).unwrap()
    }

    #[test]
    fn test_food_straight_ahead() {
        let mut grid = grid();
        let origin = Coord::new(4, 5);
        let facing = Direction::new(0);
        grid.set(origin.step(facing, 3).unwrap(), Content::Food(10), 1);
        assert_eq!(smell(&grid, origin, facing, 10), 2000);
    }

    #[test]
    fn test_adjacent_food_reports_direction() {
        let mut grid = grid();
        let origin = Coord::new(4, 5);
        let facing = Direction::new(1);
        let target = origin.neighbor(Direction::new(3)).unwrap();
        grid.set(target, Content::Food(10), 1);
        // Facing 1, food in direction 3: two turns.
        assert_eq!(smell(&grid, origin, facing, 10), 2 * 1000 + 3);
    }

    #[test]
    fn test_first_hop_ignores_facing() {
        let origin = Coord::new(4, 5);
        for facing in Direction::ALL {
            let mut grid = grid();
            let target = origin.neighbor(Direction::new(4)).unwrap();
            grid.set(target, Content::Food(10), 1);
            assert_eq!(smell(&grid, origin, facing, 10) % 1000, 4);
        }
    }

    #[test]
    fn test_nearby_is_absolute() {
        let mut grid = grid();
        let constants = Constants::default();
        let index = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let origin = Coord::new(4, 5);
        grid.set(origin.neighbor(Direction::new(2)).unwrap(), Content::Food(4), 1);
        for facing in Direction::ALL {
            let env = Surroundings {
                grid: &grid,
                critters: &[],
                index: &index,
                constants: &constants,
                rng: &mut rng,
                position: origin,
                facing,
            };
            assert_eq!(env.nearby(2), -5);
            assert_eq!(env.nearby(8), -5);
            assert_eq!(env.nearby(-4), -5);
            assert_eq!(env.nearby(0), 0);
        }
    }

    #[test]
    fn test_rocks_block_the_search() {
        let mut grid = grid();
        let origin = Coord::new(4, 5);
        for dir in Direction::ALL {
            grid.set(origin.neighbor(dir).unwrap(), Content::Rock, 1);
        }
        grid.set(Coord::new(8, 8), Content::Food(10), 1);
        assert_eq!(smell(&grid, origin, Direction::new(0), 10), NO_FOOD);
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = grid();
        let origin = Coord::new(0, 0);
        grid.set(origin.step(Direction::new(0), 9).unwrap(), Content::Food(10), 1);
        assert_eq!(smell(&grid, origin, Direction::new(0), 5), NO_FOOD);
        assert_eq!(smell(&grid, origin, Direction::new(0), 10), 8000);
    }

    #[test]
    fn test_readings() {
        let mut grid = grid();
        let constants = Constants::default();
        let index = HashMap::new();
        grid.set(Coord::new(1, 1), Content::Food(5), 1);
        grid.set(Coord::new(1, 2), Content::Rock, 1);
        let read = |coord| reading(&grid, &[], &index, &constants, coord);
        assert_eq!(read(Some(Coord::new(1, 1))), -6);
        assert_eq!(read(Some(Coord::new(1, 2))), -1);
        assert_eq!(read(Some(Coord::new(1, 3))), 0);
        assert_eq!(read(Some(Coord::new(1, 0))), -1);
        assert_eq!(read(None), -1);
    }
}
