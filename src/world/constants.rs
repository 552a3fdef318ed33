//! Simulation constants.
//!
//! One immutable table per world. The serialized names match the classic
//! `NAME value` constants file, so the same keys work in JSON.

use serde::{Deserialize, Serialize};

use crate::interpret::memory::{MAX_MEMORY, MIN_SLOTS};

/// Tunable parameters of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Constants {
    /// Damage scale of an attack.
    pub base_damage: i32,
    /// Steepness of the attack sigmoid.
    pub damage_inc: f64,
    /// Energy a critter can store per unit of size.
    pub energy_per_size: i32,
    /// Food left behind per unit of size when a critter dies.
    pub food_per_size: i32,
    /// Radius of the smell search.
    pub max_smell_distance: i32,
    /// Sensor reading for rocks and off-grid hexes.
    pub rock_value: i32,
    /// Default world width.
    pub columns: i32,
    /// Default world height.
    pub rows: i32,
    /// Cap on rule passes per turn.
    pub max_rules_per_turn: i32,
    /// Energy gained per unit of size while waiting.
    pub solar_flux: i32,
    /// Energy per unit of size to move.
    pub move_cost: i32,
    /// Energy per unit of size to attack.
    pub attack_cost: i32,
    /// Energy per unit of size and complexity to grow.
    pub grow_cost: i32,
    /// Energy per unit of complexity to bud.
    pub bud_cost: i32,
    /// Energy per unit of complexity to mate.
    pub mate_cost: i32,
    /// Complexity contributed by each rule.
    pub rule_cost: i32,
    /// Complexity contributed by each point of defense or offense.
    pub ability_cost: i32,
    /// Energy of a newborn.
    pub initial_energy: i32,
    /// Smallest memory a critter may have.
    pub min_memory: i32,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            base_damage: 100,
            damage_inc: 0.2,
            energy_per_size: 500,
            food_per_size: 200,
            max_smell_distance: 10,
            rock_value: -1,
            columns: 50,
            rows: 68,
            max_rules_per_turn: 999,
            solar_flux: 1,
            move_cost: 3,
            attack_cost: 5,
            grow_cost: 1,
            bud_cost: 9,
            mate_cost: 5,
            rule_cost: 2,
            ability_cost: 25,
            initial_energy: 250,
            min_memory: 8,
        }
    }
}

/// Outcome of assigning one `NAME value` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assignment {
    Set,
    UnknownName,
    BadValue,
}

impl Constants {
    /// Smallest memory as a slot count, never fewer than the fixed slots.
    #[must_use]
    pub fn min_memory_slots(&self) -> usize {
        usize::try_from(self.min_memory)
            .unwrap_or(0)
            .clamp(MIN_SLOTS, MAX_MEMORY)
    }

    /// Set the constant called `name` from its textual value.
    pub(crate) fn assign(&mut self, name: &str, value: &str) -> Assignment {
        if name == "DAMAGE_INC" {
            return match value.parse() {
                Ok(v) => {
                    self.damage_inc = v;
                    Assignment::Set
                }
                Err(_) => Assignment::BadValue,
            };
        }
        let slot = match name {
            "BASE_DAMAGE" => &mut self.base_damage,
            "ENERGY_PER_SIZE" => &mut self.energy_per_size,
            "FOOD_PER_SIZE" => &mut self.food_per_size,
            "MAX_SMELL_DISTANCE" => &mut self.max_smell_distance,
            "ROCK_VALUE" => &mut self.rock_value,
            "COLUMNS" => &mut self.columns,
            "ROWS" => &mut self.rows,
            "MAX_RULES_PER_TURN" => &mut self.max_rules_per_turn,
            "SOLAR_FLUX" => &mut self.solar_flux,
            "MOVE_COST" => &mut self.move_cost,
            "ATTACK_COST" => &mut self.attack_cost,
            "GROW_COST" => &mut self.grow_cost,
            "BUD_COST" => &mut self.bud_cost,
            "MATE_COST" => &mut self.mate_cost,
            "RULE_COST" => &mut self.rule_cost,
            "ABILITY_COST" => &mut self.ability_cost,
            "INITIAL_ENERGY" => &mut self.initial_energy,
            "MIN_MEMORY" => &mut self.min_memory,
            _ => return Assignment::UnknownName,
        };
        match value.parse() {
            Ok(v) => {
                *slot = v;
                Assignment::Set
            }
            Err(_) => Assignment::BadValue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_classic_names() {
        let json = serde_json::to_string(&Constants::default()).unwrap();
        assert!(json.contains("\"BASE_DAMAGE\":100"));
        assert!(json.contains("\"MAX_RULES_PER_TURN\":999"));
    }

    #[test]
    fn test_missing_json_fields_keep_defaults() {
        let constants: Constants = serde_json::from_str(r#"{"SOLAR_FLUX": 4}"#).unwrap();
        assert_eq!(constants.solar_flux, 4);
        assert_eq!(constants.initial_energy, 250);
    }

    #[test]
    fn test_assign() {
        let mut constants = Constants::default();
        assert_eq!(constants.assign("MOVE_COST", "7"), Assignment::Set);
        assert_eq!(constants.assign("DAMAGE_INC", "0.5"), Assignment::Set);
        assert_eq!(constants.assign("NOT_A_CONSTANT", "1"), Assignment::UnknownName);
        assert_eq!(constants.assign("ROWS", "many"), Assignment::BadValue);
        assert_eq!(constants.move_cost, 7);
        assert!((constants.damage_inc - 0.5).abs() < f64::EPSILON);
        assert_eq!(constants.rows, 68);
    }

    #[test]
    fn test_min_memory_covers_fixed_slots() {
        let mut constants = Constants::default();
        assert_eq!(constants.assign("MIN_MEMORY", "5"), Assignment::Set);
        assert_eq!(constants.min_memory_slots(), MIN_SLOTS);
        constants.min_memory = -3;
        assert_eq!(constants.min_memory_slots(), MIN_SLOTS);
        constants.min_memory = 20;
        assert_eq!(constants.min_memory_slots(), 20);
    }
}
