//! Attack resolution.
//!
//! Damage grows with the attacker's size and saturates through a logistic
//! curve in the difference between attacking and defending strength:
//!
//! ```text
//! damage = BASE_DAMAGE * size * sigmoid(DAMAGE_INC * (size*offense - target_size*target_defense))
//! ```
//!
//! Evenly matched critters therefore deal half of the base damage per unit
//! of size.

use crate::interpret::Memory;
use crate::world::Constants;

/// The logistic function.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Energy removed from `defender` by an attack from `attacker`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // result is clamped to the i32 range first
pub fn damage(attacker: &Memory, defender: &Memory, constants: &Constants) -> i32 {
    let size = f64::from(attacker.size());
    let strength = size * f64::from(attacker.offense());
    let resistance = f64::from(defender.size()) * f64::from(defender.defense());
    let raw = f64::from(constants.base_damage)
        * size
        * sigmoid(constants.damage_inc * (strength - resistance));
    raw.round().clamp(0.0, f64::from(i32::MAX)) as i32
}
