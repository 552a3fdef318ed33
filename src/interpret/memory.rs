//! Critter memory.
//!
//! The first eight slots have fixed meanings (see the constants below). A
//! program may read any slot but can only write slots from [`POSTURE`] on;
//! everything else is owned by the world.

use serde::{Deserialize, Serialize};

/// Memory capacity.
pub const MEMSIZE: usize = 0;
/// Defensive ability.
pub const DEFENSE: usize = 1;
/// Offensive ability.
pub const OFFENSE: usize = 2;
/// Body size.
pub const SIZE: usize = 3;
/// Stored energy.
pub const ENERGY: usize = 4;
/// Unsuccessful passes this turn.
pub const PASS: usize = 5;
/// Tag set by other critters.
pub const TAG: usize = 6;
/// Posture, the first slot a program may write.
pub const POSTURE: usize = 7;
/// Slots below this index are read-only to programs.
pub const FIRST_WRITABLE: usize = POSTURE;

/// Fewest slots any memory has: every fixed slot.
pub const MIN_SLOTS: usize = POSTURE + 1;
/// Most slots a memory may have.
pub const MAX_MEMORY: usize = 1 << 16;

/// Largest tag or posture value.
pub const MAX_MARK: i32 = 99;

/// A default substituted for an invalid initial memory value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    /// Slot that was corrected.
    pub slot: usize,
    /// Value supplied.
    pub found: i32,
    /// Value used instead.
    pub used: i32,
}

/// Fixed-length integer memory of one critter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory(Vec<i32>);

impl Memory {
    /// Validated memory built from the leading values in `values`.
    ///
    /// Capacity outside `[min_memory, MAX_MEMORY]`, abilities, size or
    /// energy below 1, and tag or posture outside `[0, 99]` are replaced by
    /// defaults. Each replacement is reported. The pass counter always
    /// starts at 0. `min_memory` is raised to [`MIN_SLOTS`] if it is lower.
    #[must_use]
    pub fn sanitize(values: &[i32], min_memory: usize) -> (Self, Vec<Substitution>) {
        let mut fixes = Vec::new();
        let mut fix = |slot: usize, ok: bool, default: i32| {
            let found = values.get(slot).copied().unwrap_or(default);
            if ok {
                found
            } else {
                fixes.push(Substitution {
                    slot,
                    found,
                    used: default,
                });
                default
            }
        };
        let min_memory = min_memory.clamp(MIN_SLOTS, MAX_MEMORY);
        let min = i32::try_from(min_memory).unwrap_or(i32::MAX);
        let max = i32::try_from(MAX_MEMORY).unwrap_or(i32::MAX);
        let get = |slot: usize| values.get(slot).copied();
        let capacity = fix(
            MEMSIZE,
            get(MEMSIZE).is_some_and(|v| (min..=max).contains(&v)),
            min,
        );
        let defense = fix(DEFENSE, get(DEFENSE).is_some_and(|v| v >= 1), 1);
        let offense = fix(OFFENSE, get(OFFENSE).is_some_and(|v| v >= 1), 1);
        let size = fix(SIZE, get(SIZE).is_some_and(|v| v >= 1), 1);
        let energy = fix(ENERGY, get(ENERGY).is_some_and(|v| v >= 1), 1);
        let tag = fix(TAG, get(TAG).is_none_or(|v| (0..=MAX_MARK).contains(&v)), 0);
        let posture = fix(
            POSTURE,
            get(POSTURE).is_none_or(|v| (0..=MAX_MARK).contains(&v)),
            0,
        );

        let len = usize::try_from(capacity).unwrap_or(min_memory);
        let mut slots = vec![0; len];
        for (slot, value) in values.iter().enumerate().take(len).skip(FIRST_WRITABLE + 1) {
            slots[slot] = *value;
        }
        slots[MEMSIZE] = capacity;
        slots[DEFENSE] = defense;
        slots[OFFENSE] = offense;
        slots[SIZE] = size;
        slots[ENERGY] = energy;
        slots[TAG] = tag;
        slots[POSTURE] = posture;
        (Self(slots), fixes)
    }

    /// Memory of a newborn sharing this memory's layout and abilities.
    #[must_use]
    pub fn newborn(&self, initial_energy: i32) -> Self {
        let mut slots = vec![0; self.0.len()];
        slots[MEMSIZE] = self.0[MEMSIZE];
        slots[DEFENSE] = self.0[DEFENSE];
        slots[OFFENSE] = self.0[OFFENSE];
        slots[SIZE] = 1;
        slots[ENERGY] = initial_energy;
        Self(slots)
    }

    /// Program read: out-of-range indices read 0.
    #[must_use]
    pub fn read(&self, index: i32) -> i32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.0.get(i).copied())
            .unwrap_or(0)
    }

    /// Program write. Returns `false`, leaving memory unchanged, for
    /// protected or out-of-range slots and for postures outside `[0, 99]`.
    pub fn write(&mut self, index: i32, value: i32) -> bool {
        let Ok(slot) = usize::try_from(index) else {
            return false;
        };
        if slot < FIRST_WRITABLE || slot >= self.0.len() {
            return false;
        }
        if slot == POSTURE && !(0..=MAX_MARK).contains(&value) {
            return false;
        }
        self.0[slot] = value;
        true
    }

    /// Unrestricted write for world bookkeeping.
    pub(crate) fn set(&mut self, slot: usize, value: i32) {
        if let Some(cell) = self.0.get_mut(slot) {
            *cell = value;
        }
    }

    /// Change capacity, keeping slot 0 in step with the length.
    pub(crate) fn resize(&mut self, capacity: usize) {
        self.0.resize(capacity, 0);
        self.0[MEMSIZE] = i32::try_from(capacity).unwrap_or(i32::MAX);
    }

    /// Raw slots.
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slot 0.
    #[must_use]
    pub fn capacity(&self) -> i32 {
        self.0[MEMSIZE]
    }

    /// Slot 1.
    #[must_use]
    pub fn defense(&self) -> i32 {
        self.0[DEFENSE]
    }

    /// Slot 2.
    #[must_use]
    pub fn offense(&self) -> i32 {
        self.0[OFFENSE]
    }

    /// Slot 3.
    #[must_use]
    pub fn size(&self) -> i32 {
        self.0[SIZE]
    }

    /// Slot 4.
    #[must_use]
    pub fn energy(&self) -> i32 {
        self.0[ENERGY]
    }

    /// Slot 5.
    #[must_use]
    pub fn pass(&self) -> i32 {
        self.0[PASS]
    }

    /// Slot 6.
    #[must_use]
    pub fn tag(&self) -> i32 {
        self.0[TAG]
    }

    /// Slot 7.
    #[must_use]
    pub fn posture(&self) -> i32 {
        self.0[POSTURE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Memory {
        Memory::sanitize(&[10, 2, 3, 4, 500, 0, 0, 5], 8).0
    }

    #[test]
    fn test_sanitize_accepts_valid_values() {
        let (memory, fixes) = Memory::sanitize(&[9, 1, 1, 1, 250, 7, 17, 99, 42], 8);
        assert!(fixes.is_empty());
        assert_eq!(memory.len(), 9);
        assert_eq!(memory.as_slice(), &[9, 1, 1, 1, 250, 0, 17, 99, 42]);
    }

    #[test]
    fn test_sanitize_substitutes_defaults() {
        let (memory, fixes) = Memory::sanitize(&[3, 0, -2, 1, 0, 0, 0, 100], 8);
        assert_eq!(memory.len(), 8);
        assert_eq!(memory.capacity(), 8);
        assert_eq!(memory.defense(), 1);
        assert_eq!(memory.offense(), 1);
        assert_eq!(memory.energy(), 1);
        assert_eq!(memory.posture(), 0);
        let slots: Vec<usize> = fixes.iter().map(|f| f.slot).collect();
        assert_eq!(slots, vec![MEMSIZE, DEFENSE, OFFENSE, ENERGY, POSTURE]);
    }

    #[test]
    fn test_reads_out_of_range_are_zero() {
        let memory = memory();
        assert_eq!(memory.read(-1), 0);
        assert_eq!(memory.read(10), 0);
        assert_eq!(memory.read(4), 500);
    }

    #[test]
    fn test_writes_are_protected() {
        let mut memory = memory();
        assert!(!memory.write(1, 50));
        assert!(!memory.write(6, 50));
        assert!(!memory.write(10, 50));
        assert!(!memory.write(7, 100));
        assert!(memory.write(7, 99));
        assert!(memory.write(9, -4));
        assert_eq!(memory.defense(), 2);
        assert_eq!(memory.posture(), 99);
        assert_eq!(memory.read(9), -4);
    }

    #[test]
    fn test_newborn_keeps_layout() {
        let mut parent = memory();
        parent.set(TAG, 12);
        let child = parent.newborn(250);
        assert_eq!(child.as_slice(), &[10, 2, 3, 1, 250, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_resize_updates_capacity() {
        let mut memory = memory();
        memory.resize(12);
        assert_eq!(memory.len(), 12);
        assert_eq!(memory.capacity(), 12);
    }
}
