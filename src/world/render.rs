//! ASCII rendering of the hex map.
//!
//! Each hex occupies one character. Hex `(c, r)` is drawn on line
//! `2r - c` counted from the bottom, at text column `2c`, so neighbouring
//! columns interleave like the hexes they stand for:
//!
//! ```text
//!   #
//! -   -
//!   -
//! F   0
//! ```

use crate::world::{Content, Coord, World};

impl World {
    /// Draw the map: `#` rock, `F` food, a critter's facing digit, `-` empty.
    #[must_use]
    pub fn render(&self) -> String {
        let grid = &self.grid;
        let width = usize::try_from(grid.columns().max(0)).unwrap_or(0) * 2;
        let mut out = String::new();
        for y in (0..2 * grid.height()).rev() {
            let mut line = String::with_capacity(width);
            for col in 0..grid.columns() {
                if col > 0 {
                    line.push(' ');
                }
                if (y - col).rem_euclid(2) != 0 {
                    line.push(' ');
                    continue;
                }
                let coord = Coord::new(col, (y + col) / 2);
                line.push(self.glyph(coord));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    fn glyph(&self, coord: Coord) -> char {
        match self.grid.content(coord) {
            Some(Content::Rock) => '#',
            Some(Content::Food(_)) => 'F',
            Some(Content::Critter(id)) => self
                .critter(id)
                .and_then(|c| char::from_digit(c.facing.value().unsigned_abs(), 10))
                .unwrap_or('?'),
            Some(Content::Empty) => '-',
            None => ' ',
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpret::Memory;
    use crate::parse::parse;
    use crate::world::{Constants, Coord, CritterSpec, Direction, World};

    #[test]
    fn test_render_layout() {
        let mut world = World::new(Constants::default(), "tiny", 3, 4, 0).unwrap();
        world.add_rock(Coord::new(1, 2)).unwrap();
        world.add_food(Coord::new(0, 0), 5).unwrap();
        let spec = CritterSpec {
            species: "s".to_string(),
            memory: Memory::sanitize(&[8, 1, 1, 1, 10], 8).0,
            program: parse("1 = 1 --> wait;").unwrap(),
        };
        world
            .add_critter(spec, Coord::new(2, 1), Direction::new(4), None)
            .unwrap();
        let text = world.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines, vec!["  #", "-   -", "  -", "F   4"]);
    }
}
