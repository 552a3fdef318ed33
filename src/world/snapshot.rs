//! Serializable views of the world for clients.
//!
//! Clients keep their own copy of the map and ask for what changed since
//! the version they last saw.

use serde::Serialize;

use crate::error::{WorldError, WorldResult};
use crate::world::{Content, Coord, Critter, CritterId, SessionId, World};

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Sees everything.
    Admin,
    /// Sees the genomes of the critters this session created.
    Session(SessionId),
    /// Sees no genomes.
    Anonymous,
}

impl Viewer {
    /// Whether this viewer may read the genome of `critter`.
    #[must_use]
    pub fn can_inspect(self, critter: &Critter) -> bool {
        match self {
            Viewer::Admin => true,
            Viewer::Session(session) => critter.session == Some(session),
            Viewer::Anonymous => false,
        }
    }
}

/// Everything a viewer may know about one critter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CritterSnapshot {
    /// Identifier.
    pub id: CritterId,
    /// Species name.
    pub species_id: String,
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
    /// Facing.
    pub direction: i32,
    /// Copy of the memory.
    pub mem: Vec<i32>,
    /// Printed program, for viewers allowed to see it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Printed last rule, or `"none"`, for viewers allowed to see it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recently_executed_rule: Option<String>,
}

impl CritterSnapshot {
    /// Snapshot of `critter` as `viewer` sees it.
    #[must_use]
    pub fn of(critter: &Critter, viewer: Viewer) -> Self {
        let visible = viewer.can_inspect(critter);
        Self {
            id: critter.id,
            species_id: critter.species.clone(),
            col: critter.position.col,
            row: critter.position.row,
            direction: critter.facing.value(),
            mem: critter.memory.as_slice().to_vec(),
            program: visible.then(|| critter.program.to_string()),
            recently_executed_rule: visible.then(|| {
                critter.last_rule.map_or_else(
                    || "none".to_string(),
                    |rule| critter.program.display_node(rule).to_string(),
                )
            }),
        }
    }
}

/// What a client sees on one hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HexView {
    /// Nothing.
    Nothing,
    /// A rock.
    Rock,
    /// Food.
    Food {
        /// Amount of food.
        value: i32,
    },
    /// A critter.
    Critter {
        /// Identifier.
        id: CritterId,
        /// Species name.
        species_id: String,
        /// Facing.
        direction: i32,
        /// Sensor appearance.
        appearance: i32,
    },
}

/// A hex and its view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexInfo {
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
    /// Content.
    #[serde(flatten)]
    pub view: HexView,
}

/// A critter that has died or been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadCritter {
    /// Identifier.
    pub id: CritterId,
    /// World version at the time of death.
    pub version: u64,
}

/// A half-open rectangle `[from, to)` of columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// First column.
    pub from_col: i32,
    /// First row.
    pub from_row: i32,
    /// Column past the last.
    pub to_col: i32,
    /// Row past the last.
    pub to_row: i32,
}

impl Region {
    /// Whether `coord` lies inside.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.col >= self.from_col
            && coord.col < self.to_col
            && coord.row >= self.from_row
            && coord.row < self.to_row
    }
}

/// World summary plus the hexes that changed since a version.
#[derive(Debug, Clone, Serialize)]
pub struct WorldStatus {
    /// Ticks simulated.
    pub current_timestep: u64,
    /// Current version.
    pub current_version: u64,
    /// Version the diff starts from.
    pub update_since: u64,
    /// Continuous run rate.
    pub rate: f64,
    /// World name.
    pub name: String,
    /// Live critters.
    pub population: usize,
    /// Columns.
    pub cols: i32,
    /// Rows.
    pub rows: i32,
    /// Critters that died after `update_since`.
    pub dead_critters: Vec<CritterId>,
    /// Changed hexes.
    pub state: Vec<HexInfo>,
}

impl World {
    /// What a client sees at `coord`, or `None` off the grid.
    #[must_use]
    pub fn hex_view(&self, coord: Coord) -> Option<HexView> {
        Some(match self.grid.content(coord)? {
            Content::Empty => HexView::Nothing,
            Content::Rock => HexView::Rock,
            Content::Food(value) => HexView::Food { value },
            Content::Critter(id) => {
                let critter = self.critter(id)?;
                HexView::Critter {
                    id,
                    species_id: critter.species.clone(),
                    direction: critter.facing.value(),
                    appearance: critter.appearance(),
                }
            }
        })
    }

    /// Snapshot of a live critter.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownCritter`] if no live critter has `id`.
    pub fn critter_snapshot(&self, id: CritterId, viewer: Viewer) -> WorldResult<CritterSnapshot> {
        self.critter(id)
            .map(|critter| CritterSnapshot::of(critter, viewer))
            .ok_or(WorldError::UnknownCritter(id))
    }

    /// Deaths recorded after version `since`.
    #[must_use]
    pub fn dead_since(&self, since: u64) -> Vec<DeadCritter> {
        self.dead
            .iter()
            .filter(|dead| dead.version > since)
            .copied()
            .collect()
    }

    /// Summary plus every hex in `region` changed after `since`.
    ///
    /// Empty hexes are reported only for `since > 0`: a client starting
    /// from scratch already assumes the map is empty.
    #[must_use]
    pub fn status(&self, since: u64, region: Option<Region>) -> WorldStatus {
        let state = self
            .grid
            .iter()
            .filter(|(coord, hex)| {
                hex.last_updated > since
                    && region.is_none_or(|r| r.contains(*coord))
                    && (since > 0 || !hex.content.is_empty())
            })
            .filter_map(|(coord, _)| {
                self.hex_view(coord).map(|view| HexInfo {
                    col: coord.col,
                    row: coord.row,
                    view,
                })
            })
            .collect();
        WorldStatus {
            current_timestep: self.steps,
            current_version: self.version,
            update_since: since,
            rate: self.rate,
            name: self.name.clone(),
            population: self.population(),
            cols: self.grid.columns(),
            rows: self.grid.rows(),
            dead_critters: self.dead_since(since).into_iter().map(|d| d.id).collect(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::Memory;
    use crate::parse::parse;
    use crate::world::{Constants, CritterSpec, Direction};

    fn world_with_critter(session: Option<SessionId>) -> (World, CritterId) {
        let mut world = World::new(Constants::default(), "snap", 6, 8, 3).unwrap();
        let spec = CritterSpec {
            species: "watcher".to_string(),
            memory: Memory::sanitize(&[8, 1, 1, 1, 100], 8).0,
            program: parse("smell > 0 --> wait;").unwrap(),
        };
        let id = world
            .add_critter(spec, Coord::new(1, 1), Direction::new(2), session)
            .unwrap();
        (world, id)
    }

    #[test]
    fn test_snapshot_visibility() {
        let owner = SessionId(7);
        let (mut world, id) = world_with_critter(Some(owner));
        let hidden = world.critter_snapshot(id, Viewer::Session(SessionId(8))).unwrap();
        assert_eq!(hidden.program, None);
        assert_eq!(hidden.recently_executed_rule, None);
        assert_eq!(hidden.mem.len(), 8);

        let own = world.critter_snapshot(id, Viewer::Session(owner)).unwrap();
        assert_eq!(own.program.as_deref(), Some("smell > 0 --> wait;\n"));
        assert_eq!(own.recently_executed_rule.as_deref(), Some("none"));

        world.advance_time(1).unwrap();
        let admin = world.critter_snapshot(id, Viewer::Admin).unwrap();
        assert_eq!(
            admin.recently_executed_rule.as_deref(),
            Some("smell > 0 --> wait;")
        );
        assert!(world.critter_snapshot(CritterId(99), Viewer::Admin).is_err());
    }

    #[test]
    fn test_status_reports_changes_since() {
        let (mut world, id) = world_with_critter(None);
        world.add_rock(Coord::new(3, 3)).unwrap();
        let full = world.status(0, None);
        assert_eq!(full.current_version, 2);
        assert_eq!(full.state.len(), 2);
        assert_eq!(full.population, 1);

        let recent = world.status(1, None);
        assert_eq!(recent.state.len(), 1);
        assert_eq!(recent.state[0].view, HexView::Rock);

        world.remove_critter(id).unwrap();
        let after = world.status(2, None);
        assert_eq!(after.dead_critters, vec![id]);
        assert_eq!(after.state.len(), 1);
        assert_eq!(after.state[0].view, HexView::Nothing);
        assert!(world.status(3, None).state.is_empty());
    }

    #[test]
    fn test_status_region() {
        let (mut world, _) = world_with_critter(None);
        world.add_rock(Coord::new(4, 4)).unwrap();
        let region = Region {
            from_col: 0,
            from_row: 0,
            to_col: 2,
            to_row: 2,
        };
        let status = world.status(0, Some(region));
        assert_eq!(status.state.len(), 1);
        assert_eq!((status.state[0].col, status.state[0].row), (1, 1));
    }

    #[test]
    fn test_status_json_shape() {
        let (world, _) = world_with_critter(None);
        let json = serde_json::to_value(world.status(0, None)).unwrap();
        assert_eq!(json["name"], "snap");
        assert_eq!(json["state"][0]["type"], "critter");
        assert_eq!(json["state"][0]["species_id"], "watcher");
    }
}
