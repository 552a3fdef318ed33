//! Text loaders for critter files, world descriptions, and constants.
//!
//! Critter file:
//!
//! ```text
//! species: Seeker
//! memsize: 9
//! defense: 2
//! offense: 3
//! size: 1
//! energy: 400
//! posture: 17
//! smell < 1000 --> eat;
//! ```
//!
//! World file, one entry per line, `//` comments allowed:
//!
//! ```text
//! name Small World
//! size 20 30
//! rock 3 4
//! food 5 6 300
//! critter seeker.txt 7 8 2
//! ```
//!
//! Invalid critter headers fall back to defaults with a warning. Broken
//! program text and malformed world entries are errors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult, WorldError};
use crate::interpret::Memory;
use crate::interpret::memory::{DEFENSE, ENERGY, MAX_MEMORY, MEMSIZE, OFFENSE, POSTURE, SIZE};
use crate::parse::parse;
use crate::world::{
    Assignment, Constants, Content, Coord, CritterSpec, DEFAULT_NAME, Direction, World,
};

/// Species of a critter file without a `species:` line.
pub const DEFAULT_SPECIES: &str = "critter";

/// Header keys in file order, with the memory slot each one fills.
const HEADERS: [(&str, Option<usize>); 7] = [
    ("species", None),
    ("memsize", Some(MEMSIZE)),
    ("defense", Some(DEFENSE)),
    ("offense", Some(OFFENSE)),
    ("size", Some(SIZE)),
    ("energy", Some(ENERGY)),
    ("posture", Some(POSTURE)),
];

fn read(path: &Path) -> LoadResult<String> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_blank(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with("//")
}

/// Parse a critter file.
///
/// # Errors
///
/// Returns [`LoadError::MemoryTooLarge`] if `memsize` exceeds
/// [`MAX_MEMORY`], and [`LoadError::Program`] if the program text does not
/// parse.
pub fn parse_critter(text: &str, constants: &Constants) -> LoadResult<CritterSpec> {
    let mut species = None;
    let mut values: [Option<i32>; 8] = [None; 8];
    let mut body = 0;

    for line in text.split_inclusive('\n') {
        if !is_blank(line) {
            let Some((key, value)) = line.split_once(':') else {
                break;
            };
            let Some(&(key, slot)) = HEADERS.iter().find(|(name, _)| *name == key.trim()) else {
                break;
            };
            // `posture := 1` is program text, not a header.
            if value.starts_with('=') {
                break;
            }
            let value = value.trim();
            match slot {
                None => species = Some(value.to_string()),
                Some(slot) => match value.parse() {
                    Ok(v) => values[slot] = Some(v),
                    Err(_) => {
                        tracing::warn!(key, value, "unreadable critter header, using default");
                    }
                },
            }
        }
        body += line.len();
    }

    let species = species.unwrap_or_else(|| {
        tracing::warn!("critter file has no species, using {DEFAULT_SPECIES:?}");
        DEFAULT_SPECIES.to_string()
    });
    for (key, slot) in HEADERS.iter().filter_map(|(k, s)| s.map(|s| (k, s))) {
        if values[slot].is_none() {
            tracing::warn!(%species, key, "missing critter header, using default");
        }
    }
    let oversized = |memsize: &i32| usize::try_from(*memsize).is_ok_and(|n| n > MAX_MEMORY);
    if let Some(memsize) = values[MEMSIZE].filter(oversized) {
        return Err(LoadError::MemoryTooLarge(memsize));
    }
    let min_memory = constants.min_memory_slots();
    let min = i32::try_from(min_memory).unwrap_or(i32::MAX);
    let defaults = [min, 1, 1, 1, constants.initial_energy, 0, 0, 0];
    let raw: Vec<i32> = values
        .iter()
        .zip(defaults)
        .map(|(value, default)| value.unwrap_or(default))
        .collect();
    let (memory, substitutions) = Memory::sanitize(&raw, min_memory);
    for fix in substitutions {
        tracing::warn!(
            %species,
            slot = fix.slot,
            found = fix.found,
            used = fix.used,
            "invalid initial memory, using default"
        );
    }
    let program = parse(&text[body..])?;
    Ok(CritterSpec {
        species,
        memory,
        program,
    })
}

/// Read and parse a critter file.
///
/// # Errors
///
/// Fails if the file cannot be read or its program does not parse.
pub fn load_critter(path: &Path, constants: &Constants) -> LoadResult<CritterSpec> {
    parse_critter(&read(path)?, constants)
}

fn syntax(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Syntax {
        line,
        message: message.into(),
    }
}

fn numbers<const N: usize>(
    line: usize,
    entry: &str,
    fields: &[&str],
) -> LoadResult<[i32; N]> {
    if fields.len() < N {
        return Err(syntax(line, format!("`{entry}` needs {N} numbers")));
    }
    let mut out = [0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field
            .parse()
            .map_err(|_| syntax(line, format!("`{field}` is not a number")))?;
    }
    Ok(out)
}

/// Parse a world description.
///
/// Critter files named in the description are resolved against `base`.
///
/// # Errors
///
/// Fails on malformed entries, invalid world sizes, and unreadable or
/// unparsable critter files.
pub fn parse_world(
    text: &str,
    base: &Path,
    constants: Constants,
    seed: u64,
) -> LoadResult<World> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !is_blank(line))
        .peekable();

    let name = match lines.peek() {
        Some((_, line)) if line.split_whitespace().next() == Some("name") => {
            let name = line["name".len()..].trim().to_string();
            lines.next();
            name
        }
        _ => {
            tracing::warn!("world file has no name, using {DEFAULT_NAME:?}");
            DEFAULT_NAME.to_string()
        }
    };
    let (columns, rows) = match lines.peek() {
        Some(&(number, line)) if line.split_whitespace().next() == Some("size") => {
            let fields: Vec<&str> = line.split_whitespace().skip(1).collect();
            let [columns, rows] = numbers::<2>(number, "size", &fields)?;
            lines.next();
            (columns, rows)
        }
        _ => {
            tracing::warn!(
                columns = constants.columns,
                rows = constants.rows,
                "world file has no size, using defaults"
            );
            (constants.columns, constants.rows)
        }
    };

    let mut world = World::new(constants, name, columns, rows, seed)?;
    let mut species: HashMap<PathBuf, CritterSpec> = HashMap::new();

    for (number, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "rock" => {
                let [col, row] = numbers::<2>(number, "rock", &fields[1..])?;
                placed(number, world.add_rock(Coord::new(col, row)));
            }
            "food" => {
                let [col, row, amount] = numbers::<3>(number, "food", &fields[1..])?;
                placed(number, world.add_food(Coord::new(col, row), amount));
            }
            "critter" => {
                let Some(file) = fields.get(1) else {
                    return Err(syntax(number, "`critter` needs a file name"));
                };
                let [col, row, dir] = numbers::<3>(number, "critter", &fields[2..])?;
                let path = base.join(file);
                let spec = match species.get(&path) {
                    Some(spec) => spec.clone(),
                    None => {
                        let spec = load_critter(&path, world.constants())?;
                        species.insert(path, spec.clone());
                        spec
                    }
                };
                let facing = Direction::new(dir);
                let coord = Coord::new(col, row);
                let coord = if matches!(world.hex_content(coord), Some(Content::Empty)) {
                    Some(coord)
                } else {
                    let fallback = world.random_empty();
                    tracing::warn!(
                        line = number,
                        %coord,
                        ?fallback,
                        "critter hex unavailable, placing at random"
                    );
                    fallback
                };
                if let Some(coord) = coord {
                    placed(number, world.add_critter(spec, coord, facing, None).map(|_| ()));
                }
            }
            other => tracing::warn!(line = number, entry = other, "unknown world entry ignored"),
        }
    }
    Ok(world)
}

/// Log a placement the world refused.
fn placed(line: usize, result: Result<(), WorldError>) {
    if let Err(err) = result {
        tracing::warn!(line, %err, "world entry skipped");
    }
}

/// Read and parse a world file. Critter paths are relative to the file.
///
/// # Errors
///
/// See [`parse_world`].
pub fn load_world(path: &Path, constants: Constants, seed: u64) -> LoadResult<World> {
    let text = read(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_world(&text, base, constants, seed)
}

/// Parse constants in either JSON or `NAME value` form.
///
/// Unknown names are ignored with a warning; missing names keep their
/// defaults.
///
/// # Errors
///
/// Fails on malformed JSON or a value that is not a number.
pub fn parse_constants(text: &str) -> LoadResult<Constants> {
    if text.trim_start().starts_with('{') {
        return serde_json::from_str(text).map_err(LoadError::Constants);
    }
    let mut constants = Constants::default();
    for (i, line) in text.lines().enumerate() {
        if is_blank(line) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
            return Err(syntax(i + 1, format!("expected `NAME value`, found `{}`", line.trim())));
        };
        match constants.assign(name, value) {
            Assignment::Set => {}
            Assignment::UnknownName => {
                tracing::warn!(line = i + 1, name, "unknown constant ignored");
            }
            Assignment::BadValue => {
                return Err(syntax(i + 1, format!("`{value}` is not a valid value for {name}")));
            }
        }
    }
    Ok(constants)
}

/// Read and parse a constants file.
///
/// # Errors
///
/// See [`parse_constants`].
pub fn load_constants(path: &Path) -> LoadResult<Constants> {
    parse_constants(&read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEEKER: &str = "species: Seeker\n\
                          memsize: 9\n\
                          defense: 2\n\
                          offense: 3\n\
                          size: 1\n\
                          energy: 400\n\
                          posture: 17\n\
                          smell < 1000 --> eat;\n";

    #[test]
    fn test_parse_critter() {
        let spec = parse_critter(SEEKER, &Constants::default()).unwrap();
        assert_eq!(spec.species, "Seeker");
        assert_eq!(spec.memory.as_slice(), &[9, 2, 3, 1, 400, 0, 0, 17, 0]);
        assert_eq!(spec.program.rule_count(), 1);
    }

    #[test]
    fn test_bad_headers_use_defaults() {
        let text = "species: Odd\nmemsize: 3\ndefense: 0\nposture: 300\nenergy: lots\n1 = 1 --> wait;";
        let spec = parse_critter(text, &Constants::default()).unwrap();
        assert_eq!(spec.memory.capacity(), 8);
        assert_eq!(spec.memory.defense(), 1);
        assert_eq!(spec.memory.offense(), 1);
        assert_eq!(spec.memory.energy(), 250);
        assert_eq!(spec.memory.posture(), 0);
    }

    #[test]
    fn test_low_min_memory_keeps_fixed_slots() {
        let constants = parse_constants("MIN_MEMORY 5\n").unwrap();
        let text = "species: Tiny\nmemsize: 5\nposture: 3\n1 = 1 --> posture := 4 wait;";
        let spec = parse_critter(text, &constants).unwrap();
        assert_eq!(spec.memory.capacity(), 8);
        assert_eq!(spec.memory.len(), 8);
        assert_eq!(spec.memory.posture(), 3);
    }

    #[test]
    fn test_oversized_memory_is_an_error() {
        let text = "species: Greedy\nmemsize: 2000000000\n1 = 1 --> wait;";
        assert!(matches!(
            parse_critter(text, &Constants::default()),
            Err(LoadError::MemoryTooLarge(2_000_000_000))
        ));
        let text = format!("memsize: {MAX_MEMORY}\n1 = 1 --> wait;");
        let spec = parse_critter(&text, &Constants::default()).unwrap();
        assert_eq!(spec.memory.len(), MAX_MEMORY);
    }

    #[test]
    fn test_headerless_critter() {
        let spec = parse_critter("1 = 1 --> posture := 5 wait;", &Constants::default()).unwrap();
        assert_eq!(spec.species, DEFAULT_SPECIES);
    }

    #[test]
    fn test_broken_program_is_an_error() {
        let text = "species: Broken\n1 = --> wait;";
        assert!(matches!(
            parse_critter(text, &Constants::default()),
            Err(LoadError::Program(_))
        ));
    }

    #[test]
    fn test_parse_world_entries() {
        let text = "// sample\nname Tiny Place\nsize 6 8\nrock 1 1\nfood 2 2 50\nrock 1 1\nfrobnicate\n";
        let world = parse_world(text, Path::new("."), Constants::default(), 1).unwrap();
        assert_eq!(world.name(), "Tiny Place");
        assert_eq!(world.grid().columns(), 6);
        assert_eq!(world.hex_content(Coord::new(1, 1)), Some(Content::Rock));
        assert_eq!(world.hex_content(Coord::new(2, 2)), Some(Content::Food(50)));
    }

    #[test]
    fn test_world_defaults_and_errors() {
        let world = parse_world("rock 0 0\n", Path::new("."), Constants::default(), 1).unwrap();
        assert_eq!(world.name(), DEFAULT_NAME);
        assert_eq!(world.grid().columns(), 50);

        assert!(matches!(
            parse_world("name x\nsize 10 2\n", Path::new("."), Constants::default(), 1),
            Err(LoadError::InvalidSize { columns: 10, rows: 2 })
        ));
        assert!(matches!(
            parse_world("size 2000000000 2000000000\n", Path::new("."), Constants::default(), 1),
            Err(LoadError::InvalidSize { .. })
        ));
        assert!(matches!(
            parse_world("name x\nsize 10 20\nfood 1 1\n", Path::new("."), Constants::default(), 1),
            Err(LoadError::Syntax { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_constants_text_and_json() {
        let constants = parse_constants("// tuned\nMOVE_COST 4\nMYSTERY 1\n").unwrap();
        assert_eq!(constants.move_cost, 4);
        assert_eq!(constants.bud_cost, 9);
        let constants = parse_constants(r#"{"BUD_COST": 3}"#).unwrap();
        assert_eq!(constants.bud_cost, 3);
        assert!(matches!(
            parse_constants("ROWS many"),
            Err(LoadError::Syntax { line: 1, .. })
        ));
    }
}
