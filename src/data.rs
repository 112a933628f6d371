//! Player attribute file loading
//!
//! Every file in the data directory describes one player. The file name
//! carries the club and the player's name, the body is a flat list of lines
//! where attribute names and their integer values appear in the same order.
//! Blank lines and the "skills" section marker are skipped.

use crate::error::LoadError;
use ndarray::Array2;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Identity column holding the title-cased player name
pub const NAME_COLUMN: &str = "Name";
/// Identity column holding the club code from the file name
pub const CLUB_COLUMN: &str = "Club";

const SKILLS_MARKER: &str = "skills";

/// One player and their attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub name: String,
    pub club: String,
    /// Attribute name to value; holds every table column once loaded
    pub attributes: HashMap<String, i64>,
}

impl PlayerRecord {
    /// Value of an attribute, 0 when the player has none
    pub fn value(&self, column: &str) -> i64 {
        self.attributes.get(column).copied().unwrap_or(0)
    }

    /// Plot label in the form `Name[Club]`
    pub fn label(&self) -> String {
        format!("{}[{}]", self.name, self.club)
    }
}

/// All players plus the column vocabulary discovered from the seed files
#[derive(Debug, Clone)]
pub struct PlayerTable {
    /// `Name`, `Club`, then attribute columns in first-seen order
    pub columns: Vec<String>,
    pub players: Vec<PlayerRecord>,
}

impl PlayerTable {
    /// Numeric attribute columns, without the two identity columns
    pub fn attribute_columns(&self) -> &[String] {
        &self.columns[2..]
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Raw attribute matrix (n_players, n_columns) for the given columns
    pub fn to_array(&self, columns: &[String]) -> Array2<f64> {
        Array2::from_shape_fn((self.players.len(), columns.len()), |(row, col)| {
            self.players[row].value(&columns[col]) as f64
        })
    }
}

/// Names of the two files whose attribute names define the table columns
#[derive(Debug, Clone)]
pub struct SeedFiles {
    /// Representative goalkeeper; its attributes come first
    pub goalkeeper: String,
    /// Representative outfield player
    pub outfield: String,
}

impl Default for SeedFiles {
    fn default() -> Self {
        Self {
            goalkeeper: "MUFC_david_de gea.txt".to_string(),
            outfield: "MUFC_adnan_januzaj.txt".to_string(),
        }
    }
}

/// A single line of an attribute file after cleanup
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Attribute(String),
    Value(i64),
}

/// Load every player file in `data_dir` into a zero-filled table
///
/// # Arguments
/// * `data_dir` - Directory holding `<club>_<first>_<last>.<ext>` files
/// * `seeds` - Goalkeeper and outfield files used to discover the columns
///
/// # Returns
/// * `PlayerTable` with one row per file, sorted by file name
pub fn load_players(data_dir: &Path, seeds: &SeedFiles) -> Result<PlayerTable, LoadError> {
    let columns = discover_columns(data_dir, seeds)?;
    info!(
        "Discovered {} attribute columns from seed files",
        columns.len() - 2
    );

    let files = list_player_files(data_dir)?;
    let mut players = Vec::with_capacity(files.len());
    for path in &files {
        let mut record = read_player(path)?;
        for column in record.attributes.keys() {
            if !columns.contains(column) {
                warn!(
                    "{}: attribute {:?} is not a table column, ignoring",
                    path.display(),
                    column
                );
            }
        }
        record.attributes.retain(|key, _| columns.contains(key));
        for column in &columns[2..] {
            record.attributes.entry(column.clone()).or_insert(0);
        }
        players.push(record);
    }

    info!("Loaded {} players from {}", players.len(), data_dir.display());
    Ok(PlayerTable { columns, players })
}

/// Build the column vocabulary from the goalkeeper seed then the outfield seed
pub fn discover_columns(data_dir: &Path, seeds: &SeedFiles) -> Result<Vec<String>, LoadError> {
    let mut columns = vec![NAME_COLUMN.to_string(), CLUB_COLUMN.to_string()];

    for seed in [&seeds.goalkeeper, &seeds.outfield] {
        let path = data_dir.join(seed);
        if !path.is_file() {
            return Err(LoadError::MissingSeed(path));
        }
        let body = read_file(&path)?;
        for token in tokenize(&body) {
            if let Token::Attribute(name) = token {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
        debug!("{} columns after seed {}", columns.len(), path.display());
    }

    Ok(columns)
}

/// Read one player file into a record holding only the attributes it names
pub fn read_player(path: &Path) -> Result<PlayerRecord, LoadError> {
    let (club, name) = parse_file_name(path)?;
    let body = read_file(path)?;

    let mut columns = Vec::new();
    let mut params = Vec::new();
    for token in tokenize(&body) {
        match token {
            Token::Attribute(column) => columns.push(column),
            Token::Value(value) => params.push(value),
        }
    }

    // Names and values are paired purely by position, so a count mismatch
    // means the pairs cannot be trusted.
    if columns.len() != params.len() {
        return Err(LoadError::ColumnValueMismatch {
            path: path.to_path_buf(),
            columns: columns.len(),
            values: params.len(),
        });
    }

    let attributes = columns.into_iter().zip(params).collect();
    debug!("Read {} from {}", name, path.display());

    Ok(PlayerRecord {
        name,
        club,
        attributes,
    })
}

/// Split `<club>_<first>_<last>.<ext>` into the club and a title-cased name
///
/// Extra `_` parts after the last name are ignored.
pub fn parse_file_name(path: &Path) -> Result<(String, String), LoadError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 || parts[..3].iter().any(|part| part.is_empty()) {
        return Err(LoadError::MalformedFileName(file_name));
    }
    if parts.len() > 3 {
        debug!("{}: ignoring trailing name parts {:?}", file_name, &parts[3..]);
    }

    let name = title_case(&format!("{} {}", parts[1], parts[2]));
    Ok((parts[0].to_string(), name))
}

/// Upper-case each letter that follows a non-letter, lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

fn tokenize(body: &str) -> Vec<Token> {
    body.lines()
        .filter(|line| !line.trim().is_empty() && !line.contains(SKILLS_MARKER))
        .map(|line| {
            let cleaned: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            match cleaned.parse::<i64>() {
                Ok(value) => Token::Value(value),
                Err(_) => Token::Attribute(cleaned),
            }
        })
        .collect()
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn list_player_files(data_dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let read_dir_err = |source| LoadError::ReadDir {
        path: data_dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn seeds() -> SeedFiles {
        SeedFiles {
            goalkeeper: "MUFC_david_de gea.txt".to_string(),
            outfield: "MUFC_adnan_januzaj.txt".to_string(),
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("david de gea"), "David De Gea");
        assert_eq!(title_case("JOHN o'shea"), "John O'Shea");
        assert_eq!(title_case("mesut özil"), "Mesut Özil");
    }

    #[test]
    fn test_parse_file_name() {
        let (club, name) = parse_file_name(Path::new("players/MUFC_david_de gea.txt")).unwrap();
        assert_eq!(club, "MUFC");
        assert_eq!(name, "David De Gea");

        let result = parse_file_name(Path::new("players/MUFC_januzaj.txt"));
        assert!(matches!(result, Err(LoadError::MalformedFileName(_))));

        let result = parse_file_name(Path::new("players/MUFC__januzaj.txt"));
        assert!(matches!(result, Err(LoadError::MalformedFileName(_))));
    }

    #[test]
    fn test_parse_file_name_extra_parts() {
        let (club, name) = parse_file_name(Path::new("players/MUFC_juan_mata_garcia.txt")).unwrap();
        assert_eq!(club, "MUFC");
        assert_eq!(name, "Juan Mata");
    }

    #[test]
    fn test_tokenize_skips_blank_and_marker_lines() {
        let body = "skills\n\n Ball control \n\t85\n\nDiving\n12 \n";
        assert_eq!(
            tokenize(body),
            vec![
                Token::Attribute("Ballcontrol".to_string()),
                Token::Value(85),
                Token::Attribute("Diving".to_string()),
                Token::Value(12),
            ]
        );
    }

    #[test]
    fn test_read_player_zips_by_position() {
        let dir = tempdir().unwrap();
        write(dir.path(), "CFC_eden_hazard.txt", "skills\nPace\nDribbling\n90\n93\n");

        let record = read_player(&dir.path().join("CFC_eden_hazard.txt")).unwrap();
        assert_eq!(record.name, "Eden Hazard");
        assert_eq!(record.club, "CFC");
        assert_eq!(record.value("Pace"), 90);
        assert_eq!(record.value("Dribbling"), 93);
        assert_eq!(record.label(), "Eden Hazard[CFC]");
    }

    #[test]
    fn test_read_player_count_mismatch() {
        let dir = tempdir().unwrap();
        write(dir.path(), "CFC_eden_hazard.txt", "Pace\n90\nDribbling\n");

        let result = read_player(&dir.path().join("CFC_eden_hazard.txt"));
        assert!(matches!(
            result,
            Err(LoadError::ColumnValueMismatch {
                columns: 2,
                values: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_discover_columns_goalkeeper_first() {
        let dir = tempdir().unwrap();
        write(dir.path(), "MUFC_david_de gea.txt", "skills\nDiving\n85\nPace\n50\n");
        write(dir.path(), "MUFC_adnan_januzaj.txt", "skills\nPace\n80\nShooting\n70\n");

        let columns = discover_columns(dir.path(), &seeds()).unwrap();
        assert_eq!(columns, vec!["Name", "Club", "Diving", "Pace", "Shooting"]);
    }

    #[test]
    fn test_missing_seed() {
        let dir = tempdir().unwrap();
        write(dir.path(), "MUFC_david_de gea.txt", "Diving\n85\n");

        let result = load_players(dir.path(), &seeds());
        assert!(matches!(result, Err(LoadError::MissingSeed(_))));
    }

    #[test]
    fn test_unreadable_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = list_player_files(&missing);
        assert!(matches!(result, Err(LoadError::ReadDir { .. })));
    }

    #[test]
    fn test_load_players_fills_missing_with_zero() {
        let dir = tempdir().unwrap();
        write(dir.path(), "MUFC_david_de gea.txt", "skills\nDiving\n85\nPace\n50\n");
        write(dir.path(), "MUFC_adnan_januzaj.txt", "skills\nPace\n80\nShooting\n70\n");
        write(dir.path(), "LFC_mo_salah.txt", "Pace\n95\nShooting\n88\nFlair\n99\n");

        let table = load_players(dir.path(), &seeds()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.attribute_columns(), &["Diving", "Pace", "Shooting"]);

        for player in &table.players {
            assert_eq!(player.attributes.len(), 3);
        }

        let salah = table.players.iter().find(|p| p.name == "Mo Salah").unwrap();
        assert_eq!(salah.value("Diving"), 0);
        assert_eq!(salah.value("Pace"), 95);
        assert!(!salah.attributes.contains_key("Flair"));

        let raw = table.to_array(table.attribute_columns());
        assert_eq!(raw.shape(), &[3, 3]);
    }
}
