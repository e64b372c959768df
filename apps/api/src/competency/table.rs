//! Loader for the pipe-delimited competency table.
//!
//! Expected header: `Competency|Definition|L1|L2|L3|L4|L5`. Extra columns are
//! ignored, level columns are optional, rows without a name or a definition
//! are dropped.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const NAME_COLUMN: &str = "Competency";
const DEFINITION_COLUMN: &str = "Definition";
pub const LEVEL_COLUMNS: [&str; 5] = ["L1", "L2", "L3", "L4", "L5"];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to open competency table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("competency table is malformed: {0}")]
    Csv(#[from] csv::Error),

    #[error("competency table has no '{0}' column")]
    MissingColumn(&'static str),
}

/// One taxonomy row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyRecord {
    pub name: String,
    pub definition: String,
    /// Level descriptors keyed `L1`..`L5`; absent or blank levels are omitted.
    pub levels: BTreeMap<String, String>,
}

pub fn load_table(path: &Path) -> Result<Vec<CompetencyRecord>, TableError> {
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_table(file)?;
    info!(
        "Loaded {} competencies from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

pub fn parse_table<R: Read>(reader: R) -> Result<Vec<CompetencyRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_idx = column(NAME_COLUMN).ok_or(TableError::MissingColumn(NAME_COLUMN))?;
    let definition_idx =
        column(DEFINITION_COLUMN).ok_or(TableError::MissingColumn(DEFINITION_COLUMN))?;
    let level_idx: Vec<(&str, usize)> = LEVEL_COLUMNS
        .iter()
        .filter_map(|level| column(level).map(|idx| (*level, idx)))
        .collect();

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row?;
        let name = row.get(name_idx).unwrap_or("");
        let definition = row.get(definition_idx).unwrap_or("");
        if name.is_empty() || definition.is_empty() {
            dropped += 1;
            continue;
        }

        let levels = level_idx
            .iter()
            .filter_map(|(level, idx)| {
                row.get(*idx)
                    .filter(|text| !text.is_empty())
                    .map(|text| (level.to_string(), text.to_string()))
            })
            .collect();

        records.push(CompetencyRecord {
            name: name.to_string(),
            definition: definition.to_string(),
            levels,
        });
    }

    if dropped > 0 {
        warn!("Dropped {dropped} competency rows missing a name or definition");
    }
    Ok(records)
}
