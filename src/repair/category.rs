//! Generic column codes -> descriptive labels.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::PassStats;
use crate::domain::Cell;

/// Lookup from category code to label, keyed by the normalized code.
///
/// Codes are compared after [`normalize_token`], so `Coluna_0`, `coluna 0`
/// and `COLUNA__0` all resolve to the same entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct CategoryMap {
    entries: HashMap<String, String>,
}

impl CategoryMap {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (normalize_token(k.as_ref()), v.into()))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.entries.get(&normalize_token(token)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for CategoryMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        CategoryMap::new(map)
    }
}

/// Case-fold and collapse runs of whitespace/underscores into a single `_`.
pub fn normalize_token(token: &str) -> String {
    token
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Replace mapped codes by their labels; unmapped cells pass through verbatim.
pub fn repair_category(column: &[Cell], mapping: &CategoryMap) -> Vec<Cell> {
    map_column(column, mapping).0
}

pub(crate) fn map_column(column: &[Cell], mapping: &CategoryMap) -> (Vec<Cell>, PassStats) {
    let mut stats = PassStats::default();
    let cells = column
        .iter()
        .map(|cell| match cell.as_text().and_then(|t| mapping.lookup(t)) {
            Some(label) => {
                stats.converted += 1;
                Cell::Text(label.to_string())
            }
            None => {
                if !cell.is_missing() {
                    stats.untouched += 1;
                }
                cell.clone()
            }
        })
        .collect();
    (cells, stats)
}
