use crate::catalog::{normalize_key, Catalog};
use crate::error::{Error, Result};
use crate::RowId;
use serde::Serialize;
use std::collections::HashMap;

/// The catalog row a query resolved to, with its display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResolution {
    #[serde(skip)]
    pub row: RowId,
    pub title: String,
    pub artist: String,
}

/// Exact-match lookup tables over normalized title and artist keys.
#[derive(Debug, Default)]
pub struct TitleIndex {
    by_title: HashMap<String, Vec<RowId>>,
    by_title_artist: HashMap<(String, String), RowId>,
}

impl TitleIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for (row, entry) in catalog.entries().iter().enumerate() {
            index.by_title.entry(entry.title_key.clone()).or_default().push(row);
            index
                .by_title_artist
                .entry((entry.title_key.clone(), entry.artist_key.clone()))
                .or_insert(row);
        }
        index
    }

    /// Resolve a raw title and optional artist to a row.
    ///
    /// With a non-blank artist the (title, artist) pair must match exactly.
    /// Without one, the first row carrying that title wins.
    pub fn resolve(&self, title: &str, artist: Option<&str>) -> Result<RowId> {
        let title_key = normalize_key(title);
        if title_key.is_empty() {
            return Err(Error::Validation("song title cannot be empty".into()));
        }
        match artist.map(normalize_key).filter(|a| !a.is_empty()) {
            Some(artist_key) => self
                .by_title_artist
                .get(&(title_key, artist_key))
                .copied()
                .ok_or_else(|| Error::NotFound(format!("song+artist not found: {} - {}", title.trim(), artist.unwrap_or("").trim()))),
            None => self
                .by_title
                .get(&title_key)
                .and_then(|rows| rows.first().copied())
                .ok_or_else(|| Error::NotFound(format!("song not found: {}", title.trim()))),
        }
    }

    pub fn rows_for_title(&self, title: &str) -> &[RowId] {
        self.by_title.get(&normalize_key(title)).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn index() -> TitleIndex {
        let catalog = Catalog::from_entries(vec![
            CatalogEntry::new("A", "Song1", "", "x"),
            CatalogEntry::new("B", "Song1", "", "y"),
            CatalogEntry::new("b", " song1 ", "", "z"),
        ]);
        TitleIndex::build(&catalog)
    }

    #[test]
    fn first_row_wins_without_artist() {
        assert_eq!(index().resolve("  SONG1 ", None).unwrap(), 0);
        assert_eq!(index().resolve("song1", Some("   ")).unwrap(), 0);
        assert_eq!(index().rows_for_title("song1"), &[0, 1, 2]);
    }

    #[test]
    fn artist_selects_exact_pair_first_occurrence() {
        assert_eq!(index().resolve("song1", Some(" b ")).unwrap(), 1);
    }

    #[test]
    fn misses_and_blank_titles() {
        let idx = index();
        assert!(matches!(idx.resolve(" ", None), Err(Error::Validation(_))));
        assert!(matches!(idx.resolve("song2", None), Err(Error::NotFound(_))));
        assert!(matches!(idx.resolve("song1", Some("C")), Err(Error::NotFound(_))));
    }
}
