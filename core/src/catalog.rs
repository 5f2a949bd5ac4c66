use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const ARTIST_COLUMN: &str = "artist";
pub const TITLE_COLUMN: &str = "song";
pub const LINK_COLUMN: &str = "link";
pub const LYRICS_COLUMN: &str = "text";

/// One song of the catalog. Display fields are kept as read; the key fields
/// and the combined text are derived once at load time.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub artist: String,
    pub title: String,
    pub link: String,
    #[serde(skip)]
    pub lyrics: String,
    #[serde(skip)]
    pub artist_key: String,
    #[serde(skip)]
    pub title_key: String,
    #[serde(skip)]
    pub(crate) combined_text: String,
}

impl CatalogEntry {
    pub fn new(artist: &str, title: &str, link: &str, lyrics: &str) -> Self {
        let combined_text = format!("{artist} {title} {lyrics}").to_lowercase();
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            lyrics: lyrics.to_string(),
            artist_key: normalize_key(artist),
            title_key: normalize_key(title),
            combined_text,
        }
    }

    /// Lower-cased `artist title lyrics`, the text that gets vectorized.
    pub fn combined_text(&self) -> &str { &self.combined_text }
}

/// Normalization shared by catalog keys and incoming queries.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Ordered songs exactly as they appear in the dataset: no filtering, no dedup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self { Self { entries } }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse CSV with a header row. Column order does not matter and extra
    /// columns are ignored; empty or missing cells become empty strings.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or(Error::Schema { column: name })
        };
        let artist_col = column(ARTIST_COLUMN)?;
        let title_col = column(TITLE_COLUMN)?;
        let link_col = column(LINK_COLUMN)?;
        let lyrics_col = column(LYRICS_COLUMN)?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let cell = |idx: usize| record.get(idx).unwrap_or("");
            entries.push(CatalogEntry::new(cell(artist_col), cell(title_col), cell(link_col), cell(lyrics_col)));
        }
        tracing::debug!(rows = entries.len(), "catalog loaded");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, row: usize) -> Option<&CatalogEntry> { self.entries.get(row) }

    pub fn entries(&self) -> &[CatalogEntry] { &self.entries }
}
