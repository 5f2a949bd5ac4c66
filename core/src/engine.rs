use crate::catalog::Catalog;
use crate::error::Result;
use crate::ranker::{top_k, Recommendation, RecommendationResult};
use crate::resolver::{QueryResolution, TitleIndex};
use crate::vocab::VectorSpace;
use crate::RowId;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_MAX_FEATURES: usize = 80_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Vocabulary cap; the most document-frequent terms are kept.
    pub max_features: usize,
    /// Longest n-gram turned into a term (2 = unigrams and bigrams).
    pub ngram_max: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_features: DEFAULT_MAX_FEATURES, ngram_max: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub entries: usize,
    pub vocabulary_size: usize,
    pub candidate_terms: usize,
    pub empty_vectors: usize,
}

/// Everything needed to answer queries, built once and never mutated.
/// Share it behind an `Arc`; to refresh, build a new one and swap the handle.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    space: VectorSpace,
    titles: TitleIndex,
}

impl Engine {
    pub fn construct<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::construct_with(path, &BuildOptions::default())
    }

    pub fn construct_with<P: AsRef<Path>>(path: P, options: &BuildOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading dataset");
        Self::from_catalog(Catalog::from_path(path)?, options)
    }

    pub fn from_reader<R: Read>(reader: R, options: &BuildOptions) -> Result<Self> {
        Self::from_catalog(Catalog::from_reader(reader)?, options)
    }

    pub fn from_catalog(catalog: Catalog, options: &BuildOptions) -> Result<Self> {
        let start = Instant::now();
        let texts: Vec<&str> = catalog.entries().iter().map(|e| e.combined_text()).collect();
        let space = VectorSpace::build(&texts, options.max_features, options.ngram_max)?;
        let titles = TitleIndex::build(&catalog);
        let engine = Self { catalog, space, titles };
        let stats = engine.stats();
        tracing::info!(
            entries = stats.entries,
            vocabulary = stats.vocabulary_size,
            candidates = stats.candidate_terms,
            empty_vectors = stats.empty_vectors,
            took_s = start.elapsed().as_secs_f64(),
            "engine built"
        );
        Ok(engine)
    }

    pub fn resolve(&self, title: &str, artist: Option<&str>) -> Result<QueryResolution> {
        let row = self.titles.resolve(title, artist)?;
        Ok(self.resolution(row))
    }

    /// Resolve the query and return up to `k` most similar other songs.
    pub fn recommend(&self, title: &str, k: usize, artist: Option<&str>) -> Result<RecommendationResult> {
        let query = self.resolve(title, artist)?;
        let recommendations = top_k(&self.space, query.row, k)
            .into_iter()
            .filter_map(|(row, score)| {
                self.catalog.get(row).map(|e| Recommendation {
                    row,
                    title: e.title.clone(),
                    artist: e.artist.clone(),
                    link: e.link.clone(),
                    score,
                })
            })
            .collect();
        Ok(RecommendationResult { query, recommendations })
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            entries: self.catalog.len(),
            vocabulary_size: self.space.vocabulary_size(),
            candidate_terms: self.space.candidate_terms,
            empty_vectors: self.space.empty_vectors(),
        }
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    fn resolution(&self, row: RowId) -> QueryResolution {
        // Rows come from the title index, which only holds catalog positions.
        let entry = &self.catalog.entries()[row];
        QueryResolution { row, title: entry.title.clone(), artist: entry.artist.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn stats_reflect_the_build() {
        let csv = "artist,song,link,text\nA,Ballad,,rain storm\nB,Anthem,,\n";
        let engine = Engine::from_reader(csv.as_bytes(), &BuildOptions::default()).unwrap();
        let stats = engine.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.empty_vectors, 0);
        assert_eq!(stats.vocabulary_size, 6);
        assert_eq!(stats.vocabulary_size, stats.candidate_terms);
    }
}
