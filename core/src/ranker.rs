use crate::resolver::QueryResolution;
use crate::vocab::VectorSpace;
use crate::RowId;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(skip)]
    pub row: RowId,
    pub title: String,
    pub artist: String,
    pub link: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub query: QueryResolution,
    pub recommendations: Vec<Recommendation>,
}

/// Cosine similarity of `row` against every row, accumulated through the
/// postings of the terms in `row`'s vector. Rows sharing no term score 0.
pub fn scores(space: &VectorSpace, row: RowId) -> Vec<f32> {
    let mut scores = vec![0.0f32; space.vectors.len()];
    if let Some(query) = space.vector(row) {
        for (tid, q_w) in &query.entries {
            for p in &space.postings[*tid as usize] {
                scores[p.row] += p.weight * q_w; // cosine since both sides are unit length
            }
        }
    }
    // Rounding can push identical documents a hair past 1.
    for s in scores.iter_mut() {
        *s = s.clamp(0.0, 1.0);
    }
    scores
}

fn by_score_then_row(scores: &[f32]) -> impl Fn(&RowId, &RowId) -> Ordering + '_ {
    move |a, b| scores[*b].total_cmp(&scores[*a]).then(a.cmp(b))
}

/// The `k` best rows other than `row`, by descending score and then ascending
/// row. Fewer are returned when the catalog is smaller than `k + 1`.
pub fn top_k(space: &VectorSpace, row: RowId, k: usize) -> Vec<(RowId, f32)> {
    let scores = scores(space, row);
    let mut ranked: Vec<RowId> = (0..scores.len()).filter(|r| *r != row).collect();
    let cmp = by_score_then_row(&scores);
    if k == 0 {
        return Vec::new();
    }
    if k < ranked.len() {
        // The order is total, so partial selection picks the same prefix a full sort would.
        ranked.select_nth_unstable_by(k - 1, &cmp);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(&cmp);
    tracing::debug!(row, k, returned = ranked.len(), "ranked");
    ranked.into_iter().map(|r| (r, scores[r])).collect()
}
