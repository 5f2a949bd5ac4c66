use crate::error::{Error, Result};
use crate::tokenizer::terms;
use crate::{RowId, TermId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub row: RowId,
    pub weight: f32, // normalized tf-idf weight
}

/// Sparse tf-idf vector of one document, sorted by term id. Unit length unless
/// the document has no term in the vocabulary, in which case it is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    pub entries: Vec<(TermId, f32)>,
}

impl TermVector {
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }
}

/// Vocabulary, idf weights and one vector per document, plus postings
/// (term -> rows sorted by row) for scoring. Immutable once built.
#[derive(Debug, Default)]
pub struct VectorSpace {
    pub dictionary: HashMap<String, TermId>,
    pub idf: Vec<f32>,
    pub vectors: Vec<TermVector>,
    pub postings: Vec<Vec<Posting>>,
    pub candidate_terms: usize,
}

impl VectorSpace {
    /// Build the space over `docs` in order.
    ///
    /// When more than `max_features` distinct terms occur, the ones with the
    /// highest document frequency are kept; equal frequencies go to the term
    /// encountered first. Kept terms are numbered in first-encountered order,
    /// so identical input always yields identical ids.
    pub fn build<S: AsRef<str>>(docs: &[S], max_features: usize, ngram_max: usize) -> Result<Self> {
        if docs.is_empty() {
            return Err(Error::Build("empty corpus".into()));
        }
        if max_features == 0 {
            return Err(Error::Build("max_features must be at least 1".into()));
        }

        // Candidate ids follow first-encounter order across the corpus.
        let mut candidates: HashMap<String, u32> = HashMap::new();
        let mut cand_df: Vec<u32> = Vec::new();
        let mut doc_counts: Vec<Vec<(u32, u32)>> = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut tf: HashMap<u32, u32> = HashMap::new();
            let mut order: Vec<u32> = Vec::new();
            for term in terms(doc.as_ref(), ngram_max) {
                let next = candidates.len() as u32;
                let cid = *candidates.entry(term).or_insert_with(|| {
                    cand_df.push(0);
                    next
                });
                let count = tf.entry(cid).or_insert(0);
                if *count == 0 {
                    cand_df[cid as usize] += 1;
                    order.push(cid);
                }
                *count += 1;
            }
            doc_counts.push(order.into_iter().map(|cid| (cid, tf[&cid])).collect());
        }

        let candidate_terms = candidates.len();
        if candidate_terms == 0 {
            return Err(Error::Build("no document contains a usable term".into()));
        }

        // Map candidate id -> term id for the retained terms.
        let mut keep: Vec<u32> = (0..candidate_terms as u32).collect();
        if candidate_terms > max_features {
            keep.sort_by(|a, b| cand_df[*b as usize].cmp(&cand_df[*a as usize]).then(a.cmp(b)));
            keep.truncate(max_features);
            keep.sort_unstable();
            tracing::debug!(candidate_terms, kept = keep.len(), "vocabulary pruned");
        }
        let mut remap: Vec<Option<TermId>> = vec![None; candidate_terms];
        for (tid, cid) in keep.iter().enumerate() {
            remap[*cid as usize] = Some(tid as TermId);
        }

        let mut dictionary: HashMap<String, TermId> = HashMap::with_capacity(keep.len());
        for (term, cid) in candidates {
            if let Some(tid) = remap[cid as usize] {
                dictionary.insert(term, tid);
            }
        }

        let n = docs.len() as f32;
        let idf: Vec<f32> = keep
            .iter()
            .map(|cid| ((1.0 + n) / (1.0 + cand_df[*cid as usize] as f32)).ln() + 1.0)
            .collect();

        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); keep.len()];
        let mut vectors: Vec<TermVector> = Vec::with_capacity(docs.len());
        for (row, counts) in doc_counts.into_iter().enumerate() {
            let mut entries: Vec<(TermId, f32)> = counts
                .into_iter()
                .filter_map(|(cid, tf)| remap[cid as usize].map(|tid| (tid, tf as f32 * idf[tid as usize])))
                .collect();
            let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for (_, w) in entries.iter_mut() { *w /= norm; }
            }
            entries.sort_unstable_by_key(|(tid, _)| *tid);
            // Rows are visited in order, so every postings list stays sorted by row.
            for (tid, weight) in &entries {
                postings[*tid as usize].push(Posting { row, weight: *weight });
            }
            vectors.push(TermVector { entries });
        }

        Ok(Self { dictionary, idf, vectors, postings, candidate_terms })
    }

    pub fn vocabulary_size(&self) -> usize { self.idf.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn vector(&self, row: RowId) -> Option<&TermVector> { self.vectors.get(row) }

    pub fn empty_vectors(&self) -> usize { self.vectors.iter().filter(|v| v.is_empty()).count() }
}
