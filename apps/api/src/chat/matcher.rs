//! Similarity Query Service: top-1 nearest record by cosine similarity.
//!
//! Per request: Received → EmbeddingQuery → EmbeddingCandidates → Ranking → Responded.
//! A provider failure at any stage aborts the request with a `MatchError` naming the stage.
//!
//! Candidate vectors come either from live provider calls (one per candidate, per
//! request) or from a `CandidateIndex` built once at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chat::similarity::cosine_similarity;
use crate::embeddings::{Embedder, EmbeddingVector, ProviderError};
use crate::models::salary::SalaryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Received,
    EmbeddingQuery,
    EmbeddingCandidates,
    Ranking,
    Responded,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchStage::Received => "received",
            MatchStage::EmbeddingQuery => "embedding_query",
            MatchStage::EmbeddingCandidates => "embedding_candidates",
            MatchStage::Ranking => "ranking",
            MatchStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("similarity search failed during {stage}: {source}")]
pub struct MatchError {
    pub stage: MatchStage,
    pub source: ProviderError,
}

impl MatchError {
    fn at(stage: MatchStage) -> impl FnOnce(ProviderError) -> MatchError {
        move |source| MatchError { stage, source }
    }
}

/// Candidate embeddings computed once, keyed by descriptive text.
/// Records with identical descriptive text share one vector.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    vectors: HashMap<String, EmbeddingVector>,
}

impl CandidateIndex {
    pub async fn build(
        embedder: &dyn Embedder,
        records: &[SalaryRecord],
        concurrency: usize,
    ) -> Result<Self, ProviderError> {
        let mut texts: Vec<String> = records.iter().map(SalaryRecord::descriptive_text).collect();
        texts.sort_unstable();
        texts.dedup();

        info!(
            "Building candidate index: {} records, {} distinct descriptions",
            records.len(),
            texts.len()
        );

        let calls: Vec<_> = texts.iter().map(|text| embedder.embed(text)).collect();
        let vectors: Vec<EmbeddingVector> = stream::iter(calls)
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        Ok(Self {
            vectors: texts.into_iter().zip(vectors).collect(),
        })
    }

    pub fn get(&self, record: &SalaryRecord) -> Option<&EmbeddingVector> {
        self.vectors.get(&record.descriptive_text())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Finds the dataset record closest to a free-text query.
#[derive(Clone)]
pub struct Matcher {
    embedder: Arc<dyn Embedder>,
    concurrency: usize,
    index: Option<Arc<CandidateIndex>>,
}

impl Matcher {
    pub fn new(embedder: Arc<dyn Embedder>, concurrency: usize) -> Self {
        Self {
            embedder,
            concurrency: concurrency.max(1),
            index: None,
        }
    }

    pub fn with_index(mut self, index: Arc<CandidateIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Returns the candidate with the highest cosine similarity to `query`.
    ///
    /// Ties go to the earliest candidate in `candidates`, whatever order the
    /// embedding calls complete in. NaN scores never win. An empty candidate
    /// set returns `None` without calling the provider.
    pub async fn find_best_match<'a>(
        &self,
        query: &str,
        candidates: &'a [SalaryRecord],
    ) -> Result<Option<&'a SalaryRecord>, MatchError> {
        debug!(stage = %MatchStage::Received, candidates = candidates.len());
        if candidates.is_empty() {
            return Ok(None);
        }

        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(MatchError::at(MatchStage::EmbeddingQuery))?;

        let best = match &self.index {
            Some(index) => rank_indexed(&query_vector, candidates, index),
            None => self.rank_live(&query_vector, candidates).await?,
        };

        match best {
            Some(best) => {
                info!(
                    stage = %MatchStage::Responded,
                    "Best match: candidate {} '{}' (similarity {:.4})",
                    best.index,
                    candidates[best.index].job_title,
                    best.score
                );
                Ok(Some(&candidates[best.index]))
            }
            None => {
                warn!(stage = %MatchStage::Ranking, "No comparable candidate embeddings");
                Ok(None)
            }
        }
    }

    /// Embeds every candidate, at most `concurrency` calls in flight.
    /// `buffered` yields results in candidate order, so ranking stays deterministic.
    async fn rank_live(
        &self,
        query_vector: &[f32],
        candidates: &[SalaryRecord],
    ) -> Result<Option<BestMatch>, MatchError> {
        let texts: Vec<String> = candidates.iter().map(SalaryRecord::descriptive_text).collect();
        // Collected before streaming so the handler future stays `Send`.
        let calls: Vec<_> = texts.iter().map(|text| self.embedder.embed(text)).collect();
        let mut embeddings = stream::iter(calls).buffered(self.concurrency).enumerate();

        let mut ranking = Ranking::default();
        while let Some((index, result)) = embeddings.next().await {
            let vector = result.map_err(MatchError::at(MatchStage::EmbeddingCandidates))?;
            ranking.consider(index, cosine_similarity(query_vector, &vector));
        }
        Ok(ranking.best)
    }
}

fn rank_indexed(
    query_vector: &[f32],
    candidates: &[SalaryRecord],
    index: &CandidateIndex,
) -> Option<BestMatch> {
    let mut ranking = Ranking::default();
    for (i, candidate) in candidates.iter().enumerate() {
        match index.get(candidate) {
            Some(vector) => ranking.consider(i, cosine_similarity(query_vector, vector)),
            None => warn!("Candidate {i} missing from index; skipped"),
        }
    }
    ranking.best
}

#[derive(Debug, Clone, Copy)]
struct BestMatch {
    index: usize,
    score: f64,
}

#[derive(Debug, Default)]
struct Ranking {
    best: Option<BestMatch>,
}

impl Ranking {
    /// Strictly-greater replaces, so the first of equal scores is kept.
    fn consider(&mut self, index: usize, score: f64) {
        if score.is_nan() {
            debug!("Candidate {index} not comparable; skipped");
            return;
        }
        let replaces = match self.best {
            Some(best) => score > best.score,
            None => true,
        };
        if replaces {
            self.best = Some(BestMatch { index, score });
        }
    }
}
