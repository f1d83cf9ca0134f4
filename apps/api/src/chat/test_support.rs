//! Deterministic embedding provider and record builders for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::embeddings::{Embedder, EmbeddingVector, ProviderError};
use crate::models::salary::SalaryRecord;

pub fn record(
    year: i32,
    title: &str,
    experience: &str,
    employment: &str,
    location: &str,
    salary: f64,
) -> SalaryRecord {
    SalaryRecord {
        work_year: year,
        job_title: title.to_string(),
        experience_level: experience.to_string(),
        employment_type: employment.to_string(),
        company_location: location.to_string(),
        salary_in_usd: salary,
    }
}

/// Returns a fixed vector per input text. Unknown text gets a zero vector,
/// which is never comparable.
#[derive(Default)]
pub struct FakeEmbedder {
    vectors: HashMap<String, (EmbeddingVector, Duration)>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, text: &str, vector: EmbeddingVector) -> Self {
        self.with_delayed(text, vector, Duration::ZERO)
    }

    pub fn with_delayed(mut self, text: &str, vector: EmbeddingVector, delay: Duration) -> Self {
        self.vectors.insert(text.to_string(), (vector, delay));
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(text) {
            return Err(ProviderError::Api {
                status: 500,
                message: "fake provider failure".to_string(),
            });
        }

        match self.vectors.get(text) {
            Some((vector, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(vector.clone())
            }
            None => Ok(vec![0.0; 3]),
        }
    }
}
