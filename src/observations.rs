//! Observation storage and time-delay embedding.

use nalgebra::DMatrix;

use crate::types::Embedding;

/// A set of univariate time series supplied to a calculator.
///
/// Series are kept separate so that no embedding vector straddles the
/// boundary between two of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    series: Vec<Vec<f64>>,
}

impl ObservationSet {
    /// Create an empty observation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one series.
    pub fn push(&mut self, series: Vec<f64>) {
        self.series.push(series);
    }

    /// Remove all series.
    pub fn clear(&mut self) {
        self.series.clear();
    }

    /// The stored series, in insertion order.
    pub fn series(&self) -> &[Vec<f64>] {
        &self.series
    }

    /// Raw length of every series, in order.
    pub fn series_lengths(&self) -> Vec<usize> {
        self.series.iter().map(Vec::len).collect()
    }

    /// Total number of raw samples across all series.
    pub fn total_samples(&self) -> usize {
        self.series.iter().map(Vec::len).sum()
    }

    /// True when no series have been added.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of (past, next) pairs available under `embedding`.
    pub fn observations_under(&self, embedding: Embedding) -> usize {
        self.series
            .iter()
            .map(|s| embedding.observations_in(s.len()))
            .sum()
    }

    /// Build the past-state and next-value matrices for `embedding`.
    pub fn embed(&self, embedding: Embedding) -> EmbeddedObservations {
        let rows = self.observations_under(embedding);
        let mut past = Vec::with_capacity(rows * embedding.k);
        let mut next = Vec::with_capacity(rows);
        let mut series_lengths = Vec::with_capacity(self.series.len());

        for series in &self.series {
            series_lengths.push(series.len());
            push_embedded(series, embedding, &mut past, &mut next);
        }

        EmbeddedObservations {
            embedding,
            past: DMatrix::from_row_slice(rows, embedding.k, &past),
            next: DMatrix::from_row_slice(rows, 1, &next),
            series_lengths,
        }
    }
}

/// Embeds a single series, appending row-major past vectors and next values.
fn push_embedded(series: &[f64], embedding: Embedding, past: &mut Vec<f64>, next: &mut Vec<f64>) {
    for t in embedding.first_target_index()..series.len() {
        for lag in 0..embedding.k {
            past.push(series[t - 1 - lag * embedding.tau]);
        }
        next.push(series[t]);
    }
}

/// Embed a standalone series, e.g. for computing locals under a fitted model.
pub fn embed_series(series: &[f64], embedding: Embedding) -> EmbeddedObservations {
    let mut set = ObservationSet::new();
    set.push(series.to_vec());
    set.embed(embedding)
}

/// Observations laid out for a mutual-information estimator.
#[derive(Debug, Clone)]
pub struct EmbeddedObservations {
    /// Embedding used to build the matrices.
    pub embedding: Embedding,
    /// One row per observation, `k` columns (most recent lag first).
    pub past: DMatrix<f64>,
    /// One row per observation, single column with the next value.
    pub next: DMatrix<f64>,
    /// Raw length of every contributing series, in order.
    pub series_lengths: Vec<usize>,
}

impl EmbeddedObservations {
    /// Number of (past, next) pairs.
    pub fn len(&self) -> usize {
        self.next.nrows()
    }

    /// True when the embedding leaves no usable pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spread per-observation values back over the raw series layout.
    ///
    /// Samples without a full past state (the first `(k-1)*tau+1` of each
    /// series) receive zero.
    pub fn pad_locals(&self, locals: &[f64]) -> Vec<f64> {
        pad_locals(self.embedding, &self.series_lengths, locals)
    }
}

/// Spread per-observation `locals` over series of the given raw lengths,
/// zero-filling the samples that have no full past state under `embedding`.
pub(crate) fn pad_locals(embedding: Embedding, series_lengths: &[usize], locals: &[f64]) -> Vec<f64> {
    let mut padded = Vec::with_capacity(series_lengths.iter().sum());
    let mut cursor = 0;
    for &len in series_lengths {
        let used = embedding.observations_in(len);
        padded.extend(std::iter::repeat(0.0).take(len - used));
        padded.extend_from_slice(&locals[cursor..cursor + used]);
        cursor += used;
    }
    padded
}
