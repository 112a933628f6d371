//! Z-score normalization of the attribute columns

use crate::data::PlayerTable;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

/// Per-column mean and sample standard deviation
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics over every row of `records`
    pub fn fit(records: &Array2<f64>) -> Self {
        let n = records.nrows() as f64;
        let mean = records
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(records.ncols()));
        let std = records
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(column, &m)| {
                let sum_sq: f64 = column.iter().map(|x| (x - m).powi(2)).sum();
                (sum_sq / (n - 1.0)).sqrt()
            })
            .collect();

        Self { mean, std }
    }

    /// Scale `records` with the fitted statistics; zero std is not guarded
    pub fn transform(&self, mut records: Array2<f64>) -> Array2<f64> {
        for mut row in records.axis_iter_mut(Axis(0)) {
            row -= &self.mean;
            row /= &self.std;
        }
        records
    }

    /// Indices of columns whose standard deviation is zero or undefined
    pub fn degenerate_indices(&self) -> Vec<usize> {
        self.std
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_finite() || **s == 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Players with every attribute column replaced by its z-score
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub names: Vec<String>,
    pub clubs: Vec<String>,
    /// Attribute columns in feature order
    pub columns: Vec<String>,
    /// Normalized features (n_players, n_columns)
    pub features: Array2<f64>,
    pub scaler: StandardScaler,
    /// Columns whose standard deviation was zero, left as NaN/inf
    pub degenerate_columns: Vec<String>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `Name[Club]` label of a row
    pub fn label(&self, row: usize) -> String {
        format!("{}[{}]", self.names[row], self.clubs[row])
    }
}

/// Replace each of `columns` with `(x - mean) / std` computed over all players
pub fn normalize(table: &PlayerTable, columns: &[String]) -> NormalizedTable {
    let raw = table.to_array(columns);
    let scaler = StandardScaler::fit(&raw);
    let features = scaler.transform(raw);

    let degenerate_columns: Vec<String> = scaler
        .degenerate_indices()
        .into_iter()
        .map(|i| columns[i].clone())
        .collect();
    if !degenerate_columns.is_empty() {
        warn!(
            "Zero-variance columns cannot be normalized: {}",
            degenerate_columns.join(", ")
        );
    }
    debug!(
        "Normalized {} columns over {} players",
        columns.len(),
        table.len()
    );

    NormalizedTable {
        names: table.players.iter().map(|p| p.name.clone()).collect(),
        clubs: table.players.iter().map(|p| p.club.clone()).collect(),
        columns: columns.to_vec(),
        features,
        scaler,
        degenerate_columns,
    }
}
