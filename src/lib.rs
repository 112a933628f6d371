//! footclust: cluster football players by their attribute sheets
//!
//! The pipeline loads one attribute file per player into a zero-filled
//! table, z-score normalizes every attribute column, runs K-Means and
//! plots each player by their distance to the first three centroids.

pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod scaler;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_players, PlayerRecord, PlayerTable, SeedFiles};
pub use error::{ClusteringError, LoadError, PipelineError, VisualizationError};
pub use model::{fit_kmeans, ClusterResult, ClusteredPlayer, KMeansConfig};
pub use scaler::{normalize, NormalizedTable, StandardScaler};
pub use viz::{build_figure, create_cluster_preview, write_cluster_html, Figure};

use std::path::Path;

/// Common result type used throughout the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Load, normalize and cluster every player in `data_dir`
pub fn cluster_players(
    data_dir: &Path,
    seeds: &SeedFiles,
    config: &KMeansConfig,
) -> Result<(PlayerTable, ClusterResult)> {
    let table = load_players(data_dir, seeds)?;
    let normalized = normalize(&table, table.attribute_columns());
    let result = fit_kmeans(&normalized, config)?;
    Ok((table, result))
}
