//! Error types for each pipeline stage

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the player directory and building the table
#[derive(Error, Debug)]
pub enum LoadError {
    /// One of the two vocabulary seed files is not in the data directory
    #[error("seed file not found: {}", .0.display())]
    MissingSeed(PathBuf),

    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filename does not follow `<club>_<first>_<last>.<ext>`
    #[error("malformed player file name {0:?}, expected <club>_<first>_<last>.<ext>")]
    MalformedFileName(String),

    /// Attribute names and values cannot be paired one to one
    #[error("{}: {columns} attribute names but {values} values", path.display())]
    ColumnValueMismatch {
        path: PathBuf,
        columns: usize,
        values: usize,
    },
}

/// Failures while fitting k-means
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("number of clusters must be positive")]
    NoClusters,

    /// Fewer points than clusters; k is never reduced to fit
    #[error("number of records ({records}) must be at least equal to number of clusters ({clusters})")]
    TooFewRecords { records: usize, clusters: usize },

    #[error("normalized table contains non-finite values (zero-variance columns: {})", .0.join(", "))]
    NonFiniteInput(Vec<String>),

    #[error("k-means failed: {0}")]
    KMeans(#[from] linfa_clustering::KMeansError),
}

/// Failures while building or writing the 3D scene
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("{clusters} clusters requested but the palette only has {palette} colors")]
    PaletteExhausted { clusters: usize, palette: usize },

    /// The projection uses the distances to the first three centroids
    #[error("3D projection needs at least 3 clusters, got {0}")]
    TooFewDimensions(usize),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot render preview: {0}")]
    Render(String),
}

/// Any pipeline failure, tagged with the stage that produced it
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load stage failed: {0}")]
    Load(#[from] LoadError),

    #[error("clustering stage failed: {0}")]
    Clustering(#[from] ClusteringError),

    #[error("visualization stage failed: {0}")]
    Visualization(#[from] VisualizationError),
}

impl PipelineError {
    /// Short name of the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Load(_) => "load",
            PipelineError::Clustering(_) => "clustering",
            PipelineError::Visualization(_) => "visualization",
        }
    }
}
