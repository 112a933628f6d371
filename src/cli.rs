//! Command-line interface definitions and argument parsing

use crate::data::SeedFiles;
use crate::error::VisualizationError;
use crate::model::KMeansConfig;
use crate::viz;
use clap::Parser;
use std::path::PathBuf;

/// Cluster football players by their attribute sheets and plot them in 3D
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding one `<club>_<first>_<last>.txt` file per player
    #[arg(short, long, default_value = "players")]
    pub data_dir: PathBuf,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "5")]
    pub clusters: usize,

    /// Output path for the interactive HTML plot
    #[arg(short, long, default_value = "footballers_3d-cluster.html")]
    pub output: PathBuf,

    /// Goalkeeper file whose attribute names seed the columns
    #[arg(long, default_value = "MUFC_david_de gea.txt")]
    pub goalkeeper_seed: String,

    /// Outfield player file whose attribute names complete the columns
    #[arg(long, default_value = "MUFC_adnan_januzaj.txt")]
    pub outfield_seed: String,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Seed for centroid initialization, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also render a static PNG preview to this path
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Reject cluster counts the plot cannot show, before loading anything
    pub fn validate(&self) -> Result<(), VisualizationError> {
        viz::check_cluster_count(self.clusters)
    }

    pub fn seed_files(&self) -> SeedFiles {
        SeedFiles {
            goalkeeper: self.goalkeeper_seed.clone(),
            outfield: self.outfield_seed.clone(),
        }
    }

    pub fn kmeans_config(&self) -> KMeansConfig {
        KMeansConfig {
            n_clusters: self.clusters,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["footclust"]);
        assert_eq!(args.data_dir, PathBuf::from("players"));
        assert_eq!(args.clusters, 5);
        assert_eq!(args.output, PathBuf::from("footballers_3d-cluster.html"));
        assert_eq!(args.goalkeeper_seed, "MUFC_david_de gea.txt");
        assert_eq!(args.outfield_seed, "MUFC_adnan_januzaj.txt");
        assert!(args.seed.is_none());
        assert!(args.png.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_cluster_count() {
        let args = Args::parse_from(["footclust", "-k", "7"]);
        assert!(matches!(
            args.validate(),
            Err(VisualizationError::PaletteExhausted { clusters: 7, .. })
        ));

        let args = Args::parse_from(["footclust", "-k", "2"]);
        assert!(matches!(
            args.validate(),
            Err(VisualizationError::TooFewDimensions(2))
        ));
    }

    #[test]
    fn test_kmeans_config() {
        let args = Args::parse_from(["footclust", "-k", "4", "--seed", "7", "--max-iters", "50"]);
        let config = args.kmeans_config();
        assert_eq!(config.n_clusters, 4);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_iters, 50);
        assert_eq!(config.tolerance, 1e-4);

        let seeds = args.seed_files();
        assert_eq!(seeds.goalkeeper, "MUFC_david_de gea.txt");
    }
}
