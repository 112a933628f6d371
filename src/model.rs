//! K-Means clustering of the normalized player table

use crate::error::ClusteringError;
use crate::scaler::NormalizedTable;
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// K-Means fitting parameters
#[derive(Debug, Clone, Copy)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    pub max_iters: u64,
    pub tolerance: f64,
    /// Seed for centroid initialization; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            max_iters: 300,
            tolerance: 1e-4,
            seed: None,
        }
    }
}

/// A player with their cluster assignment and centroid distances
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredPlayer {
    pub name: String,
    pub club: String,
    pub cluster: usize,
    /// Distance to every centroid, in centroid index order
    pub distances: Vec<f64>,
}

impl ClusteredPlayer {
    /// Plot label in the form `Name[Club]`
    pub fn label(&self) -> String {
        format!("{}[{}]", self.name, self.club)
    }
}

/// Fitted clustering of the player table
#[derive(Debug, Clone)]
pub struct ClusterResult {
    pub n_clusters: usize,
    pub players: Vec<ClusteredPlayer>,
    /// Cluster centroids in normalized space (n_clusters, n_columns)
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl ClusterResult {
    /// Cluster label of every player, in table order
    pub fn labels(&self) -> Array1<usize> {
        self.players.iter().map(|p| p.cluster).collect()
    }

    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for player in &self.players {
            sizes[player.cluster] += 1;
        }
        sizes
    }

    /// Players assigned to `cluster`
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = &ClusteredPlayer> {
        self.players.iter().filter(move |p| p.cluster == cluster)
    }
}

/// Fit K-Means on the normalized attribute columns
///
/// # Arguments
/// * `table` - Normalized players; identity columns are not part of `features`
/// * `config` - Cluster count and convergence settings
///
/// # Returns
/// * `ClusterResult` with labels, centroid distances and inertia
pub fn fit_kmeans(
    table: &NormalizedTable,
    config: &KMeansConfig,
) -> Result<ClusterResult, ClusteringError> {
    let n_clusters = config.n_clusters;
    if n_clusters == 0 {
        return Err(ClusteringError::NoClusters);
    }

    let n_records = table.features.nrows();
    if n_records < n_clusters {
        return Err(ClusteringError::TooFewRecords {
            records: n_records,
            clusters: n_clusters,
        });
    }

    if table.features.iter().any(|x| !x.is_finite()) {
        return Err(ClusteringError::NonFiniteInput(
            table.degenerate_columns.clone(),
        ));
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let dataset = DatasetBase::from(table.features.clone());
    let model = KMeans::params_with(n_clusters, rng, L2Dist)
        .max_n_iterations(config.max_iters)
        .tolerance(config.tolerance)
        .fit(&dataset)?;

    let centroids = model.centroids().clone();
    let distances = centroid_distances(&table.features, &centroids);

    let mut inertia = 0.0;
    let players = distances
        .outer_iter()
        .enumerate()
        .map(|(row, dists)| {
            let cluster = argmin(dists.iter().copied());
            inertia += dists[cluster].powi(2);
            ClusteredPlayer {
                name: table.names[row].clone(),
                club: table.clubs[row].clone(),
                cluster,
                distances: dists.to_vec(),
            }
        })
        .collect();

    let result = ClusterResult {
        n_clusters,
        players,
        centroids,
        inertia,
    };
    info!(
        "Fitted {} clusters, sizes {:?}",
        n_clusters,
        result.cluster_sizes()
    );
    debug!("Inertia: {:.4}", result.inertia);

    Ok(result)
}

/// Euclidean distance from every row of `features` to every centroid
///
/// Returns an (n_rows, n_centroids) matrix.
pub fn centroid_distances(features: &Array2<f64>, centroids: &Array2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((features.nrows(), centroids.nrows()), |(row, c)| {
        L2Dist.distance(features.row(row), centroids.row(c))
    })
}

/// Index of the smallest value; the first one wins ties
fn argmin(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut min = f64::INFINITY;
    for (i, value) in values.enumerate() {
        if value < min {
            min = value;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::StandardScaler;

    fn create_test_table(rows: usize) -> NormalizedTable {
        // Three well separated groups in 3 dimensions
        let groups = [[-2.0, -2.0, -2.0], [2.0, 2.0, 2.0], [2.0, -2.0, 0.0]];
        let mut data = Vec::with_capacity(rows * 3);
        for i in 0..rows {
            let offset = (i / groups.len()) as f64 * 0.05;
            for v in groups[i % groups.len()] {
                data.push(v + offset);
            }
        }
        let features = Array2::from_shape_vec((rows, 3), data).unwrap();
        let scaler = StandardScaler::fit(&features);

        NormalizedTable {
            names: (0..rows).map(|i| format!("Player {}", i)).collect(),
            clubs: vec!["AFC".to_string(); rows],
            columns: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            features,
            scaler,
            degenerate_columns: Vec::new(),
        }
    }

    fn config(n_clusters: usize) -> KMeansConfig {
        KMeansConfig {
            n_clusters,
            seed: Some(42),
            ..KMeansConfig::default()
        }
    }

    #[test]
    fn test_fit_kmeans() {
        let table = create_test_table(9);
        let result = fit_kmeans(&table, &config(3)).unwrap();

        assert_eq!(result.n_clusters, 3);
        assert_eq!(result.players.len(), 9);
        assert_eq!(result.centroids.shape(), &[3, 3]);
        assert!(result.inertia.is_finite() && result.inertia >= 0.0);
        for player in &result.players {
            assert!(player.cluster < 3);
            assert_eq!(player.distances.len(), 3);
        }
    }

    #[test]
    fn test_label_is_argmin_of_distances() {
        let table = create_test_table(12);
        let result = fit_kmeans(&table, &config(4)).unwrap();

        for player in &result.players {
            let min = player
                .distances
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            assert_eq!(player.distances[player.cluster], min);
        }
    }

    #[test]
    fn test_cluster_sizes() {
        let table = create_test_table(9);
        let result = fit_kmeans(&table, &config(3)).unwrap();

        let sizes = result.cluster_sizes();
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes.iter().sum::<usize>(), 9);
        assert_eq!(result.labels().len(), 9);
        assert_eq!(result.members(0).count(), sizes[0]);
    }

    #[test]
    fn test_too_few_records() {
        let table = create_test_table(3);
        let result = fit_kmeans(&table, &config(5));
        assert!(matches!(
            result,
            Err(ClusteringError::TooFewRecords {
                records: 3,
                clusters: 5
            })
        ));
    }

    #[test]
    fn test_zero_clusters() {
        let table = create_test_table(3);
        assert!(matches!(
            fit_kmeans(&table, &config(0)),
            Err(ClusteringError::NoClusters)
        ));
    }

    #[test]
    fn test_non_finite_input() {
        let mut table = create_test_table(6);
        table.features.column_mut(2).fill(f64::NAN);
        table.degenerate_columns = vec!["C".to_string()];

        let result = fit_kmeans(&table, &config(3));
        assert!(matches!(result, Err(ClusteringError::NonFiniteInput(cols)) if cols == vec!["C".to_string()]));
    }

    #[test]
    fn test_centroid_distances() {
        let features = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 3.0, 4.0]).unwrap();
        let centroids = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 3.0, 0.0]).unwrap();
        let distances = centroid_distances(&features, &centroids);

        assert_eq!(distances.shape(), &[2, 2]);
        assert!((distances[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((distances[[0, 1]] - 3.0).abs() < 1e-12);
        assert!((distances[[1, 0]] - 5.0).abs() < 1e-12);
        assert!((distances[[1, 1]] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_argmin_first_wins_ties() {
        assert_eq!(argmin([3.0, 1.0, 1.0, 2.0].into_iter()), 1);
    }
}
