//! 3D cluster scene: plotly HTML output and an optional Plotters preview
//!
//! Players are placed by their distances to the first three centroids.
//! Each player is its own marker trace, each cluster gets a translucent
//! convex hull built from its members.

use crate::error::VisualizationError;
use crate::model::ClusterResult;
use plotly::common::Title;
use plotly::layout::{Axis as PlotlyAxis, LayoutScene};
use plotly::Plot;
use plotters::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Color palette for different clusters
pub const CLUSTER_COLORS: [(u8, u8, u8); 6] = [
    (230, 25, 25),
    (80, 80, 250),
    (80, 230, 80),
    (250, 200, 90),
    (100, 100, 100),
    (60, 250, 250),
];

/// Number of distance dimensions shown in the scene
pub const PLOT_DIMENSIONS: usize = 3;

const MARKER_OPACITY: f64 = 0.9;
const HULL_OPACITY: f64 = 0.2;

/// CSS color of a cluster
pub fn cluster_color(cluster: usize) -> String {
    let (r, g, b) = CLUSTER_COLORS[cluster];
    format!("rgb({},{},{})", r, g, b)
}

/// Check that `n_clusters` can be drawn before any work is done
pub fn check_cluster_count(n_clusters: usize) -> Result<(), VisualizationError> {
    if n_clusters > CLUSTER_COLORS.len() {
        return Err(VisualizationError::PaletteExhausted {
            clusters: n_clusters,
            palette: CLUSTER_COLORS.len(),
        });
    }
    if n_clusters < PLOT_DIMENSIONS {
        return Err(VisualizationError::TooFewDimensions(n_clusters));
    }
    Ok(())
}

/// Every player needs a distance to each of the plotted centroids
fn check_distances(result: &ClusterResult) -> Result<(), VisualizationError> {
    match result
        .players
        .iter()
        .find(|p| p.distances.len() < PLOT_DIMENSIONS)
    {
        Some(short) => Err(VisualizationError::TooFewDimensions(short.distances.len())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: f64,
    pub color: String,
    pub line: MarkerLine,
}

/// One plotly trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Trace {
    /// A single player
    #[serde(rename = "scatter3d")]
    Scatter3d {
        name: String,
        mode: &'static str,
        showlegend: bool,
        marker: Marker,
        opacity: f64,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
    /// Hull around the members of one cluster
    #[serde(rename = "mesh3d")]
    Mesh3d {
        name: String,
        color: String,
        opacity: f64,
        alphahull: f64,
        hoverinfo: &'static str,
        showlegend: bool,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
}

impl plotly::Trace for Trace {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Trace {
    pub fn is_marker(&self) -> bool {
        matches!(self, Trace::Scatter3d { .. })
    }

    pub fn color(&self) -> &str {
        match self {
            Trace::Scatter3d { marker, .. } => &marker.color,
            Trace::Mesh3d { color, .. } => color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAxis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub xaxis: SceneAxis,
    pub yaxis: SceneAxis,
    pub zaxis: SceneAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub scene: Scene,
}

impl Layout {
    fn to_plotly(&self) -> plotly::Layout {
        let axis = |axis: &SceneAxis| PlotlyAxis::new().title(Title::with_text(&axis.title));
        plotly::Layout::new()
            .title(Title::with_text(&self.title))
            .scene(
                LayoutScene::new()
                    .x_axis(axis(&self.scene.xaxis))
                    .y_axis(axis(&self.scene.yaxis))
                    .z_axis(axis(&self.scene.zaxis)),
            )
    }
}

/// Plotly figure: marker traces first, then one hull per cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn markers(&self) -> impl Iterator<Item = &Trace> {
        self.data.iter().filter(|t| t.is_marker())
    }

    pub fn hulls(&self) -> impl Iterator<Item = &Trace> {
        self.data.iter().filter(|t| !t.is_marker())
    }
}

/// Build the 3D scene for a clustering result
pub fn build_figure(result: &ClusterResult) -> Result<Figure, VisualizationError> {
    check_cluster_count(result.n_clusters)?;
    check_distances(result)?;

    let mut data = Vec::with_capacity(result.players.len() + result.n_clusters);

    for player in &result.players {
        data.push(Trace::Scatter3d {
            name: player.label(),
            mode: "markers",
            showlegend: false,
            marker: Marker {
                size: 3.0,
                color: cluster_color(player.cluster),
                line: MarkerLine { width: 0.0 },
            },
            opacity: MARKER_OPACITY,
            x: vec![player.distances[0]],
            y: vec![player.distances[1]],
            z: vec![player.distances[2]],
        });
    }

    for cluster in 0..result.n_clusters {
        let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
        for player in result.members(cluster) {
            x.push(player.distances[0]);
            y.push(player.distances[1]);
            z.push(player.distances[2]);
        }
        data.push(Trace::Mesh3d {
            name: format!("cluster {}", cluster),
            color: cluster_color(cluster),
            opacity: HULL_OPACITY,
            alphahull: 0.0,
            hoverinfo: "none",
            showlegend: true,
            x,
            y,
            z,
        });
    }

    let axis = |i: usize| SceneAxis {
        title: format!("distance to cluster {}", i),
    };

    Ok(Figure {
        data,
        layout: Layout {
            title: "Footballers in centroid-distance space".to_string(),
            scene: Scene {
                xaxis: axis(0),
                yaxis: axis(1),
                zaxis: axis(2),
            },
        },
    })
}

/// Render a figure as a standalone HTML page with plotly.js inlined
///
/// Names come from file names, which cannot contain `/`, so no trace
/// string can close the surrounding script block.
pub fn render_html(figure: &Figure) -> String {
    let mut plot = Plot::new();
    for trace in &figure.data {
        plot.add_trace(Box::new(trace.clone()));
    }
    plot.set_layout(figure.layout.to_plotly());
    plot.to_html()
}

/// Build the scene and write it as an HTML file
pub fn write_cluster_html(
    result: &ClusterResult,
    output_path: &Path,
) -> Result<Figure, VisualizationError> {
    let figure = build_figure(result)?;
    let html = render_html(&figure);
    fs::write(output_path, html).map_err(|source| VisualizationError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    info!(
        "Cluster scene with {} traces saved to: {}",
        figure.data.len(),
        output_path.display()
    );
    Ok(figure)
}

fn render_error<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::Render(e.to_string())
}

/// Create a static 3D scatter of the same projection as a PNG
pub fn create_cluster_preview(
    result: &ClusterResult,
    output_path: &Path,
) -> Result<(), VisualizationError> {
    check_cluster_count(result.n_clusters)?;
    check_distances(result)?;

    let bounds = |dim: usize| {
        let (lo, hi) = result
            .players
            .iter()
            .map(|p| p.distances[dim])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            });
        if lo.is_finite() {
            (lo - 0.5)..(hi + 0.5)
        } else {
            0.0..1.0
        }
    };

    let root = BitMapBackend::new(output_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Footballer clusters", ("sans-serif", 30))
        .margin(20)
        .build_cartesian_3d(bounds(0), bounds(1), bounds(2))
        .map_err(render_error)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(render_error)?;

    for cluster in 0..result.n_clusters {
        let (r, g, b) = CLUSTER_COLORS[cluster];
        let color = RGBColor(r, g, b);
        chart
            .draw_series(result.members(cluster).map(|p| {
                Circle::new(
                    (p.distances[0], p.distances[1], p.distances[2]),
                    3,
                    color.filled(),
                )
            }))
            .map_err(render_error)?
            .label(format!("cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    info!("Cluster preview saved to: {}", output_path.display());

    Ok(())
}
