//! footclust: 3D K-Means clustering of football players
//!
//! This is the main entrypoint that orchestrates data loading, normalization,
//! model fitting and visualization.

use anyhow::{Context, Result};
use clap::Parser;
use footclust::{
    fit_kmeans, load_players, normalize, viz, Args, ClusterResult, PipelineError, PlayerTable,
};
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("footclust - Footballer clustering using K-Means");
        println!("===============================================\n");
    }

    args.validate()
        .map_err(PipelineError::from)
        .context("invalid configuration")?;

    run_pipeline(&args).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{} stage aborted the run", stage))
    })
}

/// Run the full clustering pipeline
fn run_pipeline(args: &Args) -> Result<(), PipelineError> {
    let start_time = Instant::now();

    // Step 1: Load player files
    if args.verbose {
        println!("Step 1: Loading player attribute files");
        println!("  Data directory: {}", args.data_dir.display());
    }

    let data_start = Instant::now();
    let table = load_players(&args.data_dir, &args.seed_files())?;
    let data_time = data_start.elapsed();

    println!(
        "✓ Data loaded: {} players, {} attributes",
        table.len(),
        table.attribute_columns().len()
    );
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Normalize and fit K-Means
    if args.verbose {
        println!("\nStep 2: Fitting K-Means model");
        println!("  Number of clusters: {}", args.clusters);
        println!("  Max iterations: {}", args.max_iters);
        println!("  Tolerance: {}", args.tolerance);
    }

    let model_start = Instant::now();
    let normalized = normalize(&table, table.attribute_columns());
    let result = fit_kmeans(&normalized, &args.kmeans_config())?;
    let model_time = model_start.elapsed();

    println!("✓ Model fitted successfully");
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_time.as_secs_f64());
    }

    print_cluster_statistics(&table, &result);

    // Step 3: Generate visualization
    if args.verbose {
        println!("\nStep 3: Generating visualization");
        println!("  Output file: {}", args.output.display());
    }

    let viz_start = Instant::now();
    viz::write_cluster_html(&result, &args.output)?;
    if let Some(png) = &args.png {
        viz::create_cluster_preview(&result, png)?;
    }
    let viz_time = viz_start.elapsed();

    println!("\n✓ Visualization generated");
    if args.verbose {
        println!("  Visualization time: {:.2}s", viz_time.as_secs_f64());
    }

    let total_time = start_time.elapsed();
    info!("Pipeline finished in {:.2}s", total_time.as_secs_f64());
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("3D cluster plot saved to: {}", args.output.display());
    if let Some(png) = &args.png {
        println!("Preview saved to: {}", png.display());
    }

    Ok(())
}

/// Print cluster statistics to console
fn print_cluster_statistics(table: &PlayerTable, result: &ClusterResult) {
    println!("\n=== Cluster Statistics ===");
    let total = table.len() as f64;
    for (i, size) in result.cluster_sizes().into_iter().enumerate() {
        let percentage = (size as f64 / total) * 100.0;
        println!("Cluster {}: {} players ({:.1}%)", i, size, percentage);
    }
    println!("Within-cluster sum of squares: {:.2}", result.inertia);

    for cluster in 0..result.n_clusters {
        let members: Vec<String> = result.members(cluster).map(|p| p.label()).collect();
        info!("Cluster {}: {}", cluster, members.join(", "));
    }
}
