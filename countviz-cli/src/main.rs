mod common;
mod heatmap;
mod hclust;
mod kmeans;
mod zscore;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "countviz";
    pub const BIN_NAME: &str = "countviz";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Exploratory analysis of genomic count tables: hierarchical clustering, k-means, z-score normalization, and annotated heatmaps.")
        .subcommand_required(true)
        .subcommand(hclust::cli::create_hclust_cli())
        .subcommand(kmeans::cli::create_kmeans_cli())
        .subcommand(zscore::cli::create_zscore_cli())
        .subcommand(heatmap::cli::create_heatmap_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // HIERARCHICAL CLUSTERING
        //
        Some((hclust::cli::HCLUST_CMD, matches)) => {
            hclust::handlers::run_hclust(matches)?;
        }

        //
        // K-MEANS
        //
        Some((kmeans::cli::KMEANS_CMD, matches)) => {
            kmeans::handlers::run_kmeans(matches)?;
        }

        //
        // Z-SCORE NORMALIZATION
        //
        Some((zscore::cli::ZSCORE_CMD, matches)) => {
            zscore::handlers::run_zscore(matches)?;
        }

        //
        // HEATMAP
        //
        Some((heatmap::cli::HEATMAP_CMD, matches)) => {
            heatmap::handlers::run_heatmap(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
