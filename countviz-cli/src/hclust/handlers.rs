use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use countviz_cluster::{Dendrogram, DistanceMatrix, DistanceMetric, Linkage};
use countviz_plot::render_dendrogram;

use crate::common::{load_matrix, observations, spinner, write_assignments};
use crate::hclust::cli::DEFAULT_ASSIGNMENTS;

pub fn run_hclust(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("matrix")
        .expect("A path to a count table is required.");

    let metric: DistanceMetric = matches
        .get_one::<String>("metric")
        .expect("metric has a default")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let linkage: Linkage = matches
        .get_one::<String>("linkage")
        .expect("linkage has a default")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let matrix = load_matrix(path, matches.get_flag("log2"))?;
    let (labels, data) = observations(&matrix, matches.get_flag("features"));

    let spinner = spinner(format!(
        "Computing pairwise distances over {} observations",
        labels.len()
    ));
    let dist = DistanceMatrix::from_rows(data.view(), metric)?;
    spinner.set_message("Agglomerating");
    let tree = Dendrogram::build(&dist, linkage)?;
    spinner.finish_and_clear();

    if let Some(&k) = matches.get_one::<usize>("cut") {
        let clusters = tree.cut(k)?;
        let default_out = DEFAULT_ASSIGNMENTS.to_string();
        let out = matches.get_one::<String>("assignments").unwrap_or(&default_out);
        write_assignments(out, &labels, &clusters)?;
        println!("Wrote {}-cluster assignments to {}", k, out);
    }

    if let Some(plot) = matches.get_one::<String>("plot") {
        render_dendrogram(&tree, &labels, "Hierarchical clustering", Path::new(plot))
            .with_context(|| format!("Failed to render dendrogram to {}", plot))?;
        println!("Wrote dendrogram to {}", plot);
    }

    if matches.get_flag("json") {
        let heights: Vec<f64> = tree.merges().iter().map(|m| m.height).collect();
        let order: Vec<&String> = tree.leaf_order().into_iter().map(|i| &labels[i]).collect();
        let summary = serde_json::json!({
            "observations": labels.len(),
            "metric": format!("{:?}", metric),
            "linkage": format!("{:?}", linkage),
            "merge_heights": heights,
            "leaf_order": order,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
