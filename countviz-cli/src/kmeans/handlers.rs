use anyhow::Result;
use clap::ArgMatches;

use countviz_cluster::KMeans;
use countviz_cluster::kmeans::{DEFAULT_MAX_ITER, DEFAULT_N_INIT};

use crate::common::{load_matrix, observations, spinner, write_assignments};
use crate::kmeans::cli::DEFAULT_OUT;

pub fn run_kmeans(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("matrix")
        .expect("A path to a count table is required.");
    let k = *matches.get_one::<usize>("k").expect("k is required.");

    let max_iter = matches
        .get_one::<usize>("max-iter")
        .copied()
        .unwrap_or(DEFAULT_MAX_ITER);
    let restarts = matches
        .get_one::<usize>("restarts")
        .copied()
        .unwrap_or(DEFAULT_N_INIT);

    let matrix = load_matrix(path, matches.get_flag("log2"))?;
    let (labels, data) = observations(&matrix, matches.get_flag("features"));

    let mut model = KMeans::new(k).with_max_iter(max_iter).with_restarts(restarts);
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        model = model.with_seed(seed);
    }

    let spinner = spinner(format!(
        "Fitting k-means (k = {}, {} restarts) over {} observations",
        k,
        restarts,
        labels.len()
    ));
    let fit = model.fit(data.view())?;
    spinner.finish_and_clear();

    let default_out = DEFAULT_OUT.to_string();
    let out = matches.get_one::<String>("output").unwrap_or(&default_out);
    write_assignments(out, &labels, &fit.labels)?;
    println!(
        "Wrote {}-cluster assignments to {} (inertia {:.4}, {} iterations{})",
        k,
        out,
        fit.inertia,
        fit.iterations,
        if fit.converged { ", converged" } else { "" }
    );

    if matches.get_flag("json") {
        let summary = serde_json::json!({
            "k": k,
            "observations": labels.len(),
            "inertia": fit.inertia,
            "iterations": fit.iterations,
            "converged": fit.converged,
            "cluster_sizes": fit.cluster_sizes(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
