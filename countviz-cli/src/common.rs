use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array2;

use countviz_cluster::log2_plus_one;
use countviz_core::CountMatrix;

/// Load a count table, optionally log2(x + 1)-transformed.
pub fn load_matrix(path: &str, log2: bool) -> Result<CountMatrix> {
    let matrix = CountMatrix::try_from(Path::new(path))
        .with_context(|| format!("Failed to load count table from {}", path))?;
    if log2 {
        let logged = log2_plus_one(matrix.view());
        Ok(matrix.with_values(logged))
    } else {
        Ok(matrix)
    }
}

/// Orient the table so observations are rows: samples (columns) by default,
/// features (rows) when `features` is set. Returns the observation labels
/// alongside the oriented data.
pub fn observations(matrix: &CountMatrix, features: bool) -> (Vec<String>, Array2<f64>) {
    if features {
        (matrix.feature_names.clone(), matrix.values.clone())
    } else {
        (matrix.sample_names.clone(), matrix.values.t().to_owned())
    }
}

/// Spinner for long-running stages; ticks on its own thread so it stays
/// animated while the work happens.
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Write a two-column observation -> cluster TSV. Overwrites.
pub fn write_assignments(path: &str, labels: &[String], clusters: &[usize]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "observation\tcluster")?;
    for (label, cluster) in labels.iter().zip(clusters.iter()) {
        writeln!(writer, "{}\t{}", label, cluster)?;
    }
    writer.flush()?;
    Ok(())
}
