use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use countviz_cluster::{NormalizeAxis, zscore};

use crate::common::load_matrix;
use crate::zscore::cli::DEFAULT_OUT;

pub fn run_zscore(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("matrix")
        .expect("A path to a count table is required.");
    let axis: NormalizeAxis = matches
        .get_one::<String>("axis")
        .expect("axis has a default")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let matrix = load_matrix(path, matches.get_flag("log2"))?;
    let normalized = matrix.with_values(zscore(matrix.view(), axis));

    let default_out = DEFAULT_OUT.to_string();
    let out = matches.get_one::<String>("output").unwrap_or(&default_out);
    normalized.write_tsv(Path::new(out))?;
    println!("Wrote normalized table to {}", out);

    Ok(())
}
