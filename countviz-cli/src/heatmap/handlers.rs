use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use countviz_cluster::{Dendrogram, DistanceMatrix, DistanceMetric, Linkage, NormalizeAxis, zscore};
use countviz_core::DesignTable;
use countviz_plot::{AnnotationTrack, BreakMode, ColorRamp, Heatmap};

use crate::common::{load_matrix, spinner};
use crate::heatmap::cli::DEFAULT_OUT;

pub fn run_heatmap(matches: &ArgMatches) -> Result<()> {
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
    let ramp: ColorRamp = matches
        .get_one::<String>("ramp")
        .expect("ramp has a default")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let mut matrix = load_matrix(path, matches.get_flag("log2"))?;
    if let Some(&top) = matches.get_one::<usize>("top") {
        matrix = matrix.top_variable_features(top);
    }

    let scale = matches
        .get_one::<String>("scale")
        .expect("scale has a default")
        .to_lowercase();
    let (values, key_label) = match scale.as_str() {
        "none" => (matrix.values.clone(), "count"),
        axis => {
            let axis: NormalizeAxis = axis.parse().map_err(anyhow::Error::msg)?;
            (zscore(matrix.view(), axis), "z-score")
        }
    };

    let spinner = spinner("Building heatmap".to_string());
    let row_tree = if matches.get_flag("cluster-rows") {
        spinner.set_message(format!("Clustering {} rows", matrix.n_features()));
        let dist = DistanceMatrix::from_rows(values.view(), metric)?;
        Some(Dendrogram::build(&dist, linkage)?)
    } else {
        None
    };
    let col_tree = if matches.get_flag("cluster-cols") {
        spinner.set_message(format!("Clustering {} columns", matrix.n_samples()));
        let dist = DistanceMatrix::from_columns(values.view(), metric)?;
        Some(Dendrogram::build(&dist, linkage)?)
    } else {
        None
    };
    spinner.finish_and_clear();

    let mut heatmap = Heatmap::new(
        values.view(),
        matrix.feature_names.clone(),
        matrix.sample_names.clone(),
    )
    .with_ramp(ramp)
    .with_key_label(key_label)
    .show_row_labels(!matches.get_flag("no-row-labels"))
    .show_col_labels(!matches.get_flag("no-col-labels"));

    if matches.get_flag("quantile-breaks") {
        heatmap = heatmap.with_break_mode(BreakMode::Quantile);
    } else if scale != "none" {
        // z-scores center on 0; symmetric breaks keep zero-variance rows at
        // the ramp midpoint instead of tinting them toward the low end
        heatmap = heatmap.with_break_mode(BreakMode::Symmetric);
    }
    if let Some(title) = matches.get_one::<String>("title") {
        heatmap = heatmap.with_title(title);
    }
    if let Some(tree) = row_tree.as_ref() {
        heatmap = heatmap.with_row_tree(tree);
    }
    if let Some(tree) = col_tree.as_ref() {
        heatmap = heatmap.with_col_tree(tree);
    }

    if let Some(factors) = matches.get_one::<String>("annotate") {
        let design_path = match matches.get_one::<String>("design") {
            Some(p) => p,
            None => bail!("--annotate requires --design"),
        };
        let design = DesignTable::try_from(Path::new(design_path))
            .with_context(|| format!("Failed to load design table from {}", design_path))?;

        for factor in factors.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let track_values = design.factor_values(factor, &matrix.sample_names)?;
            heatmap = heatmap.with_annotation(AnnotationTrack {
                name: factor.to_string(),
                values: track_values,
            });
        }
    }

    let default_out = DEFAULT_OUT.to_string();
    let out = matches.get_one::<String>("output").unwrap_or(&default_out);
    heatmap
        .render_svg(Path::new(out))
        .with_context(|| format!("Failed to render heatmap to {}", out))?;
    println!(
        "Wrote {} x {} heatmap to {}",
        matrix.n_features(),
        matrix.n_samples(),
        out
    );

    Ok(())
}
