use clap::{Arg, ArgAction, Command, arg};

pub const HCLUST_CMD: &str = "hclust";
pub const DEFAULT_METRIC: &str = "euclidean";
pub const DEFAULT_LINKAGE: &str = "average";
pub const DEFAULT_ASSIGNMENTS: &str = "hclust_clusters.tsv";

pub fn create_hclust_cli() -> Command {
    Command::new(HCLUST_CMD)
        .author("Databio")
        .about("Hierarchically cluster the samples (or features) of a count table.")
        .arg(Arg::new("matrix").required(true).help("Path to a whitespace-delimited count table"))
        .arg(arg!(--metric <metric> "Distance metric: euclidean, manhattan, or correlation").default_value(DEFAULT_METRIC))
        .arg(arg!(--linkage <linkage> "Linkage: single, complete, or average").default_value(DEFAULT_LINKAGE))
        .arg(
            Arg::new("features")
                .long("features")
                .action(ArgAction::SetTrue)
                .help("Cluster features (rows) instead of samples (columns)"),
        )
        .arg(arg!(--log2 "Apply log2(x + 1) before computing distances").action(ArgAction::SetTrue))
        .arg(arg!(--cut <k> "Cut the tree into k clusters and write the assignments").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--assignments <path> "Where to write the cluster-assignment TSV (with --cut)"))
        .arg(arg!(--plot <path> "Render the dendrogram to this SVG file"))
        .arg(arg!(--json "Print a JSON summary to stdout").action(ArgAction::SetTrue))
}
