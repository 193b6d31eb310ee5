use clap::{Arg, ArgAction, Command, arg};

pub const KMEANS_CMD: &str = "kmeans";
pub const DEFAULT_OUT: &str = "kmeans_clusters.tsv";

pub fn create_kmeans_cli() -> Command {
    Command::new(KMEANS_CMD)
        .author("Databio")
        .about("Partition the samples (or features) of a count table with k-means.")
        .arg(Arg::new("matrix").required(true).help("Path to a whitespace-delimited count table"))
        .arg(
            Arg::new("k")
                .short('k')
                .long("clusters")
                .required(true)
                .value_parser(clap::value_parser!(usize))
                .help("Number of clusters"),
        )
        .arg(arg!(--"max-iter" <n> "Maximum Lloyd iterations per restart").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--restarts <n> "Number of random restarts; best fit wins").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--seed <seed> "Seed for reproducible centroid initialization").value_parser(clap::value_parser!(u64)))
        .arg(
            Arg::new("features")
                .long("features")
                .action(ArgAction::SetTrue)
                .help("Cluster features (rows) instead of samples (columns)"),
        )
        .arg(arg!(--log2 "Apply log2(x + 1) before clustering").action(ArgAction::SetTrue))
        .arg(arg!(--output <path> "Where to write the cluster-assignment TSV"))
        .arg(arg!(--json "Print a JSON fit summary to stdout").action(ArgAction::SetTrue))
}
