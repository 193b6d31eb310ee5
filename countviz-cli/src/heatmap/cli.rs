use clap::{Arg, ArgAction, Command, arg};

pub const HEATMAP_CMD: &str = "heatmap";
pub const DEFAULT_OUT: &str = "heatmap.svg";
pub const DEFAULT_RAMP: &str = "green-black-red";
pub const DEFAULT_METRIC: &str = "euclidean";
pub const DEFAULT_LINKAGE: &str = "average";

pub fn create_heatmap_cli() -> Command {
    Command::new(HEATMAP_CMD)
        .author("Databio")
        .about("Render a count table as an annotated SVG heatmap.")
        .arg(Arg::new("matrix").required(true).help("Path to a whitespace-delimited count table"))
        .arg(arg!(--scale <axis> "Z-score before drawing: rows, columns, or none").default_value("none"))
        .arg(arg!(--log2 "Apply log2(x + 1) before anything else").action(ArgAction::SetTrue))
        .arg(arg!(--top <n> "Keep only the n most variable features").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--"cluster-rows" "Cluster and reorder the rows, drawing the tree in the margin").action(ArgAction::SetTrue))
        .arg(arg!(--"cluster-cols" "Cluster and reorder the columns, drawing the tree in the margin").action(ArgAction::SetTrue))
        .arg(arg!(--metric <metric> "Distance metric for clustering").default_value(DEFAULT_METRIC))
        .arg(arg!(--linkage <linkage> "Linkage for clustering").default_value(DEFAULT_LINKAGE))
        .arg(arg!(--ramp <ramp> "Color ramp: green-black-red, blue-white-red, or white-orange-red").default_value(DEFAULT_RAMP))
        .arg(arg!(--"quantile-breaks" "Space color breaks at data quantiles instead of linearly").action(ArgAction::SetTrue))
        .arg(arg!(--design <path> "Tab-delimited experimental-design table for column annotation"))
        .arg(arg!(--annotate <factors> "Comma-separated design factors to draw as annotation tracks"))
        .arg(arg!(--title <title> "Plot title"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output SVG path"),
        )
        .arg(arg!(--"no-row-labels" "Hide row labels").action(ArgAction::SetTrue))
        .arg(arg!(--"no-col-labels" "Hide column labels").action(ArgAction::SetTrue))
}
