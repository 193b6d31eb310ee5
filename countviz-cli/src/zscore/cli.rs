use clap::{Arg, ArgAction, Command, arg};

pub const ZSCORE_CMD: &str = "zscore";
pub const DEFAULT_AXIS: &str = "rows";
pub const DEFAULT_OUT: &str = "zscore.tsv";

pub fn create_zscore_cli() -> Command {
    Command::new(ZSCORE_CMD)
        .author("Databio")
        .about("Z-score normalize a count table along its rows or columns.")
        .arg(Arg::new("matrix").required(true).help("Path to a whitespace-delimited count table"))
        .arg(arg!(--axis <axis> "Normalize along rows or columns").default_value(DEFAULT_AXIS))
        .arg(arg!(--log2 "Apply log2(x + 1) before normalizing").action(ArgAction::SetTrue))
        .arg(arg!(--output <path> "Where to write the normalized TSV"))
}
