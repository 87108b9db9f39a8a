use clap::Parser;

/// Aggregates scraped contestant and round-table voting data into the
/// demographic bias statistics consumed by the dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration describing the analysis: input file
    /// sources, output directory and rules. For more information about the file format,
    /// read the documentation.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (glob pattern) The per-season contestant files. Setting this option overrides
    /// the sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (glob pattern) The per-season round-table vote files. Setting this option
    /// overrides the sources that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub votes: Option<String>,

    /// (directory path) Where the derived tables are written. Setting this option
    /// overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (episode number) A banishment at or before this episode counts as early.
    #[clap(long, value_parser)]
    pub cutoff: Option<u32>,

    /// (file path) A reference summary in JSON format. If provided, traitorstats will
    /// check that the computed statistics match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
