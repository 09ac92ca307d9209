use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "hbnb",
    about = "Interactive console for the HBnB object store",
    version,
)]
pub struct Cli {
    /// JSON file holding the stored entities
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run a console line and exit (repeatable)
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub commands: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
