//! tfsynth cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; tfsynth ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the construct tree described by manifests and synthesize it
    ///
    /// Reads a yaml manifest from stdin unless any other source is provided (via -f/-d)
    #[command(alias = "synthesize")]
    Synth(SynthCommand),

    /// List the built-in element types
    Catalog,

    /// Print the attributes of a built-in element type
    Schema(SchemaCommand),
}

#[derive(Parser, Debug)]
pub struct SynthCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a manifest file (.yaml, .yml, .json or .hcl)
    #[clap(short = 'f', long = "file")]
    pub files: Vec<PathBuf>,

    /// Load all manifest files of a directory
    #[clap(short = 'd', long = "dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Indent json output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Hcl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
            OutputFormat::Hcl => f.write_str("hcl"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct SchemaCommand {
    /// `resource`, `data` or `provider`
    pub kind: String,

    /// Type name, e.g. github_repository
    pub type_name: String,
}
