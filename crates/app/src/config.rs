//! Configuration for the sfpack application.
//!
//! Command-line arguments are parsed by clap into [`Cli`]; [`PackConfig`]
//! and [`UnpackConfig`] resolve them into concrete paths and settings.
//!
//! # Philosophy
//!
//! `sfpack pack` works with ZERO arguments: without an input file it packs
//! generated sample text. The sample seed is printed with the resolved
//! configuration so runs are reproducible.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Extension of packed files.
pub const PACKED_EXTENSION: &str = "shm";

/// Extension of unpacked files.
pub const UNPACKED_EXTENSION: &str = "txt";

/// Default size of generated sample text.
pub const DEFAULT_SAMPLE_BYTES: usize = 64 * 1024;

#[derive(Debug, Parser)]
#[command(name = "sfpack", version, about = "Pack text files with Shannon-Fano prefix codes")]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pack a text file into a container
    Pack(PackArgs),
    /// Unpack a container back into text
    Unpack(UnpackArgs),
}

/// Compression methods for `pack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Shannon-Fano variable-length codes
    #[value(name = "sh")]
    ShannonFano,
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Input text file (default: generate sample text)
    pub input: Option<PathBuf>,

    /// Output file (default: <input stem>.shm in the current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Compression method
    #[arg(short, long, value_enum, default_value_t = Method::ShannonFano)]
    pub method: Method,

    /// Fold uppercase letters into an escape marker before packing
    #[arg(long)]
    pub fold_case: bool,

    /// Size of generated sample text in bytes
    #[arg(long, value_name = "BYTES")]
    pub sample_size: Option<usize>,

    /// Random seed for sample text
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the generated sample text to this path
    #[arg(long, value_name = "PATH")]
    pub save_sample: Option<PathBuf>,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print the statistics summary
    #[arg(long)]
    pub no_stats: bool,
}

#[derive(Debug, Args)]
pub struct UnpackArgs {
    /// Packed input file
    pub input: PathBuf,

    /// Output file (default: <input stem>.txt in the current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Restore uppercase letters folded by `pack --fold-case`
    #[arg(long)]
    pub fold_case: bool,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,
}

/// Where the text to pack comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Sample {
        seed: u64,
        size_bytes: usize,
        save_to: Option<PathBuf>,
    },
}

/// Resolved configuration for `pack`.
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub input: InputSource,
    pub output_file: PathBuf,
    pub method: Method,
    pub fold_case: bool,
    pub print_config: bool,
    pub print_stats: bool,
}

impl PackConfig {
    /// Resolve defaults for everything not given on the command line.
    ///
    /// If no seed is given, one is taken from the clock.
    pub fn from_args(args: PackArgs) -> Result<Self, String> {
        let input = match args.input {
            Some(path) => {
                if args.sample_size.is_some() || args.seed.is_some() || args.save_sample.is_some() {
                    return Err(
                        "--sample-size, --seed and --save-sample only apply without an input file"
                            .to_string(),
                    );
                }
                InputSource::File(path)
            }
            None => InputSource::Sample {
                seed: args.seed.unwrap_or_else(clock_seed),
                size_bytes: args.sample_size.unwrap_or(DEFAULT_SAMPLE_BYTES),
                save_to: args.save_sample,
            },
        };

        let output_file = match (args.out, &input) {
            (Some(out), _) => out,
            (None, InputSource::File(path)) => packed_file_name(path),
            (None, InputSource::Sample { .. }) => {
                PathBuf::from(format!("sample.{PACKED_EXTENSION}"))
            }
        };

        if let InputSource::File(path) = &input {
            if *path == output_file {
                return Err(format!(
                    "output would overwrite input: {}",
                    output_file.display()
                ));
            }
        }

        Ok(Self {
            input,
            output_file,
            method: args.method,
            fold_case: args.fold_case,
            print_config: args.print_config,
            print_stats: !args.no_stats,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.input {
            InputSource::File(path) => println!("Input file:  {}", path.display()),
            InputSource::Sample {
                seed,
                size_bytes,
                save_to,
            } => {
                println!("Input:       generated sample ({size_bytes} bytes)");
                println!("Seed:        {seed}");
                if let Some(path) = save_to {
                    println!("Sample file: {}", path.display());
                }
            }
        }
        println!("Output file: {}", self.output_file.display());
        println!("Method:      {:?}", self.method);
        println!("Fold case:   {}", self.fold_case);
        println!();
    }
}

/// Resolved configuration for `unpack`.
#[derive(Debug, Clone)]
pub struct UnpackConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub fold_case: bool,
    pub print_config: bool,
}

impl UnpackConfig {
    pub fn from_args(args: UnpackArgs) -> Result<Self, String> {
        let output_file = args
            .out
            .unwrap_or_else(|| unpacked_file_name(&args.input));

        if output_file == args.input {
            return Err(format!(
                "output would overwrite input: {}",
                output_file.display()
            ));
        }

        Ok(Self {
            input_file: args.input,
            output_file,
            fold_case: args.fold_case,
            print_config: args.print_config,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Input file:  {}", self.input_file.display());
        println!("Output file: {}", self.output_file.display());
        println!("Fold case:   {}", self.fold_case);
        println!();
    }
}

/// `<stem>.shm` in the current directory.
pub fn packed_file_name(path: &Path) -> PathBuf {
    with_extension_in_cwd(path, PACKED_EXTENSION)
}

/// `<stem>.txt` in the current directory.
pub fn unpacked_file_name(path: &Path) -> PathBuf {
    with_extension_in_cwd(path, UNPACKED_EXTENSION)
}

fn with_extension_in_cwd(path: &Path, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    PathBuf::from(format!("{stem}.{extension}"))
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
