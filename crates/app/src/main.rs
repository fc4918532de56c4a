//! sfpack: pack and unpack text files with Shannon-Fano prefix codes.
//!
//! ```text
//! sfpack pack notes.txt            # writes notes.shm
//! sfpack unpack notes.shm          # writes notes.txt
//! sfpack pack --seed 7 -v          # packs generated sample text
//! ```

mod config;
mod input_gen;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};

use sfpack_core::case_fold::{fold_case, unfold_case};
use sfpack_core::stats::Stats;
use sfpack_core::{Codec, Container, ShannonFano};

use config::{Cli, Command, InputSource, Method, PackConfig, UnpackConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Pack(args) => {
            let config = PackConfig::from_args(args).map_err(anyhow::Error::msg)?;
            if config.print_config {
                config.print();
            }
            let stats = pack(&config)?;
            if config.print_stats {
                stats.print_summary();
            }
        }
        Command::Unpack(args) => {
            let config = UnpackConfig::from_args(args).map_err(anyhow::Error::msg)?;
            if config.print_config {
                config.print();
            }
            unpack(&config)?;
        }
    }

    Ok(())
}

/// Default level is info; `-v` raises it, `-q` lowers it.
fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Install the global logger. `RUST_LOG` overrides the flag level.
fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level(verbose, quiet));
    builder.parse_default_env();
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });
    builder.init();
}

fn pack(config: &PackConfig) -> Result<Stats> {
    let mut stats = Stats::new();

    let text = match &config.input {
        InputSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {} as UTF-8 text", path.display()))?,
        InputSource::Sample {
            seed,
            size_bytes,
            save_to,
        } => {
            info!("Generating {size_bytes} bytes of sample text (seed {seed})");
            let text = input_gen::generate_sample_text(*seed, *size_bytes);
            if let Some(path) = save_to {
                fs::write(path, &text)
                    .with_context(|| format!("failed to write sample to {}", path.display()))?;
            }
            text
        }
    };
    stats.set_input(&text);

    let text = if config.fold_case {
        let folded = fold_case(&text);
        debug!("Case folding: {} -> {} bytes", text.len(), folded.len());
        folded
    } else {
        text
    };

    let container = match config.method {
        Method::ShannonFano => Codec::new(ShannonFano).encode_container(&text)?,
    };
    let bytes = container.to_bytes()?;

    fs::write(&config.output_file, &bytes)
        .with_context(|| format!("failed to write {}", config.output_file.display()))?;

    stats.record(&container, bytes.len());
    stats.complete();
    info!(
        "Packed {} bytes into {} ({} bytes)",
        stats.input_bytes,
        config.output_file.display(),
        stats.container_bytes
    );

    Ok(stats)
}

fn unpack(config: &UnpackConfig) -> Result<()> {
    let bytes = fs::read(&config.input_file)
        .with_context(|| format!("failed to read {}", config.input_file.display()))?;
    let container = Container::parse(&bytes)
        .with_context(|| format!("{} is not a valid container", config.input_file.display()))?;
    debug!(
        "Container: {} symbols, {} payload bits",
        container.table.len(),
        container.bit_len
    );

    let text = container
        .decode_text()
        .with_context(|| format!("failed to decode {}", config.input_file.display()))?;
    let text = if config.fold_case {
        unfold_case(&text)
    } else {
        text
    };

    fs::write(&config.output_file, &text)
        .with_context(|| format!("failed to write {}", config.output_file.display()))?;
    info!(
        "Unpacked {} ({} bytes) into {} ({} bytes)",
        config.input_file.display(),
        bytes.len(),
        config.output_file.display(),
        text.len()
    );

    Ok(())
}
