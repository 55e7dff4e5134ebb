// Licensed under the Apache-2.0 license

//! Generates `<stem>_mmr.h`, `<stem>_mmr.c` and `<stem>_mmr.ld` from an SVD file.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use clap_num::maybe_hex;
use log::{info, LevelFilter};
use registers_generator::util::mmr_stem;
use registers_generator::{generate_mmr, AliasNaming, GeneratorConfig, MmrFileNames};
use simple_logger::SimpleLogger;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Parser, Debug)]
#[command(
    name = "svdconv",
    version,
    about = "Generate C register types, placements and a linker script from an SVD file"
)]
struct Cli {
    /// SVD file to convert
    input: PathBuf,

    /// Output directory [default: the input's directory]
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Fail if the existing outputs differ from the generated ones; write nothing
    #[arg(long)]
    check: bool,

    /// Fail on aliased registers that do not share a `{BASE}_` name prefix
    #[arg(long)]
    strict_alias_names: bool,

    /// ALIGN value of every linker section (a power of two)
    #[arg(long, value_name = "N", default_value = "4", value_parser = section_align)]
    section_align: u64,

    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn section_align(s: &str) -> std::result::Result<u64, String> {
    let align = maybe_hex::<u64>(s)?;
    if !align.is_power_of_two() {
        return Err(format!("{align} is not a power of two"));
    }
    Ok(align)
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn config(&self) -> GeneratorConfig {
        let alias_naming = if self.strict_alias_names {
            AliasNaming::Strict
        } else {
            AliasNaming::Lenient
        };
        GeneratorConfig::with_defaults()
            .alias_naming(alias_naming)
            .section_align(self.section_align)
    }

    fn out_dir(&self) -> PathBuf {
        match (&self.out_dir, self.input.parent()) {
            (Some(dir), _) => dir.clone(),
            (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level())
        .init()
        .context("Failed to initialize logging")?;
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let stem = mmr_stem(&cli.input)
        .with_context(|| format!("Cannot derive an output name from {:?}", cli.input))?;
    let names = MmrFileNames::new(&stem);

    let svd = registers_svd::load_file(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    let files = generate_mmr(&svd, &names, &cli.config())
        .with_context(|| format!("Failed to generate registers from {}", cli.input.display()))?;

    let out_dir = cli.out_dir();
    let outputs = [
        (out_dir.join(&names.header), files.header),
        (out_dir.join(&names.source), files.source),
        (out_dir.join(&names.linker), files.linker),
    ];
    if cli.check {
        check_outputs(&outputs)
    } else {
        write_outputs(&out_dir, &outputs)
    }
}

/// Stages every output in a temporary file next to its destination before
/// moving any of them into place.
fn write_outputs(out_dir: &Path, outputs: &[(PathBuf, String)]) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut staged = vec![];
    for (dest, contents) in outputs {
        let mut temp = NamedTempFile::new_in(out_dir)
            .with_context(|| format!("Failed to create a temporary file in {}", out_dir.display()))?;
        temp.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        staged.push((temp, dest));
    }
    for (temp, dest) in staged {
        temp.persist(dest)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        info!("Wrote {}", dest.display());
    }
    Ok(())
}

fn check_outputs(outputs: &[(PathBuf, String)]) -> Result<()> {
    let mut stale = vec![];
    for (dest, expected) in outputs {
        info!("Checking {}", dest.display());
        match std::fs::read(dest) {
            Ok(actual) if actual == expected.as_bytes() => {}
            _ => stale.push(dest.display().to_string()),
        }
    }
    if !stale.is_empty() {
        bail!(
            "{} do not match the generator output; rerun svdconv without --check to update them",
            stale.join(", ")
        );
    }
    Ok(())
}
