//! `rle` command-line tool: compress or decompress a file in the `.rle`
//! format.
//!
//! ```text
//! rle [OPTIONS] [FILE]
//!
//!   -c, --stdout      write to standard output and keep the input file
//!   -d, --decompress  decode instead of encode
//!   -f, --force       overwrite output, allow compressed data on a terminal
//!   -k, --keep        keep (do not delete) the input file
//!   -h, --help        print help
//!   -V, --version     print version
//! ```
//!
//! With no FILE, or when FILE is `-`, standard input is read and standard
//! output written.
//!
//! # Exit codes
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | Error (I/O failure, bad suffix, etc.)     |
//!
//! Errors go to stderr prefixed with `rle: `, log output is controlled by
//! `RUST_LOG`.
#[macro_use]
extern crate log;

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

const SUFFIX: &str = "rle";

#[derive(Parser, Debug)]
#[command(
    name = "rle",
    version,
    about = "Compress or decompress FILE in the .rle format."
)]
struct Cli {
    /// Write to standard output and do not delete the input file.
    #[arg(short = 'c', long = "stdout")]
    to_stdout: bool,

    /// Force decompression (decoding).
    #[arg(short, long)]
    decompress: bool,

    /// Force: overwrite output files, write compressed data to a terminal.
    #[arg(short, long)]
    force: bool,

    /// Keep (do not delete) the input file.
    #[arg(short, long)]
    keep: bool,

    /// Input file, `-` for standard input.
    file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

/// Where the codec reads from and writes to, resolved from the flags.
#[derive(Debug, PartialEq, Eq)]
struct Plan {
    mode: Mode,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    keep: bool,
    force: bool,
}

impl Cli {
    fn plan(&self) -> Result<Plan> {
        let mode = if self.decompress {
            Mode::Decode
        } else {
            Mode::Encode
        };
        let input = self
            .file
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
            .cloned();

        let output = match &input {
            Some(path) if !self.to_stdout => Some(output_path(path, mode, self.force)?),
            _ => None,
        };

        Ok(Plan {
            mode,
            keep: self.keep || self.to_stdout || input.is_none(),
            input,
            output,
            force: self.force,
        })
    }
}

fn has_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SUFFIX)
}

/// Derive the output file name from the input name.
fn output_path(input: &Path, mode: Mode, force: bool) -> Result<PathBuf> {
    match mode {
        Mode::Encode => {
            if has_suffix(input) && !force {
                bail!("{}: Filename already has `.{SUFFIX}' suffix", input.display());
            }
            let mut name = OsString::from(input.as_os_str());
            name.push(".");
            name.push(SUFFIX);
            Ok(PathBuf::from(name))
        }
        Mode::Decode => {
            if !has_suffix(input) {
                bail!("{}: Filename has an unknown suffix", input.display());
            }
            Ok(input.with_extension(""))
        }
    }
}

fn create_output(path: &Path, force: bool) -> Result<File> {
    if force {
        match fs::remove_file(path) {
            Ok(()) => debug!("removed existing {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("{}: Can not remove", path.display()))
            }
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .with_context(|| format!("{}", path.display()))
}

fn run(plan: &Plan) -> Result<()> {
    debug!("{plan:?}");

    if plan.mode == Mode::Encode
        && plan.output.is_none()
        && !plan.force
        && io::stdout().is_terminal()
    {
        bail!(
            "Compressed data can not be written to a terminal.\n\
             rle: Try `rle -h' for more information."
        );
    }

    let input: Box<dyn io::BufRead> = match &plan.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("{}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &plan.output {
        Some(path) => Box::new(BufWriter::new(create_output(path, plan.force)?)),
        None => Box::new(io::stdout().lock()),
    };

    let result = match plan.mode {
        Mode::Encode => rle::encode(input, output),
        Mode::Decode => rle::decode(input, output),
    };

    if let Err(e) = result {
        if let Some(path) = &plan.output {
            if let Err(err) = fs::remove_file(path) {
                warn!("{}: Can not remove: {err}", path.display());
            }
        }
        let name = plan
            .input
            .as_deref()
            .map_or_else(|| "(stdin)".to_owned(), |p| p.display().to_string());
        return Err(e).with_context(|| name);
    }

    if let (Some(path), false) = (&plan.input, plan.keep) {
        fs::remove_file(path).with_context(|| format!("{}: Can not remove", path.display()))?;
        debug!("removed input {}", path.display());
    }

    Ok(())
}

fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let result = cli.plan().and_then(|plan| run(&plan));

    if let Err(e) = result {
        eprintln!("rle: {e:#}");
        process::exit(1);
    }
}
