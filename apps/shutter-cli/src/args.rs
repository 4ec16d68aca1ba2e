//! Command line parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use shutter_core::{Configuration, RecordMode, SnapshotFormat};

/// A parsed invocation.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Evaluate an image file against its stored snapshot.
    Check(SnapshotArgs),
    /// Make an image file the accepted snapshot.
    Accept(SnapshotArgs),
    /// Write a comparison composite for two image files.
    Diff {
        reference: PathBuf,
        candidate: PathBuf,
        output: PathBuf,
    },
    Help,
}

/// Arguments shared by commands that address a stored snapshot.
#[derive(Debug, Default, PartialEq)]
pub struct SnapshotArgs {
    pub image: PathBuf,
    pub root: PathBuf,
    pub group: String,
    pub name: String,
    pub config_file: Option<PathBuf>,
    pub record: Option<RecordMode>,
    pub format: Option<SnapshotFormat>,
    pub directory: Option<String>,
}

impl SnapshotArgs {
    /// Resolve the configuration: defaults, then file, then environment,
    /// then flags.
    pub fn configuration(&self) -> Result<Configuration> {
        let base = match &self.config_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Configuration::default(),
        };
        let mut config = base.with_env_overrides()?;

        if let Some(record) = self.record {
            config.record = record;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(directory) = &self.directory {
            config.directory_name.clone_from(directory);
        }
        Ok(config)
    }
}

pub const USAGE: &str = "\
Shutter snapshot tool

Usage:
  shutter check  <IMAGE> --group <GROUP> --name <NAME> [OPTIONS]
  shutter accept <IMAGE> --group <GROUP> --name <NAME> [OPTIONS]
  shutter diff   <REFERENCE> <CANDIDATE> --output <FILE>

Options:
  -r, --root <DIR>         Directory snapshots are stored under (default: .)
  -g, --group <GROUP>      Snapshot group, usually the test file stem
  -n, --name <NAME>        Snapshot name
  -c, --config <FILE>      JSON configuration file
      --record <MODE>      all, never, failed or missing
      --format <FORMAT>    png, bmp or tiff
      --directory <NAME>   Snapshot directory name (default: __Snapshots__)
  -o, --output <FILE>      Output path for diff
      --help               Show this help message";

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    let mut positional = Vec::new();
    let mut snapshot = SnapshotArgs {
        root: PathBuf::from("."),
        ..Default::default()
    };
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("missing value for {flag}"))
        };
        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "-r" | "--root" => snapshot.root = PathBuf::from(value()?),
            "-g" | "--group" => snapshot.group = value()?,
            "-n" | "--name" => snapshot.name = value()?,
            "-c" | "--config" => snapshot.config_file = Some(PathBuf::from(value()?)),
            "--record" => snapshot.record = Some(value()?.parse()?),
            "--format" => snapshot.format = Some(value()?.parse()?),
            "--directory" => snapshot.directory = Some(value()?),
            "-o" | "--output" => output = Some(PathBuf::from(value()?)),
            other if other.starts_with('-') => bail!("unknown option {other}"),
            other => positional.push(PathBuf::from(other)),
        }
        i += 1;
    }

    match command.as_str() {
        "check" | "accept" => {
            let [image] = <[PathBuf; 1]>::try_from(positional)
                .map_err(|_| anyhow!("{command} takes exactly one image path"))?;
            if snapshot.group.is_empty() || snapshot.name.is_empty() {
                bail!("{command} requires --group and --name");
            }
            snapshot.image = image;
            if command == "check" {
                Ok(Command::Check(snapshot))
            } else {
                Ok(Command::Accept(snapshot))
            }
        }
        "diff" => {
            let [reference, candidate] = <[PathBuf; 2]>::try_from(positional)
                .map_err(|_| anyhow!("diff takes a reference and a candidate path"))?;
            let output = output.ok_or_else(|| anyhow!("diff requires --output"))?;
            Ok(Command::Diff {
                reference,
                candidate,
                output,
            })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("unknown command {other}"),
    }
}
