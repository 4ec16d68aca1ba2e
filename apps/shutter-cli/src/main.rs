//! Command line front end for Shutter snapshots.
//!
//! Checks rendered image files against stored snapshots, accepts new
//! references and writes comparison composites.
//!
//! # Usage
//!
//! ```bash
//! shutter check target/render/header.png --group view_tests --name header --root tests
//! shutter accept target/render/header.png --group view_tests --name header --root tests
//! shutter diff old.png new.png --output header-FAILED.png
//! ```

mod args;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use shutter_core::{RasterImage, RenderError, RenderResult, SnapshotFormat, SnapshotIdentity};
use shutter_test::{FsReferenceStore, ReferenceStore, SnapshotEngine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use args::{Command, SnapshotArgs};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

/// Run one command. `Ok(false)` means the snapshot did not pass.
fn run(args: &[String]) -> Result<bool> {
    match args::parse_args(args)? {
        Command::Help => {
            println!("{}", args::USAGE);
            Ok(true)
        }
        Command::Check(snapshot) => check(&snapshot),
        Command::Accept(snapshot) => accept(&snapshot).map(|()| true),
        Command::Diff {
            reference,
            candidate,
            output,
        } => diff(&reference, &candidate, &output).map(|()| true),
    }
}

fn check(args: &SnapshotArgs) -> Result<bool> {
    let config = args.configuration()?;
    let identity = SnapshotIdentity::new(&args.group, &args.name)?;
    let engine = SnapshotEngine::new(FsReferenceStore::new(&args.root));

    let verdict = engine.evaluate(load_render(&args.image), &identity, &config);
    if verdict.is_failure() {
        error!("{identity}: {verdict}");
    } else {
        info!("{identity}: {verdict}");
    }
    Ok(!verdict.is_failure())
}

fn accept(args: &SnapshotArgs) -> Result<()> {
    let config = args.configuration()?;
    let identity = SnapshotIdentity::new(&args.group, &args.name)?;
    let store = FsReferenceStore::new(&args.root);
    let image = load_image(&args.image)?;

    store.ensure_directory(&identity.directory(store.root(), &config.directory_name))?;
    let path = identity.snapshot_path(store.root(), &config.directory_name, config.format);
    store.write(&image, &path, config.format)?;
    store.remove(&identity.failed_path(store.root(), &config.directory_name, config.format))?;
    info!("Accepted {identity} as {}", path.display());
    Ok(())
}

fn diff(reference: &Path, candidate: &Path, output: &Path) -> Result<()> {
    let reference = load_image(reference)?;
    let candidate = load_image(candidate)?;
    let composite = shutter_diff::compose(&reference, &candidate)?;

    let format = output_format(output);
    let bytes = composite.encode(format)?;
    std::fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    info!("Comparison saved: {}", output.display());
    Ok(())
}

fn load_image(path: &Path) -> Result<RasterImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let format = input_format(path)?;
    RasterImage::decode(&bytes, format).with_context(|| format!("decoding {}", path.display()))
}

/// An unreadable input counts as a failed render rather than a CLI error.
fn load_render(path: &Path) -> RenderResult {
    load_image(path).map_err(|err| RenderError::new(format!("{err:#}")))
}

fn input_format(path: &Path) -> Result<SnapshotFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .with_context(|| format!("{} has no file extension", path.display()))?;
    Ok(extension.parse()?)
}

fn output_format(path: &Path) -> SnapshotFormat {
    input_format(path).unwrap_or_default()
}
