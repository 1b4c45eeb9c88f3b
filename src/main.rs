use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;

use protocrap_objc::{InitGuard, Options, codegen};

/// Protocrap Objective-C code generator.
///
/// protoc --descriptor_set_out=desc.pb --include_imports my.proto
/// protocrap-objc desc.pb --out-dir gen
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// FileDescriptorSet from protoc, or `-` for stdin. Without it the
    /// binary runs as a protoc plugin.
    descriptor: Option<PathBuf>,

    /// Run as a protoc plugin (CodeGeneratorRequest on stdin)
    #[arg(long, conflicts_with = "descriptor")]
    plugin: bool,

    /// Output directory (default: print units to stdout)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Generate only this file (repeatable; default: every file in the set)
    #[arg(long = "file")]
    files: Vec<String>,

    /// Generated code is compiled with ARC
    #[arg(long)]
    arc: bool,

    #[arg(long, value_enum, default_value_t = InitGuard::DispatchOnce)]
    init_guard: InitGuard,

    /// Additional file that must not import the ProtocolBuffers umbrella header
    #[arg(long = "bootstrap")]
    bootstrap_files: Vec<String>,

    /// Write a JSON manifest of the generated files
    #[arg(long)]
    manifest: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let descriptor = match &cli.descriptor {
        Some(descriptor) if !cli.plugin => descriptor,
        _ => return run_plugin(),
    };
    let descriptor_bytes = if descriptor.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(descriptor).with_context(|| format!("reading {}", descriptor.display()))?
    };
    info!("read descriptor ({} bytes)", descriptor_bytes.len());

    let options = Options {
        arc: cli.arc,
        init_guard: cli.init_guard,
        bootstrap_files: cli.bootstrap_files.clone(),
    };
    let outputs = codegen::generate(&descriptor_bytes, &cli.files, &options)?;

    match &cli.out_dir {
        Some(dir) => {
            for output in &outputs {
                for unit in [&output.units.header, &output.units.source] {
                    let path = dir.join(&unit.name);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)
                            .with_context(|| format!("creating {}", parent.display()))?;
                    }
                    fs::write(&path, &unit.content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("generated {}", path.display());
                }
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            for output in &outputs {
                stdout.write_all(output.units.header.content.as_bytes())?;
                stdout.write_all(output.units.source.content.as_bytes())?;
            }
        }
    }

    if let Some(path) = &cli.manifest {
        fs::write(path, codegen::manifest(&outputs)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("wrote manifest {}", path.display());
    }
    Ok(())
}

fn run_plugin() -> Result<()> {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;
    let request = CodeGeneratorRequest::decode(buf.as_slice())
        .context("failed to decode CodeGeneratorRequest")?;
    info!(
        "plugin request for {} of {} files",
        request.file_to_generate.len(),
        request.proto_file.len()
    );

    let response = codegen::generate_response(request);
    if let Some(error) = &response.error {
        log::error!("{}", error);
    }
    io::stdout().write_all(&response.encode_to_vec())?;
    Ok(())
}
