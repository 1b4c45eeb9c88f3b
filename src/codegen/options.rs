// protocrap-objc/src/codegen/options.rs

use anyhow::{Result, bail};
use clap::ValueEnum;

use super::names;

/// One-time primitive guarding the registry initialization block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InitGuard {
    /// `dispatch_once` inside `+initialize`.
    #[default]
    DispatchOnce,
    /// Only the runtime's once-per-class `+initialize` guarantee.
    ClassInitialize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Target is compiled with ARC; no explicit `retain`/`autorelease`.
    pub arc: bool,
    pub init_guard: InitGuard,
    /// Files that must not import the ProtocolBuffers umbrella header, on
    /// top of `names::BOOTSTRAP_FILES`.
    pub bootstrap_files: Vec<String>,
}

impl Options {
    /// Parse a protoc plugin parameter, e.g.
    /// `arc,init_guard=class_initialize,bootstrap=foo/bar.proto`.
    pub fn from_parameter(parameter: &str) -> Result<Self> {
        let mut options = Options::default();
        for item in parameter.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (item, None),
            };
            match (key, value) {
                ("arc", None) => options.arc = true,
                ("arc", Some(value)) => options.arc = parse_bool(value)?,
                ("init_guard", Some("dispatch_once")) => {
                    options.init_guard = InitGuard::DispatchOnce
                }
                ("init_guard", Some("class_initialize")) => {
                    options.init_guard = InitGuard::ClassInitialize
                }
                ("init_guard", other) => bail!("invalid init_guard value {:?}", other),
                ("bootstrap", Some(file)) if !file.is_empty() => {
                    options.bootstrap_files.push(file.to_string())
                }
                _ => bail!("unknown generator parameter {:?}", item),
            }
        }
        Ok(options)
    }

    pub fn is_bootstrap(&self, file: &str) -> bool {
        names::is_bootstrap_file(file, &self.bootstrap_files)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => bail!("expected a boolean, got {:?}", value),
    }
}
