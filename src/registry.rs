// protocrap-objc/src/registry.rs
//
// Run-time semantics of the extension registry that generated containers
// build in `+initialize`, modeled over a `FileSet`. Generated code and this
// model follow the same plan: a fresh mutable registry, the file's own
// `registerAllExtensions:`, then each direct dependency's, frozen once.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use log::{debug, warn};

use crate::codegen::descriptor::{FileId, FileSet, MessageType};
use crate::codegen::names;

/// `(extended class, field number)`.
pub type ExtensionKey = (String, i32);

#[derive(Debug, Default)]
pub struct MutableExtensionRegistry {
    entries: BTreeMap<ExtensionKey, String>,
}

impl MutableExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, keeping the existing entry, if the key is taken.
    pub fn add_extension(&mut self, extendee: &str, number: i32, identifier: &str) -> bool {
        let key = (extendee.to_string(), number);
        if let Some(existing) = self.entries.get(&key) {
            warn!(
                "{}: field {} of {} is already registered as {}",
                identifier, number, extendee, existing
            );
            return false;
        }
        self.entries.insert(key, identifier.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn freeze(self) -> ExtensionRegistry {
        ExtensionRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable snapshot published by an initialization block.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtensionRegistry {
    entries: BTreeMap<ExtensionKey, String>,
}

impl ExtensionRegistry {
    pub fn get(&self, extendee: &str, number: i32) -> Option<&str> {
        self.entries
            .get(&(extendee.to_string(), number))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtensionKey, &str)> {
        self.entries.iter().map(|(key, id)| (key, id.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;

/// A registry built on first access, exactly once, by whichever caller gets
/// there first. Concurrent first callers block until it is published.
#[derive(Debug)]
pub struct LazyExtensionRegistry {
    cell: OnceLock<ExtensionRegistry>,
    state: AtomicU8,
    builds: AtomicUsize,
}

impl LazyExtensionRegistry {
    pub const fn new() -> Self {
        LazyExtensionRegistry {
            cell: OnceLock::new(),
            state: AtomicU8::new(UNINITIALIZED),
            builds: AtomicUsize::new(0),
        }
    }

    /// A build that panics leaves the cell `Uninitialized`; the next caller
    /// builds again.
    pub fn get_or_init(&self, build: impl FnOnce() -> ExtensionRegistry) -> &ExtensionRegistry {
        self.cell.get_or_init(|| {
            self.state.store(INITIALIZING, Ordering::Release);
            let _reset = ResetOnUnwind(&self.state);
            let registry = build();
            self.builds.fetch_add(1, Ordering::AcqRel);
            registry
        })
    }

    pub fn get(&self) -> Option<&ExtensionRegistry> {
        self.cell.get()
    }

    pub fn state(&self) -> InitState {
        if self.cell.get().is_some() {
            return InitState::Ready;
        }
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => InitState::Uninitialized,
            _ => InitState::Initializing,
        }
    }

    /// Number of builds that completed; at most one.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }
}

struct ResetOnUnwind<'a>(&'a AtomicU8);

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.store(UNINITIALIZED, Ordering::Release);
        }
    }
}

impl Default for LazyExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// What a file's generated `registerAllExtensions:` adds: the file's own
/// top-level extensions and those nested in its messages, never anything
/// from its imports. Returns the number of extensions added.
pub fn register_all_extensions(
    files: &FileSet,
    id: FileId,
    registry: &mut MutableExtensionRegistry,
) -> usize {
    let file = files.get(id);
    let container = names::container_type_name(file);
    let mut added = 0;

    for extension in &file.extensions {
        let identifier = names::extension_identifier(&container, &extension.field.name);
        added += usize::from(registry.add_extension(
            &extension.extendee,
            extension.field.number,
            &identifier,
        ));
    }
    for message in file.all_messages() {
        added += register_nested(message, registry);
    }
    added
}

fn register_nested(message: &MessageType, registry: &mut MutableExtensionRegistry) -> usize {
    message
        .extensions
        .iter()
        .map(|extension| {
            let identifier =
                names::extension_identifier(&message.class_name, &extension.field.name);
            registry.add_extension(&extension.extendee, extension.field.number, &identifier)
                as usize
        })
        .sum()
}

/// The body of a file's initialization block: own registration first, then
/// every direct dependency in declared order.
pub fn build_registry(files: &FileSet, id: FileId) -> ExtensionRegistry {
    let file = files.get(id);
    let mut registry = MutableExtensionRegistry::new();
    register_all_extensions(files, id, &mut registry);
    for &dependency in &file.dependencies {
        register_all_extensions(files, dependency, &mut registry);
    }
    debug!(
        "built extension registry for {} with {} extensions",
        file.name,
        registry.len()
    );
    registry.freeze()
}

/// The containers of a generated program, one lazily initialized registry
/// per file.
pub struct Program<'a> {
    files: &'a FileSet,
    registries: HashMap<FileId, LazyExtensionRegistry>,
}

impl<'a> Program<'a> {
    pub fn new(files: &'a FileSet) -> Self {
        Program {
            files,
            registries: files
                .iter()
                .map(|(id, _)| (id, LazyExtensionRegistry::new()))
                .collect(),
        }
    }

    /// `[<Container> extensionRegistry]`: triggers the file's initialization
    /// block on first use.
    pub fn extension_registry(&self, id: FileId) -> &ExtensionRegistry {
        self.cell(id).get_or_init(|| build_registry(self.files, id))
    }

    pub fn state(&self, id: FileId) -> InitState {
        self.cell(id).state()
    }

    pub fn build_count(&self, id: FileId) -> usize {
        self.cell(id).build_count()
    }

    fn cell(&self, id: FileId) -> &LazyExtensionRegistry {
        // Every id handed out by the set has a cell.
        &self.registries[&id]
    }
}
