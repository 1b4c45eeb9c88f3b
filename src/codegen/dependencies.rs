// protocrap-objc/src/codegen/dependencies.rs

use std::collections::{BTreeSet, HashSet};

use log::trace;

use super::descriptor::{FileId, FileSet};
use super::generators::MessageGenerator;

/// Forward declarations for a header, one entry per `@class` line. Ordered
/// lexicographically so the emitted header does not depend on traversal
/// order.
pub type ForwardDeclarations = BTreeSet<String>;

/// Collect the forward declarations of every message in `file` and in every
/// file reachable through its imports. Each file is visited once, so diamond
/// imports, cycles and self-imports all terminate.
pub fn compute_forward_declarations(
    files: &FileSet,
    file: FileId,
    messages: &dyn MessageGenerator,
) -> ForwardDeclarations {
    let mut resolver = Resolver {
        files,
        messages,
        seen: HashSet::new(),
        decls: ForwardDeclarations::new(),
    };
    resolver.visit(file);
    resolver.decls
}

struct Resolver<'a> {
    files: &'a FileSet,
    messages: &'a dyn MessageGenerator,
    seen: HashSet<FileId>,
    decls: ForwardDeclarations,
}

impl Resolver<'_> {
    fn visit(&mut self, id: FileId) {
        let file = self.files.get(id);
        if !self.seen.insert(id) {
            trace!("{} already visited", file.name);
            return;
        }
        trace!("collecting forward declarations from {}", file.name);

        for &dependency in &file.dependencies {
            self.visit(dependency);
        }
        for message in file.all_messages() {
            self.messages
                .contribute_forward_declarations(message, &mut self.decls);
        }
    }
}
