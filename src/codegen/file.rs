// protocrap-objc/src/codegen/file.rs
//
// Per-file orchestration: the layout of the .pb.h and .pb.m units and the
// container class that owns the file's extension registry. Everything inside
// an enum, message or extension body is delegated to the sub-generators.

use anyhow::Result;
use log::debug;
use serde::Serialize;

use super::Options;
use super::dependencies::{ForwardDeclarations, compute_forward_declarations};
use super::descriptor::{FileId, FileSet, SchemaFile};
use super::generators::SubGenerators;
use super::names;
use super::options::InitGuard;
use super::printer::Printer;

const BANNER: &str = "// Generated by the protocol buffer compiler.  DO NOT EDIT!\n\n";

const PORTABILITY_GUARDS: &str = concat!(
    "#ifndef __has_feature\n",
    "  #define __has_feature(x) 0 // Compatibility with non-clang compilers.\n",
    "#endif // __has_feature\n",
    "\n",
    "#ifndef NS_RETURNS_NOT_RETAINED\n",
    "  #if __has_feature(attribute_ns_returns_not_retained)\n",
    "    #define NS_RETURNS_NOT_RETAINED __attribute__((ns_returns_not_retained))\n",
    "  #else\n",
    "    #define NS_RETURNS_NOT_RETAINED\n",
    "  #endif\n",
    "#endif\n",
    "\n",
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

/// The declaration and definition units of one schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitPair {
    pub header: GeneratedFile,
    pub source: GeneratedFile,
}

/// Order of the `registerAllExtensions:` calls made by a file's
/// initialization block: the file's own container, then every direct
/// dependency's container in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationPlan {
    pub container: String,
    pub dependencies: Vec<String>,
}

impl RegistrationPlan {
    pub fn calls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.container.as_str()).chain(self.dependencies.iter().map(String::as_str))
    }
}

/// What was generated for one file, as written to the JSON manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub file: String,
    pub container: String,
    pub header: String,
    pub source: String,
    pub forward_declarations: Vec<String>,
    pub registration: RegistrationPlan,
}

pub struct FileGenerator<'a> {
    files: &'a FileSet,
    id: FileId,
    file: &'a SchemaFile,
    options: &'a Options,
    generators: &'a SubGenerators,
    container: String,
}

impl<'a> FileGenerator<'a> {
    pub fn new(
        files: &'a FileSet,
        id: FileId,
        options: &'a Options,
        generators: &'a SubGenerators,
    ) -> Self {
        let file = files.get(id);
        FileGenerator {
            files,
            id,
            file,
            options,
            generators,
            container: names::container_type_name(file),
        }
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    pub fn forward_declarations(&self) -> ForwardDeclarations {
        compute_forward_declarations(self.files, self.id, &*self.generators.messages)
    }

    pub fn registration_plan(&self) -> RegistrationPlan {
        RegistrationPlan {
            container: self.container.clone(),
            dependencies: self
                .file
                .dependencies
                .iter()
                .map(|&dep| names::container_type_name(self.files.get(dep)))
                .collect(),
        }
    }

    pub fn emit_declarations(&self, printer: &mut Printer) -> Result<()> {
        self.emit_declarations_with(&self.forward_declarations(), printer)
    }

    fn emit_declarations_with(
        &self,
        decls: &ForwardDeclarations,
        printer: &mut Printer,
    ) -> Result<()> {
        let file = self.file;
        let generators = self.generators;

        printer.print(BANNER, &[])?;
        if !self.options.is_bootstrap(&file.name) {
            printer.print("#import <ProtocolBuffers/ProtocolBuffers.h>\n\n", &[])?;
        }

        if !file.dependencies.is_empty() {
            for &dep in &file.dependencies {
                let header = names::header_path(self.files.get(dep));
                printer.print("#import \"$header$\"\n", &[("header", &header)])?;
            }
            printer.print("\n", &[])?;
        }

        for decl in decls {
            printer.print("$decl$;\n", &[("decl", decl)])?;
        }
        printer.print(PORTABILITY_GUARDS, &[])?;

        // Enum names must be visible before any class body refers to them.
        for enum_type in &file.enums {
            generators.enums.emit_declaration(enum_type, printer)?;
        }
        for message in &file.messages {
            generators
                .messages
                .emit_nested_enum_declarations(message, printer)?;
        }

        printer.print(
            concat!(
                "\n",
                "@interface $container$ : NSObject {\n",
                "}\n",
                "+ (PBExtensionRegistry*) extensionRegistry;\n",
                "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry;\n",
            ),
            &[("container", &self.container)],
        )?;
        for extension in &file.extensions {
            generators
                .extensions
                .emit_declaration(&self.container, extension, printer)?;
        }
        printer.print("@end\n\n", &[])?;

        for message in &file.messages {
            generators.messages.emit_declaration(message, printer)?;
        }
        Ok(())
    }

    pub fn emit_definitions(&self, printer: &mut Printer) -> Result<()> {
        let file = self.file;
        let generators = self.generators;
        let own_header = format!("{}.pb.h", names::file_name(file));

        printer.print(BANNER, &[])?;
        printer.print("#import \"$header$\"\n\n", &[("header", &own_header)])?;
        printer.print("@implementation $container$\n", &[("container", &self.container)])?;

        for extension in &file.extensions {
            generators
                .extensions
                .emit_storage(&self.container, extension, printer)?;
        }
        for message in &file.messages {
            generators.messages.emit_static_storage(message, printer)?;
        }

        printer.print("static PBExtensionRegistry* extensionRegistry = nil;\n", &[])?;
        self.emit_initialize(printer)?;

        printer.print(
            "+ (void) registerAllExtensions:(PBMutableExtensionRegistry*) registry {\n",
            &[],
        )?;
        {
            // Own extensions only; dependencies are merged by +initialize.
            let mut body = printer.indented();
            for extension in &file.extensions {
                generators
                    .extensions
                    .emit_registration(&self.container, extension, &mut body)?;
            }
            for message in &file.messages {
                generators
                    .messages
                    .emit_extension_registration(message, &mut body)?;
            }
        }
        printer.print(
            concat!(
                "}\n",
                "+ (PBExtensionRegistry*) extensionRegistry {\n",
                "  return extensionRegistry;\n",
                "}\n",
            ),
            &[],
        )?;

        for extension in &file.extensions {
            generators
                .extensions
                .emit_implementation(&self.container, extension, printer)?;
        }
        printer.print("@end\n\n", &[])?;

        for enum_type in &file.enums {
            generators.enums.emit_definition(enum_type, printer)?;
        }
        for message in &file.messages {
            generators.messages.emit_definition(message, printer)?;
        }
        Ok(())
    }

    /// The one-time initialization block. The runtime sends `+initialize`
    /// before the container's first message, so the first call to
    /// `extensionRegistry` always observes the published registry.
    fn emit_initialize(&self, printer: &mut Printer) -> Result<()> {
        printer.print(
            "+ (void) initialize {\n  if (self == [$container$ class]) {\n",
            &[("container", &self.container)],
        )?;
        {
            let mut method = printer.indented();
            let mut class_guard = method.indented();
            match self.options.init_guard {
                InitGuard::DispatchOnce => {
                    class_guard.print(
                        "static dispatch_once_t onceToken;\ndispatch_once(&onceToken, ^{\n",
                        &[],
                    )?;
                    {
                        let mut once = class_guard.indented();
                        self.emit_initialize_body(&mut once)?;
                    }
                    class_guard.print("});\n", &[])?;
                }
                InitGuard::ClassInitialize => self.emit_initialize_body(&mut class_guard)?,
            }
        }
        printer.print("  }\n}\n", &[])
    }

    fn emit_initialize_body(&self, printer: &mut Printer) -> Result<()> {
        let file = self.file;
        let generators = self.generators;

        for extension in &file.extensions {
            generators
                .extensions
                .emit_initialization(&self.container, extension, printer)?;
        }
        for message in &file.messages {
            generators
                .messages
                .emit_static_initialization(message, printer)?;
        }

        printer.print(
            "PBMutableExtensionRegistry* registry = [PBMutableExtensionRegistry registry];\n",
            &[],
        )?;
        let plan = self.registration_plan();
        printer.print("[self registerAllExtensions:registry];\n", &[])?;
        for dependency in &plan.dependencies {
            printer.print(
                "[$dependency$ registerAllExtensions:registry];\n",
                &[("dependency", dependency)],
            )?;
        }

        if self.options.arc {
            printer.print("extensionRegistry = registry;\n", &[])
        } else {
            printer.print("extensionRegistry = [registry retain];\n", &[])
        }
    }

    pub fn generate(&self) -> Result<(UnitPair, ManifestEntry)> {
        let decls = self.forward_declarations();
        debug!(
            "generating {} ({} dependencies, {} forward declarations)",
            self.file.name,
            self.file.dependencies.len(),
            decls.len()
        );

        let mut header = Printer::new();
        self.emit_declarations_with(&decls, &mut header)?;
        let mut source = Printer::new();
        self.emit_definitions(&mut source)?;

        let units = UnitPair {
            header: GeneratedFile {
                name: names::header_path(self.file),
                content: header.into_string(),
            },
            source: GeneratedFile {
                name: names::source_path(self.file),
                content: source.into_string(),
            },
        };
        let entry = ManifestEntry {
            file: self.file.name.clone(),
            container: self.container.clone(),
            header: units.header.name.clone(),
            source: units.source.name.clone(),
            forward_declarations: decls.into_iter().collect(),
            registration: self.registration_plan(),
        };
        Ok((units, entry))
    }
}
