// protocrap-objc/src/codegen/generators.rs
//
// One trait per schema construct. The file generator only orchestrates;
// everything inside an enum, message or extension body comes from these.

use anyhow::Result;

use super::Options;
use super::dependencies::ForwardDeclarations;
use super::descriptor::{EnumType, ExtensionField, MessageType};
use super::enums::ObjcEnumGenerator;
use super::extension::ObjcExtensionGenerator;
use super::message::ObjcMessageGenerator;
use super::printer::Printer;

pub trait EnumGenerator {
    fn emit_declaration(&self, enum_type: &EnumType, printer: &mut Printer) -> Result<()>;
    fn emit_definition(&self, enum_type: &EnumType, printer: &mut Printer) -> Result<()>;
}

pub trait MessageGenerator {
    /// Declarations of the enums nested in `message` (recursively), without
    /// any class bodies.
    fn emit_nested_enum_declarations(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_declaration(&self, message: &MessageType, printer: &mut Printer) -> Result<()>;
    fn emit_static_storage(&self, message: &MessageType, printer: &mut Printer) -> Result<()>;
    fn emit_static_initialization(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()>;
    /// Registration of the extensions declared inside `message`, recursively.
    fn emit_extension_registration(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_definition(&self, message: &MessageType, printer: &mut Printer) -> Result<()>;
    /// Forward declarations `message` itself needs. Nested messages are
    /// visited separately by the resolver.
    fn contribute_forward_declarations(
        &self,
        message: &MessageType,
        decls: &mut ForwardDeclarations,
    );
}

/// `owner` is the class the extension accessor is declared on: the file's
/// container class for top-level extensions, the message class otherwise.
pub trait ExtensionGenerator {
    fn emit_declaration(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_storage(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_initialization(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_registration(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()>;
    fn emit_implementation(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()>;
}

pub struct SubGenerators {
    pub enums: Box<dyn EnumGenerator>,
    pub messages: Box<dyn MessageGenerator>,
    pub extensions: Box<dyn ExtensionGenerator>,
}

impl SubGenerators {
    /// The Objective-C generators for the ProtocolBuffers runtime.
    pub fn objc(options: &Options) -> Self {
        let extensions = ObjcExtensionGenerator { arc: options.arc };
        SubGenerators {
            enums: Box::new(ObjcEnumGenerator),
            messages: Box::new(ObjcMessageGenerator { extensions }),
            extensions: Box::new(extensions),
        }
    }
}
