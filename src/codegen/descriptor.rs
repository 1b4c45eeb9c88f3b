// protocrap-objc/src/codegen/descriptor.rs
//
// Schema tree consumed by the generators, resolved from protoc descriptors.
// Files live in one arena and refer to their imports by `FileId`, so import
// cycles (including self-imports) are representable without shared ownership.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};

use super::names;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

#[derive(Debug)]
pub struct FileSet {
    files: Vec<SchemaFile>,
    by_name: HashMap<String, FileId>,
}

#[derive(Debug)]
pub struct SchemaFile {
    /// Declared path, e.g. `google/protobuf/unittest.proto`. Unique in a set.
    pub name: String,
    pub package: String,
    pub class_prefix: String,
    pub dependencies: Vec<FileId>,
    pub enums: Vec<EnumType>,
    pub messages: Vec<MessageType>,
    pub extensions: Vec<ExtensionField>,
}

#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub class_name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug)]
pub struct EnumValue {
    /// Generated constant, e.g. `ColorDarkRed`.
    pub name: String,
    pub number: i32,
}

#[derive(Debug)]
pub struct MessageType {
    pub name: String,
    pub full_name: String,
    pub class_name: String,
    pub fields: Vec<Field>,
    pub nested_messages: Vec<MessageType>,
    pub nested_enums: Vec<EnumType>,
    pub extensions: Vec<ExtensionField>,
}

#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub number: i32,
    pub label: Label,
    pub kind: Type,
    /// Generated class of the referenced message or enum type.
    pub type_class: Option<String>,
    pub default_value: Option<String>,
    pub packed: bool,
}

#[derive(Debug)]
pub struct ExtensionField {
    pub field: Field,
    /// Generated class of the message being extended.
    pub extendee: String,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, Type::Message | Type::Group)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == Type::Enum
    }
}

impl MessageType {
    /// This message followed by every nested message, depth first, in
    /// declared order.
    pub fn walk(&self) -> Messages<'_> {
        Messages { stack: vec![self] }
    }
}

pub struct Messages<'a> {
    stack: Vec<&'a MessageType>,
}

impl<'a> Iterator for Messages<'a> {
    type Item = &'a MessageType;

    fn next(&mut self) -> Option<Self::Item> {
        let message = self.stack.pop()?;
        self.stack.extend(message.nested_messages.iter().rev());
        Some(message)
    }
}

impl SchemaFile {
    /// Every message of the file, nested ones included.
    pub fn all_messages(&self) -> impl Iterator<Item = &MessageType> {
        self.messages.iter().flat_map(MessageType::walk)
    }
}

impl FileSet {
    pub fn from_descriptor_set(set: &FileDescriptorSet) -> Result<Self> {
        Self::from_protos(&set.file)
    }

    /// Resolve a list of file descriptors into a set. Every file named as a
    /// dependency and every referenced type must be present.
    pub fn from_protos(protos: &[FileDescriptorProto]) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (index, proto) in protos.iter().enumerate() {
            if by_name.insert(proto.name().to_string(), FileId(index)).is_some() {
                bail!("duplicate file in descriptor set: {}", proto.name());
            }
        }

        let mut symbols = SymbolTable::default();
        for proto in protos {
            symbols.add_file(proto);
        }

        let files = protos
            .iter()
            .map(|proto| {
                build_file(proto, &by_name, &symbols)
                    .with_context(|| format!("while resolving {}", proto.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FileSet { files, by_name })
    }

    pub fn find(&self, name: &str) -> Option<FileId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: FileId) -> &SchemaFile {
        &self.files[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SchemaFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Fully qualified proto name (without leading dot) -> generated class.
#[derive(Default)]
struct SymbolTable {
    classes: HashMap<String, String>,
    /// Enum class -> constant of its first value, the implicit default.
    first_values: HashMap<String, String>,
}

impl SymbolTable {
    fn add_file(&mut self, file: &FileDescriptorProto) {
        let prefix = class_prefix(file);
        for message in &file.message_type {
            self.add_message(file.package(), prefix, &mut Vec::new(), message);
        }
        for enum_type in &file.enum_type {
            self.add_enum(file.package(), &[], prefix, enum_type);
        }
    }

    fn add_message<'a>(
        &mut self,
        package: &str,
        prefix: &str,
        scope: &mut Vec<&'a str>,
        message: &'a DescriptorProto,
    ) {
        self.insert(package, scope, prefix, message.name());
        scope.push(message.name());
        for nested in &message.nested_type {
            self.add_message(package, prefix, scope, nested);
        }
        for enum_type in &message.enum_type {
            self.add_enum(package, scope, prefix, enum_type);
        }
        scope.pop();
    }

    fn add_enum(
        &mut self,
        package: &str,
        scope: &[&str],
        prefix: &str,
        enum_type: &EnumDescriptorProto,
    ) {
        let class = self.insert(package, scope, prefix, enum_type.name());
        if let Some(first) = enum_type.value.first() {
            let constant = names::enum_value_name(&class, first.name());
            self.first_values.insert(class, constant);
        }
    }

    fn insert(&mut self, package: &str, scope: &[&str], prefix: &str, name: &str) -> String {
        let class = names::class_name(prefix, scope, name);
        self.classes
            .insert(qualified_name(package, scope, name), class.clone());
        class
    }

    fn resolve(&self, type_name: &str) -> Result<&str> {
        let key = type_name.trim_start_matches('.');
        self.classes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("unresolved type {}", type_name))
    }
}

fn qualified_name(package: &str, scope: &[&str], name: &str) -> String {
    let mut full_name = String::from(package);
    for part in scope.iter().copied().chain(std::iter::once(name)) {
        if !full_name.is_empty() {
            full_name.push('.');
        }
        full_name.push_str(part);
    }
    full_name
}

fn class_prefix(file: &FileDescriptorProto) -> &str {
    file.options
        .as_ref()
        .map(|options| options.objc_class_prefix())
        .unwrap_or("")
}

fn build_file(
    proto: &FileDescriptorProto,
    by_name: &HashMap<String, FileId>,
    symbols: &SymbolTable,
) -> Result<SchemaFile> {
    let dependencies = proto
        .dependency
        .iter()
        .map(|dep| {
            by_name
                .get(dep)
                .copied()
                .ok_or_else(|| anyhow!("dependency {} is missing from the descriptor set", dep))
        })
        .collect::<Result<Vec<_>>>()?;

    let prefix = class_prefix(proto);
    let package = proto.package();

    let messages = proto
        .message_type
        .iter()
        .map(|m| build_message(m, package, prefix, &mut Vec::new(), symbols))
        .collect::<Result<Vec<_>>>()?;
    let enums = proto
        .enum_type
        .iter()
        .map(|e| build_enum(e, prefix, &[]))
        .collect();
    let extensions = proto
        .extension
        .iter()
        .map(|f| build_extension(f, symbols))
        .collect::<Result<Vec<_>>>()?;

    Ok(SchemaFile {
        name: proto.name().to_string(),
        package: package.to_string(),
        class_prefix: prefix.to_string(),
        dependencies,
        enums,
        messages,
        extensions,
    })
}

fn build_message<'a>(
    proto: &'a DescriptorProto,
    package: &str,
    prefix: &str,
    scope: &mut Vec<&'a str>,
    symbols: &SymbolTable,
) -> Result<MessageType> {
    let class_name = names::class_name(prefix, scope, proto.name());
    let full_name = qualified_name(package, scope, proto.name());

    let fields = proto
        .field
        .iter()
        .map(|f| build_field(f, symbols))
        .collect::<Result<Vec<_>>>()?;
    let extensions = proto
        .extension
        .iter()
        .map(|f| build_extension(f, symbols))
        .collect::<Result<Vec<_>>>()?;

    scope.push(proto.name());
    let nested_messages = proto
        .nested_type
        .iter()
        .map(|m| build_message(m, package, prefix, scope, symbols))
        .collect::<Result<Vec<_>>>();
    let nested_enums = proto
        .enum_type
        .iter()
        .map(|e| build_enum(e, prefix, scope))
        .collect();
    scope.pop();

    Ok(MessageType {
        name: proto.name().to_string(),
        full_name,
        class_name,
        fields,
        nested_messages: nested_messages?,
        nested_enums,
        extensions,
    })
}

fn build_enum(proto: &EnumDescriptorProto, prefix: &str, scope: &[&str]) -> EnumType {
    let class_name = names::class_name(prefix, scope, proto.name());
    let values = proto
        .value
        .iter()
        .map(|v| EnumValue {
            name: names::enum_value_name(&class_name, v.name()),
            number: v.number(),
        })
        .collect();
    EnumType {
        name: proto.name().to_string(),
        class_name,
        values,
    }
}

fn build_field(proto: &FieldDescriptorProto, symbols: &SymbolTable) -> Result<Field> {
    let kind = proto.r#type();
    let type_class = match kind {
        Type::Message | Type::Group | Type::Enum => Some(
            symbols
                .resolve(proto.type_name())
                .with_context(|| format!("field {}", proto.name()))?
                .to_string(),
        ),
        _ => None,
    };
    let default_value = match (&type_class, kind) {
        (Some(class), Type::Enum) => proto
            .default_value
            .as_deref()
            .map(|value| names::enum_value_name(class, value))
            .or_else(|| symbols.first_values.get(class).cloned()),
        _ => proto.default_value.clone(),
    };
    Ok(Field {
        name: proto.name().to_string(),
        number: proto.number(),
        label: proto.label(),
        kind,
        type_class,
        default_value,
        packed: proto.options.as_ref().is_some_and(|o| o.packed()),
    })
}

fn build_extension(proto: &FieldDescriptorProto, symbols: &SymbolTable) -> Result<ExtensionField> {
    let extendee = symbols
        .resolve(proto.extendee())
        .with_context(|| format!("extension {}", proto.name()))?
        .to_string();
    Ok(ExtensionField {
        field: build_field(proto, symbols)?,
        extendee,
    })
}
