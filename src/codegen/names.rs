// protocrap-objc/src/codegen/names.rs

use std::collections::HashMap;

use anyhow::{Result, bail};

use super::descriptor::{FileSet, SchemaFile};

/// Files the ProtocolBuffers runtime itself is generated from. Their headers
/// must not import the umbrella header, which would import them back.
pub const BOOTSTRAP_FILES: &[&str] = &["google/protobuf/descriptor.proto"];

const OBJC_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "class", "const", "continue", "default", "description",
    "do", "double", "else", "enum", "extern", "float", "for", "goto", "hash", "id", "if",
    "inline", "int", "long", "nil", "register", "restrict", "return", "self", "short",
    "signed", "sizeof", "static", "struct", "super", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "while", "BOOL", "NO", "YES", "Nil", "SEL", "IMP",
];

pub fn is_bootstrap_file(name: &str, extra: &[String]) -> bool {
    BOOTSTRAP_FILES.contains(&name) || extra.iter().any(|f| f == name)
}

/// Convert `foo_bar2baz` style identifiers to `fooBar2Baz` (or `FooBar2Baz`
/// when `cap_first` is set). Any non-alphanumeric character is a word break.
pub fn underscores_to_camel_case(input: &str, cap_first: bool) -> String {
    let mut result = String::with_capacity(input.len());
    let mut cap_next = cap_first;

    for (i, c) in input.chars().enumerate() {
        if c.is_ascii_lowercase() {
            if cap_next {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
            cap_next = false;
        } else if c.is_ascii_uppercase() {
            if i == 0 && !cap_first {
                result.push(c.to_ascii_lowercase());
            } else {
                result.push(c);
            }
            cap_next = false;
        } else if c.is_ascii_digit() {
            result.push(c);
            cap_next = true;
        } else {
            cap_next = true;
        }
    }

    result
}

pub fn strip_proto(name: &str) -> &str {
    name.strip_suffix(".protodevel")
        .or_else(|| name.strip_suffix(".proto"))
        .unwrap_or(name)
}

/// Camel-cased base name of the schema file: `foo/bar_baz.proto` -> `BarBaz`.
pub fn file_name(file: &SchemaFile) -> String {
    let base = file.name.rsplit('/').next().unwrap_or(&file.name);
    underscores_to_camel_case(strip_proto(base), true)
}

/// Directory-qualified output stem: `foo/bar_baz.proto` -> `foo/BarBaz`.
pub fn file_path(file: &SchemaFile) -> String {
    match file.name.rfind('/') {
        Some(slash) => format!("{}/{}", &file.name[..slash], file_name(file)),
        None => file_name(file),
    }
}

pub fn header_path(file: &SchemaFile) -> String {
    format!("{}.pb.h", file_path(file))
}

pub fn source_path(file: &SchemaFile) -> String {
    format!("{}.pb.m", file_path(file))
}

/// Name of the per-file container class holding the extension registry.
pub fn container_type_name(file: &SchemaFile) -> String {
    format!("{}{}Root", file.class_prefix, file_name(file))
}

/// Class name for a message or enum nested under `scope`, e.g.
/// `PB` + [`Outer`, `Inner`] + `Kind` -> `PBOuter_Inner_Kind`.
pub fn class_name(prefix: &str, scope: &[&str], name: &str) -> String {
    let mut result = String::from(prefix);
    for parent in scope {
        result.push_str(parent);
        result.push('_');
    }
    result.push_str(name);
    result
}

/// `PBColor` + `DARK_RED` -> `PBColorDarkRed`. Mixed-case values keep their
/// casing.
pub fn enum_value_name(enum_class: &str, value: &str) -> String {
    let suffix = if value.chars().any(|c| c.is_ascii_lowercase()) {
        underscores_to_camel_case(value, true)
    } else {
        underscores_to_camel_case(&value.to_ascii_lowercase(), true)
    };
    format!("{}{}", enum_class, suffix)
}

/// Accessor name for a field or extension; keywords get a `_p` suffix.
pub fn field_name(name: &str) -> String {
    let camel = underscores_to_camel_case(name, false);
    if OBJC_KEYWORDS.contains(&camel.as_str()) {
        format!("{}_p", camel)
    } else {
        camel
    }
}

pub fn capitalized_field_name(name: &str) -> String {
    underscores_to_camel_case(name, true)
}

/// Identifier of the static storage holding an extension field object.
pub fn extension_identifier(owner: &str, extension: &str) -> String {
    format!("{}_{}", owner, field_name(extension))
}

/// Fail if two files of the set would produce the same container class or
/// the same output paths.
pub fn check_collisions(files: &FileSet) -> Result<()> {
    let mut containers: HashMap<String, &str> = HashMap::new();
    let mut headers: HashMap<String, &str> = HashMap::new();

    for (_, file) in files.iter() {
        if let Some(other) = containers.insert(container_type_name(file), &file.name) {
            bail!(
                "{} and {} both generate container class {}",
                other,
                file.name,
                container_type_name(file)
            );
        }
        if let Some(other) = headers.insert(header_path(file), &file.name) {
            bail!(
                "{} and {} both generate {}",
                other,
                file.name,
                header_path(file)
            );
        }
    }
    Ok(())
}
