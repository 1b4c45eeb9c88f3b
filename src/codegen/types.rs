// protocrap-objc/src/codegen/types.rs
//
// Objective-C spellings of field types and default values.

use prost_types::field_descriptor_proto::Type;

use super::descriptor::Field;

fn type_class(field: &Field) -> &str {
    field.type_class.as_deref().unwrap_or("NSObject")
}

/// Declared type of the field's property, e.g. `SInt32` or `NSString*`.
pub fn objc_type(field: &Field) -> String {
    if field.is_repeated() {
        return "NSArray*".to_string();
    }
    match field.kind {
        Type::Int32 | Type::Sint32 | Type::Sfixed32 => "SInt32".to_string(),
        Type::Uint32 | Type::Fixed32 => "UInt32".to_string(),
        Type::Int64 | Type::Sint64 | Type::Sfixed64 => "SInt64".to_string(),
        Type::Uint64 | Type::Fixed64 => "UInt64".to_string(),
        Type::Bool => "BOOL".to_string(),
        Type::Float => "Float32".to_string(),
        Type::Double => "Float64".to_string(),
        Type::String => "NSString*".to_string(),
        Type::Bytes => "NSData*".to_string(),
        Type::Enum => type_class(field).to_string(),
        Type::Message | Type::Group => format!("{}*", type_class(field)),
    }
}

/// Whether the property holds an object (retained) rather than a scalar.
pub fn is_object(field: &Field) -> bool {
    field.is_repeated()
        || matches!(
            field.kind,
            Type::String | Type::Bytes | Type::Message | Type::Group
        )
}

/// `PBExtensionType*` constant describing the extension's wire type.
pub fn extension_type(field: &Field) -> &'static str {
    match field.kind {
        Type::Double => "PBExtensionTypeDouble",
        Type::Float => "PBExtensionTypeFloat",
        Type::Int64 => "PBExtensionTypeInt64",
        Type::Uint64 => "PBExtensionTypeUInt64",
        Type::Int32 => "PBExtensionTypeInt32",
        Type::Fixed64 => "PBExtensionTypeFixed64",
        Type::Fixed32 => "PBExtensionTypeFixed32",
        Type::Bool => "PBExtensionTypeBool",
        Type::String => "PBExtensionTypeString",
        Type::Group => "PBExtensionTypeGroup",
        Type::Message => "PBExtensionTypeMessage",
        Type::Bytes => "PBExtensionTypeBytes",
        Type::Uint32 => "PBExtensionTypeUInt32",
        Type::Enum => "PBExtensionTypeEnum",
        Type::Sfixed32 => "PBExtensionTypeSFixed32",
        Type::Sfixed64 => "PBExtensionTypeSFixed64",
        Type::Sint32 => "PBExtensionTypeSInt32",
        Type::Sint64 => "PBExtensionTypeSInt64",
    }
}

/// Class whose instances carry the value at run time.
pub fn boxed_class(field: &Field) -> &str {
    match field.kind {
        Type::String => "NSString",
        Type::Bytes => "NSData",
        Type::Message | Type::Group => type_class(field),
        _ => "NSNumber",
    }
}

/// Default value as an unboxed Objective-C expression.
pub fn default_value(field: &Field) -> String {
    if field.is_repeated() {
        return "[NSArray array]".to_string();
    }
    let explicit = field.default_value.as_deref();
    match field.kind {
        Type::Int32 | Type::Sint32 | Type::Sfixed32 => explicit.unwrap_or("0").to_string(),
        Type::Uint32 | Type::Fixed32 => format!("{}U", explicit.unwrap_or("0")),
        Type::Int64 | Type::Sint64 | Type::Sfixed64 => format!("{}LL", explicit.unwrap_or("0")),
        Type::Uint64 | Type::Fixed64 => format!("{}ULL", explicit.unwrap_or("0")),
        Type::Float | Type::Double => float_literal(explicit.unwrap_or("0"), field.kind),
        Type::Bool => match explicit {
            Some("true") => "YES".to_string(),
            _ => "NO".to_string(),
        },
        Type::String => format!("@\"{}\"", escape(explicit.unwrap_or(""))),
        // protoc hands bytes defaults over already C-escaped.
        Type::Bytes => match explicit {
            Some(bytes) if !bytes.is_empty() => format!(
                "[NSData dataWithBytes:\"{0}\" length:sizeof(\"{0}\") - 1]",
                bytes
            ),
            _ => "[NSData data]".to_string(),
        },
        // Resolved to the value constant when the descriptor is built.
        Type::Enum => explicit.unwrap_or("0").to_string(),
        Type::Message | Type::Group => format!("[{} defaultInstance]", type_class(field)),
    }
}

/// Default value as an object, for extension fields.
pub fn boxed_default_value(field: &Field) -> String {
    if field.is_repeated() || is_object(field) {
        return default_value(field);
    }
    let constructor = match field.kind {
        Type::Uint32 | Type::Fixed32 => "numberWithUnsignedInt",
        Type::Int64 | Type::Sint64 | Type::Sfixed64 => "numberWithLongLong",
        Type::Uint64 | Type::Fixed64 => "numberWithUnsignedLongLong",
        Type::Bool => "numberWithBool",
        Type::Float => "numberWithFloat",
        Type::Double => "numberWithDouble",
        _ => "numberWithInt",
    };
    format!("[NSNumber {}:{}]", constructor, default_value(field))
}

fn float_literal(value: &str, kind: Type) -> String {
    match value {
        "inf" => "INFINITY".to_string(),
        "-inf" => "-INFINITY".to_string(),
        "nan" => "NAN".to_string(),
        _ => {
            let mut literal = value.to_string();
            if !literal.contains(['.', 'e', 'E']) {
                literal.push_str(".0");
            }
            if kind == Type::Float {
                literal.push('f');
            }
            literal
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}
