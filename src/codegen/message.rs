// protocrap-objc/src/codegen/message.rs
//
// Message classes and their builders. Serialization itself lives in the
// PBGeneratedMessage runtime; the generated classes carry storage, presence,
// defaults and the builder API.

use anyhow::Result;

use super::dependencies::ForwardDeclarations;
use super::descriptor::{Field, MessageType};
use super::enums::ObjcEnumGenerator;
use super::extension::ObjcExtensionGenerator;
use super::generators::{EnumGenerator, ExtensionGenerator, MessageGenerator};
use super::names;
use super::printer::Printer;
use super::types;

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjcMessageGenerator {
    pub extensions: ObjcExtensionGenerator,
}

/// Substitution variables shared by every per-field template.
struct FieldVars {
    name: String,
    cap: String,
    ty: String,
    default: String,
    property_attrs: &'static str,
}

impl FieldVars {
    fn new(field: &Field) -> Self {
        FieldVars {
            name: names::field_name(&field.name),
            cap: names::capitalized_field_name(&field.name),
            ty: types::objc_type(field),
            default: types::default_value(field),
            property_attrs: if types::is_object(field) { "(strong) " } else { "" },
        }
    }

    fn vars<'a>(&'a self, class: &'a str) -> [(&'a str, &'a str); 6] {
        [
            ("class", class),
            ("name", &self.name),
            ("cap", &self.cap),
            ("type", &self.ty),
            ("default", &self.default),
            ("attrs", self.property_attrs),
        ]
    }
}

impl ObjcMessageGenerator {
    fn new_object(&self, class: &str) -> String {
        if self.extensions.arc {
            format!("[[{} alloc] init]", class)
        } else {
            format!("[[[{} alloc] init] autorelease]", class)
        }
    }

    fn emit_interface(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        let class = message.class_name.as_str();
        printer.print(
            "@interface $class$ : PBGeneratedMessage {\n@private\n",
            &[("class", class)],
        )?;
        {
            let mut ivars = printer.indented();
            for field in &message.fields {
                let v = FieldVars::new(field);
                if field.is_repeated() {
                    ivars.print("NSMutableArray* mutable$cap$List;\n", &v.vars(class))?;
                } else {
                    ivars.print("BOOL has$cap$_:1;\n", &v.vars(class))?;
                    ivars.print("$type$ $name$;\n", &v.vars(class))?;
                }
            }
        }
        printer.print("}\n", &[])?;

        for field in &message.fields {
            let v = FieldVars::new(field);
            if field.is_repeated() {
                printer.print("- (NSArray*) $name$;\n", &v.vars(class))?;
            } else {
                printer.print(
                    "- (BOOL) has$cap$;\n@property (readonly$attrs_list$) $type$ $name$;\n",
                    &[
                        ("cap", &v.cap),
                        ("type", &v.ty),
                        ("name", &v.name),
                        ("attrs_list", if types::is_object(field) { ", strong" } else { "" }),
                    ],
                )?;
            }
        }
        for extension in &message.extensions {
            self.extensions.emit_declaration(class, extension, printer)?;
        }

        printer.print(
            concat!(
                "\n",
                "+ ($class$*) defaultInstance;\n",
                "- ($class$*) defaultInstance;\n",
                "\n",
                "- (BOOL) isInitialized;\n",
                "- ($class$_Builder*) builder;\n",
                "+ ($class$_Builder*) builder;\n",
                "+ ($class$_Builder*) builderWithPrototype:($class$*) prototype;\n",
                "- ($class$_Builder*) toBuilder;\n",
                "@end\n\n",
            ),
            &[("class", class)],
        )
    }

    fn emit_builder_interface(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        let class = message.class_name.as_str();
        printer.print(
            concat!(
                "@interface $class$_Builder : PBGeneratedMessage_Builder {\n",
                "@private\n",
                "  $class$* result;\n",
                "}\n",
                "\n",
                "- ($class$*) defaultInstance;\n",
                "\n",
                "- ($class$_Builder*) clear;\n",
                "- ($class$_Builder*) clone;\n",
                "\n",
                "- ($class$*) build;\n",
                "- ($class$*) buildPartial;\n",
                "\n",
                "- ($class$_Builder*) mergeFrom:($class$*) other;\n",
            ),
            &[("class", class)],
        )?;

        for field in &message.fields {
            let v = FieldVars::new(field);
            if field.is_repeated() {
                printer.print(
                    concat!(
                        "- (NSArray*) $name$;\n",
                        "- ($class$_Builder*) add$cap$:(id) value;\n",
                        "- ($class$_Builder*) clear$cap$;\n",
                    ),
                    &v.vars(class),
                )?;
            } else {
                printer.print(
                    concat!(
                        "- (BOOL) has$cap$;\n",
                        "- ($type$) $name$;\n",
                        "- ($class$_Builder*) set$cap$:($type$) value;\n",
                        "- ($class$_Builder*) clear$cap$;\n",
                    ),
                    &v.vars(class),
                )?;
            }
        }
        printer.print("@end\n\n", &[])
    }

    fn emit_implementation(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        let class = message.class_name.as_str();

        printer.print("@interface $class$ ()\n", &[("class", class)])?;
        for field in &message.fields {
            let v = FieldVars::new(field);
            if field.is_repeated() {
                printer.print(
                    "@property (strong) NSMutableArray* mutable$cap$List;\n",
                    &v.vars(class),
                )?;
            } else {
                // Readwrite presence so the builder can assign it.
                printer.print(
                    "@property BOOL has$cap$;\n@property $attrs$$type$ $name$;\n",
                    &v.vars(class),
                )?;
            }
        }
        printer.print(
            concat!(
                "@end\n",
                "\n",
                "@implementation $class$\n",
                "\n",
                "+ (void) initialize {\n",
                "  if (self == [$class$ class]) {\n",
                "    default$class$Instance = [[$class$ alloc] init];\n",
                "  }\n",
                "}\n",
            ),
            &[("class", class)],
        )?;

        for field in &message.fields {
            let v = FieldVars::new(field);
            if field.is_repeated() {
                printer.print(
                    concat!(
                        "@synthesize mutable$cap$List;\n",
                        "- (NSArray*) $name$ {\n",
                        "  return mutable$cap$List;\n",
                        "}\n",
                    ),
                    &v.vars(class),
                )?;
            } else {
                printer.print(
                    concat!(
                        "- (BOOL) has$cap$ {\n",
                        "  return !!has$cap$_;\n",
                        "}\n",
                        "- (void) setHas$cap$:(BOOL) value_ {\n",
                        "  has$cap$_ = !!value_;\n",
                        "}\n",
                        "@synthesize $name$;\n",
                    ),
                    &v.vars(class),
                )?;
            }
        }

        printer.print("- (id) init {\n  if ((self = [super init])) {\n", &[])?;
        {
            let mut block = printer.indented();
            let mut body = block.indented();
            for field in message.fields.iter().filter(|f| !f.is_repeated()) {
                let v = FieldVars::new(field);
                body.print("self.$name$ = $default$;\n", &v.vars(class))?;
            }
        }
        printer.print("  }\n  return self;\n}\n", &[])?;

        for extension in &message.extensions {
            self.extensions.emit_implementation(class, extension, printer)?;
        }

        printer.print(
            concat!(
                "+ ($class$*) defaultInstance {\n",
                "  return default$class$Instance;\n",
                "}\n",
                "- ($class$*) defaultInstance {\n",
                "  return default$class$Instance;\n",
                "}\n",
                "- (BOOL) isInitialized {\n",
            ),
            &[("class", class)],
        )?;
        {
            let mut body = printer.indented();
            for field in message.fields.iter().filter(|f| f.is_required()) {
                let v = FieldVars::new(field);
                body.print("if (!self.has$cap$) {\n  return NO;\n}\n", &v.vars(class))?;
            }
            body.print("return YES;\n", &[])?;
        }
        let builder = self.new_object(&format!("{}_Builder", class));
        printer.print(
            concat!(
                "}\n",
                "+ ($class$_Builder*) builder {\n",
                "  return $new_builder$;\n",
                "}\n",
                "+ ($class$_Builder*) builderWithPrototype:($class$*) prototype {\n",
                "  return [[$class$ builder] mergeFrom:prototype];\n",
                "}\n",
                "- ($class$_Builder*) builder {\n",
                "  return [$class$ builder];\n",
                "}\n",
                "- ($class$_Builder*) toBuilder {\n",
                "  return [$class$ builderWithPrototype:self];\n",
                "}\n",
                "@end\n\n",
            ),
            &[("class", class), ("new_builder", &builder)],
        )
    }

    fn emit_builder_implementation(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()> {
        let class = message.class_name.as_str();
        let release = if self.extensions.arc { "" } else { "  [result release];\n" };
        printer.print(
            concat!(
                "@implementation $class$_Builder\n",
                "- (id) init {\n",
                "  if ((self = [super init])) {\n",
                "    result = [[$class$ alloc] init];\n",
                "  }\n",
                "  return self;\n",
                "}\n",
                "- ($class$*) defaultInstance {\n",
                "  return [$class$ defaultInstance];\n",
                "}\n",
                "- ($class$_Builder*) clear {\n",
                "$release$",
                "  result = [[$class$ alloc] init];\n",
                "  return self;\n",
                "}\n",
                "- ($class$_Builder*) clone {\n",
                "  return [$class$ builderWithPrototype:result];\n",
                "}\n",
                "- ($class$*) build {\n",
                "  [self checkInitialized];\n",
                "  return [self buildPartial];\n",
                "}\n",
                "- ($class$*) buildPartial {\n",
                "  $class$* returnMe = result;\n",
                "  result = nil;\n",
                "  return returnMe;\n",
                "}\n",
                "- ($class$_Builder*) mergeFrom:($class$*) other {\n",
                "  if (other == [$class$ defaultInstance]) {\n",
                "    return self;\n",
                "  }\n",
            ),
            &[("class", class), ("release", release)],
        )?;
        {
            let mut body = printer.indented();
            for field in &message.fields {
                let v = FieldVars::new(field);
                if field.is_repeated() {
                    body.print(
                        "for (id element in other.$name$) {\n  [self add$cap$:element];\n}\n",
                        &v.vars(class),
                    )?;
                } else {
                    body.print(
                        "if (other.has$cap$) {\n  [self set$cap$:other.$name$];\n}\n",
                        &v.vars(class),
                    )?;
                }
            }
            body.print("return self;\n", &[])?;
        }
        printer.print("}\n", &[])?;

        for field in &message.fields {
            let v = FieldVars::new(field);
            if field.is_repeated() {
                printer.print(
                    concat!(
                        "- (NSArray*) $name$ {\n",
                        "  return result.mutable$cap$List;\n",
                        "}\n",
                        "- ($class$_Builder*) add$cap$:(id) value {\n",
                        "  if (result.mutable$cap$List == nil) {\n",
                        "    result.mutable$cap$List = [NSMutableArray array];\n",
                        "  }\n",
                        "  [result.mutable$cap$List addObject:value];\n",
                        "  return self;\n",
                        "}\n",
                        "- ($class$_Builder*) clear$cap$ {\n",
                        "  result.mutable$cap$List = nil;\n",
                        "  return self;\n",
                        "}\n",
                    ),
                    &v.vars(class),
                )?;
            } else {
                printer.print(
                    concat!(
                        "- (BOOL) has$cap$ {\n",
                        "  return result.has$cap$;\n",
                        "}\n",
                        "- ($type$) $name$ {\n",
                        "  return result.$name$;\n",
                        "}\n",
                        "- ($class$_Builder*) set$cap$:($type$) value {\n",
                        "  result.has$cap$ = YES;\n",
                        "  result.$name$ = value;\n",
                        "  return self;\n",
                        "}\n",
                        "- ($class$_Builder*) clear$cap$ {\n",
                        "  result.has$cap$ = NO;\n",
                        "  result.$name$ = $default$;\n",
                        "  return self;\n",
                        "}\n",
                    ),
                    &v.vars(class),
                )?;
            }
        }
        printer.print("@end\n\n", &[])
    }
}

impl MessageGenerator for ObjcMessageGenerator {
    fn emit_nested_enum_declarations(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()> {
        for enum_type in &message.nested_enums {
            ObjcEnumGenerator.emit_declaration(enum_type, printer)?;
        }
        for nested in &message.nested_messages {
            self.emit_nested_enum_declarations(nested, printer)?;
        }
        Ok(())
    }

    fn emit_declaration(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        for nested in &message.nested_messages {
            self.emit_declaration(nested, printer)?;
        }
        self.emit_interface(message, printer)?;
        self.emit_builder_interface(message, printer)
    }

    fn emit_static_storage(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        let class = message.class_name.as_str();
        for extension in &message.extensions {
            self.extensions.emit_storage(class, extension, printer)?;
        }
        printer.print(
            "static $class$* default$class$Instance = nil;\n",
            &[("class", class)],
        )?;
        for nested in &message.nested_messages {
            self.emit_static_storage(nested, printer)?;
        }
        Ok(())
    }

    fn emit_static_initialization(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()> {
        let class = message.class_name.as_str();
        for extension in &message.extensions {
            self.extensions.emit_initialization(class, extension, printer)?;
        }
        for nested in &message.nested_messages {
            self.emit_static_initialization(nested, printer)?;
        }
        Ok(())
    }

    fn emit_extension_registration(
        &self,
        message: &MessageType,
        printer: &mut Printer,
    ) -> Result<()> {
        for extension in &message.extensions {
            self.extensions
                .emit_registration(&message.class_name, extension, printer)?;
        }
        for nested in &message.nested_messages {
            self.emit_extension_registration(nested, printer)?;
        }
        Ok(())
    }

    fn emit_definition(&self, message: &MessageType, printer: &mut Printer) -> Result<()> {
        for enum_type in &message.nested_enums {
            ObjcEnumGenerator.emit_definition(enum_type, printer)?;
        }
        for nested in &message.nested_messages {
            self.emit_definition(nested, printer)?;
        }
        self.emit_implementation(message, printer)?;
        self.emit_builder_implementation(message, printer)
    }

    fn contribute_forward_declarations(
        &self,
        message: &MessageType,
        decls: &mut ForwardDeclarations,
    ) {
        decls.insert(format!("@class {}", message.class_name));
        decls.insert(format!("@class {}_Builder", message.class_name));
    }
}
