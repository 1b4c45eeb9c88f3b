// protocrap-objc/src/codegen/extension.rs

use anyhow::Result;

use super::descriptor::ExtensionField;
use super::generators::ExtensionGenerator;
use super::names;
use super::printer::Printer;
use super::types;

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjcExtensionGenerator {
    /// Storage is strong under ARC; otherwise the field object is retained.
    pub arc: bool,
}

impl ExtensionGenerator for ObjcExtensionGenerator {
    fn emit_declaration(
        &self,
        _owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()> {
        let name = names::field_name(&field.field.name);
        printer.print("+ (id<PBExtensionField>) $name$;\n", &[("name", &name)])
    }

    fn emit_storage(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()> {
        let storage = names::extension_identifier(owner, &field.field.name);
        printer.print(
            "static id<PBExtensionField> $storage$ = nil;\n",
            &[("storage", &storage)],
        )
    }

    fn emit_initialization(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()> {
        let f = &field.field;
        let storage = names::extension_identifier(owner, &f.name);
        let number = f.number.to_string();
        let default_value = types::boxed_default_value(f);
        let value_class = format!("[{} class]", types::boxed_class(f));
        let (open, close) = if self.arc { ("", "") } else { ("[", " retain]") };

        printer.print(
            "$storage$ =\n  $open$[PBConcreteExtensionField extensionWithType:$type$\n",
            &[
                ("storage", &storage),
                ("open", open),
                ("type", types::extension_type(f)),
            ],
        )?;
        printer.print(
            concat!(
                "                                  extendedClass:[$extendee$ class]\n",
                "                                    fieldNumber:$number$\n",
                "                                   defaultValue:$default$\n",
                "                            messageOrGroupClass:$value_class$\n",
                "                                     isRepeated:$repeated$\n",
                "                                       isPacked:$packed$\n",
                "                         isMessageSetWireFormat:NO]$close$;\n",
            ),
            &[
                ("extendee", &field.extendee),
                ("number", &number),
                ("default", &default_value),
                ("value_class", &value_class),
                ("repeated", yes_no(f.is_repeated())),
                ("packed", yes_no(f.packed)),
                ("close", close),
            ],
        )
    }

    fn emit_registration(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()> {
        let storage = names::extension_identifier(owner, &field.field.name);
        printer.print(
            "[registry addExtension:$storage$];\n",
            &[("storage", &storage)],
        )
    }

    fn emit_implementation(
        &self,
        owner: &str,
        field: &ExtensionField,
        printer: &mut Printer,
    ) -> Result<()> {
        let name = names::field_name(&field.field.name);
        let storage = names::extension_identifier(owner, &field.field.name);
        printer.print(
            "+ (id<PBExtensionField>) $name$ {\n  return $storage$;\n}\n",
            &[("name", &name), ("storage", &storage)],
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "YES" } else { "NO" }
}
