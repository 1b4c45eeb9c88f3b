// protocrap-objc/src/codegen/enums.rs

use std::collections::HashSet;

use anyhow::Result;

use super::descriptor::EnumType;
use super::generators::EnumGenerator;
use super::printer::Printer;

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjcEnumGenerator;

impl EnumGenerator for ObjcEnumGenerator {
    fn emit_declaration(&self, enum_type: &EnumType, printer: &mut Printer) -> Result<()> {
        let class = enum_type.class_name.as_str();
        printer.print("typedef NS_ENUM(SInt32, $name$) {\n", &[("name", class)])?;
        {
            let mut body = printer.indented();
            for value in &enum_type.values {
                let number = value.number.to_string();
                body.print(
                    "$name$ = $number$,\n",
                    &[("name", &value.name), ("number", &number)],
                )?;
            }
        }
        printer.print(
            "};\n\nBOOL $name$IsValidValue($name$ value);\n\n",
            &[("name", class)],
        )
    }

    fn emit_definition(&self, enum_type: &EnumType, printer: &mut Printer) -> Result<()> {
        let class = enum_type.class_name.as_str();
        printer.print(
            "BOOL $name$IsValidValue($name$ value) {\n  switch (value) {\n",
            &[("name", class)],
        )?;
        {
            let mut switch = printer.indented();
            let mut cases = switch.indented();
            // Aliases share a number and would repeat a case label.
            let mut seen = HashSet::new();
            for value in &enum_type.values {
                if seen.insert(value.number) {
                    cases.print("case $name$:\n", &[("name", &value.name)])?;
                }
            }
            cases.print("  return YES;\ndefault:\n  return NO;\n", &[])?;
        }
        printer.print("  }\n}\n", &[])
    }
}
