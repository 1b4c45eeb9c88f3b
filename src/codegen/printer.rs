// protocrap-objc/src/codegen/printer.rs

use std::ops::{Deref, DerefMut};

use anyhow::{Result, anyhow, bail};

const INDENT: &str = "  ";

/// Text sink for generated code.
///
/// `print` substitutes `$name$` with the matching variable (`$$` is a
/// literal dollar) and indents every non-empty line to the current level.
#[derive(Debug)]
pub struct Printer {
    out: String,
    indent: String,
    at_line_start: bool,
}

/// Indentation scope. Outdents when dropped, so every exit path of the
/// enclosing block restores the level.
pub struct Indented<'a> {
    printer: &'a mut Printer,
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            out: String::new(),
            indent: String::new(),
            at_line_start: true,
        }
    }

    pub fn print(&mut self, text: &str, vars: &[(&str, &str)]) -> Result<()> {
        let mut rest = text;
        while let Some(start) = rest.find('$') {
            self.write(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('$')
                .ok_or_else(|| anyhow!("unterminated variable in {:?}", text))?;
            let name = &after[..end];
            if name.is_empty() {
                self.write("$");
            } else {
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| anyhow!("undefined variable ${}$ in {:?}", name, text))?;
                self.write(value);
            }
            rest = &after[end + 1..];
        }
        self.write(rest);
        Ok(())
    }

    /// Append text without variable substitution.
    pub fn print_raw(&mut self, text: &str) {
        self.write(text);
    }

    pub fn indent(&mut self) {
        self.indent.push_str(INDENT);
    }

    pub fn outdent(&mut self) -> Result<()> {
        if self.indent.is_empty() {
            bail!("outdent without matching indent");
        }
        self.indent.truncate(self.indent.len() - INDENT.len());
        Ok(())
    }

    pub fn indented(&mut self) -> Indented<'_> {
        self.indent();
        Indented { printer: self }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn write(&mut self, text: &str) {
        for line in text.split_inclusive('\n') {
            if self.at_line_start && line != "\n" {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(line);
            self.at_line_start = line.ends_with('\n');
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Indented<'_> {
    type Target = Printer;

    fn deref(&self) -> &Printer {
        self.printer
    }
}

impl DerefMut for Indented<'_> {
    fn deref_mut(&mut self) -> &mut Printer {
        self.printer
    }
}

impl Drop for Indented<'_> {
    fn drop(&mut self) {
        let len = self.printer.indent.len().saturating_sub(INDENT.len());
        self.printer.indent.truncate(len);
    }
}
