//! Canonical text form of an interface.
//!
//! Alias bodies and error payloads put one struct field per line; method
//! signatures stay on a single line. The output parses back to an equal
//! [`Interface`].

use std::fmt::{self, Write};

use super::{Interface, Member, Type};

#[derive(Clone, Copy)]
enum Layout {
    SingleLine,
    MultiLine { indent: usize },
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(f, self.description())?;
        write!(f, "interface {}", self.name())?;

        for member in self.members() {
            f.write_str("\n\n")?;
            write_description(f, member.description())?;

            match member {
                Member::Alias(alias) => {
                    write!(f, "type {} ", alias.name)?;
                    write_type(f, &alias.ty, Layout::MultiLine { indent: 0 })?;
                }
                Member::Method(method) => {
                    write!(f, "method {}", method.name)?;
                    if !method.input.is_struct() {
                        f.write_char(' ')?;
                    }
                    write_type(f, &method.input, Layout::SingleLine)?;
                    f.write_str(" -> ")?;
                    write_type(f, &method.output, Layout::SingleLine)?;
                }
                Member::Error(error) => {
                    write!(f, "error {}", error.name)?;
                    if let Some(payload) = &error.payload {
                        f.write_char(' ')?;
                        write_type(f, payload, Layout::MultiLine { indent: 0 })?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self, Layout::SingleLine)
    }
}

fn write_description(w: &mut impl Write, description: &str) -> fmt::Result {
    if description.is_empty() {
        return Ok(());
    }

    for line in description.split('\n') {
        if line.is_empty() {
            w.write_str("#\n")?;
        } else {
            writeln!(w, "# {line}")?;
        }
    }
    Ok(())
}

fn write_type(w: &mut impl Write, ty: &Type, layout: Layout) -> fmt::Result {
    match ty {
        Type::Bool => w.write_str("bool"),
        Type::Int => w.write_str("int"),
        Type::Float => w.write_str("float"),
        Type::String => w.write_str("string"),
        Type::Array(element) => {
            write_type(w, element, layout)?;
            w.write_str("[]")
        }
        Type::Alias(name) => w.write_str(name),
        Type::Struct(fields) if fields.is_empty() => w.write_str("()"),
        Type::Struct(fields) => match layout {
            Layout::SingleLine => {
                w.write_char('(')?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        w.write_str(", ")?;
                    }
                    write!(w, "{}: ", field.name)?;
                    write_type(w, &field.ty, layout)?;
                }
                w.write_char(')')
            }
            Layout::MultiLine { indent } => {
                let nested = Layout::MultiLine { indent: indent + 2 };
                w.write_char('(')?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        w.write_char(',')?;
                    }
                    write!(w, "\n{:width$}{}: ", "", field.name, width = indent + 2)?;
                    write_type(w, &field.ty, nested)?;
                }
                write!(w, "\n{:width$})", "", width = indent)
            }
        },
    }
}
