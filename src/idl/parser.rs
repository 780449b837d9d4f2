//! Varlink IDL parser.
//!
//! Single pass over the input bytes with one byte of push-back. Comment
//! lines collect into a pending description that the next declaration takes.

use super::{
    is_valid_interface_name, ErrorDecl, Field, Interface, Method, ParseError, Type, TypeAlias,
};

pub fn parse_interface(src: &str) -> Result<Interface, ParseError> {
    let mut cursor = Cursor::new(src);

    cursor.skip_blank();
    if cursor.keyword() != "interface" {
        return Err(ParseError);
    }

    cursor.skip_blank();
    let description = cursor.take_description();
    let name = cursor.interface_name();
    if !is_valid_interface_name(name) {
        return Err(ParseError);
    }

    let mut interface = Interface::new(name).map_err(|_| ParseError)?;
    interface.set_description(description);

    while cursor.skip_blank() {
        match cursor.keyword() {
            "type" => interface.add_member(parse_alias(&mut cursor)?),
            "method" => interface.add_member(parse_method(&mut cursor)?),
            "error" => interface.add_member(parse_error(&mut cursor)?),
            _ => return Err(ParseError),
        }
    }

    Ok(interface)
}

fn parse_alias(cursor: &mut Cursor<'_>) -> Result<TypeAlias, ParseError> {
    cursor.skip_blank();
    let description = cursor.take_description();
    let name = cursor.type_name()?;

    cursor.skip_blank();
    let ty = parse_type(cursor)?;

    Ok(TypeAlias {
        name,
        description,
        ty,
    })
}

fn parse_method(cursor: &mut Cursor<'_>) -> Result<Method, ParseError> {
    cursor.skip_blank();
    let description = cursor.take_description();
    let name = cursor.type_name()?;

    cursor.skip_blank();
    let input = parse_type(cursor)?;

    cursor.skip_blank();
    cursor.expect(b'-')?;
    cursor.expect(b'>')?;

    cursor.skip_blank();
    let output = parse_type(cursor)?;

    Ok(Method {
        name,
        description,
        input,
        output,
    })
}

fn parse_error(cursor: &mut Cursor<'_>) -> Result<ErrorDecl, ParseError> {
    cursor.skip_blank();
    let description = cursor.take_description();
    let name = cursor.type_name()?;

    // The payload must start on the declaration's own line.
    cursor.skip_spaces();
    let payload = match cursor.peek() {
        Some(b) if b == b'(' || b.is_ascii_alphanumeric() => Some(parse_type(cursor)?),
        _ => None,
    };

    Ok(ErrorDecl {
        name,
        description,
        payload,
    })
}

fn parse_type(cursor: &mut Cursor<'_>) -> Result<Type, ParseError> {
    let base = match cursor.peek() {
        Some(b'a'..=b'z') => match cursor.keyword() {
            "bool" => Type::Bool,
            "int" => Type::Int,
            "float" => Type::Float,
            "string" => Type::String,
            _ => return Err(ParseError),
        },
        Some(b'A'..=b'Z' | b'0'..=b'9') => Type::Alias(cursor.type_name()?),
        Some(b'(') => parse_struct(cursor)?,
        _ => return Err(ParseError),
    };

    // Exactly one `[]`, directly after the base type.
    if cursor.next() == Some(b'[') {
        cursor.expect(b']')?;
        return Ok(Type::array(base));
    }
    cursor.unread();

    Ok(base)
}

fn parse_struct(cursor: &mut Cursor<'_>) -> Result<Type, ParseError> {
    cursor.expect(b'(')?;
    let mut fields = Vec::new();

    if cursor.next() == Some(b')') {
        return Ok(Type::Struct(fields));
    }
    cursor.unread();

    loop {
        cursor.skip_blank();
        let name = cursor.field_name()?;

        cursor.skip_blank();
        cursor.expect(b':')?;

        cursor.skip_blank();
        let ty = parse_type(cursor)?;
        fields.push(Field { name, ty });

        cursor.skip_blank();
        match cursor.next() {
            Some(b',') => continue,
            Some(b')') => return Ok(Type::Struct(fields)),
            _ => return Err(ParseError),
        }
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    description: String,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            description: String::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Consume one byte. The position moves even past the end so that
    /// `unread` always undoes exactly one `next`.
    fn next(&mut self) -> Option<u8> {
        let byte = self.peek();
        self.pos += 1;
        byte
    }

    fn unread(&mut self) {
        self.pos -= 1;
    }

    fn expect(&mut self, expected: u8) -> Result<(), ParseError> {
        match self.next() {
            Some(b) if b == expected => Ok(()),
            _ => Err(ParseError),
        }
    }

    fn take_while(&mut self, mut accept: impl FnMut(u8) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while matches!(self.peek(), Some(b) if accept(b)) {
            self.pos += 1;
        }
        &input[start..self.pos]
    }

    /// Skip spaces, newlines and comment lines. Returns whether input
    /// remains.
    fn skip_blank(&mut self) -> bool {
        loop {
            match self.next() {
                Some(b' ') => {}
                Some(b'\n') => self.description.clear(),
                Some(b'#') => self.read_comment(),
                _ => {
                    self.unread();
                    break;
                }
            }
        }
        !self.at_end()
    }

    fn skip_spaces(&mut self) {
        self.take_while(|b| b == b' ');
    }

    /// Called after `#`. Appends the rest of the line to the pending
    /// description and consumes the newline without clearing it, so a
    /// comment trailing a declaration documents the next one.
    fn read_comment(&mut self) {
        if self.peek() == Some(b' ') {
            self.pos += 1;
        }
        let line = self.take_while(|b| b != b'\n');
        if !self.description.is_empty() {
            self.description.push('\n');
        }
        self.description.push_str(line);
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
    }

    fn take_description(&mut self) -> String {
        std::mem::take(&mut self.description)
    }

    fn keyword(&mut self) -> &'a str {
        self.take_while(|b| b.is_ascii_lowercase())
    }

    fn interface_name(&mut self) -> &'a str {
        self.take_while(|b| b.is_ascii_lowercase() || b == b'-' || b == b'.')
    }

    fn type_name(&mut self) -> Result<String, ParseError> {
        let name = self.take_while(|b| b.is_ascii_alphanumeric());
        if name.is_empty() {
            return Err(ParseError);
        }
        Ok(name.to_string())
    }

    fn field_name(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(b) if b.is_ascii_lowercase() || b == b'_' => {}
            _ => return Err(ParseError),
        }
        let name =
            self.take_while(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        Ok(name.to_string())
    }
}
