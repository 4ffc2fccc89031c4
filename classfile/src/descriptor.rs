//! Field and method descriptor parsing (JVMS §4.3.2, §4.3.3). These are not
//! part of the binary class-file grammar — descriptors are themselves `Utf8`
//! constant-pool entries — but a structural decoder that wants to expose
//! `FieldInfo`/`MethodInfo` descriptors as anything other than an opaque
//! string needs this grammar, so it lives alongside the rest of the model.

use crate::constant_pool::Utf8;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldDescriptor {
    BaseType(&'static str),
    ObjectType(String),
    ArrayType(Box<FieldDescriptor>),
}

impl std::fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldDescriptor::BaseType(name) => write!(f, "{name}"),
            FieldDescriptor::ObjectType(name) => write!(f, "{name}"),
            FieldDescriptor::ArrayType(inner) => write!(f, "{inner}[]"),
        }
    }
}

fn base_type(c: u8) -> Option<&'static str> {
    Some(match c {
        b'B' => "byte",
        b'C' => "char",
        b'D' => "double",
        b'F' => "float",
        b'I' => "int",
        b'J' => "long",
        b'S' => "short",
        b'Z' => "boolean",
        _ => return None,
    })
}

/// Parses a single field descriptor starting at `bytes[*pos]`, advancing
/// `pos` past it. Returns `None` on a malformed descriptor.
fn parse_one(bytes: &[u8], pos: &mut usize) -> Option<FieldDescriptor> {
    let mut array_depth = 0usize;
    while *pos < bytes.len() && bytes[*pos] == b'[' {
        array_depth += 1;
        *pos += 1;
    }
    let c = *bytes.get(*pos)?;
    let base = if c == b'L' {
        *pos += 1;
        let start = *pos;
        while *pos < bytes.len() && bytes[*pos] != b';' {
            *pos += 1;
        }
        let name = std::str::from_utf8(&bytes[start..*pos]).ok()?.to_string();
        *pos += 1; // consume ';'
        FieldDescriptor::ObjectType(name)
    } else {
        *pos += 1;
        FieldDescriptor::BaseType(base_type(c)?)
    };
    Some((0..array_depth).fold(base, |inner, _| FieldDescriptor::ArrayType(Box::new(inner))))
}

impl From<&Utf8> for Option<FieldDescriptor> {
    fn from(value: &Utf8) -> Self {
        let mut pos = 0;
        let descriptor = parse_one(&value.bytes, &mut pos)?;
        if pos == value.bytes.len() {
            Some(descriptor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldDescriptor>,
    pub return_type: Option<FieldDescriptor>,
}

impl From<&Utf8> for Option<MethodDescriptor> {
    fn from(value: &Utf8) -> Self {
        let bytes = &value.bytes;
        if bytes.first() != Some(&b'(') {
            return None;
        }
        let mut pos = 1;
        let mut parameters = Vec::new();
        while bytes.get(pos) != Some(&b')') {
            parameters.push(parse_one(bytes, &mut pos)?);
        }
        pos += 1; // consume ')'
        let return_type = if bytes.get(pos) == Some(&b'V') {
            pos += 1;
            None
        } else {
            Some(parse_one(bytes, &mut pos)?)
        };
        if pos == bytes.len() {
            Some(MethodDescriptor {
                parameters,
                return_type,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(s: &str) -> Utf8 {
        Utf8::from(s)
    }

    #[test]
    fn primitive_field_descriptor() {
        let parsed: Option<FieldDescriptor> = (&utf8("I")).into();
        assert_eq!(parsed, Some(FieldDescriptor::BaseType("int")));
    }

    #[test]
    fn object_field_descriptor() {
        let parsed: Option<FieldDescriptor> = (&utf8("Ljava/lang/String;")).into();
        assert_eq!(
            parsed,
            Some(FieldDescriptor::ObjectType("java/lang/String".into()))
        );
    }

    #[test]
    fn array_of_primitive() {
        let parsed: Option<FieldDescriptor> = (&utf8("[[I")).into();
        assert_eq!(
            parsed,
            Some(FieldDescriptor::ArrayType(Box::new(FieldDescriptor::ArrayType(
                Box::new(FieldDescriptor::BaseType("int"))
            ))))
        );
    }

    #[test]
    fn method_descriptor_with_void_return() {
        let parsed: Option<MethodDescriptor> = (&utf8("()V")).into();
        assert_eq!(
            parsed,
            Some(MethodDescriptor {
                parameters: vec![],
                return_type: None,
            })
        );
    }

    #[test]
    fn method_descriptor_with_params_and_return() {
        let parsed: Option<MethodDescriptor> = (&utf8("(ILjava/lang/String;)Z")).into();
        assert_eq!(
            parsed,
            Some(MethodDescriptor {
                parameters: vec![
                    FieldDescriptor::BaseType("int"),
                    FieldDescriptor::ObjectType("java/lang/String".into()),
                ],
                return_type: Some(FieldDescriptor::BaseType("boolean")),
            })
        );
    }
}
