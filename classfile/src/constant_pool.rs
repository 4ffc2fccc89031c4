//! The constant pool (JVMS §4.4): a 1-indexed table of 11 tagged structures
//! referenced by index from everywhere else in the class file. `Long` and
//! `Double` entries occupy two consecutive indices; the second index holds
//! [`ConstantPool::Unusable`] and must never be dereferenced directly.

use crate::cursor::Cursor;
use crate::error::decode::{DecodeCause, DecodeError};
use crate::error::Diagnostic;
use crate::mutf8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    Fieldref,
    Methodref,
    InterfaceMethodref,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            1 => Tag::Utf8,
            3 => Tag::Integer,
            4 => Tag::Float,
            5 => Tag::Long,
            6 => Tag::Double,
            7 => Tag::Class,
            8 => Tag::String,
            9 => Tag::Fieldref,
            10 => Tag::Methodref,
            11 => Tag::InterfaceMethodref,
            12 => Tag::NameAndType,
            15 => Tag::MethodHandle,
            16 => Tag::MethodType,
            17 => Tag::Dynamic,
            18 => Tag::InvokeDynamic,
            19 => Tag::Module,
            20 => Tag::Package,
            other => return Err(other),
        })
    }
}

/// A `Utf8` constant's text, kept as both the decoded `String` (when valid
/// modified UTF-8) and the raw bytes that produced it, since a malformed
/// entry is a [`Diagnostic`], not a decode failure (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8 {
    pub bytes: Vec<u8>,
    pub text: Option<String>,
}

impl Utf8 {
    /// Returns the decoded entry plus whether the bytes were malformed
    /// modified UTF-8; the caller attaches the pool index to the diagnostic
    /// since `Utf8::read` doesn't know its own position in the pool.
    fn read(cursor: &mut Cursor) -> Result<(Utf8, bool), DecodeError> {
        let length = cursor.read_u2()?;
        let bytes = cursor.read_slice(length as usize)?.to_vec();
        let text = mutf8::decode(&bytes);
        let malformed = text.is_none();
        Ok((Utf8 { bytes, text }, malformed))
    }
}

impl From<&str> for Utf8 {
    fn from(s: &str) -> Utf8 {
        Utf8 {
            bytes: mutf8::encode(s),
            text: Some(s.to_string()),
        }
    }
}

impl std::fmt::Display for Utf8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "<invalid modified utf-8, {} bytes>", self.bytes.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            1 => ReferenceKind::GetField,
            2 => ReferenceKind::GetStatic,
            3 => ReferenceKind::PutField,
            4 => ReferenceKind::PutStatic,
            5 => ReferenceKind::InvokeVirtual,
            6 => ReferenceKind::InvokeStatic,
            7 => ReferenceKind::InvokeSpecial,
            8 => ReferenceKind::NewInvokeSpecial,
            9 => ReferenceKind::InvokeInterface,
            other => return Err(other),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPool {
    /// The second slot of a two-slot `Long`/`Double` entry. Any structural
    /// reference to this index is a format error, never a decode failure.
    Unusable,
    Utf8(Utf8),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: ReferenceKind,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
}

impl ConstantPool {
    pub fn tag(&self) -> Option<Tag> {
        Some(match self {
            ConstantPool::Unusable => return None,
            ConstantPool::Utf8(_) => Tag::Utf8,
            ConstantPool::Integer(_) => Tag::Integer,
            ConstantPool::Float(_) => Tag::Float,
            ConstantPool::Long(_) => Tag::Long,
            ConstantPool::Double(_) => Tag::Double,
            ConstantPool::Class { .. } => Tag::Class,
            ConstantPool::String { .. } => Tag::String,
            ConstantPool::Fieldref { .. } => Tag::Fieldref,
            ConstantPool::Methodref { .. } => Tag::Methodref,
            ConstantPool::InterfaceMethodref { .. } => Tag::InterfaceMethodref,
            ConstantPool::NameAndType { .. } => Tag::NameAndType,
            ConstantPool::MethodHandle { .. } => Tag::MethodHandle,
            ConstantPool::MethodType { .. } => Tag::MethodType,
            ConstantPool::Dynamic { .. } => Tag::Dynamic,
            ConstantPool::InvokeDynamic { .. } => Tag::InvokeDynamic,
            ConstantPool::Module { .. } => Tag::Module,
            ConstantPool::Package { .. } => Tag::Package,
        })
    }
}

/// Reads `constant_pool_count - 1` entries, producing a 1-indexed vector of
/// length `constant_pool_count` whose `[0]` slot is [`ConstantPool::Unusable`]
/// (index 0 is never a valid reference) and whose `Long`/`Double` entries each
/// consume two indices, the second also `Unusable` (§4.2, §8 "Long/Double
/// occupy two pool slots").
pub fn read_constant_pool(
    cursor: &mut Cursor,
    constant_pool_count: u16,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<ConstantPool>, DecodeError> {
    let mut pool = Vec::with_capacity(constant_pool_count as usize);
    pool.push(ConstantPool::Unusable);
    while pool.len() < constant_pool_count as usize {
        let index = pool.len() as u16;
        let tag_byte = cursor.read_u1()?;
        let tag = Tag::try_from(tag_byte).map_err(|tag| {
            DecodeError::new(
                DecodeCause::BadConstantTag { tag, at_index: index },
                "unrecognised constant-pool tag",
            )
        })?;
        let entry = match tag {
            Tag::Utf8 => {
                let (utf8, malformed) = Utf8::read(cursor)?;
                if malformed {
                    diagnostics.push(Diagnostic::BadUtf8 { at_index: index });
                }
                ConstantPool::Utf8(utf8)
            }
            Tag::Integer => ConstantPool::Integer(cursor.read_u4()? as i32),
            Tag::Float => ConstantPool::Float(f32::from_bits(cursor.read_u4()?)),
            Tag::Long => {
                let high = cursor.read_u4()?;
                let low = cursor.read_u4()?;
                ConstantPool::Long(((high as i64) << 32) | (low as i64))
            }
            Tag::Double => {
                let high = cursor.read_u4()?;
                let low = cursor.read_u4()?;
                ConstantPool::Double(f64::from_bits(((high as u64) << 32) | (low as u64)))
            }
            Tag::Class => ConstantPool::Class {
                name_index: cursor.read_u2()?,
            },
            Tag::String => ConstantPool::String {
                string_index: cursor.read_u2()?,
            },
            Tag::Fieldref => ConstantPool::Fieldref {
                class_index: cursor.read_u2()?,
                name_and_type_index: cursor.read_u2()?,
            },
            Tag::Methodref => ConstantPool::Methodref {
                class_index: cursor.read_u2()?,
                name_and_type_index: cursor.read_u2()?,
            },
            Tag::InterfaceMethodref => ConstantPool::InterfaceMethodref {
                class_index: cursor.read_u2()?,
                name_and_type_index: cursor.read_u2()?,
            },
            Tag::NameAndType => ConstantPool::NameAndType {
                name_index: cursor.read_u2()?,
                descriptor_index: cursor.read_u2()?,
            },
            Tag::MethodHandle => {
                let kind_byte = cursor.read_u1()?;
                let reference_kind = ReferenceKind::try_from(kind_byte).map_err(|value| {
                    DecodeError::new(
                        DecodeCause::BadConstantTag {
                            tag: value,
                            at_index: index,
                        },
                        "unrecognised method handle reference_kind",
                    )
                })?;
                ConstantPool::MethodHandle {
                    reference_kind,
                    reference_index: cursor.read_u2()?,
                }
            }
            Tag::MethodType => ConstantPool::MethodType {
                descriptor_index: cursor.read_u2()?,
            },
            Tag::Dynamic => ConstantPool::Dynamic {
                bootstrap_method_attr_index: cursor.read_u2()?,
                name_and_type_index: cursor.read_u2()?,
            },
            Tag::InvokeDynamic => ConstantPool::InvokeDynamic {
                bootstrap_method_attr_index: cursor.read_u2()?,
                name_and_type_index: cursor.read_u2()?,
            },
            Tag::Module => ConstantPool::Module {
                name_index: cursor.read_u2()?,
            },
            Tag::Package => ConstantPool::Package {
                name_index: cursor.read_u2()?,
            },
        };
        let wide = matches!(entry, ConstantPool::Long(_) | ConstantPool::Double(_));
        pool.push(entry);
        if wide {
            pool.push(ConstantPool::Unusable);
        }
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_for(tag: u8, body: &[u8]) -> Vec<u8> {
        let mut v = vec![tag];
        v.extend_from_slice(body);
        v
    }

    #[test]
    fn long_consumes_two_slots_with_unusable_second() {
        let mut raw = Vec::new();
        raw.extend(bytes_for(5, &1i64.to_be_bytes()));
        let mut cursor = Cursor::new(&raw);
        let mut diagnostics = Vec::new();
        let pool = read_constant_pool(&mut cursor, 3, &mut diagnostics).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool[1], ConstantPool::Long(1));
        assert_eq!(pool[2], ConstantPool::Unusable);
    }

    #[test]
    fn float_round_trips_through_ieee754_bits() {
        let mut raw = bytes_for(4, &1.5f32.to_be_bytes());
        raw.extend(bytes_for(7, &[0, 1]));
        let mut cursor = Cursor::new(&raw);
        let mut diagnostics = Vec::new();
        let pool = read_constant_pool(&mut cursor, 3, &mut diagnostics).unwrap();
        assert_eq!(pool[1], ConstantPool::Float(1.5));
    }

    #[test]
    fn unrecognised_tag_is_a_decode_error() {
        let raw = bytes_for(200, &[]);
        let mut cursor = Cursor::new(&raw);
        let mut diagnostics = Vec::new();
        let err = read_constant_pool(&mut cursor, 2, &mut diagnostics).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::BadConstantTag { tag: 200, at_index: 1 }
        ));
    }

    #[test]
    fn malformed_utf8_is_a_diagnostic_not_an_error() {
        // 0xC0 0x80 is the valid encoded-null form; 0xC2 alone is truncated.
        let raw = bytes_for(1, &[0, 1, 0xC2]);
        let mut cursor = Cursor::new(&raw);
        let mut diagnostics = Vec::new();
        let pool = read_constant_pool(&mut cursor, 2, &mut diagnostics).unwrap();
        assert!(matches!(pool[1], ConstantPool::Utf8(ref u) if u.text.is_none()));
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::BadUtf8 { at_index: 1 }));
    }
}
