//! Attribute dispatch (§4.4): every attribute begins with `attribute_name_index`
//! and `attribute_length`, after which a fixed table of body decoders, keyed
//! by the resolved name, takes over. An unrecognised name is kept verbatim as
//! [`Attribute::Unknown`] rather than dropped, and a body decoder that
//! consumes the wrong number of bytes never corrupts its siblings — the
//! cursor is always resynced to the attribute's declared end.

mod annotation;
mod code;
mod module;
mod record;
mod stack_map;
mod type_annotation;

pub use annotation::{Annotation, ElementValue, ElementValuePair};
pub use code::{Code, ExceptionTableEntry};
pub use module::{Module, ModuleExports, ModuleOpens, ModuleProvides, ModuleRequires};
pub use record::{Record, RecordComponent};
pub use stack_map::{StackMapFrame, StackMapTable, VerificationTypeInfo};
pub use type_annotation::{PathDescriptor, TargetInfo, TypeAnnotation, TypePath};

use crate::access_flags::{ClassAccessFlags, MethodParameterAccessFlags};
use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::decode::DecodeError;
use crate::error::Diagnostic;

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: Vec<ClassAccessFlags>,
    pub inner_class_access_flags_residue: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    pub name_index: u16,
    pub access_flags: Vec<MethodParameterAccessFlags>,
    pub access_flags_residue: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    ConstantValue { value_index: u16 },
    Code(Code),
    StackMapTable(StackMapTable),
    Exceptions { exception_index_table: Vec<u16> },
    InnerClasses { classes: Vec<InnerClass> },
    EnclosingMethod { class_index: u16, method_index: u16 },
    Synthetic,
    Deprecated,
    Signature { signature_index: u16 },
    SourceFile { sourcefile_index: u16 },
    SourceDebugExtension { debug_extension: Vec<u8> },
    LineNumberTable(Vec<LineNumberEntry>),
    LocalVariableTable(Vec<LocalVariableEntry>),
    LocalVariableTypeTable(Vec<LocalVariableEntry>),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    Module(Module),
    ModulePackages { package_index: Vec<u16> },
    ModuleMainClass { main_class_index: u16 },
    NestHost { host_class_index: u16 },
    NestMembers { classes: Vec<u16> },
    Record(Record),
    PermittedSubclasses { classes: Vec<u16> },
    AnnotationDefault(ElementValue),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    Unknown { name: String, raw_bytes: Vec<u8> },
}

fn resolve_utf8<'p>(
    constant_pool: &'p [ConstantPool],
    index: u16,
    location: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<&'p str> {
    match constant_pool.get(index as usize) {
        Some(ConstantPool::Utf8(utf8)) => utf8.text.as_deref(),
        Some(_) => {
            diagnostics.push(Diagnostic::WrongConstantKind {
                location,
                index,
                expected: "Utf8",
            });
            None
        }
        None => {
            diagnostics.push(Diagnostic::IndexOutOfRange {
                location,
                index,
                pool_size: constant_pool.len() as u16,
            });
            None
        }
    }
}

fn read_u16_table(cursor: &mut Cursor) -> Result<Vec<u16>, DecodeError> {
    let count = cursor.read_u2()?;
    (0..count).map(|_| cursor.read_u2()).collect()
}

fn read_annotations(cursor: &mut Cursor) -> Result<Vec<Annotation>, DecodeError> {
    let count = cursor.read_u2()?;
    (0..count).map(|_| Annotation::read(cursor)).collect()
}

/// Reads one attribute, enforcing that its body consumes exactly
/// `attribute_length` bytes (§4.4). A mismatch is recorded as a diagnostic
/// and the cursor is forced back onto the declared boundary so the next
/// attribute (or whatever follows the attribute table) is read from the
/// right place.
pub fn read_attribute(
    cursor: &mut Cursor,
    constant_pool: &[ConstantPool],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Attribute, DecodeError> {
    let name_index = cursor.read_u2()?;
    let attribute_length = cursor.read_u4()?;
    let body_start = cursor.position();
    let name = resolve_utf8(constant_pool, name_index, "attribute_name_index", diagnostics);

    let attribute = match name {
        Some("ConstantValue") => Attribute::ConstantValue {
            value_index: cursor.read_u2()?,
        },
        Some("Code") => Attribute::Code(Code::read(cursor, constant_pool, diagnostics)?),
        Some("StackMapTable") => Attribute::StackMapTable(StackMapTable::read(cursor)?),
        Some("Exceptions") => Attribute::Exceptions {
            exception_index_table: read_u16_table(cursor)?,
        },
        Some("InnerClasses") => {
            let count = cursor.read_u2()?;
            let mut classes = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let inner_class_info_index = cursor.read_u2()?;
                let outer_class_info_index = cursor.read_u2()?;
                let inner_name_index = cursor.read_u2()?;
                let (inner_class_access_flags, inner_class_access_flags_residue) =
                    ClassAccessFlags::from_u16(cursor.read_u2()?);
                classes.push(InnerClass {
                    inner_class_info_index,
                    outer_class_info_index,
                    inner_name_index,
                    inner_class_access_flags,
                    inner_class_access_flags_residue,
                });
            }
            Attribute::InnerClasses { classes }
        }
        Some("EnclosingMethod") => Attribute::EnclosingMethod {
            class_index: cursor.read_u2()?,
            method_index: cursor.read_u2()?,
        },
        Some("Synthetic") => Attribute::Synthetic,
        Some("Deprecated") => Attribute::Deprecated,
        Some("Signature") => Attribute::Signature {
            signature_index: cursor.read_u2()?,
        },
        Some("SourceFile") => Attribute::SourceFile {
            sourcefile_index: cursor.read_u2()?,
        },
        Some("SourceDebugExtension") => Attribute::SourceDebugExtension {
            debug_extension: cursor.read_slice(attribute_length as usize)?.to_vec(),
        },
        Some("LineNumberTable") => {
            let count = cursor.read_u2()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LineNumberEntry {
                    start_pc: cursor.read_u2()?,
                    line_number: cursor.read_u2()?,
                });
            }
            Attribute::LineNumberTable(entries)
        }
        Some(name @ ("LocalVariableTable" | "LocalVariableTypeTable")) => {
            let count = cursor.read_u2()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableEntry {
                    start_pc: cursor.read_u2()?,
                    length: cursor.read_u2()?,
                    name_index: cursor.read_u2()?,
                    descriptor_index: cursor.read_u2()?,
                    index: cursor.read_u2()?,
                });
            }
            if name == "LocalVariableTable" {
                Attribute::LocalVariableTable(entries)
            } else {
                Attribute::LocalVariableTypeTable(entries)
            }
        }
        Some("BootstrapMethods") => {
            let count = cursor.read_u2()?;
            let mut methods = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let bootstrap_method_ref = cursor.read_u2()?;
                let bootstrap_arguments = read_u16_table(cursor)?;
                methods.push(BootstrapMethod {
                    bootstrap_method_ref,
                    bootstrap_arguments,
                });
            }
            Attribute::BootstrapMethods(methods)
        }
        Some("MethodParameters") => {
            let count = cursor.read_u1()?;
            let mut parameters = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let name_index = cursor.read_u2()?;
                let (access_flags, access_flags_residue) =
                    MethodParameterAccessFlags::from_u16(cursor.read_u2()?);
                parameters.push(MethodParameter {
                    name_index,
                    access_flags,
                    access_flags_residue,
                });
            }
            Attribute::MethodParameters(parameters)
        }
        Some("Module") => Attribute::Module(Module::read(cursor)?),
        Some("ModulePackages") => Attribute::ModulePackages {
            package_index: read_u16_table(cursor)?,
        },
        Some("ModuleMainClass") => Attribute::ModuleMainClass {
            main_class_index: cursor.read_u2()?,
        },
        Some("NestHost") => Attribute::NestHost {
            host_class_index: cursor.read_u2()?,
        },
        Some("NestMembers") => Attribute::NestMembers {
            classes: read_u16_table(cursor)?,
        },
        Some("Record") => Attribute::Record(Record::read(cursor, constant_pool, diagnostics)?),
        Some("PermittedSubclasses") => Attribute::PermittedSubclasses {
            classes: read_u16_table(cursor)?,
        },
        Some("AnnotationDefault") => Attribute::AnnotationDefault(ElementValue::read(cursor)?),
        Some(name @ ("RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations")) => {
            let annotations = read_annotations(cursor)?;
            if name == "RuntimeVisibleAnnotations" {
                Attribute::RuntimeVisibleAnnotations(annotations)
            } else {
                Attribute::RuntimeInvisibleAnnotations(annotations)
            }
        }
        Some(
            name @ ("RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations"),
        ) => {
            let num_parameters = cursor.read_u1()?;
            let mut parameters = Vec::with_capacity(num_parameters as usize);
            for _ in 0..num_parameters {
                parameters.push(read_annotations(cursor)?);
            }
            if name == "RuntimeVisibleParameterAnnotations" {
                Attribute::RuntimeVisibleParameterAnnotations(parameters)
            } else {
                Attribute::RuntimeInvisibleParameterAnnotations(parameters)
            }
        }
        Some(name @ ("RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations")) => {
            let count = cursor.read_u2()?;
            let mut annotations = Vec::with_capacity(count as usize);
            for _ in 0..count {
                annotations.push(TypeAnnotation::read(cursor)?);
            }
            if name == "RuntimeVisibleTypeAnnotations" {
                Attribute::RuntimeVisibleTypeAnnotations(annotations)
            } else {
                Attribute::RuntimeInvisibleTypeAnnotations(annotations)
            }
        }
        Some(other) => Attribute::Unknown {
            name: other.to_string(),
            raw_bytes: cursor.read_slice(attribute_length as usize)?.to_vec(),
        },
        None => Attribute::Unknown {
            name: format!("<unresolvable name_index {name_index}>"),
            raw_bytes: cursor.read_slice(attribute_length as usize)?.to_vec(),
        },
    };

    let consumed = (cursor.position() - body_start) as u32;
    if consumed != attribute_length {
        diagnostics.push(Diagnostic::AttributeLengthMismatch {
            name: name.unwrap_or("<unresolvable>").to_string(),
            expected: attribute_length,
            actual: consumed,
        });
        cursor.seek_to(body_start + attribute_length as usize)?;
    }
    Ok(attribute)
}

pub fn read_attributes(
    cursor: &mut Cursor,
    count: u16,
    constant_pool: &[ConstantPool],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Attribute>, DecodeError> {
    (0..count)
        .map(|_| read_attribute(cursor, constant_pool, diagnostics))
        .collect()
}
