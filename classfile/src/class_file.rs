//! The top-level assembler (§4.6): reads, in fixed order, the magic number,
//! version, constant pool, class-level access flags, `this_class`,
//! `super_class`, the interface table, field table, method table and
//! class-level attribute table. Anything left in the buffer afterwards is
//! `TrailingBytes`.

use crate::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::attribute::{self, Attribute};
use crate::constant_pool::{self, ConstantPool};
use crate::cursor::Cursor;
use crate::error::decode::{DecodeCause, DecodeError};
use crate::error::Diagnostic;

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: Vec<FieldAccessFlags>,
    pub access_flags_residue: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: Vec<MethodAccessFlags>,
    pub access_flags_residue: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: Vec<ConstantPool>,
    pub access_flags: Vec<ClassAccessFlags>,
    pub access_flags_residue: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<Attribute>,
    pub diagnostics: Vec<Diagnostic>,
}

fn read_field_or_method_attributes(
    cursor: &mut Cursor,
    constant_pool: &[ConstantPool],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(u16, u16, u16, Vec<Attribute>), DecodeError> {
    let access_flags = cursor.read_u2()?;
    let name_index = cursor.read_u2()?;
    let descriptor_index = cursor.read_u2()?;
    let attributes_count = cursor.read_u2()?;
    let attributes =
        attribute::read_attributes(cursor, attributes_count, constant_pool, diagnostics)?;
    Ok((access_flags, name_index, descriptor_index, attributes))
}

impl ClassFile {
    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let mut diagnostics = Vec::new();

        let magic = cursor.read_u4()?;
        if magic != MAGIC {
            return Err(DecodeError::new(
                DecodeCause::BadMagic { observed: magic },
                "first four bytes were not 0xCAFEBABE",
            ));
        }

        let minor_version = cursor.read_u2()?;
        let major_version = cursor.read_u2()?;

        let constant_pool_count = cursor.read_u2()?;
        let constant_pool = constant_pool::read_constant_pool(
            &mut cursor,
            constant_pool_count,
            &mut diagnostics,
        )?;

        let (class_flags, access_flags_residue) =
            ClassAccessFlags::from_u16(cursor.read_u2()?);

        let this_class = cursor.read_u2()?;
        let super_class = cursor.read_u2()?;

        let interfaces_count = cursor.read_u2()?;
        let interfaces = (0..interfaces_count)
            .map(|_| cursor.read_u2())
            .collect::<Result<_, _>>()?;

        let fields_count = cursor.read_u2()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            let (raw_flags, name_index, descriptor_index, attributes) =
                read_field_or_method_attributes(&mut cursor, &constant_pool, &mut diagnostics)?;
            let (access_flags, access_flags_residue) = FieldAccessFlags::from_u16(raw_flags);
            fields.push(FieldInfo {
                access_flags,
                access_flags_residue,
                name_index,
                descriptor_index,
                attributes,
            });
        }

        let methods_count = cursor.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            let (raw_flags, name_index, descriptor_index, attributes) =
                read_field_or_method_attributes(&mut cursor, &constant_pool, &mut diagnostics)?;
            let (access_flags, access_flags_residue) = MethodAccessFlags::from_u16(raw_flags);
            methods.push(MethodInfo {
                access_flags,
                access_flags_residue,
                name_index,
                descriptor_index,
                attributes,
            });
        }

        let attributes_count = cursor.read_u2()?;
        let attributes =
            attribute::read_attributes(&mut cursor, attributes_count, &constant_pool, &mut diagnostics)?;

        let remaining = cursor.remaining();
        if remaining != 0 {
            return Err(DecodeError::new(
                DecodeCause::TrailingBytes { n: remaining },
                "bytes remained after the final class-level attribute",
            ));
        }

        let mut class_file = ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags: class_flags,
            access_flags_residue,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            diagnostics,
        };
        let mut format_diagnostics = class_file.check_format();
        class_file.diagnostics.append(&mut format_diagnostics);
        Ok(class_file)
    }

    fn expect_kind(
        &self,
        index: u16,
        location: &'static str,
        expected: &'static str,
        matches: impl Fn(&ConstantPool) -> bool,
    ) -> Option<Diagnostic> {
        match self.constant_pool.get(index as usize) {
            Some(entry) if matches(entry) => None,
            Some(_) => Some(Diagnostic::WrongConstantKind {
                location,
                index,
                expected,
            }),
            None => Some(Diagnostic::IndexOutOfRange {
                location,
                index,
                pool_size: self.constant_pool.len() as u16,
            }),
        }
    }

    /// Post-parse structural validation (§7 "WrongConstantKind"/"IndexOutOfRange"):
    /// every structural pool reference must be in range and point at a slot of
    /// the kind the site requires. These conditions never abort the decode —
    /// they are reported back as diagnostics for a caller to inspect or escalate.
    pub fn check_format(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let is_class = |c: &ConstantPool| matches!(c, ConstantPool::Class { .. });
        let is_utf8 = |c: &ConstantPool| matches!(c, ConstantPool::Utf8(_));
        let is_name_and_type = |c: &ConstantPool| matches!(c, ConstantPool::NameAndType { .. });

        diagnostics.extend(self.expect_kind(self.this_class, "this_class", "Class", is_class));
        if self.super_class != 0 {
            diagnostics.extend(self.expect_kind(
                self.super_class,
                "super_class",
                "Class",
                is_class,
            ));
        }
        for &index in &self.interfaces {
            diagnostics.extend(self.expect_kind(index, "interfaces", "Class", is_class));
        }

        for field in &self.fields {
            diagnostics.extend(self.expect_kind(
                field.name_index,
                "field.name_index",
                "Utf8",
                is_utf8,
            ));
            diagnostics.extend(self.expect_kind(
                field.descriptor_index,
                "field.descriptor_index",
                "Utf8",
                is_utf8,
            ));
        }
        for method in &self.methods {
            diagnostics.extend(self.expect_kind(
                method.name_index,
                "method.name_index",
                "Utf8",
                is_utf8,
            ));
            diagnostics.extend(self.expect_kind(
                method.descriptor_index,
                "method.descriptor_index",
                "Utf8",
                is_utf8,
            ));
        }

        for entry in &self.constant_pool {
            match entry {
                ConstantPool::Class { name_index } => {
                    diagnostics.extend(self.expect_kind(
                        *name_index,
                        "Class.name_index",
                        "Utf8",
                        is_utf8,
                    ));
                }
                ConstantPool::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    diagnostics.extend(self.expect_kind(
                        *name_index,
                        "NameAndType.name_index",
                        "Utf8",
                        is_utf8,
                    ));
                    diagnostics.extend(self.expect_kind(
                        *descriptor_index,
                        "NameAndType.descriptor_index",
                        "Utf8",
                        is_utf8,
                    ));
                }
                ConstantPool::Fieldref {
                    class_index,
                    name_and_type_index,
                }
                | ConstantPool::Methodref {
                    class_index,
                    name_and_type_index,
                }
                | ConstantPool::InterfaceMethodref {
                    class_index,
                    name_and_type_index,
                } => {
                    diagnostics.extend(self.expect_kind(
                        *class_index,
                        "ref.class_index",
                        "Class",
                        is_class,
                    ));
                    diagnostics.extend(self.expect_kind(
                        *name_and_type_index,
                        "ref.name_and_type_index",
                        "NameAndType",
                        is_name_and_type,
                    ));
                }
                _ => {}
            }
        }

        for attribute in &self.attributes {
            if let Attribute::InnerClasses { classes } = attribute {
                for inner_class in classes {
                    diagnostics.extend(self.expect_kind(
                        inner_class.inner_class_info_index,
                        "InnerClasses.inner_class_info_index",
                        "Class",
                        is_class,
                    ));
                    if inner_class.outer_class_info_index != 0 {
                        diagnostics.extend(self.expect_kind(
                            inner_class.outer_class_info_index,
                            "InnerClasses.outer_class_info_index",
                            "Class",
                            is_class,
                        ));
                    }
                    if inner_class.inner_name_index != 0 {
                        diagnostics.extend(self.expect_kind(
                            inner_class.inner_name_index,
                            "InnerClasses.inner_name_index",
                            "Utf8",
                            is_utf8,
                        ));
                    }
                }
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny byte-builder for assembling synthetic class files in tests;
    /// there are no binary `.class` fixtures in this workspace to load instead.
    #[derive(Default)]
    struct Builder {
        bytes: Vec<u8>,
    }

    impl Builder {
        fn u1(mut self, v: u8) -> Self {
            self.bytes.push(v);
            self
        }
        fn u2(mut self, v: u16) -> Self {
            self.bytes.extend_from_slice(&v.to_be_bytes());
            self
        }
        fn u4(mut self, v: u32) -> Self {
            self.bytes.extend_from_slice(&v.to_be_bytes());
            self
        }
        fn bytes(mut self, v: &[u8]) -> Self {
            self.bytes.extend_from_slice(v);
            self
        }
        fn utf8_entry(self, s: &str) -> Self {
            let encoded = crate::mutf8::encode(s);
            self.u1(1).u2(encoded.len() as u16).bytes(&encoded)
        }
        fn build(self) -> Vec<u8> {
            self.bytes
        }
    }

    /// `public class Empty {}` worth of structure: one constructor whose body
    /// is `aload_0; invokespecial <Object.<init>>; return`.
    fn empty_class_bytes() -> Vec<u8> {
        let code_body = Builder::default()
            .u2(1) // max_stack
            .u2(1) // max_locals
            .u4(3) // code_length
            .bytes(&[0x2A, 0xB7, 0xB1]) // aload_0; invokespecial; return
            .u2(0) // exception_table_length
            .u2(0) // nested attributes_count
            .build();

        Builder::default()
            .u4(MAGIC)
            .u2(0) // minor_version
            .u2(52) // major_version
            .u2(10) // constant_pool_count (9 real entries + reserved 0)
            .utf8_entry("Empty") // #1
            .u1(7).u2(1) // #2 Class -> #1
            .utf8_entry("java/lang/Object") // #3
            .u1(7).u2(3) // #4 Class -> #3
            .utf8_entry("<init>") // #5
            .utf8_entry("()V") // #6
            .u1(12).u2(5).u2(6) // #7 NameAndType(<init>, ()V)
            .u1(10).u2(4).u2(7) // #8 Methodref(Object, <init>:()V)
            .utf8_entry("Code") // #9
            .u2(0x0021) // access_flags: PUBLIC | SUPER
            .u2(2) // this_class -> #2 (Empty)
            .u2(4) // super_class -> #4 (Object)
            .u2(0) // interfaces_count
            .u2(0) // fields_count
            .u2(1) // methods_count
            .u2(0x0001) // method access_flags: PUBLIC
            .u2(5) // name_index -> <init>
            .u2(6) // descriptor_index -> ()V
            .u2(1) // method attributes_count
            .u2(9) // attribute_name_index -> "Code"
            .u4(code_body.len() as u32)
            .bytes(&code_body)
            .u2(0) // class attributes_count
            .build()
    }

    #[test]
    fn bad_magic_is_fatal() {
        let bytes = [0x00, 0x00, 0x00, 0x00];
        let err = ClassFile::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err.cause(), DecodeCause::BadMagic { observed: 0 }));
    }

    #[test]
    fn truncated_input_is_bad_magic_or_eof() {
        let bytes = [0xCA, 0xFE, 0xBA];
        let err = ClassFile::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::BadMagic { .. } | DecodeCause::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn long_second_slot_is_rejected_as_wrong_kind() {
        // count=4: #1 Long(0x2A), #2 Unusable, #3 Utf8("hi"). A reference to
        // #2 as though it were a Class entry must be WrongConstantKind.
        let bytes = Builder::default()
            .u4(MAGIC)
            .u2(0)
            .u2(52)
            .u2(4)
            .u1(5).u4(0).u4(0x2A) // #1 Long
            .utf8_entry("hi") // #3
            .u2(0x0021)
            .u2(2) // this_class points at the Unusable second slot of the Long
            .u2(0)
            .u2(0)
            .u2(0)
            .u2(0)
            .u2(0)
            .build();
        let class_file = ClassFile::from_bytes(&bytes).unwrap();
        assert!(class_file.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::WrongConstantKind {
                location: "this_class",
                index: 2,
                ..
            }
        )));
    }

    #[test]
    fn empty_class_decodes_end_to_end() {
        let class_file = ClassFile::from_bytes(&empty_class_bytes()).unwrap();
        assert_eq!(class_file.major_version, 52);
        assert_eq!(
            class_file.access_flags,
            vec![ClassAccessFlags::Public, ClassAccessFlags::Super]
        );
        assert!(matches!(
            class_file.constant_pool[2],
            ConstantPool::Class { name_index: 1 }
        ));
        assert_eq!(class_file.methods.len(), 1);
        let init = &class_file.methods[0];
        assert_eq!(init.access_flags, vec![MethodAccessFlags::Public]);
        assert_eq!(init.attributes.len(), 1);
        let Attribute::Code(code) = &init.attributes[0] else {
            panic!("expected a Code attribute");
        };
        let mnemonics: Vec<&str> = code
            .instructions
            .iter()
            .map(|(_, name)| name.as_str())
            .collect();
        assert_eq!(mnemonics, vec!["aload_0", "invokespecial", "return"]);
        assert!(class_file.diagnostics.is_empty());
    }

    #[test]
    fn unknown_attribute_retains_name_and_raw_bytes() {
        let raw_bytes = [1u8, 2, 3, 4, 5, 6, 7];
        let bytes = Builder::default()
            .u4(MAGIC)
            .u2(0)
            .u2(52)
            .u2(3)
            .utf8_entry("f") // #1 field name
            .utf8_entry("X-Vendor-Meta") // #2
            .u2(0x0021)
            .u2(0) // this_class: intentionally invalid, checked separately
            .u2(0)
            .u2(0)
            .u2(1) // fields_count
            .u2(0x0001) // field access_flags
            .u2(1) // name_index
            .u2(1) // descriptor_index (reuses #1, kind-checked separately)
            .u2(1) // field attributes_count
            .u2(2) // attribute_name_index -> "X-Vendor-Meta"
            .u4(raw_bytes.len() as u32)
            .bytes(&raw_bytes)
            .u2(0) // methods_count
            .u2(0) // class attributes_count
            .build();
        let class_file = ClassFile::from_bytes(&bytes).unwrap();
        let Attribute::Unknown { name, raw_bytes: got } = &class_file.fields[0].attributes[0]
        else {
            panic!("expected an Unknown attribute");
        };
        assert_eq!(name, "X-Vendor-Meta");
        assert_eq!(got, &raw_bytes);
    }
}
