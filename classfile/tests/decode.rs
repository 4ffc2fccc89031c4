use std::error::Error;

use classfile::access_flags::{ClassAccessFlags, FieldAccessFlags};
use classfile::attribute::{Attribute, StackMapFrame, VerificationTypeInfo};
use classfile::class_file::ClassFile;
use classfile::constant_pool::ConstantPool;
use classfile::error::Diagnostic;

const MAGIC: u32 = 0xCAFE_BABE;

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
        let encoded = classfile::mutf8::encode(s);
        self.u1(1).u2(encoded.len() as u16).bytes(&encoded)
    }
    fn build(self) -> Vec<u8> {
        self.bytes
    }
}

#[test]
fn empty_class_round_trips() -> Result<(), Box<dyn Error>> {
    let code_body = Builder::default()
        .u2(1)
        .u2(1)
        .u4(3)
        .bytes(&[0x2A, 0xB7, 0xB1])
        .u2(0)
        .u2(0)
        .build();

    let bytes = Builder::default()
        .u4(MAGIC)
        .u2(0)
        .u2(52)
        .u2(10)
        .utf8_entry("Empty") // #1
        .u1(7).u2(1) // #2 Class
        .utf8_entry("java/lang/Object") // #3
        .u1(7).u2(3) // #4 Class
        .utf8_entry("<init>") // #5
        .utf8_entry("()V") // #6
        .u1(12).u2(5).u2(6) // #7 NameAndType
        .u1(10).u2(4).u2(7) // #8 Methodref
        .utf8_entry("Code") // #9
        .u2(0x0021)
        .u2(2)
        .u2(4)
        .u2(0)
        .u2(0)
        .u2(1)
        .u2(0x0001)
        .u2(5)
        .u2(6)
        .u2(1)
        .u2(9)
        .u4(code_body.len() as u32)
        .bytes(&code_body)
        .u2(0)
        .build();

    let class_file = ClassFile::from_bytes(&bytes)?;
    assert_eq!(
        class_file.access_flags,
        vec![ClassAccessFlags::Public, ClassAccessFlags::Super]
    );
    assert!(class_file.constant_pool.len() >= 4);
    assert!(class_file.diagnostics.is_empty());
    Ok(())
}

#[test]
fn synthetic_access_flags_decode_as_a_bitfield() -> Result<(), Box<dyn Error>> {
    // 0x1012 = SYNTHETIC | FINAL | PRIVATE on a field: a nibble-by-nibble
    // decoder can't represent three bits sharing two nibbles like this.
    let (flags, residue) = FieldAccessFlags::from_u16(0x1012);
    assert_eq!(
        flags,
        vec![
            FieldAccessFlags::Private,
            FieldAccessFlags::Final,
            FieldAccessFlags::Synthetic,
        ]
    );
    assert_eq!(residue, 0);
    Ok(())
}

#[test]
fn long_second_slot_reference_is_wrong_constant_kind() -> Result<(), Box<dyn Error>> {
    let bytes = Builder::default()
        .u4(MAGIC)
        .u2(0)
        .u2(52)
        .u2(4)
        .u1(5).u4(0).u4(0x2A) // #1 Long
        .utf8_entry("hi") // #3
        .u2(0x0021)
        .u2(2)
        .u2(0)
        .u2(0)
        .u2(0)
        .u2(0)
        .u2(0)
        .build();
    let class_file = ClassFile::from_bytes(&bytes)?;
    assert!(matches!(
        class_file.constant_pool[2],
        ConstantPool::Unusable
    ));
    assert!(class_file.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::WrongConstantKind {
            location: "this_class",
            index: 2,
            ..
        }
    )));
    Ok(())
}

#[test]
fn unknown_field_attribute_is_retained_verbatim() -> Result<(), Box<dyn Error>> {
    let raw_bytes = [1u8, 2, 3, 4, 5, 6, 7];
    let bytes = Builder::default()
        .u4(MAGIC)
        .u2(0)
        .u2(52)
        .u2(3)
        .utf8_entry("f")
        .utf8_entry("X-Vendor-Meta")
        .u2(0x0021)
        .u2(0)
        .u2(0)
        .u2(0)
        .u2(1)
        .u2(0x0001)
        .u2(1)
        .u2(1)
        .u2(1)
        .u2(2)
        .u4(raw_bytes.len() as u32)
        .bytes(&raw_bytes)
        .u2(0)
        .u2(0)
        .build();
    let class_file = ClassFile::from_bytes(&bytes)?;
    let Attribute::Unknown { name, raw_bytes: got } = &class_file.fields[0].attributes[0] else {
        panic!("expected Unknown attribute");
    };
    assert_eq!(name, "X-Vendor-Meta");
    assert_eq!(got, &raw_bytes);
    Ok(())
}

#[test]
fn truncated_input_is_bad_magic_or_eof() {
    let bytes = [0xCA, 0xFE, 0xBA];
    let err = ClassFile::from_bytes(&bytes).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("BadMagic") || message.contains("UnexpectedEof"));
}

#[test]
fn stack_map_table_full_frame_round_trips() -> Result<(), Box<dyn Error>> {
    use classfile::cursor::Cursor;

    // entries=1, frame_type=255, offset_delta=5,
    // num_locals=2 [Integer, Object(#7)], num_stack=1 [Uninitialized(12)].
    let raw = Builder::default()
        .u2(1)
        .u1(255)
        .u2(5)
        .u2(2)
        .u1(1)
        .u1(7).u2(7)
        .u2(1)
        .u1(8).u2(12)
        .build();
    let mut cursor = Cursor::new(&raw);
    let table = classfile::attribute::StackMapTable::read(&mut cursor)?;
    assert_eq!(
        table.entries,
        vec![StackMapFrame::FullFrame {
            offset_delta: 5,
            locals: vec![
                VerificationTypeInfo::Integer,
                VerificationTypeInfo::Object { cpool_index: 7 },
            ],
            stack: vec![VerificationTypeInfo::Uninitialized { offset: 12 }],
        }]
    );
    Ok(())
}
