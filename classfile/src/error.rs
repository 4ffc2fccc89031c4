#![allow(clippy::enum_variant_names)]

//! Error types split into two families, mirroring how they arise:
//! [`decode`] holds conditions that abort the decode of the current class
//! file outright; [`format`] holds conditions a caller validates after a
//! successful decode (out-of-range pool indices, wrong constant kinds at a
//! structural site). Recoverable conditions encountered *during* decode do
//! not appear here at all — they are pushed onto [`Diagnostic`] instead.

pub mod decode {
    use std::error::Error;
    use std::fmt::Display;

    #[derive(Debug)]
    pub enum DecodeCause {
        /// First four bytes were not `0xCAFEBABE`.
        BadMagic { observed: u32 },
        /// The cursor ran out of bytes mid-field.
        UnexpectedEof { at: usize, wanted: usize },
        /// Bytes remained in the buffer after the last class-level attribute.
        TrailingBytes { n: usize },
        /// A constant-pool tag byte did not match any defined kind.
        BadConstantTag { tag: u8, at_index: u16 },
        /// A `StackMapTable` frame type fell in the reserved 128..=246 range.
        ReservedFrameType { value: u8 },
        /// An `element_value` tag was not one of the defined ASCII tags.
        UnknownElementValueTag { tag: u8 },
        /// A `type_annotation`'s `target_type` byte did not select a known target kind.
        InvalidTargetType { value: u8 },
        /// A `type_path`'s `type_path_kind` byte was outside 0..=3.
        InvalidTypePathKind { value: u8 },
    }

    impl Display for DecodeCause {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                DecodeCause::BadMagic { observed } => {
                    write!(f, "BadMagic: {observed:#010X}")
                }
                DecodeCause::UnexpectedEof { at, wanted } => {
                    write!(f, "UnexpectedEof: at {at}, wanted {wanted} bytes")
                }
                DecodeCause::TrailingBytes { n } => write!(f, "TrailingBytes: {n}"),
                DecodeCause::BadConstantTag { tag, at_index } => {
                    write!(f, "BadConstantTag: {tag} at index {at_index}")
                }
                DecodeCause::ReservedFrameType { value } => {
                    write!(f, "ReservedFrameType: {value}")
                }
                DecodeCause::UnknownElementValueTag { tag } => {
                    write!(f, "UnknownElementValueTag: {tag}")
                }
                DecodeCause::InvalidTargetType { value } => {
                    write!(f, "InvalidTargetType: {value:#04X}")
                }
                DecodeCause::InvalidTypePathKind { value } => {
                    write!(f, "InvalidTypePathKind: {value}")
                }
            }
        }
    }

    #[derive(Debug)]
    pub struct DecodeError {
        cause: DecodeCause,
        msg: String,
    }

    impl DecodeError {
        pub fn new(cause: DecodeCause, msg: impl Into<String>) -> DecodeError {
            DecodeError {
                cause,
                msg: msg.into(),
            }
        }

        pub fn cause(&self) -> &DecodeCause {
            &self.cause
        }
    }

    impl Error for DecodeError {}

    impl Display for DecodeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Decode Error: {}, {}", self.cause, self.msg)
        }
    }
}

pub mod format {
    use std::error::Error;
    use std::fmt::Display;

    #[derive(Debug)]
    pub enum FormatCause {
        InvalidIndex { index: u16, pool_size: u16 },
        WrongConstantKind { index: u16, expected: &'static str },
        TooManyFlags,
        MissingAttribute(&'static str),
    }

    impl Display for FormatCause {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                FormatCause::InvalidIndex { index, pool_size } => {
                    write!(f, "InvalidIndex: {index} (pool size {pool_size})")
                }
                FormatCause::WrongConstantKind { index, expected } => {
                    write!(f, "WrongConstantKind: index {index} expected {expected}")
                }
                FormatCause::TooManyFlags => write!(f, "TooManyFlags"),
                FormatCause::MissingAttribute(name) => write!(f, "MissingAttribute: {name}"),
            }
        }
    }

    #[derive(Debug)]
    pub struct FormatError {
        cause: FormatCause,
        msg: String,
    }

    impl FormatError {
        pub fn new(cause: FormatCause, msg: impl Into<String>) -> FormatError {
            FormatError {
                cause,
                msg: msg.into(),
            }
        }
    }

    impl Error for FormatError {}

    impl Display for FormatError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Format Error: {}, {}", self.cause, self.msg)
        }
    }
}

/// A recoverable condition noticed while decoding. These never abort the
/// decode; they accumulate here so a caller can inspect or escalate them.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A `Utf8` constant's bytes were not valid modified UTF-8; the slot keeps
    /// its raw bytes and decoding continues.
    BadUtf8 { at_index: u16 },
    /// An attribute body consumed a different number of bytes than its
    /// declared `attribute_length`; the cursor was resynced to the declared end.
    AttributeLengthMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },
    /// A structural use of the constant pool pointed at a slot of the wrong
    /// kind (e.g. `this_class` not pointing at a `Class` entry).
    WrongConstantKind {
        location: &'static str,
        index: u16,
        expected: &'static str,
    },
    /// A constant-pool index referenced from a structural site fell outside
    /// `1..pool_size`.
    IndexOutOfRange {
        location: &'static str,
        index: u16,
        pool_size: u16,
    },
}
