//! A structural decoder for the JVM class-file format (JVMS §4): given raw
//! bytes, produces a fully structured [`class_file::ClassFile`] — constant
//! pool, access flags, field/method tables, and every attribute kind down to
//! the bytecode inside `Code`. It does not verify bytecode type-safety,
//! cross-check descriptors against method bodies, resolve symbolic
//! references across class files, or execute anything; it only decodes.

pub mod access_flags;
pub mod attribute;
pub mod class_file;
pub mod constant_pool;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod mutf8;
pub mod opcode;

pub use class_file::ClassFile;
pub use error::{decode::DecodeError, Diagnostic};
