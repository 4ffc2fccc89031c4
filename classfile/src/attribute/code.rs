use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::decode::DecodeError;
use crate::error::Diagnostic;
use crate::opcode;

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

/// A decoded `Code` attribute body. `instructions` pairs each code-array
/// offset with its opcode's mnemonic (§4.7); it is not an instruction
/// stream — no operand has been consumed, so offsets into `code` that fall
/// inside a multi-byte instruction's operands get mnemonics of their own,
/// same as running the recognizer byte-by-byte always does.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub instructions: Vec<(usize, String)>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<super::Attribute>,
}

impl Code {
    pub fn read(
        cursor: &mut Cursor,
        constant_pool: &[ConstantPool],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Code, DecodeError> {
        let max_stack = cursor.read_u2()?;
        let max_locals = cursor.read_u2()?;
        let code_length = cursor.read_u4()?;
        let code = cursor.read_slice(code_length as usize)?.to_vec();
        let instructions = code
            .iter()
            .enumerate()
            .map(|(offset, &byte)| (offset, opcode::mnemonic(byte)))
            .collect();

        let exception_table_length = cursor.read_u2()?;
        let mut exception_table = Vec::with_capacity(exception_table_length as usize);
        for _ in 0..exception_table_length {
            exception_table.push(ExceptionTableEntry {
                start_pc: cursor.read_u2()?,
                end_pc: cursor.read_u2()?,
                handler_pc: cursor.read_u2()?,
                catch_type: cursor.read_u2()?,
            });
        }

        let attributes_count = cursor.read_u2()?;
        let attributes =
            super::read_attributes(cursor, attributes_count, constant_pool, diagnostics)?;

        Ok(Code {
            max_stack,
            max_locals,
            code,
            instructions,
            exception_table,
            attributes,
        })
    }
}
