use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::decode::DecodeError;
use crate::error::Diagnostic;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<super::Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub components: Vec<RecordComponent>,
}

impl Record {
    pub fn read(
        cursor: &mut Cursor,
        constant_pool: &[ConstantPool],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Record, DecodeError> {
        let component_count = cursor.read_u2()?;
        let mut components = Vec::with_capacity(component_count as usize);
        for _ in 0..component_count {
            let name_index = cursor.read_u2()?;
            let descriptor_index = cursor.read_u2()?;
            let attributes_count = cursor.read_u2()?;
            let attributes =
                super::read_attributes(cursor, attributes_count, constant_pool, diagnostics)?;
            components.push(RecordComponent {
                name_index,
                descriptor_index,
                attributes,
            });
        }
        Ok(Record { components })
    }
}
