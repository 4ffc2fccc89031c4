use crate::cursor::Cursor;
use crate::error::decode::{DecodeCause, DecodeError};

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    ConstValue { tag: u8, const_value_index: u16 },
    EnumConstValue { type_name_index: u16, const_name_index: u16 },
    ClassInfo { class_info_index: u16 },
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn read(cursor: &mut Cursor) -> Result<ElementValue, DecodeError> {
        let tag = cursor.read_u1()?;
        Ok(match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                ElementValue::ConstValue {
                    tag,
                    const_value_index: cursor.read_u2()?,
                }
            }
            b'e' => ElementValue::EnumConstValue {
                type_name_index: cursor.read_u2()?,
                const_name_index: cursor.read_u2()?,
            },
            b'c' => ElementValue::ClassInfo {
                class_info_index: cursor.read_u2()?,
            },
            b'@' => ElementValue::Annotation(Box::new(Annotation::read(cursor)?)),
            b'[' => {
                let count = cursor.read_u2()?;
                let values = (0..count)
                    .map(|_| ElementValue::read(cursor))
                    .collect::<Result<_, _>>()?;
                ElementValue::Array(values)
            }
            other => {
                return Err(DecodeError::new(
                    DecodeCause::UnknownElementValueTag { tag: other },
                    "unrecognised element_value tag",
                ))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl Annotation {
    pub fn read(cursor: &mut Cursor) -> Result<Annotation, DecodeError> {
        let type_index = cursor.read_u2()?;
        let num_pairs = cursor.read_u2()?;
        let mut element_value_pairs = Vec::with_capacity(num_pairs as usize);
        for _ in 0..num_pairs {
            element_value_pairs.push(ElementValuePair {
                element_name_index: cursor.read_u2()?,
                value: ElementValue::read(cursor)?,
            });
        }
        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_annotation_element_value_is_recursive() {
        // tag '@' -> inner annotation: type_index=1, 0 pairs.
        let raw = [b'@', 0, 1, 0, 0];
        let mut cursor = Cursor::new(&raw);
        let value = ElementValue::read(&mut cursor).unwrap();
        assert_eq!(
            value,
            ElementValue::Annotation(Box::new(Annotation {
                type_index: 1,
                element_value_pairs: vec![],
            }))
        );
    }

    #[test]
    fn unknown_tag_is_fatal() {
        let raw = [b'?', 0, 1];
        let mut cursor = Cursor::new(&raw);
        let err = ElementValue::read(&mut cursor).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::UnknownElementValueTag { tag } if *tag == b'?'
        ));
    }
}
