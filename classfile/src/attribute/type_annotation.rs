use crate::cursor::Cursor;
use crate::error::decode::{DecodeCause, DecodeError};

use super::annotation::ElementValuePair;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarTargetEntry {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetInfo {
    TypeParameterTarget { type_parameter_index: u8 },
    SupertypeTarget { supertype_index: u16 },
    TypeParameterBoundTarget { type_parameter_index: u8, bound_index: u8 },
    EmptyTarget,
    FormalParameterTarget { formal_parameter_index: u8 },
    ThrowsTarget { throws_type_index: u16 },
    LocalvarTarget { table: Vec<LocalVarTargetEntry> },
    CatchTarget { exception_table_index: u16 },
    OffsetTarget { offset: u16 },
    TypeArgumentTarget { offset: u16, type_argument_index: u8 },
}

impl TargetInfo {
    fn read(target_type: u8, cursor: &mut Cursor) -> Result<TargetInfo, DecodeError> {
        Ok(match target_type {
            0x00 | 0x01 => TargetInfo::TypeParameterTarget {
                type_parameter_index: cursor.read_u1()?,
            },
            0x10 => TargetInfo::SupertypeTarget {
                supertype_index: cursor.read_u2()?,
            },
            0x11 | 0x12 => TargetInfo::TypeParameterBoundTarget {
                type_parameter_index: cursor.read_u1()?,
                bound_index: cursor.read_u1()?,
            },
            0x13..=0x15 => TargetInfo::EmptyTarget,
            0x16 => TargetInfo::FormalParameterTarget {
                formal_parameter_index: cursor.read_u1()?,
            },
            0x17 => TargetInfo::ThrowsTarget {
                throws_type_index: cursor.read_u2()?,
            },
            0x40 | 0x41 => {
                let table_length = cursor.read_u2()?;
                let table = (0..table_length)
                    .map(|_| {
                        Ok(LocalVarTargetEntry {
                            start_pc: cursor.read_u2()?,
                            length: cursor.read_u2()?,
                            index: cursor.read_u2()?,
                        })
                    })
                    .collect::<Result<_, DecodeError>>()?;
                TargetInfo::LocalvarTarget { table }
            }
            0x42 => TargetInfo::CatchTarget {
                exception_table_index: cursor.read_u2()?,
            },
            0x43..=0x46 => TargetInfo::OffsetTarget {
                offset: cursor.read_u2()?,
            },
            0x47..=0x4B => TargetInfo::TypeArgumentTarget {
                offset: cursor.read_u2()?,
                type_argument_index: cursor.read_u1()?,
            },
            value => {
                return Err(DecodeError::new(
                    DecodeCause::InvalidTargetType { value },
                    "target_type did not select a known target_info kind",
                ))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathDescriptor {
    pub type_path_kind: u8,
    pub type_argument_index: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypePath {
    pub path: Vec<PathDescriptor>,
}

impl TypePath {
    fn read(cursor: &mut Cursor) -> Result<TypePath, DecodeError> {
        let path_length = cursor.read_u1()?;
        let mut path = Vec::with_capacity(path_length as usize);
        for _ in 0..path_length {
            let type_path_kind = cursor.read_u1()?;
            if type_path_kind > 3 {
                return Err(DecodeError::new(
                    DecodeCause::InvalidTypePathKind {
                        value: type_path_kind,
                    },
                    "type_path_kind outside 0..=3",
                ));
            }
            let type_argument_index = cursor.read_u1()?;
            path.push(PathDescriptor {
                type_path_kind,
                type_argument_index,
            });
        }
        Ok(TypePath { path })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target_type: u8,
    pub target_info: TargetInfo,
    pub target_path: TypePath,
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl TypeAnnotation {
    pub fn read(cursor: &mut Cursor) -> Result<TypeAnnotation, DecodeError> {
        let target_type = cursor.read_u1()?;
        let target_info = TargetInfo::read(target_type, cursor)?;
        let target_path = TypePath::read(cursor)?;
        let type_index = cursor.read_u2()?;
        let num_element_value_pairs = cursor.read_u2()?;
        let mut element_value_pairs = Vec::with_capacity(num_element_value_pairs as usize);
        for _ in 0..num_element_value_pairs {
            element_value_pairs.push(ElementValuePair {
                element_name_index: cursor.read_u2()?,
                value: super::ElementValue::read(cursor)?,
            });
        }
        Ok(TypeAnnotation {
            target_type,
            target_info,
            target_path,
            type_index,
            element_value_pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catch_target_reads_exception_table_index() {
        let raw = [0x42u8, 0, 3, 0, 0, 1, 0, 0];
        let mut cursor = Cursor::new(&raw);
        let annotation = TypeAnnotation::read(&mut cursor).unwrap();
        assert_eq!(
            annotation.target_info,
            TargetInfo::CatchTarget {
                exception_table_index: 3
            }
        );
    }

    #[test]
    fn type_path_kind_above_three_is_fatal() {
        let raw = [1u8, 4, 0];
        let mut cursor = Cursor::new(&raw);
        let err = TypePath::read(&mut cursor).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::InvalidTypePathKind { value: 4 }
        ));
    }

    #[test]
    fn unrecognised_target_type_is_fatal() {
        let raw = [0x99u8];
        let mut cursor = Cursor::new(&raw);
        let err = TargetInfo::read(0x99, &mut cursor).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::InvalidTargetType { value: 0x99 }
        ));
    }
}
