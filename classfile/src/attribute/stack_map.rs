use crate::cursor::Cursor;
use crate::error::decode::{DecodeCause, DecodeError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Long,
    Double,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    Uninitialized { offset: u16 },
}

impl VerificationTypeInfo {
    fn read(cursor: &mut Cursor) -> Result<VerificationTypeInfo, DecodeError> {
        let tag = cursor.read_u1()?;
        Ok(match tag {
            0 => VerificationTypeInfo::Top,
            1 => VerificationTypeInfo::Integer,
            2 => VerificationTypeInfo::Float,
            3 => VerificationTypeInfo::Double,
            4 => VerificationTypeInfo::Long,
            5 => VerificationTypeInfo::Null,
            6 => VerificationTypeInfo::UninitializedThis,
            7 => VerificationTypeInfo::Object {
                cpool_index: cursor.read_u2()?,
            },
            8 => VerificationTypeInfo::Uninitialized {
                offset: cursor.read_u2()?,
            },
            other => {
                return Err(DecodeError::new(
                    DecodeCause::UnknownElementValueTag { tag: other },
                    "unrecognised verification_type_info tag",
                ))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame {
    SameFrame { offset_delta: u16 },
    SameLocals1StackItemFrame { offset_delta: u16, stack: VerificationTypeInfo },
    SameLocals1StackItemFrameExtended { offset_delta: u16, stack: VerificationTypeInfo },
    ChopFrame { offset_delta: u16, k: u8 },
    SameFrameExtended { offset_delta: u16 },
    AppendFrame { offset_delta: u16, locals: Vec<VerificationTypeInfo> },
    FullFrame {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
        stack: Vec<VerificationTypeInfo>,
    },
}

impl StackMapFrame {
    fn read(cursor: &mut Cursor) -> Result<StackMapFrame, DecodeError> {
        let frame_type = cursor.read_u1()?;
        Ok(match frame_type {
            0..=63 => StackMapFrame::SameFrame {
                offset_delta: frame_type as u16,
            },
            64..=127 => StackMapFrame::SameLocals1StackItemFrame {
                offset_delta: (frame_type - 64) as u16,
                stack: VerificationTypeInfo::read(cursor)?,
            },
            247 => StackMapFrame::SameLocals1StackItemFrameExtended {
                offset_delta: cursor.read_u2()?,
                stack: VerificationTypeInfo::read(cursor)?,
            },
            248..=250 => StackMapFrame::ChopFrame {
                offset_delta: cursor.read_u2()?,
                k: 251 - frame_type,
            },
            251 => StackMapFrame::SameFrameExtended {
                offset_delta: cursor.read_u2()?,
            },
            252..=254 => {
                let offset_delta = cursor.read_u2()?;
                let n = frame_type - 251;
                let locals = (0..n)
                    .map(|_| VerificationTypeInfo::read(cursor))
                    .collect::<Result<_, _>>()?;
                StackMapFrame::AppendFrame {
                    offset_delta,
                    locals,
                }
            }
            255 => {
                let offset_delta = cursor.read_u2()?;
                let num_locals = cursor.read_u2()?;
                let locals = (0..num_locals)
                    .map(|_| VerificationTypeInfo::read(cursor))
                    .collect::<Result<_, _>>()?;
                let num_stack = cursor.read_u2()?;
                let stack = (0..num_stack)
                    .map(|_| VerificationTypeInfo::read(cursor))
                    .collect::<Result<_, _>>()?;
                StackMapFrame::FullFrame {
                    offset_delta,
                    locals,
                    stack,
                }
            }
            reserved => {
                return Err(DecodeError::new(
                    DecodeCause::ReservedFrameType { value: reserved },
                    "frame_type in the reserved 128..=246 range",
                ))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackMapTable {
    pub entries: Vec<StackMapFrame>,
}

impl StackMapTable {
    pub fn read(cursor: &mut Cursor) -> Result<StackMapTable, DecodeError> {
        let number_of_entries = cursor.read_u2()?;
        let entries = (0..number_of_entries)
            .map(|_| StackMapFrame::read(cursor))
            .collect::<Result<_, _>>()?;
        Ok(StackMapTable { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_frame_type_is_fatal() {
        let raw = [1u8, 200];
        let mut cursor = Cursor::new(&raw);
        let err = StackMapTable::read(&mut cursor).unwrap_err();
        assert!(matches!(
            err.cause(),
            DecodeCause::ReservedFrameType { value: 200 }
        ));
    }

    #[test]
    fn full_frame_round_trips() {
        // entries=1, frame_type=255, offset_delta=1, num_locals=1, Integer,
        // num_stack=1, Integer.
        let raw = [0u8, 1, 255, 0, 1, 0, 1, 1, 0, 1, 1];
        let mut cursor = Cursor::new(&raw);
        let table = StackMapTable::read(&mut cursor).unwrap();
        assert_eq!(
            table.entries,
            vec![StackMapFrame::FullFrame {
                offset_delta: 1,
                locals: vec![VerificationTypeInfo::Integer],
                stack: vec![VerificationTypeInfo::Integer],
            }]
        );
    }
}
