use crate::access_flags::{ModuleExportsAccessFlags, ModuleOpensAccessFlags, ModuleRequiresAccessFlags};
use crate::cursor::Cursor;
use crate::error::decode::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRequires {
    pub requires_index: u16,
    pub requires_flags: Vec<ModuleRequiresAccessFlags>,
    pub requires_flags_residue: u16,
    pub requires_version_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExports {
    pub exports_index: u16,
    pub exports_flags: Vec<ModuleExportsAccessFlags>,
    pub exports_flags_residue: u16,
    pub exports_to_index: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOpens {
    pub opens_index: u16,
    pub opens_flags: Vec<ModuleOpensAccessFlags>,
    pub opens_flags_residue: u16,
    pub opens_to_index: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProvides {
    pub provides_index: u16,
    pub provides_with_index: Vec<u16>,
}

/// The full module descriptor (§4.5: "full module descriptor"); recognised
/// but not interpreted beyond structure — resolving `requires`/`uses` against
/// other modules is a linker's concern, not this decoder's.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub module_name_index: u16,
    pub module_flags: u16,
    pub module_version_index: u16,
    pub requires: Vec<ModuleRequires>,
    pub exports: Vec<ModuleExports>,
    pub opens: Vec<ModuleOpens>,
    pub uses_index: Vec<u16>,
    pub provides: Vec<ModuleProvides>,
}

impl Module {
    pub fn read(cursor: &mut Cursor) -> Result<Module, DecodeError> {
        let module_name_index = cursor.read_u2()?;
        let module_flags = cursor.read_u2()?;
        let module_version_index = cursor.read_u2()?;

        let requires_count = cursor.read_u2()?;
        let mut requires = Vec::with_capacity(requires_count as usize);
        for _ in 0..requires_count {
            let requires_index = cursor.read_u2()?;
            let (requires_flags, requires_flags_residue) =
                ModuleRequiresAccessFlags::from_u16(cursor.read_u2()?);
            let requires_version_index = cursor.read_u2()?;
            requires.push(ModuleRequires {
                requires_index,
                requires_flags,
                requires_flags_residue,
                requires_version_index,
            });
        }

        let exports_count = cursor.read_u2()?;
        let mut exports = Vec::with_capacity(exports_count as usize);
        for _ in 0..exports_count {
            let exports_index = cursor.read_u2()?;
            let (exports_flags, exports_flags_residue) =
                ModuleExportsAccessFlags::from_u16(cursor.read_u2()?);
            let exports_to_count = cursor.read_u2()?;
            let exports_to_index = (0..exports_to_count)
                .map(|_| cursor.read_u2())
                .collect::<Result<_, _>>()?;
            exports.push(ModuleExports {
                exports_index,
                exports_flags,
                exports_flags_residue,
                exports_to_index,
            });
        }

        let opens_count = cursor.read_u2()?;
        let mut opens = Vec::with_capacity(opens_count as usize);
        for _ in 0..opens_count {
            let opens_index = cursor.read_u2()?;
            let (opens_flags, opens_flags_residue) =
                ModuleOpensAccessFlags::from_u16(cursor.read_u2()?);
            let opens_to_count = cursor.read_u2()?;
            let opens_to_index = (0..opens_to_count)
                .map(|_| cursor.read_u2())
                .collect::<Result<_, _>>()?;
            opens.push(ModuleOpens {
                opens_index,
                opens_flags,
                opens_flags_residue,
                opens_to_index,
            });
        }

        let uses_count = cursor.read_u2()?;
        let uses_index = (0..uses_count)
            .map(|_| cursor.read_u2())
            .collect::<Result<_, _>>()?;

        let provides_count = cursor.read_u2()?;
        let mut provides = Vec::with_capacity(provides_count as usize);
        for _ in 0..provides_count {
            let provides_index = cursor.read_u2()?;
            let provides_with_count = cursor.read_u2()?;
            let provides_with_index = (0..provides_with_count)
                .map(|_| cursor.read_u2())
                .collect::<Result<_, _>>()?;
            provides.push(ModuleProvides {
                provides_index,
                provides_with_index,
            });
        }

        Ok(Module {
            module_name_index,
            module_flags,
            module_version_index,
            requires,
            exports,
            opens,
            uses_index,
            provides,
        })
    }
}
