use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use classfile::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use classfile::attribute::Attribute;
use classfile::class_file::{ClassFile, FieldInfo, MethodInfo};
use classfile::constant_pool::ConstantPool;
use classfile::descriptor::{FieldDescriptor, MethodDescriptor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_name = "CLASSES", required = true)]
    class_files: Vec<PathBuf>,

    /// Show only public classes and members
    #[arg(long)]
    public: bool,

    /// Show protected/public classes and members
    #[arg(long)]
    protected: bool,

    /// Show package/protected/public classes and members (default)
    #[arg(long, default_value_t = true)]
    package: bool,

    /// Show all classes and members
    #[arg(long)]
    private: bool,

    /// Disassemble Code attributes (opcode mnemonics only; no operand decoding)
    #[arg(short = 'c', long)]
    disassemble: bool,

    /// Print generic signatures
    #[arg(short, long)]
    signatures: bool,

    /// Print constant-pool contents
    #[arg(long)]
    constants: bool,
}

#[derive(Clone, Copy, PartialEq, PartialOrd)]
enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Args {
    fn threshold(&self) -> Visibility {
        if self.private {
            Visibility::Private
        } else if self.protected {
            Visibility::Protected
        } else if self.public {
            Visibility::Public
        } else {
            Visibility::Package
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    for path in &args.class_files {
        if let Err(err) = dump_one(path, &args) {
            warn!("{}: {err}", path.display());
        }
    }
}

fn dump_one(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("reading {}", path.display());
    let mut file = File::open(path)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;

    let class_file = ClassFile::from_bytes(&contents)?;
    if !class_file.diagnostics.is_empty() {
        warn!(
            "{}: {} diagnostic(s) accumulated during decode",
            path.display(),
            class_file.diagnostics.len()
        );
    }

    let mut out = Vec::new();
    render(&class_file, args, &mut out)?;
    std::io::stdout().write_all(&out)?;
    Ok(())
}

fn utf8_at(class_file: &ClassFile, index: u16) -> Option<&str> {
    match class_file.constant_pool.get(index as usize) {
        Some(ConstantPool::Utf8(utf8)) => utf8.text.as_deref(),
        _ => None,
    }
}

fn class_name_at(class_file: &ClassFile, index: u16) -> Option<&str> {
    match class_file.constant_pool.get(index as usize) {
        Some(ConstantPool::Class { name_index }) => utf8_at(class_file, *name_index),
        _ => None,
    }
}

fn field_visibility(flags: &[FieldAccessFlags]) -> Visibility {
    if flags.contains(&FieldAccessFlags::Public) {
        Visibility::Public
    } else if flags.contains(&FieldAccessFlags::Protected) {
        Visibility::Protected
    } else if flags.contains(&FieldAccessFlags::Private) {
        Visibility::Private
    } else {
        Visibility::Package
    }
}

fn method_visibility(flags: &[MethodAccessFlags]) -> Visibility {
    if flags.contains(&MethodAccessFlags::Public) {
        Visibility::Public
    } else if flags.contains(&MethodAccessFlags::Protected) {
        Visibility::Protected
    } else if flags.contains(&MethodAccessFlags::Private) {
        Visibility::Private
    } else {
        Visibility::Package
    }
}

fn field_descriptor_text(class_file: &ClassFile, descriptor_index: u16) -> String {
    utf8_at(class_file, descriptor_index)
        .and_then(|text| {
            let utf8 = classfile::constant_pool::Utf8::from(text);
            let descriptor: Option<FieldDescriptor> = (&utf8).into();
            descriptor.map(|d| d.to_string())
        })
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn method_descriptor_parts(class_file: &ClassFile, descriptor_index: u16) -> (String, String) {
    match utf8_at(class_file, descriptor_index) {
        Some(text) => {
            let utf8 = classfile::constant_pool::Utf8::from(text);
            let descriptor: Option<MethodDescriptor> = (&utf8).into();
            match descriptor {
                Some(d) => {
                    let params = d
                        .parameters
                        .iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let return_type = d
                        .return_type
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "void".to_string());
                    (params, return_type)
                }
                None => ("<unknown>".to_string(), "<unknown>".to_string()),
            }
        }
        None => ("<unknown>".to_string(), "<unknown>".to_string()),
    }
}

fn render(
    class_file: &ClassFile,
    args: &Args,
    out: &mut Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let threshold = args.threshold();

    for attribute in &class_file.attributes {
        if let Attribute::SourceFile { sourcefile_index } = attribute {
            if let Some(name) = utf8_at(class_file, *sourcefile_index) {
                writeln!(out, "Compiled from \"{name}\"")?;
            }
        }
    }

    let this_class_name =
        class_name_at(class_file, class_file.this_class).unwrap_or("<unresolved>");

    let flag_words: Vec<&str> = class_file
        .access_flags
        .iter()
        .filter(|f| **f != ClassAccessFlags::Super)
        .map(|f| match f {
            ClassAccessFlags::Public => "public",
            ClassAccessFlags::Final => "final",
            ClassAccessFlags::Super => unreachable!(),
            ClassAccessFlags::Interface => "interface",
            ClassAccessFlags::Abstract => "abstract",
            ClassAccessFlags::Synthetic => "synthetic",
            ClassAccessFlags::Annotation => "@interface",
            ClassAccessFlags::Enum => "enum",
            ClassAccessFlags::Module => "module",
        })
        .collect();
    writeln!(
        out,
        "{} class {} {{",
        flag_words.join(" "),
        this_class_name
    )?
    ;

    if args.constants {
        writeln!(out, "  constant pool:")?;
        for (index, entry) in class_file.constant_pool.iter().enumerate().skip(1) {
            writeln!(out, "    #{index} = {entry:?}")?;
        }
    }

    render_fields(class_file, args, threshold, out)?;
    render_methods(class_file, args, threshold, this_class_name, out)?;

    writeln!(out, "}}")?;
    Ok(())
}

fn render_fields(
    class_file: &ClassFile,
    args: &Args,
    threshold: Visibility,
    out: &mut Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    for field in &class_file.fields {
        if field_visibility(&field.access_flags) < threshold {
            continue;
        }
        let name = utf8_at(class_file, field.name_index).unwrap_or("<unresolved>");
        let descriptor = field_descriptor_text(class_file, field.descriptor_index);
        let flags = field_flag_words(field);
        writeln!(out, "  {flags}{descriptor} {name};")?;
        if args.signatures {
            if let Some(signature) = field_signature(field) {
                let signature_name = utf8_at(class_file, signature).unwrap_or("<unresolved>");
                writeln!(out, "    signature: {signature_name}")?;
            }
        }
    }
    Ok(())
}

fn field_flag_words(field: &FieldInfo) -> String {
    let words: Vec<&str> = field
        .access_flags
        .iter()
        .map(|f| match f {
            FieldAccessFlags::Public => "public",
            FieldAccessFlags::Private => "private",
            FieldAccessFlags::Protected => "protected",
            FieldAccessFlags::Static => "static",
            FieldAccessFlags::Final => "final",
            FieldAccessFlags::Volatile => "volatile",
            FieldAccessFlags::Transient => "transient",
            FieldAccessFlags::Synthetic => "synthetic",
            FieldAccessFlags::Enum => "enum",
        })
        .collect();
    if words.is_empty() {
        String::new()
    } else {
        format!("{} ", words.join(" "))
    }
}

fn field_signature(field: &FieldInfo) -> Option<u16> {
    field.attributes.iter().find_map(|a| match a {
        Attribute::Signature { signature_index } => Some(*signature_index),
        _ => None,
    })
}

fn render_methods(
    class_file: &ClassFile,
    args: &Args,
    threshold: Visibility,
    this_class_name: &str,
    out: &mut Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    for method in &class_file.methods {
        if method_visibility(&method.access_flags) < threshold {
            continue;
        }
        let raw_name = utf8_at(class_file, method.name_index).unwrap_or("<unresolved>");
        let name = if raw_name == "<init>" {
            this_class_name
        } else {
            raw_name
        };
        let (params, return_type) = method_descriptor_parts(class_file, method.descriptor_index);
        let flags = method_flag_words(method);
        if raw_name == "<clinit>" {
            writeln!(out, "  {flags}{{}};")?;
        } else if raw_name == "<init>" {
            writeln!(out, "  {flags}{name}({params});")?;
        } else {
            writeln!(out, "  {flags}{return_type} {name}({params});")?;
        }

        if args.disassemble {
            disassemble(method, out)?;
        }
    }
    Ok(())
}

fn method_flag_words(method: &MethodInfo) -> String {
    let words: Vec<&str> = method
        .access_flags
        .iter()
        .map(|f| match f {
            MethodAccessFlags::Public => "public",
            MethodAccessFlags::Private => "private",
            MethodAccessFlags::Protected => "protected",
            MethodAccessFlags::Static => "static",
            MethodAccessFlags::Final => "final",
            MethodAccessFlags::Synchronized => "synchronized",
            MethodAccessFlags::Bridge => "bridge",
            MethodAccessFlags::Varargs => "varargs",
            MethodAccessFlags::Native => "native",
            MethodAccessFlags::Abstract => "abstract",
            MethodAccessFlags::Strict => "strictfp",
            MethodAccessFlags::Synthetic => "synthetic",
        })
        .collect();
    if words.is_empty() {
        String::new()
    } else {
        format!("{} ", words.join(" "))
    }
}

/// Prints one line per code-array byte as `offset: mnemonic`. This walks the
/// array linearly without consuming operand widths, so a multi-byte
/// instruction's operand bytes get their own (meaningless on their own)
/// mnemonic lines too — matching the decoder's own non-goal of not parsing
/// operands.
fn disassemble(method: &MethodInfo, out: &mut Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    for attribute in &method.attributes {
        if let Attribute::Code(code) = attribute {
            writeln!(out, "    Code:")?;
            for (offset, mnemonic) in &code.instructions {
                writeln!(out, "      {offset:>5}: {mnemonic}")?;
            }
        }
    }
    Ok(())
}
