//! The class-file AST the verifiers operate on.
//!
//! Nodes are produced by an external bytecode reader (see [`ClassFileReader`])
//! and are immutable once built. Resolvers hand them out as [`std::sync::Arc`]s
//! that stay valid for the whole verification run.

use crate::{
    access::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    references::{ClassRef, FieldRef, MethodRef},
    types::{field_type::FieldType, method_descriptor::MethodDescriptor},
};

/// One loaded class or interface.
#[derive(Debug, Clone)]
pub struct ClassNode {
    /// The binary name of the class (e.g. `org/acme/Widget`).
    pub name: String,
    /// The access flags of the class.
    pub access: ClassAccessFlags,
    /// The binary name of the superclass. `None` for `java/lang/Object`.
    pub super_name: Option<String>,
    /// The binary names of the implemented interfaces, in declaration order.
    pub interfaces: Vec<String>,
    /// The fields declared in the class, in declaration order.
    pub fields: Vec<FieldNode>,
    /// The methods declared in the class, in declaration order.
    pub methods: Vec<MethodNode>,
    /// Whether the class is marked deprecated.
    pub is_deprecated: bool,
    /// Whether the class is marked as experimental API.
    pub is_experimental: bool,
    /// Whether the class is marked as internal API.
    pub is_internal_api: bool,
}

impl ClassNode {
    /// Whether the node describes an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.contains(ClassAccessFlags::INTERFACE)
    }

    /// Whether the class is declared `final`.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.access.contains(ClassAccessFlags::FINAL)
    }

    /// Whether the class is declared `abstract`.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access.contains(ClassAccessFlags::ABSTRACT)
    }

    /// Gets a declared method by name and descriptor.
    #[must_use]
    pub fn get_method(&self, name: &str, descriptor: &MethodDescriptor) -> Option<&MethodNode> {
        self.methods
            .iter()
            .find(|m| m.name == name && &m.descriptor == descriptor)
    }

    /// Gets a declared field by name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Creates a [`ClassRef`] referring to this class.
    #[must_use]
    pub fn as_ref(&self) -> ClassRef {
        ClassRef::new(self.name.clone())
    }
}

/// One declared method.
#[derive(Debug, Clone)]
pub struct MethodNode {
    /// The name of the method.
    pub name: String,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
    /// The access flags of the method.
    pub access: MethodAccessFlags,
    /// The instructions of the method body. Empty for abstract and native
    /// methods.
    pub instructions: Vec<Instruction>,
    /// Whether the method is marked deprecated.
    pub is_deprecated: bool,
}

impl MethodNode {
    /// Whether the method is declared `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access.contains(MethodAccessFlags::STATIC)
    }

    /// Whether the method is declared `abstract`.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access.contains(MethodAccessFlags::ABSTRACT)
    }

    /// Whether the method is declared `final`.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.access.contains(MethodAccessFlags::FINAL)
    }

    /// Whether the method is declared `private`.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.access.contains(MethodAccessFlags::PRIVATE)
    }

    /// Whether the method is synthesized by the compiler.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.access.contains(MethodAccessFlags::SYNTHETIC)
    }

    /// Whether the method is a compiler-generated bridge.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.access.contains(MethodAccessFlags::BRIDGE)
    }

    /// Creates a [`MethodRef`] referring to this method as declared in
    /// `owner`.
    #[must_use]
    pub fn as_ref(&self, owner: &ClassNode) -> MethodRef {
        MethodRef {
            owner: owner.as_ref(),
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldNode {
    /// The name of the field.
    pub name: String,
    /// The declared type of the field.
    pub field_type: FieldType,
    /// The access flags of the field.
    pub access: FieldAccessFlags,
    /// The constant value of the field, if it has a `ConstantValue` attribute.
    pub constant_value: Option<ConstantValue>,
    /// Whether the field is marked deprecated.
    pub is_deprecated: bool,
}

impl FieldNode {
    /// Whether the field is declared `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access.contains(FieldAccessFlags::STATIC)
    }

    /// Whether the field is declared `final`.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.access.contains(FieldAccessFlags::FINAL)
    }

    /// Creates a [`FieldRef`] referring to this field as declared in `owner`.
    #[must_use]
    pub fn as_ref(&self, owner: &ClassNode) -> FieldRef {
        FieldRef {
            owner: owner.as_ref(),
            name: self.name.clone(),
            field_type: self.field_type.clone(),
        }
    }
}

/// A compile-time constant stored in a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// An `int`-family constant.
    Integer(i32),
    /// A `long` constant.
    Long(i64),
    /// A `float` constant.
    Float(f32),
    /// A `double` constant.
    Double(f64),
    /// A string constant.
    String(String),
}

/// One bytecode instruction, collapsed to the opcode families the analysis
/// inspects. Everything else (loads, stores, arithmetic, control flow) is
/// [`Instruction::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// A method invocation.
    Invoke {
        /// Which of the four invocation opcodes this is.
        kind: InvokeKind,
        /// The invoked method.
        method: MethodRef,
        /// The `itf` flag of the constant-pool reference: `true` when the
        /// owner is named as an interface.
        interface: bool,
    },
    /// A field read or write.
    Field {
        /// Which of the four field-access opcodes this is.
        kind: FieldOpKind,
        /// The accessed field.
        field: FieldRef,
    },
    /// An instruction operating on a type operand. The operand is either an
    /// internal class name or, for `checkcast`/`instanceof`/`multianewarray`,
    /// possibly an array descriptor such as `[[Lx/Y;`.
    Type {
        /// Which type-operand opcode this is.
        kind: TypeOpKind,
        /// The type operand as written in the constant pool.
        type_name: String,
    },
    /// An `ldc` of a class literal.
    LoadClassConstant {
        /// The type operand of the loaded class literal.
        type_name: String,
    },
    /// Any instruction the analysis does not inspect.
    Other,
}

/// The four invocation opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// `invokevirtual`
    Virtual,
    /// `invokespecial`
    Special,
    /// `invokeinterface`
    Interface,
    /// `invokestatic`
    Static,
}

/// The four field-access opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOpKind {
    /// `getfield`
    GetField,
    /// `putfield`
    PutField,
    /// `getstatic`
    GetStatic,
    /// `putstatic`
    PutStatic,
}

impl FieldOpKind {
    /// Whether the opcode accesses a static field.
    #[must_use]
    pub fn is_static_access(self) -> bool {
        matches!(self, Self::GetStatic | Self::PutStatic)
    }

    /// Whether the opcode writes to the field.
    #[must_use]
    pub fn is_write(self) -> bool {
        matches!(self, Self::PutField | Self::PutStatic)
    }
}

/// The instructions carrying a type operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOpKind {
    /// `new`
    New,
    /// `checkcast`
    CheckCast,
    /// `instanceof`
    InstanceOf,
    /// `anewarray`
    ANewArray,
    /// `multianewarray`
    MultiANewArray,
}

impl Instruction {
    /// The mnemonic of the instruction, for locations and reports.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Invoke { kind, .. } => match kind {
                InvokeKind::Virtual => "invokevirtual",
                InvokeKind::Special => "invokespecial",
                InvokeKind::Interface => "invokeinterface",
                InvokeKind::Static => "invokestatic",
            },
            Instruction::Field { kind, .. } => match kind {
                FieldOpKind::GetField => "getfield",
                FieldOpKind::PutField => "putfield",
                FieldOpKind::GetStatic => "getstatic",
                FieldOpKind::PutStatic => "putstatic",
            },
            Instruction::Type { kind, .. } => match kind {
                TypeOpKind::New => "new",
                TypeOpKind::CheckCast => "checkcast",
                TypeOpKind::InstanceOf => "instanceof",
                TypeOpKind::ANewArray => "anewarray",
                TypeOpKind::MultiANewArray => "multianewarray",
            },
            Instruction::LoadClassConstant { .. } => "ldc",
            Instruction::Other => "other",
        }
    }
}

/// The bytecode-reader collaborator.
///
/// Parsing class files is out of scope for this crate; class pools hand raw
/// bytes to an injected reader and expect a [`ClassNode`] back.
pub trait ClassFileReader: std::fmt::Debug {
    /// Builds the AST of the class named `binary_name` from `bytes`.
    ///
    /// # Errors
    /// [`InvalidClassFile`] when the bytes do not form a well-formed class
    /// file of a supported version.
    fn read(&self, binary_name: &str, bytes: &[u8]) -> Result<ClassNode, InvalidClassFile>;
}

/// An error produced by a [`ClassFileReader`] on malformed input.
#[derive(Debug, thiserror::Error)]
#[error("Invalid class file {class_name}: {message}")]
pub struct InvalidClassFile {
    /// The binary name the reader was asked for.
    pub class_name: String,
    /// The reader's diagnostic.
    pub message: String,
}
