//! Concrete locations of findings inside the verified plugin.

use crate::types::method_descriptor::MethodDescriptor;

/// The location of a class.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{class_name}")]
pub struct ClassLocation {
    /// The binary name of the class.
    pub class_name: String,
}

/// The location of a method declaration.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{class_name}.{method_name}{descriptor}")]
pub struct MethodLocation {
    /// The binary name of the declaring class.
    pub class_name: String,
    /// The name of the method.
    pub method_name: String,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
}

/// The location of a field declaration.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{class_name}.{field_name}")]
pub struct FieldLocation {
    /// The binary name of the declaring class.
    pub class_name: String,
    /// The name of the field.
    pub field_name: String,
}

/// The location of one instruction inside a method body.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{method} at instruction {index} ({mnemonic})")]
pub struct InstructionLocation {
    /// The enclosing method.
    pub method: MethodLocation,
    /// The index of the instruction in the method body.
    pub index: usize,
    /// The mnemonic of the instruction's opcode.
    pub mnemonic: &'static str,
}

/// Any location a problem or usage can point at.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display, derive_more::From)]
pub enum Location {
    /// A class declaration.
    Class(ClassLocation),
    /// A method declaration.
    Method(MethodLocation),
    /// A field declaration.
    Field(FieldLocation),
    /// An instruction inside a method body.
    Instruction(InstructionLocation),
}

impl Location {
    /// The binary name of the class enclosing the location.
    #[must_use]
    pub fn enclosing_class(&self) -> &str {
        match self {
            Location::Class(it) => &it.class_name,
            Location::Method(it) => &it.class_name,
            Location::Field(it) => &it.class_name,
            Location::Instruction(it) => &it.method.class_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let method = MethodLocation {
            class_name: "q/B".into(),
            method_name: "run".into(),
            descriptor: "()V".parse().unwrap(),
        };
        assert_eq!(method.to_string(), "q/B.run()V");
        let instruction = InstructionLocation {
            method,
            index: 3,
            mnemonic: "invokevirtual",
        };
        assert_eq!(
            instruction.to_string(),
            "q/B.run()V at instruction 3 (invokevirtual)"
        );
    }

    #[test]
    fn enclosing_class_of_each_variant() {
        let loc: Location = ClassLocation {
            class_name: "a/B".into(),
        }
        .into();
        assert_eq!(loc.enclosing_class(), "a/B");
        let loc: Location = FieldLocation {
            class_name: "a/C".into(),
            field_name: "f".into(),
        }
        .into();
        assert_eq!(loc.enclosing_class(), "a/C");
    }
}
