//! JVM field types as encoded in descriptors.
use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use crate::{macros::see_jvm_spec, references::ClassRef};

/// A primitive type in Java.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum PrimitiveType {
    /// The `boolean` type.
    Boolean,
    /// The `char` type.
    Char,
    /// The `float` type.
    Float,
    /// The `double` type.
    Double,
    /// The `byte` type.
    Byte,
    /// The `short` type.
    Short,
    /// The `int` type.
    Int,
    /// The `long` type.
    Long,
}

impl PrimitiveType {
    pub(crate) fn descriptor_str(self) -> &'static str {
        match self {
            Self::Boolean => "Z",
            Self::Char => "C",
            Self::Float => "F",
            Self::Double => "D",
            Self::Byte => "B",
            Self::Short => "S",
            Self::Int => "I",
            Self::Long => "J",
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Char => write!(f, "char"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
        }
    }
}

impl TryFrom<char> for PrimitiveType {
    type Error = InvalidDescriptor;

    fn try_from(descriptor: char) -> Result<Self, Self::Error> {
        match descriptor {
            'Z' => Ok(Self::Boolean),
            'C' => Ok(Self::Char),
            'F' => Ok(Self::Float),
            'D' => Ok(Self::Double),
            'B' => Ok(Self::Byte),
            'S' => Ok(Self::Short),
            'I' => Ok(Self::Int),
            'J' => Ok(Self::Long),
            unexpected => Err(InvalidDescriptor(unexpected.to_string())),
        }
    }
}

/// A field type (non-generic) in Java.
#[doc = see_jvm_spec!(4, 3, 2)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum FieldType {
    /// A primitive type.
    Base(PrimitiveType),
    /// A reference type, except arrays.
    Object(ClassRef),
    /// An array type.
    Array(Box<FieldType>),
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base(it) => it.fmt(f),
            Self::Object(it) => it.fmt(f),
            Self::Array(it) => write!(f, "{it}[]"),
        }
    }
}

impl FromStr for FieldType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars();
        match chars.next() {
            Some('[') => Self::from_str(chars.as_str())
                .map(FieldType::into_array_type)
                .map_err(|_| InvalidDescriptor(descriptor.to_owned())),
            Some('L') => {
                let class_name = chars.take_while_ref(|it| it != &';').collect::<String>();
                match (chars.next(), chars.next()) {
                    (Some(';'), None) => Ok(Self::Object(ClassRef::new(class_name))),
                    _ => Err(InvalidDescriptor(descriptor.to_owned())),
                }
            }
            Some(c) => match chars.next() {
                None => PrimitiveType::try_from(c).map(Self::Base),
                _ => Err(InvalidDescriptor(descriptor.to_owned())),
            },
            None => Err(InvalidDescriptor(descriptor.to_owned())),
        }
    }
}

impl FieldType {
    /// Creates an array type with `self` as the element type.
    #[must_use]
    pub fn into_array_type(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// Renders the type back into its descriptor form.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Base(it) => it.descriptor_str().to_owned(),
            FieldType::Object(ClassRef { binary_name }) => format!("L{binary_name};"),
            FieldType::Array(inner) => format!("[{}", inner.descriptor()),
        }
    }

    /// The class named by this type, unwrapping arrays down to the element
    /// type. Primitives (and arrays of primitives) name no class.
    #[must_use]
    pub fn element_class(&self) -> Option<&ClassRef> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(it) => Some(it),
            FieldType::Array(inner) => inner.element_class(),
        }
    }
}

impl From<PrimitiveType> for FieldType {
    fn from(it: PrimitiveType) -> Self {
        FieldType::Base(it)
    }
}

/// An error indicating that a descriptor string is malformed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid descriptor: {0}")]
pub struct InvalidDescriptor(pub String);

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::tests::arb_class_name;

    use super::*;

    #[test]
    fn primitive_type_descriptor_str() {
        assert_eq!(PrimitiveType::Boolean.descriptor_str(), "Z");
        assert_eq!(PrimitiveType::Char.descriptor_str(), "C");
        assert_eq!(PrimitiveType::Float.descriptor_str(), "F");
        assert_eq!(PrimitiveType::Double.descriptor_str(), "D");
        assert_eq!(PrimitiveType::Byte.descriptor_str(), "B");
        assert_eq!(PrimitiveType::Short.descriptor_str(), "S");
        assert_eq!(PrimitiveType::Int.descriptor_str(), "I");
        assert_eq!(PrimitiveType::Long.descriptor_str(), "J");
    }

    #[test]
    fn field_type_display() {
        assert_eq!(
            FieldType::Base(PrimitiveType::Boolean).to_string(),
            "boolean"
        );
        assert_eq!(
            FieldType::Object(ClassRef::new("java/lang/Object")).to_string(),
            "java/lang/Object"
        );
        assert_eq!(
            FieldType::Base(PrimitiveType::Int)
                .into_array_type()
                .to_string(),
            "int[]"
        );
        assert_eq!(
            FieldType::Object(ClassRef::new("java/lang/Object"))
                .into_array_type()
                .to_string(),
            "java/lang/Object[]"
        );
    }

    #[test]
    fn element_class_unwraps_arrays() {
        let ty = FieldType::from_str("[[Lp/Elem;").unwrap();
        assert_eq!(ty.element_class(), Some(&ClassRef::new("p/Elem")));
        let prim = FieldType::from_str("[[I").unwrap();
        assert_eq!(prim.element_class(), None);
    }

    proptest! {
        #[test]
        fn field_type_from_str_class(class_name in arb_class_name()) {
            let s = format!("L{class_name};");
            let expected = FieldType::Object(ClassRef::new(class_name));
            assert_eq!(FieldType::from_str(&s), Ok(expected));
        }

        #[test]
        fn field_type_round_trips(
            base in prop_oneof![
                any::<PrimitiveType>().prop_map(FieldType::Base),
                arb_class_name().prop_map(|it| FieldType::Object(ClassRef::new(it))),
            ],
            dimension in 0u8..=6,
        ) {
            let ty = (0..dimension).fold(base, |acc, _| acc.into_array_type());
            let descriptor = ty.descriptor();
            assert_eq!(FieldType::from_str(&descriptor), Ok(ty));
        }

        #[test]
        fn should_reject_invalid_primitive_type(s in r"[^ZCFDBSIJ\[L].*") {
            assert!(FieldType::from_str(&s).is_err());
        }
    }

    #[test]
    fn rejects_unterminated_object_type() {
        assert!(FieldType::from_str("Ljava/lang/Object").is_err());
        assert!(FieldType::from_str("[[Ljava/lang/Object").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(FieldType::from_str("II").is_err());
        assert!(FieldType::from_str("Lp/A;x").is_err());
    }
}
