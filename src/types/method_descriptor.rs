//! Non-generic JVM method descriptors.

use itertools::Itertools;
use std::str::FromStr;

use crate::{macros::see_jvm_spec, references::ClassRef};

use super::field_type::{FieldType, InvalidDescriptor, PrimitiveType};

/// The descriptor of a method.
/// Consists of the parameter types and the return type.
#[doc = see_jvm_spec!(4, 3, 3)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, derive_more::Display)]
#[display(
    "({}){}",
    parameter_types.iter().map(FieldType::descriptor).join(""),
    return_type.descriptor()
)]
pub struct MethodDescriptor {
    /// The types of the parameters.
    pub parameter_types: Vec<FieldType>,
    /// The return type.
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// Renders the descriptor back into its string form (e.g. `(Lx/Y;I)V`).
    #[must_use]
    pub fn descriptor(&self) -> String {
        format!(
            "({}){}",
            self.parameter_types.iter().map(FieldType::descriptor).join(""),
            self.return_type.descriptor(),
        )
    }
}

/// Denotes the return type of a method.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, derive_more::Display, derive_more::From,
)]
pub enum ReturnType {
    /// The method returns a specific type.
    Some(FieldType),
    /// The return type of the method is `void`.
    #[display("void")]
    Void,
}

const PARAM_START: char = '(';
const PARAM_END: char = ')';
const ARRAY_MARKER: char = '[';
const OBJECT_MARKER: char = 'L';
const OBJECT_END: char = ';';

impl FromStr for MethodDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let remaining = descriptor
            .strip_prefix(PARAM_START)
            .ok_or_else(|| InvalidDescriptor(descriptor.to_owned()))?;
        let (parameter_types, remaining) = parse_params(remaining)
            .map_err(|_| InvalidDescriptor(descriptor.to_owned()))?;
        let return_type = ReturnType::from_str(remaining)
            .map_err(|_| InvalidDescriptor(descriptor.to_owned()))?;
        Ok(Self {
            parameter_types,
            return_type,
        })
    }
}

fn parse_params(mut remaining: &str) -> Result<(Vec<FieldType>, &str), InvalidDescriptor> {
    let mut parameter_types = Vec::new();
    loop {
        if let Some(remaining) = remaining.strip_prefix(PARAM_END) {
            return Ok((parameter_types, remaining));
        }
        let (dimension, after_dim) = parse_array_dimension(remaining)?;
        let (base_type, after_param) = parse_next_param(after_dim)?;
        let param_type = (0..dimension).fold(base_type, |acc, _| acc.into_array_type());
        parameter_types.push(param_type);
        remaining = after_param;
    }
}

fn parse_next_param(input: &str) -> Result<(FieldType, &str), InvalidDescriptor> {
    let (first_char, remaining) = input
        .chars()
        .next()
        .map(|c| (c, &input[c.len_utf8()..]))
        .ok_or_else(|| InvalidDescriptor(input.to_owned()))?;

    match first_char {
        primitive @ ('Z' | 'C' | 'F' | 'D' | 'B' | 'S' | 'I' | 'J') => {
            let param_type = PrimitiveType::try_from(primitive).map(Into::into)?;
            Ok((param_type, remaining))
        }
        OBJECT_MARKER => {
            let (class_name, rest) = remaining
                .split_once(OBJECT_END)
                .ok_or_else(|| InvalidDescriptor(input.to_owned()))?;
            Ok((FieldType::Object(ClassRef::new(class_name)), rest))
        }
        _ => Err(InvalidDescriptor(input.to_owned())),
    }
}

fn parse_array_dimension(input: &str) -> Result<(u8, &str), InvalidDescriptor> {
    let count = input.chars().take_while(|&c| c == ARRAY_MARKER).count();
    let remaining = &input[count..];
    let dimension = u8::try_from(count).map_err(|_| InvalidDescriptor(input.to_owned()))?;
    Ok((dimension, remaining))
}

impl FromStr for ReturnType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor == "V" {
            Ok(ReturnType::Void)
        } else {
            FieldType::from_str(descriptor).map(ReturnType::Some)
        }
    }
}

impl ReturnType {
    /// Returns the descriptor of the return type.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            ReturnType::Some(it) => it.descriptor(),
            ReturnType::Void => "V".to_owned(),
        }
    }
}
