//! Builders for synthetic classes shared by the integration tests.

use percolator::{
    access::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    classes::{ClassNode, FieldNode, Instruction, MethodNode},
    dependencies::{DependencyFindResult, DependencyFinder},
    references::{ClassRef, FieldRef, MethodRef},
    resolvers::FixedResolver,
    verification::{CancellationToken, IdeDescriptor, PluginDetails, VerifierParameters},
};

pub fn class(name: &str) -> ClassNode {
    ClassNode {
        name: name.to_owned(),
        access: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        super_name: Some("java/lang/Object".to_owned()),
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        is_deprecated: false,
        is_experimental: false,
        is_internal_api: false,
    }
}

pub fn interface(name: &str) -> ClassNode {
    ClassNode {
        access: ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT,
        ..class(name)
    }
}

pub fn method(name: &str, descriptor: &str) -> MethodNode {
    MethodNode {
        name: name.to_owned(),
        descriptor: descriptor.parse().expect("test descriptor"),
        access: MethodAccessFlags::PUBLIC,
        instructions: Vec::new(),
        is_deprecated: false,
    }
}

pub fn field(name: &str, descriptor: &str) -> FieldNode {
    FieldNode {
        name: name.to_owned(),
        field_type: descriptor.parse().expect("test descriptor"),
        access: FieldAccessFlags::PUBLIC,
        constant_value: None,
        is_deprecated: false,
    }
}

pub fn method_ref(owner: &str, name: &str, descriptor: &str) -> MethodRef {
    MethodRef {
        owner: ClassRef::new(owner),
        name: name.to_owned(),
        descriptor: descriptor.parse().expect("test descriptor"),
    }
}

pub fn field_ref(owner: &str, name: &str, descriptor: &str) -> FieldRef {
    FieldRef {
        owner: ClassRef::new(owner),
        name: name.to_owned(),
        field_type: descriptor.parse().expect("test descriptor"),
    }
}

/// A `java/lang/Object` with the members the resolution algorithms consult.
pub fn object_class() -> ClassNode {
    let mut object = class("java/lang/Object");
    object.super_name = None;
    object.methods = vec![
        method("<init>", "()V"),
        method("toString", "()Ljava/lang/String;"),
        method("hashCode", "()I"),
        method("equals", "(Ljava/lang/Object;)Z"),
    ];
    object
}

/// A dependency finder that knows no plugins.
#[derive(Debug)]
pub struct NoDependencies;

impl DependencyFinder for NoDependencies {
    fn find(&self, _plugin_id: &str) -> DependencyFindResult {
        DependencyFindResult::NotFound("no dependency source configured".to_owned())
    }
}

pub fn ide(classes: Vec<ClassNode>) -> IdeDescriptor {
    IdeDescriptor {
        version: "IU-251.1".to_owned(),
        resolver: Box::new(FixedResolver::from_classes(
            classes.into_iter().chain([object_class()]),
        )),
        bundled_jdk: None,
    }
}

pub fn plugin(id: &str, classes: Vec<ClassNode>) -> PluginDetails {
    let classes_to_check = classes.iter().map(|c| c.name.clone()).collect();
    PluginDetails {
        plugin_id: id.to_owned(),
        declared_dependencies: Vec::new(),
        resolver: Box::new(FixedResolver::from_classes(classes)),
        classes_to_check,
        structure_warnings: Vec::new(),
    }
}

pub fn run(
    ide: IdeDescriptor,
    plugin: PluginDetails,
    params: VerifierParameters,
) -> percolator::verification::VerificationResult {
    percolator::verification::verify_plugin(
        ide,
        None,
        plugin,
        &NoDependencies,
        params,
        &CancellationToken::new(),
    )
}

/// Convenience for the common `new` instruction.
pub fn new_instruction(type_name: &str) -> Instruction {
    Instruction::Type {
        kind: percolator::classes::TypeOpKind::New,
        type_name: type_name.to_owned(),
    }
}
