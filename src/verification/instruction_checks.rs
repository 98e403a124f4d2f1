//! Instruction-level verifiers: invocations, field accesses, and type
//! operands.

use std::sync::Arc;

use crate::{
    classes::{ClassNode, FieldOpKind, Instruction, InvokeKind, MethodNode, TypeOpKind},
    hierarchy,
    locations::{InstructionLocation, Location, MethodLocation},
    problems::Problem,
    references::{CLASS_INITIALIZER_NAME, CONSTRUCTOR_NAME, FieldRef, MethodRef},
    resolution::{
        FieldLookup, MethodLookup, ResolvedMethod,
        fields::resolve_field,
        methods::{resolve_class_method, resolve_interface_method},
    },
    types::field_type::FieldType,
};

use super::context::VerificationContext;

pub(crate) fn verify(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    method: &MethodNode,
    index: usize,
    instruction: &Instruction,
) {
    let usage = Location::Instruction(InstructionLocation {
        method: MethodLocation {
            class_name: class.name.clone(),
            method_name: method.name.clone(),
            descriptor: method.descriptor.clone(),
        },
        index,
        mnemonic: instruction.mnemonic(),
    });
    match instruction {
        Instruction::Invoke {
            kind,
            method: reference,
            interface,
        } => verify_invoke(ctx, class, *kind, reference, *interface, &usage),
        Instruction::Field {
            kind,
            field: reference,
        } => verify_field_access(ctx, class, method, *kind, reference, &usage),
        Instruction::Type { kind, type_name } => {
            verify_type_op(ctx, class, *kind, type_name, &usage);
        }
        Instruction::LoadClassConstant { type_name } => {
            resolve_type_operand(ctx, class, type_name, &usage);
        }
        Instruction::Other => {}
    }
}

/// Resolves a type operand, unwrapping array descriptors to their element
/// class. Primitive operands resolve to nothing and are never missing.
fn resolve_type_operand(
    ctx: &mut VerificationContext<'_>,
    from: &Arc<ClassNode>,
    type_name: &str,
    usage: &Location,
) -> Option<Arc<ClassNode>> {
    if type_name.starts_with('[') {
        let descriptor: FieldType = type_name.parse().ok()?;
        let element = descriptor.element_class()?.binary_name.clone();
        ctx.resolve_class_ref(&element, from, usage)
    } else {
        ctx.resolve_class_ref(type_name, from, usage)
    }
}

fn verify_invoke(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    kind: InvokeKind,
    reference: &MethodRef,
    itf_flag: bool,
    usage: &Location,
) {
    // Invocations on array types (clone and the Object methods) resolve
    // against java/lang/Object.
    let owner_name = if reference.owner.binary_name.starts_with('[') {
        hierarchy::OBJECT
    } else {
        reference.owner.binary_name.as_str()
    };
    let Some(owner) = ctx.resolve_class_ref(owner_name, class, usage) else {
        return;
    };

    let interface_resolution = match kind {
        InvokeKind::Interface => true,
        InvokeKind::Special | InvokeKind::Static => itf_flag,
        InvokeKind::Virtual => false,
    };
    if interface_resolution && !owner.is_interface() {
        ctx.register(Problem::IncompatibleInterfaceToClassChange {
            class_name: owner.name.clone(),
            usage: usage.clone(),
        });
        return;
    }
    if !interface_resolution && owner.is_interface() {
        let problem = match kind {
            InvokeKind::Virtual | InvokeKind::Special => Problem::InvokeClassMethodOnInterface {
                class_name: owner.name.clone(),
                usage: usage.clone(),
            },
            InvokeKind::Static => Problem::IncompatibleClassToInterfaceChange {
                class_name: owner.name.clone(),
                usage: usage.clone(),
            },
            InvokeKind::Interface => unreachable!("interface invocations resolve as interfaces"),
        };
        ctx.register(problem);
        return;
    }

    let lookup = if reference.name == CONSTRUCTOR_NAME {
        // Constructors are not inherited; the reference must name the class
        // that declares them.
        match owner
            .methods
            .iter()
            .position(|m| m.name == reference.name && m.descriptor == reference.descriptor)
        {
            Some(index) => MethodLookup::Found(ResolvedMethod {
                class: Arc::clone(&owner),
                index,
            }),
            None => MethodLookup::NotFound,
        }
    } else if interface_resolution {
        resolve_interface_method(ctx, &owner, reference, usage)
    } else {
        resolve_class_method(ctx, &owner, reference, usage)
    };
    let resolved = match lookup {
        MethodLookup::Found(resolved) => resolved,
        MethodLookup::NotFound => {
            ctx.register(Problem::MethodNotFound {
                method: reference.clone(),
                usage: usage.clone(),
            });
            return;
        }
        MethodLookup::Failed => return,
    };

    let target = resolved.method();
    let resolved_ref = target.as_ref(&resolved.class);
    match kind {
        InvokeKind::Virtual if target.is_static() => {
            ctx.register(Problem::InvokeVirtualOnStaticMethod {
                method: resolved_ref,
                usage: usage.clone(),
            });
            return;
        }
        InvokeKind::Special if target.is_static() => {
            ctx.register(Problem::InvokeSpecialOnStaticMethod {
                method: resolved_ref,
                usage: usage.clone(),
            });
            return;
        }
        InvokeKind::Interface if target.is_private() => {
            ctx.register(Problem::InvokeInterfaceOnPrivateMethod {
                method: resolved_ref,
                usage: usage.clone(),
            });
            return;
        }
        InvokeKind::Interface if target.is_static() => {
            ctx.register(Problem::InvokeInterfaceOnStaticMethod {
                method: resolved_ref,
                usage: usage.clone(),
            });
            return;
        }
        InvokeKind::Static if !target.is_static() => {
            ctx.register(Problem::InvokeStaticOnInstanceMethod {
                method: resolved_ref,
                usage: usage.clone(),
            });
            return;
        }
        _ => {}
    }

    ctx.check_method_access(&resolved, &owner, class, usage);
    if kind == InvokeKind::Special && resolved.method().is_abstract() {
        ctx.register(Problem::AbstractMethodInvocation {
            method: resolved.method().as_ref(&resolved.class),
            usage: usage.clone(),
        });
    }
    ctx.record_method_usage(&resolved, usage);
}

fn verify_field_access(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    enclosing_method: &MethodNode,
    kind: FieldOpKind,
    reference: &FieldRef,
    usage: &Location,
) {
    if reference.owner.binary_name.starts_with('[') {
        // Arrays have no fields; such bytecode never links anywhere.
        return;
    }
    let Some(owner) = ctx.resolve_class_ref(&reference.owner.binary_name, class, usage) else {
        return;
    };
    let resolved = match resolve_field(ctx, &owner, reference, usage) {
        FieldLookup::Found(resolved) => resolved,
        FieldLookup::NotFound => {
            ctx.register(Problem::FieldNotFound {
                field: reference.clone(),
                usage: usage.clone(),
            });
            return;
        }
        FieldLookup::Failed => return,
    };

    let target = resolved.field();
    let resolved_ref = target.as_ref(&resolved.class);
    if kind.is_static_access() && !target.is_static() {
        ctx.register(Problem::StaticAccessOfInstanceField {
            field: resolved_ref,
            usage: usage.clone(),
        });
        return;
    }
    if !kind.is_static_access() && target.is_static() {
        ctx.register(Problem::InstanceAccessOfStaticField {
            field: resolved_ref,
            usage: usage.clone(),
        });
        return;
    }
    if kind.is_write() && target.is_final() {
        let same_class = resolved.class.name == class.name;
        let in_initializer = enclosing_method.name == CONSTRUCTOR_NAME
            || enclosing_method.name == CLASS_INITIALIZER_NAME;
        if !(same_class && in_initializer) {
            ctx.register(Problem::ChangeFinalField {
                field: resolved_ref,
                usage: usage.clone(),
            });
        }
    }

    ctx.check_field_access(&resolved, &owner, class, usage);
    ctx.record_field_usage(&resolved, usage);
}

fn verify_type_op(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    kind: TypeOpKind,
    type_name: &str,
    usage: &Location,
) {
    let Some(target) = resolve_type_operand(ctx, class, type_name, usage) else {
        return;
    };
    if kind == TypeOpKind::New {
        if target.is_interface() {
            ctx.register(Problem::InterfaceInstantiation {
                class_name: target.name.clone(),
                usage: usage.clone(),
            });
        } else if target.is_abstract() {
            ctx.register(Problem::AbstractClassInstantiation {
                class_name: target.name.clone(),
                usage: usage.clone(),
            });
        }
    }
}
