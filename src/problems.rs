//! The compatibility problems the engine can report.
//!
//! The enumeration of kinds is the crate's public contract: every kind carries
//! exactly the references and locations its report needs, and rendering is a
//! pattern match on the tag.

use std::fmt::Display;

use crate::{
    access::AccessLevel,
    locations::{ClassLocation, Location, MethodLocation},
    references::{FieldRef, MethodRef},
};

/// One verified defect.
///
/// Within a run each distinct value is reported at most once; the registrar
/// deduplicates structurally equal problems.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
#[non_exhaustive]
pub enum Problem {
    /// A referenced class is absent from every layer of the classpath.
    ClassNotFound {
        /// The binary name of the missing class.
        class_name: String,
        /// Where the reference occurs.
        usage: Location,
    },
    /// A rollup of [`Problem::ClassNotFound`]s sharing a common package
    /// prefix. Replaces its children in the top-level listing; the children
    /// are retained for detail views.
    PackageNotFound {
        /// The common package prefix.
        package: String,
        /// The collapsed `ClassNotFound` problems.
        missing: Vec<Problem>,
    },
    /// A referenced class exists but its bytes do not form a valid class file.
    InvalidClassFile {
        /// The binary name of the broken class.
        class_name: String,
        /// The reader's diagnostic.
        reason: String,
        /// The first reference that triggered the read.
        usage: Location,
    },
    /// A referenced class exists but reading it failed with an I/O error.
    FailedToReadClassFile {
        /// The binary name of the unreadable class.
        class_name: String,
        /// The underlying error.
        reason: String,
        /// The first reference that triggered the read.
        usage: Location,
    },
    /// A referenced class is not accessible from the referencing class.
    IllegalClassAccess {
        /// The binary name of the inaccessible class.
        class_name: String,
        /// The declared visibility of the class.
        level: AccessLevel,
        /// Where the reference occurs.
        usage: Location,
    },
    /// An invoked method cannot be resolved.
    MethodNotFound {
        /// The unresolved reference.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// A resolved method is not accessible from the invoking class.
    IllegalMethodAccess {
        /// The resolved method, with its declaring class as owner.
        method: MethodRef,
        /// The declared visibility of the method.
        level: AccessLevel,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokespecial` resolves to an abstract method.
    AbstractMethodInvocation {
        /// The resolved abstract method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// A plugin method overrides a method that became `final` in an ancestor.
    OverridingFinalMethod {
        /// The final ancestor method.
        method: MethodRef,
        /// The overriding plugin method.
        location: MethodLocation,
    },
    /// A concrete plugin class inherits an abstract method it never
    /// implements.
    MethodNotImplemented {
        /// The unimplemented abstract method, with its declaring type as
        /// owner.
        method: MethodRef,
        /// The concrete class missing the implementation.
        location: ClassLocation,
    },
    /// Unrelated superinterfaces provide conflicting default implementations
    /// of the same method, and the class overrides none of them.
    MultipleDefaultImplementations {
        /// The conflicted method, with the inheriting class as owner.
        method: MethodRef,
        /// The inheriting class.
        location: ClassLocation,
    },
    /// An `invokevirtual` targets a method that is now static.
    InvokeVirtualOnStaticMethod {
        /// The resolved static method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokespecial` targets a method that is now static.
    InvokeSpecialOnStaticMethod {
        /// The resolved static method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokeinterface` targets a method that is now static.
    InvokeInterfaceOnStaticMethod {
        /// The resolved static method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokeinterface` targets a private method.
    InvokeInterfaceOnPrivateMethod {
        /// The resolved private method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokestatic` targets a method that is now an instance method.
    InvokeStaticOnInstanceMethod {
        /// The resolved instance method.
        method: MethodRef,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// An `invokevirtual` or `invokespecial` names an owner that is now an
    /// interface.
    InvokeClassMethodOnInterface {
        /// The binary name of the owner that became an interface.
        class_name: String,
        /// Where the invocation occurs.
        usage: Location,
    },
    /// A reference that requires a class resolves to an interface.
    IncompatibleClassToInterfaceChange {
        /// The binary name of the type that became an interface.
        class_name: String,
        /// Where the reference occurs.
        usage: Location,
    },
    /// A reference that requires an interface resolves to a class.
    IncompatibleInterfaceToClassChange {
        /// The binary name of the type that became a class.
        class_name: String,
        /// Where the reference occurs.
        usage: Location,
    },
    /// A plugin class extends a class that is now `final`.
    InheritFromFinalClass {
        /// The binary name of the final superclass.
        class_name: String,
        /// The inheriting plugin class.
        location: ClassLocation,
    },
    /// A plugin class extends a type that is now an interface.
    SuperClassBecameInterface {
        /// The binary name of the former class.
        class_name: String,
        /// The inheriting plugin class.
        location: ClassLocation,
    },
    /// A plugin class implements a type that is now a class.
    SuperInterfaceBecameClass {
        /// The binary name of the former interface.
        class_name: String,
        /// The implementing plugin class.
        location: ClassLocation,
    },
    /// A `new` instruction instantiates a type that is now an interface.
    InterfaceInstantiation {
        /// The binary name of the interface.
        class_name: String,
        /// Where the instantiation occurs.
        usage: Location,
    },
    /// A `new` instruction instantiates a class that is now abstract.
    AbstractClassInstantiation {
        /// The binary name of the abstract class.
        class_name: String,
        /// Where the instantiation occurs.
        usage: Location,
    },
    /// An accessed field cannot be resolved.
    FieldNotFound {
        /// The unresolved reference.
        field: FieldRef,
        /// Where the access occurs.
        usage: Location,
    },
    /// A resolved field is not accessible from the accessing class.
    IllegalFieldAccess {
        /// The resolved field, with its declaring class as owner.
        field: FieldRef,
        /// The declared visibility of the field.
        level: AccessLevel,
        /// Where the access occurs.
        usage: Location,
    },
    /// A `getstatic`/`putstatic` targets a field that is now an instance
    /// field.
    StaticAccessOfInstanceField {
        /// The resolved instance field.
        field: FieldRef,
        /// Where the access occurs.
        usage: Location,
    },
    /// A `getfield`/`putfield` targets a field that is now static.
    InstanceAccessOfStaticField {
        /// The resolved static field.
        field: FieldRef,
        /// Where the access occurs.
        usage: Location,
    },
    /// A write to a `final` field outside the declaring class's initializer.
    ChangeFinalField {
        /// The resolved final field.
        field: FieldRef,
        /// Where the write occurs.
        usage: Location,
    },
}

impl Problem {
    /// A one-line category description, stable per kind.
    #[must_use]
    pub fn short_description(&self) -> &'static str {
        match self {
            Problem::ClassNotFound { .. } => "Class not found",
            Problem::PackageNotFound { .. } => "Package not found",
            Problem::InvalidClassFile { .. } => "Invalid class file",
            Problem::FailedToReadClassFile { .. } => "Failed to read class file",
            Problem::IllegalClassAccess { .. } => "Illegal class access",
            Problem::MethodNotFound { .. } => "Method not found",
            Problem::IllegalMethodAccess { .. } => "Illegal method access",
            Problem::AbstractMethodInvocation { .. } => "Invocation of abstract method",
            Problem::OverridingFinalMethod { .. } => "Overriding final method",
            Problem::MethodNotImplemented { .. } => "Abstract method is not implemented",
            Problem::MultipleDefaultImplementations { .. } => {
                "Multiple default implementations of method"
            }
            Problem::InvokeVirtualOnStaticMethod { .. } => {
                "Invocation of invokevirtual on a static method"
            }
            Problem::InvokeSpecialOnStaticMethod { .. } => {
                "Invocation of invokespecial on a static method"
            }
            Problem::InvokeInterfaceOnStaticMethod { .. } => {
                "Invocation of invokeinterface on a static method"
            }
            Problem::InvokeInterfaceOnPrivateMethod { .. } => {
                "Invocation of invokeinterface on a private method"
            }
            Problem::InvokeStaticOnInstanceMethod { .. } => {
                "Invocation of invokestatic on an instance method"
            }
            Problem::InvokeClassMethodOnInterface { .. } => {
                "Invocation of a class method on an interface"
            }
            Problem::IncompatibleClassToInterfaceChange { .. } => {
                "Incompatible change of class to interface"
            }
            Problem::IncompatibleInterfaceToClassChange { .. } => {
                "Incompatible change of interface to class"
            }
            Problem::InheritFromFinalClass { .. } => "Inheritance from a final class",
            Problem::SuperClassBecameInterface { .. } => "Superclass became an interface",
            Problem::SuperInterfaceBecameClass { .. } => "Superinterface became a class",
            Problem::InterfaceInstantiation { .. } => "Instantiation of an interface",
            Problem::AbstractClassInstantiation { .. } => "Instantiation of an abstract class",
            Problem::FieldNotFound { .. } => "Field not found",
            Problem::IllegalFieldAccess { .. } => "Illegal field access",
            Problem::StaticAccessOfInstanceField { .. } => "Static access of an instance field",
            Problem::InstanceAccessOfStaticField { .. } => "Instance access of a static field",
            Problem::ChangeFinalField { .. } => "Write to a final field",
        }
    }

    /// The binary name of the class the finding is located in. For
    /// [`Problem::PackageNotFound`] this is the package prefix itself.
    #[must_use]
    pub fn enclosing_class(&self) -> &str {
        match self {
            Problem::PackageNotFound { package, .. } => package,
            Problem::ClassNotFound { usage, .. }
            | Problem::InvalidClassFile { usage, .. }
            | Problem::FailedToReadClassFile { usage, .. }
            | Problem::IllegalClassAccess { usage, .. }
            | Problem::MethodNotFound { usage, .. }
            | Problem::IllegalMethodAccess { usage, .. }
            | Problem::AbstractMethodInvocation { usage, .. }
            | Problem::InvokeVirtualOnStaticMethod { usage, .. }
            | Problem::InvokeSpecialOnStaticMethod { usage, .. }
            | Problem::InvokeInterfaceOnStaticMethod { usage, .. }
            | Problem::InvokeInterfaceOnPrivateMethod { usage, .. }
            | Problem::InvokeStaticOnInstanceMethod { usage, .. }
            | Problem::InvokeClassMethodOnInterface { usage, .. }
            | Problem::IncompatibleClassToInterfaceChange { usage, .. }
            | Problem::IncompatibleInterfaceToClassChange { usage, .. }
            | Problem::InterfaceInstantiation { usage, .. }
            | Problem::AbstractClassInstantiation { usage, .. }
            | Problem::FieldNotFound { usage, .. }
            | Problem::IllegalFieldAccess { usage, .. }
            | Problem::StaticAccessOfInstanceField { usage, .. }
            | Problem::InstanceAccessOfStaticField { usage, .. }
            | Problem::ChangeFinalField { usage, .. } => usage.enclosing_class(),
            Problem::OverridingFinalMethod { location, .. } => &location.class_name,
            Problem::MethodNotImplemented { location, .. }
            | Problem::MultipleDefaultImplementations { location, .. }
            | Problem::InheritFromFinalClass { location, .. }
            | Problem::SuperClassBecameInterface { location, .. }
            | Problem::SuperInterfaceBecameClass { location, .. } => &location.class_name,
        }
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::ClassNotFound { class_name, usage } => {
                write!(f, "Class {class_name} is not found, referenced at {usage}")
            }
            Problem::PackageNotFound { package, missing } => {
                write!(
                    f,
                    "Package {package} is not found ({} missing classes)",
                    missing.len()
                )
            }
            Problem::InvalidClassFile {
                class_name,
                reason,
                usage,
            } => {
                write!(
                    f,
                    "Class file {class_name} is invalid ({reason}), referenced at {usage}"
                )
            }
            Problem::FailedToReadClassFile {
                class_name,
                reason,
                usage,
            } => {
                write!(
                    f,
                    "Failed to read class file {class_name} ({reason}), referenced at {usage}"
                )
            }
            Problem::IllegalClassAccess {
                class_name,
                level,
                usage,
            } => {
                write!(
                    f,
                    "Class {class_name} is {level} and not accessible from {usage}"
                )
            }
            Problem::MethodNotFound { method, usage } => {
                write!(f, "Method {method} is not found, invoked at {usage}")
            }
            Problem::IllegalMethodAccess {
                method,
                level,
                usage,
            } => {
                write!(
                    f,
                    "Method {method} is {level} and not accessible from {usage}"
                )
            }
            Problem::AbstractMethodInvocation { method, usage } => {
                write!(f, "Abstract method {method} is invoked at {usage}")
            }
            Problem::OverridingFinalMethod { method, location } => {
                write!(f, "Method {location} overrides final method {method}")
            }
            Problem::MethodNotImplemented { method, location } => {
                write!(
                    f,
                    "Concrete class {location} inherits abstract method {method} but does not implement it"
                )
            }
            Problem::MultipleDefaultImplementations { method, location } => {
                write!(
                    f,
                    "Class {location} inherits multiple default implementations of {method}"
                )
            }
            Problem::InvokeVirtualOnStaticMethod { method, usage } => {
                write!(
                    f,
                    "invokevirtual of static method {method} at {usage}"
                )
            }
            Problem::InvokeSpecialOnStaticMethod { method, usage } => {
                write!(f, "invokespecial of static method {method} at {usage}")
            }
            Problem::InvokeInterfaceOnStaticMethod { method, usage } => {
                write!(f, "invokeinterface of static method {method} at {usage}")
            }
            Problem::InvokeInterfaceOnPrivateMethod { method, usage } => {
                write!(f, "invokeinterface of private method {method} at {usage}")
            }
            Problem::InvokeStaticOnInstanceMethod { method, usage } => {
                write!(f, "invokestatic of instance method {method} at {usage}")
            }
            Problem::InvokeClassMethodOnInterface { class_name, usage } => {
                write!(
                    f,
                    "Class method invocation on interface {class_name} at {usage}"
                )
            }
            Problem::IncompatibleClassToInterfaceChange { class_name, usage } => {
                write!(
                    f,
                    "Type {class_name} changed from class to interface, referenced at {usage}"
                )
            }
            Problem::IncompatibleInterfaceToClassChange { class_name, usage } => {
                write!(
                    f,
                    "Type {class_name} changed from interface to class, referenced at {usage}"
                )
            }
            Problem::InheritFromFinalClass {
                class_name,
                location,
            } => {
                write!(f, "Class {location} inherits from final class {class_name}")
            }
            Problem::SuperClassBecameInterface {
                class_name,
                location,
            } => {
                write!(
                    f,
                    "Superclass {class_name} of {location} became an interface"
                )
            }
            Problem::SuperInterfaceBecameClass {
                class_name,
                location,
            } => {
                write!(
                    f,
                    "Superinterface {class_name} of {location} became a class"
                )
            }
            Problem::InterfaceInstantiation { class_name, usage } => {
                write!(f, "Interface {class_name} is instantiated at {usage}")
            }
            Problem::AbstractClassInstantiation { class_name, usage } => {
                write!(f, "Abstract class {class_name} is instantiated at {usage}")
            }
            Problem::FieldNotFound { field, usage } => {
                write!(f, "Field {field} is not found, accessed at {usage}")
            }
            Problem::IllegalFieldAccess {
                field,
                level,
                usage,
            } => {
                write!(
                    f,
                    "Field {field} is {level} and not accessible from {usage}"
                )
            }
            Problem::StaticAccessOfInstanceField { field, usage } => {
                write!(f, "Static access of instance field {field} at {usage}")
            }
            Problem::InstanceAccessOfStaticField { field, usage } => {
                write!(f, "Instance access of static field {field} at {usage}")
            }
            Problem::ChangeFinalField { field, usage } => {
                write!(f, "Final field {field} is written at {usage}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::locations::ClassLocation;

    use super::*;

    fn class_usage(name: &str) -> Location {
        Location::Class(ClassLocation {
            class_name: name.into(),
        })
    }

    #[test]
    fn structural_equality_drives_dedup() {
        let a = Problem::ClassNotFound {
            class_name: "p/Gone".into(),
            usage: class_usage("q/User"),
        };
        let b = Problem::ClassNotFound {
            class_name: "p/Gone".into(),
            usage: class_usage("q/User"),
        };
        let c = Problem::ClassNotFound {
            class_name: "p/Gone".into(),
            usage: class_usage("q/Other"),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn descriptions_render() {
        let problem = Problem::ClassNotFound {
            class_name: "p/Gone".into(),
            usage: class_usage("q/User"),
        };
        assert_eq!(problem.short_description(), "Class not found");
        assert_eq!(
            problem.to_string(),
            "Class p/Gone is not found, referenced at q/User"
        );
        assert_eq!(problem.enclosing_class(), "q/User");
    }
}
