//! Access flags and the member-accessibility primitives.

use bitflags::bitflags;

use crate::macros::see_jvm_spec;

bitflags! {
    /// The access flags of a class or interface.
    #[doc = see_jvm_spec!(4, 1)]
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct ClassAccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `final`; no subclasses allowed.
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by the `invokespecial` instruction.
        const SUPER = 0x0020;
        /// Is an interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared `abstract`; must not be instantiated.
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an enum class.
        const ENUM = 0x4000;
        /// Is a module, not a class or interface.
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// The access flags of a method.
    #[doc = see_jvm_spec!(4, 6)]
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct MethodAccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class.
        const PRIVATE = 0x0002;
        /// Declared `protected`; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`; must not be overridden.
        const FINAL = 0x0010;
        /// Declared `synchronized`.
        const SYNCHRONIZED = 0x0020;
        /// A bridge method generated by the compiler.
        const BRIDGE = 0x0040;
        /// Declared with a variable number of arguments.
        const VARARGS = 0x0080;
        /// Declared `native`; implemented in a language other than Java.
        const NATIVE = 0x0100;
        /// Declared `abstract`; no implementation is provided.
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`.
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// The access flags of a field.
    #[doc = see_jvm_spec!(4, 5)]
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct FieldAccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class.
        const PRIVATE = 0x0002;
        /// Declared `protected`; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`; never directly assigned to after object construction.
        const FINAL = 0x0010;
        /// Declared `volatile`; cannot be cached.
        const VOLATILE = 0x0040;
        /// Declared `transient`; not written or read by a persistent object manager.
        const TRANSIENT = 0x0080;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an element of an `enum` class.
        const ENUM = 0x4000;
    }
}

/// The declared visibility of a class or member.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, derive_more::Display)]
pub enum AccessLevel {
    /// Accessible from everywhere.
    #[display("public")]
    Public,
    /// Accessible from the declaring class's package and from subclasses.
    #[display("protected")]
    Protected,
    /// Accessible from the declaring class's package only.
    #[display("package-private")]
    PackagePrivate,
    /// Accessible from the declaring class only.
    #[display("private")]
    Private,
}

impl From<MethodAccessFlags> for AccessLevel {
    fn from(flags: MethodAccessFlags) -> Self {
        if flags.contains(MethodAccessFlags::PUBLIC) {
            AccessLevel::Public
        } else if flags.contains(MethodAccessFlags::PROTECTED) {
            AccessLevel::Protected
        } else if flags.contains(MethodAccessFlags::PRIVATE) {
            AccessLevel::Private
        } else {
            AccessLevel::PackagePrivate
        }
    }
}

impl From<FieldAccessFlags> for AccessLevel {
    fn from(flags: FieldAccessFlags) -> Self {
        if flags.contains(FieldAccessFlags::PUBLIC) {
            AccessLevel::Public
        } else if flags.contains(FieldAccessFlags::PROTECTED) {
            AccessLevel::Protected
        } else if flags.contains(FieldAccessFlags::PRIVATE) {
            AccessLevel::Private
        } else {
            AccessLevel::PackagePrivate
        }
    }
}

impl From<ClassAccessFlags> for AccessLevel {
    fn from(flags: ClassAccessFlags) -> Self {
        // Top-level classes are either public or package-private in the
        // class-file encoding.
        if flags.contains(ClassAccessFlags::PUBLIC) {
            AccessLevel::Public
        } else {
            AccessLevel::PackagePrivate
        }
    }
}

/// The package part of a binary class name, without the trailing slash.
/// Empty for the default package.
#[must_use]
pub fn package_of(binary_name: &str) -> &str {
    binary_name
        .rsplit_once('/')
        .map_or("", |(package, _)| package)
}

/// Whether two binary class names belong to the same package.
#[must_use]
pub fn same_package(a: &str, b: &str) -> bool {
    package_of(a) == package_of(b)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn package_of_names() {
        assert_eq!(package_of("java/lang/Object"), "java/lang");
        assert_eq!(package_of("Single"), "");
        assert_eq!(package_of("a/B"), "a");
    }

    #[test]
    fn same_package_compares_prefixes() {
        assert!(same_package("p/q/A", "p/q/B"));
        assert!(!same_package("p/q/A", "p/B"));
        assert!(same_package("A", "B"));
    }

    #[test]
    fn method_access_levels() {
        assert_eq!(
            AccessLevel::from(MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC),
            AccessLevel::Public
        );
        assert_eq!(
            AccessLevel::from(MethodAccessFlags::PROTECTED),
            AccessLevel::Protected
        );
        assert_eq!(
            AccessLevel::from(MethodAccessFlags::PRIVATE),
            AccessLevel::Private
        );
        assert_eq!(
            AccessLevel::from(MethodAccessFlags::STATIC),
            AccessLevel::PackagePrivate
        );
    }

    fn arb_method_access_flag() -> impl Strategy<Value = MethodAccessFlags> {
        prop_oneof![
            Just(MethodAccessFlags::PUBLIC),
            Just(MethodAccessFlags::PRIVATE),
            Just(MethodAccessFlags::PROTECTED),
            Just(MethodAccessFlags::STATIC),
            Just(MethodAccessFlags::FINAL),
            Just(MethodAccessFlags::SYNCHRONIZED),
            Just(MethodAccessFlags::BRIDGE),
            Just(MethodAccessFlags::VARARGS),
            Just(MethodAccessFlags::NATIVE),
            Just(MethodAccessFlags::ABSTRACT),
            Just(MethodAccessFlags::STRICT),
            Just(MethodAccessFlags::SYNTHETIC),
        ]
    }

    proptest! {
        #[test]
        fn method_access_flag_bits_no_overlap(
            lhs in arb_method_access_flag(),
            rhs in arb_method_access_flag()
        ) {
            prop_assume!(lhs != rhs);
            assert_eq!(lhs.bits() & rhs.bits(), 0);
        }
    }
}
