//! Rules deciding which types and members reach the report.

use crate::metadata::{AccessorKind, FieldMetadata, MethodMetadata, TypeMetadata};

/// Name of the module-level pseudo type some toolchains emit instead of `<Module>`.
pub const MODULE_PSEUDO_TYPE: &str = "_Module_";

/// Synthetic accessor that IL2CPP-generated assemblies add to every type.
pub const IL2CPP_TYPE_ACCESSOR: &str = "get_Il2CppType";

/// Exported-ness predicates, optionally narrowed to a single namespace.
///
/// All predicates are pure. An empty namespace constraint behaves like no constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportFilter<'a> {
    namespace: Option<&'a str>,
}

impl<'a> ExportFilter<'a> {
    /// Create a filter. `namespace` restricts exported types to exactly that namespace.
    #[must_use]
    pub fn new(namespace: Option<&'a str>) -> Self {
        ExportFilter {
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// Public, not compiler-generated, not the module pseudo type, and in the constrained
    /// namespace if there is one.
    #[must_use]
    pub fn is_exported_type(&self, type_metadata: &TypeMetadata) -> bool {
        type_metadata.visibility.is_public()
            && type_metadata.name != MODULE_PSEUDO_TYPE
            && !type_metadata.has_generated_name()
            && self
                .namespace
                .map_or(true, |ns| type_metadata.namespace == ns)
    }

    /// Public and not an auto-property backing field.
    #[must_use]
    pub fn is_exported_field(&self, field: &FieldMetadata) -> bool {
        field.visibility.is_public() && !field.is_backing_field()
    }

    /// Public, not an accessor or constructor, not compiler-generated and not the IL2CPP type
    /// accessor.
    #[must_use]
    pub fn is_exported_method(&self, method: &MethodMetadata) -> bool {
        method.visibility.is_public()
            && method.accessor == AccessorKind::None
            && !method.has_generated_name()
            && method.name != IL2CPP_TYPE_ACCESSOR
    }
}
