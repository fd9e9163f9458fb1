//! Read-only metadata model consumed by the export core.
//!
//! The types in this module are an owned snapshot of the parts of an assembly that matter to
//! the report: modules, their types, and each type's fields and methods. They carry no parsing
//! logic. Where they come from is abstracted by [`MetadataSource`]:
//!
//! - [`loader::CilAssemblySource`] reads a real assembly through `dotscope`
//! - [`AssemblyMetadata`] is itself a source, which lets tests and benchmarks drive the core
//!   with synthetic in-memory graphs
//!
//! # Examples
//!
//! ```rust
//! use asminspect::metadata::{
//!     AssemblyMetadata, FieldMetadata, ModuleMetadata, TypeMetadata, Visibility,
//! };
//!
//! let player = TypeMetadata::new("Game", "Player", Visibility::Public)
//!     .with_field(FieldMetadata::new("Health", "System.Int32", Visibility::Public));
//!
//! let assembly = AssemblyMetadata::new("Assembly-CSharp")
//!     .with_module(ModuleMetadata::new("Assembly-CSharp.dll").with_type(player));
//!
//! assert_eq!(assembly.modules[0].types[0].full_name(), "Game.Player");
//! ```

pub mod loader;

use strum::{Display, EnumString};

use crate::Result;

/// Marker that the C# compiler embeds in the names of auto-property backing fields.
pub const BACKING_FIELD_MARKER: &str = "k__BackingField";

/// First character of every compiler-generated type or member name.
pub const GENERATED_NAME_PREFIX: char = '<';

/// Mask of the member access bits in `FieldAttributes` and `MethodAttributes`,
/// §II.23.1.5 / §II.23.1.10
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;

/// Mask of the visibility bits in `TypeAttributes`, §II.23.1.15
pub const TYPE_VISIBILITY_MASK: u32 = 0x0007;

/// Access level of a type or member.
///
/// Named after the C# keywords rather than the ECMA-335 flag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    /// Accessible everywhere (`Public`)
    Public,
    /// Accessible within the declaring assembly (`Assembly`, or `NotPublic` for types)
    Internal,
    /// Accessible to subclasses (`Family`)
    Protected,
    /// Accessible to subclasses or within the assembly (`FamORAssem`)
    ProtectedInternal,
    /// Accessible to subclasses within the assembly (`FamANDAssem`)
    PrivateProtected,
    /// Accessible only within the declaring type (`Private`)
    Private,
    /// Not referenceable at all (`CompilerControlled`)
    CompilerControlled,
}

impl Visibility {
    /// Decode the access bits of a field or method attribute word.
    #[must_use]
    pub fn from_member_flags(flags: u32) -> Self {
        match flags & MEMBER_ACCESS_MASK {
            0 => Visibility::CompilerControlled,
            1 => Visibility::Private,
            2 => Visibility::PrivateProtected,
            3 => Visibility::Internal,
            4 => Visibility::Protected,
            5 => Visibility::ProtectedInternal,
            _ => Visibility::Public,
        }
    }

    /// Decode the visibility bits of a top-level type attribute word.
    ///
    /// Only `Public` (1) maps to [`Visibility::Public`]. Nested visibilities are never public at
    /// module level.
    #[must_use]
    pub fn from_type_flags(flags: u32) -> Self {
        match flags & TYPE_VISIBILITY_MASK {
            1 => Visibility::Public,
            3 => Visibility::Private,
            4 => Visibility::Protected,
            6 => Visibility::PrivateProtected,
            7 => Visibility::ProtectedInternal,
            // NotPublic, NestedPublic (only reachable through the enclosing type), NestedAssembly
            _ => Visibility::Internal,
        }
    }

    /// Shortcut for `self == Visibility::Public`.
    #[must_use]
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

/// Marks methods that the compiler synthesizes for properties and object construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AccessorKind {
    /// An ordinary method
    #[default]
    None,
    /// A property getter (`get_X`)
    Getter,
    /// A property setter (`set_X`)
    Setter,
    /// An instance or static constructor (`.ctor`, `.cctor`)
    Constructor,
}

/// A method parameter. Position is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    /// Declared parameter name, empty if the metadata has none
    pub name: String,
    /// Fully-qualified declared type name
    pub type_name: String,
}

impl ParameterMetadata {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ParameterMetadata {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A field declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    /// Field name
    pub name: String,
    /// Fully-qualified declared type name
    pub type_name: String,
    /// Access level
    pub visibility: Visibility,
}

impl FieldMetadata {
    /// Create a field.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        FieldMetadata {
            name: name.into(),
            type_name: type_name.into(),
            visibility,
        }
    }

    /// True for compiler-synthesized auto-property storage.
    #[must_use]
    pub fn is_backing_field(&self) -> bool {
        self.name.contains(BACKING_FIELD_MARKER)
    }
}

/// A method declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMetadata {
    /// Method name
    pub name: String,
    /// Fully-qualified declared return type name
    pub return_type: String,
    /// Access level
    pub visibility: Visibility,
    /// Whether the method is a property accessor or a constructor
    pub accessor: AccessorKind,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterMetadata>,
}

impl MethodMetadata {
    /// Create an ordinary method without parameters.
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        MethodMetadata {
            name: name.into(),
            return_type: return_type.into(),
            visibility,
            accessor: AccessorKind::None,
            parameters: Vec::new(),
        }
    }

    /// Set the accessor kind.
    #[must_use]
    pub fn with_accessor(mut self, accessor: AccessorKind) -> Self {
        self.accessor = accessor;
        self
    }

    /// Append a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterMetadata) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// True if the name carries the compiler-generated marker.
    #[must_use]
    pub fn has_generated_name(&self) -> bool {
        self.name.starts_with(GENERATED_NAME_PREFIX)
    }
}

/// A type defined in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    /// Namespace, empty for the global namespace
    pub namespace: String,
    /// Simple name, including any generic arity suffix (`List`1`)
    pub name: String,
    /// Access level
    pub visibility: Visibility,
    /// Declared fields, unordered
    pub fields: Vec<FieldMetadata>,
    /// Declared methods, unordered
    pub methods: Vec<MethodMetadata>,
}

impl TypeMetadata {
    /// Create a type without members.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        TypeMetadata {
            namespace: namespace.into(),
            name: name.into(),
            visibility,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Append a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    /// `Namespace.Name`, or just `Name` in the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// True if the name carries the compiler-generated marker.
    #[must_use]
    pub fn has_generated_name(&self) -> bool {
        self.name.starts_with(GENERATED_NAME_PREFIX)
    }
}

/// A module and the types it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    /// Module file name
    pub name: String,
    /// Defined types, in whatever order the source produced them
    pub types: Vec<TypeMetadata>,
}

impl ModuleMetadata {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        ModuleMetadata {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Append a type.
    #[must_use]
    pub fn with_type(mut self, type_metadata: TypeMetadata) -> Self {
        self.types.push(type_metadata);
        self
    }
}

/// Root of a metadata graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyMetadata {
    /// Simple assembly name (no version or culture)
    pub name: String,
    /// Modules of the assembly
    pub modules: Vec<ModuleMetadata>,
}

impl AssemblyMetadata {
    /// Create an assembly without modules.
    pub fn new(name: impl Into<String>) -> Self {
        AssemblyMetadata {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    /// Append a module.
    #[must_use]
    pub fn with_module(mut self, module: ModuleMetadata) -> Self {
        self.modules.push(module);
        self
    }
}

/// Capability to enumerate the metadata of one assembly.
///
/// Implementations may produce modules and types in any order; consumers sort explicitly.
/// Reading may fail: a reader that cannot make sense of the underlying binary returns
/// [`crate::Error::InvalidFormat`] or [`crate::Error::Unexpected`].
pub trait MetadataSource {
    /// Simple name of the assembly.
    ///
    /// # Errors
    /// Returns an error if the assembly has no readable manifest.
    fn assembly_name(&self) -> Result<String>;

    /// All modules with their types, fields, methods and parameters.
    ///
    /// # Errors
    /// Returns an error if the metadata graph cannot be read.
    fn modules(&self) -> Result<Vec<ModuleMetadata>>;
}

impl MetadataSource for AssemblyMetadata {
    fn assembly_name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn modules(&self) -> Result<Vec<ModuleMetadata>> {
        Ok(self.modules.clone())
    }
}
