//! [`MetadataSource`] backed by `dotscope`.
//!
//! `dotscope` does all of the PE and ECMA-335 work: mapping the file, decoding the metadata
//! tables and resolving signatures into its type registry. This module only walks the loaded
//! `CilObject` and copies what the report needs into the crate's own metadata model.
//!
//! Type names are rendered the way reflection-style tools print them: `System.Int32`,
//! `System.Collections.Generic.List`1<T>`, `System.Byte[]`, `System.Int32&`, `Ns.Outer/Inner`.
//! Generic parameters use their declared names, falling back to `!0` / `!!0` when the
//! parameter row has no name.

use std::{collections::BTreeSet, path::Path};

use bitflags::bitflags;
use dotscope::{
    metadata::{
        signatures::TypeSignature,
        tables::GenericParamList,
        token::Token,
        typesystem::{CilType, TypeRegistry},
    },
    CilObject, ValidationConfig,
};

use crate::{
    metadata::{
        AccessorKind, FieldMetadata, MetadataSource, MethodMetadata, ModuleMetadata,
        ParameterMetadata, TypeMetadata, Visibility, TYPE_VISIBILITY_MASK,
    },
    Error, Result,
};

/// Metadata table id of `TypeDef` tokens
const TYPEDEF_TABLE: u8 = 0x02;

/// Nested visibilities start at `NestedPublic`
const FIRST_NESTED_VISIBILITY: u32 = 0x0002;

/// Separator between an enclosing type and its nested type
const NESTED_SEPARATOR: char = '/';

bitflags! {
    /// The `MethodAttributes` bits this loader inspects, §II.23.1.10
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAttributes: u32 {
        /// Name is special; accessors and constructors carry it
        const SPECIAL_NAME = 0x0800;
        /// Name is special to the runtime (`.ctor`, `.cctor`)
        const RT_SPECIAL_NAME = 0x1000;
    }
}

impl From<dotscope::Error> for Error {
    fn from(err: dotscope::Error) -> Self {
        match err {
            dotscope::Error::NotSupported
            | dotscope::Error::Goblin(_)
            | dotscope::Error::Malformed { .. }
            | dotscope::Error::OutOfBounds { .. }
            | dotscope::Error::HeapBoundsError { .. }
            | dotscope::Error::ValidationRawFailed { .. } => Error::InvalidFormat,
            other => unexpected_error!(other),
        }
    }
}

/// A .NET assembly loaded through `dotscope`.
///
/// The parsed object is held for the lifetime of the source and dropped with it.
pub struct CilAssemblySource {
    object: CilObject,
}

impl CilAssemblySource {
    /// Load and parse the assembly at `path`.
    ///
    /// Validation runs at the analysis level, which accepts the slightly irregular metadata
    /// that obfuscators and IL2CPP toolchains emit.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the file is not a .NET PE image, or
    /// [`Error::Unexpected`] for any other load failure.
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("loading {} through dotscope", path.display());
        let object = CilObject::from_path_with_validation(path, ValidationConfig::analysis())?;
        Ok(CilAssemblySource { object })
    }

    fn type_metadata(cil_type: &CilType, registry: &TypeRegistry) -> TypeMetadata {
        let mut type_metadata = TypeMetadata::new(
            cil_type.namespace.clone(),
            cil_type.name.clone(),
            Visibility::from_type_flags(cil_type.flags),
        );

        let type_parameters = generic_names(&cil_type.generic_params);
        let accessors = PropertyAccessors::of(cil_type);

        let type_scope = RegistryScope {
            registry,
            type_parameters: &type_parameters,
            method_parameters: &[],
        };
        for (_, field) in cil_type.fields.iter() {
            type_metadata.fields.push(FieldMetadata::new(
                field.name.clone(),
                type_name(&field.signature.base, &type_scope),
                Visibility::from_member_flags(field.flags),
            ));
        }

        for (_, method_ref) in cil_type.methods.iter() {
            let Some(method) = method_ref.upgrade() else {
                log::debug!("dangling method reference on {}", cil_type.name);
                continue;
            };

            let method_parameters = generic_names(&method.generic_params);
            let scope = RegistryScope {
                registry,
                type_parameters: &type_parameters,
                method_parameters: &method_parameters,
            };

            let attributes = MethodAttributes::from_bits_truncate(method.flags_modifiers.bits());
            let return_type = &method.signature.return_type;
            let mut method_metadata = MethodMetadata::new(
                method.name.clone(),
                parameter_type_name(&return_type.base, return_type.by_ref, &scope),
                Visibility::from_member_flags(method.flags_access.bits()),
            )
            .with_accessor(accessors.kind(&method.name, method.token, attributes));

            let rows: Vec<(u32, Option<String>)> = method
                .params
                .iter()
                .map(|(_, param)| (param.sequence, param.name.clone()))
                .collect();
            let names = parameter_names(&rows, method.signature.params.len());

            for (name, signature) in names.into_iter().zip(&method.signature.params) {
                method_metadata.parameters.push(ParameterMetadata::new(
                    name,
                    parameter_type_name(&signature.base, signature.by_ref, &scope),
                ));
            }

            type_metadata.methods.push(method_metadata);
        }

        type_metadata
    }
}

impl MetadataSource for CilAssemblySource {
    fn assembly_name(&self) -> Result<String> {
        // A module without a manifest is a netmodule, not an assembly
        self.object
            .assembly()
            .map(|assembly| assembly.name.clone())
            .ok_or(Error::InvalidFormat)
    }

    fn modules(&self) -> Result<Vec<ModuleMetadata>> {
        let module_name = self
            .object
            .module()
            .map(|module| module.name.clone())
            .unwrap_or_default();

        let registry = self.object.types();
        let mut module = ModuleMetadata::new(module_name);

        for entry in registry.iter() {
            let cil_type = entry.value();

            if cil_type.token.table() != TYPEDEF_TABLE || is_nested(cil_type.flags) {
                continue;
            }

            module.types.push(Self::type_metadata(cil_type, &registry));
        }

        log::debug!(
            "read {} top-level types from module '{}'",
            module.types.len(),
            module.name
        );

        Ok(vec![module])
    }
}

/// Nested types are listed by their enclosing type, not by the module.
fn is_nested(type_flags: u32) -> bool {
    (type_flags & TYPE_VISIBILITY_MASK) >= FIRST_NESTED_VISIBILITY
}

/// `(number, name)` of every generic parameter in `params`.
fn generic_names(params: &GenericParamList) -> Vec<(u32, String)> {
    params
        .iter()
        .map(|(_, param)| (param.number, param.name.clone()))
        .collect()
}

/// Names for `count` signature parameters, from `(sequence, name)` param rows.
///
/// Param rows are numbered from 1; sequence 0 describes the return value. A parameter without
/// a row, or whose row has no name, gets an empty name.
fn parameter_names(rows: &[(u32, Option<String>)], count: usize) -> Vec<String> {
    (1..=count)
        .map(|sequence| {
            rows.iter()
                .find(|(row_sequence, _)| *row_sequence as usize == sequence)
                .and_then(|(_, name)| name.clone())
                .unwrap_or_default()
        })
        .collect()
}

/// Methods bound to a type's properties through `MethodSemantics`.
#[derive(Debug, Default)]
struct PropertyAccessors {
    getters: BTreeSet<Token>,
    setters: BTreeSet<Token>,
}

impl PropertyAccessors {
    fn of(cil_type: &CilType) -> Self {
        let mut accessors = PropertyAccessors::default();
        for (_, property) in cil_type.properties.iter() {
            if let Some(token) = property.fn_getter.get().and_then(|getter| getter.token()) {
                accessors.getters.insert(token);
            }
            if let Some(token) = property.fn_setter.get().and_then(|setter| setter.token()) {
                accessors.setters.insert(token);
            }
        }
        accessors
    }

    fn kind(&self, name: &str, token: Token, attributes: MethodAttributes) -> AccessorKind {
        let constructor = MethodAttributes::SPECIAL_NAME | MethodAttributes::RT_SPECIAL_NAME;
        if attributes.contains(constructor) && (name == ".ctor" || name == ".cctor") {
            AccessorKind::Constructor
        } else if self.getters.contains(&token) {
            AccessorKind::Getter
        } else if self.setters.contains(&token) {
            AccessorKind::Setter
        } else {
            AccessorKind::None
        }
    }
}

/// What a signature refers to by token or generic parameter index.
trait NameScope {
    /// Fully-qualified name of the type behind `token`.
    fn resolve(&self, token: &Token) -> Option<String>;

    /// Declared name of the owning type's generic parameter `index`.
    fn type_parameter(&self, index: u32) -> Option<&str>;

    /// Declared name of the owning method's generic parameter `index`.
    fn method_parameter(&self, index: u32) -> Option<&str>;
}

struct RegistryScope<'a> {
    registry: &'a TypeRegistry,
    type_parameters: &'a [(u32, String)],
    method_parameters: &'a [(u32, String)],
}

impl NameScope for RegistryScope<'_> {
    fn resolve(&self, token: &Token) -> Option<String> {
        self.registry
            .get(token)
            .map(|resolved| qualified_name(&resolved))
    }

    fn type_parameter(&self, index: u32) -> Option<&str> {
        lookup(self.type_parameters, index)
    }

    fn method_parameter(&self, index: u32) -> Option<&str> {
        lookup(self.method_parameters, index)
    }
}

fn lookup(names: &[(u32, String)], index: u32) -> Option<&str> {
    names
        .iter()
        .find(|(number, name)| *number == index && !name.is_empty())
        .map(|(_, name)| name.as_str())
}

/// `Ns.Name`, or `Ns.Outer/Inner` for nested types.
fn qualified_name(cil_type: &CilType) -> String {
    let enclosing = cil_type
        .enclosing_type
        .get()
        .and_then(|enclosing| enclosing.upgrade());

    match enclosing {
        Some(outer) => format!(
            "{}{NESTED_SEPARATOR}{}",
            qualified_name(&outer),
            cil_type.name
        ),
        None if cil_type.namespace.is_empty() => cil_type.name.clone(),
        None => format!("{}.{}", cil_type.namespace, cil_type.name),
    }
}

fn parameter_type_name(signature: &TypeSignature, by_ref: bool, scope: &dyn NameScope) -> String {
    let name = type_name(signature, scope);
    if by_ref {
        format!("{name}&")
    } else {
        name
    }
}

/// Render a signature type as a fully-qualified name.
fn type_name(signature: &TypeSignature, scope: &dyn NameScope) -> String {
    let primitive = match signature {
        TypeSignature::Void => "System.Void",
        TypeSignature::Boolean => "System.Boolean",
        TypeSignature::Char => "System.Char",
        TypeSignature::I1 => "System.SByte",
        TypeSignature::U1 => "System.Byte",
        TypeSignature::I2 => "System.Int16",
        TypeSignature::U2 => "System.UInt16",
        TypeSignature::I4 => "System.Int32",
        TypeSignature::U4 => "System.UInt32",
        TypeSignature::I8 => "System.Int64",
        TypeSignature::U8 => "System.UInt64",
        TypeSignature::R4 => "System.Single",
        TypeSignature::R8 => "System.Double",
        TypeSignature::String => "System.String",
        TypeSignature::Object => "System.Object",
        TypeSignature::I => "System.IntPtr",
        TypeSignature::U => "System.UIntPtr",
        TypeSignature::TypedByRef => "System.TypedReference",
        TypeSignature::Class(token) | TypeSignature::ValueType(token) => {
            return scope.resolve(token).unwrap_or_else(|| {
                log::debug!("unresolved type token {token}");
                String::new()
            });
        }
        TypeSignature::GenericInst(base, args) => {
            let args: Vec<String> = args.iter().map(|arg| type_name(arg, scope)).collect();
            return format!("{}<{}>", type_name(base, scope), args.join(","));
        }
        TypeSignature::SzArray(array) => return format!("{}[]", type_name(&array.base, scope)),
        TypeSignature::Array(array) => {
            let commas = ",".repeat(array.rank.saturating_sub(1) as usize);
            return format!("{}[{commas}]", type_name(&array.base, scope));
        }
        TypeSignature::Ptr(pointer) => return format!("{}*", type_name(&pointer.base, scope)),
        TypeSignature::ByRef(inner) => return format!("{}&", type_name(inner, scope)),
        TypeSignature::Pinned(inner) => return type_name(inner, scope),
        TypeSignature::GenericParamType(index) => {
            return scope
                .type_parameter(*index)
                .map_or_else(|| format!("!{index}"), str::to_string);
        }
        TypeSignature::GenericParamMethod(index) => {
            return scope
                .method_parameter(*index)
                .map_or_else(|| format!("!!{index}"), str::to_string);
        }
        TypeSignature::FnPtr(_) => "method",
        _ => "",
    };

    primitive.to_string()
}
