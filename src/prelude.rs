//! # asminspect Prelude
//!
//! Convenient re-exports of the most commonly used types. Import this module to get quick
//! access to everything needed to run an export or build a report from metadata.
//!
//! ```rust
//! use asminspect::prelude::*;
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all asminspect operations
pub use crate::Error;

/// The result type used throughout asminspect
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Run configuration and namespace handling
pub use crate::config::{ExportConfig, NamespaceFilter};

/// Runs an export and reports how it ended
pub use crate::export::{Exporter, Outcome};

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Owned metadata snapshot and the trait that produces it
pub use crate::metadata::{
    AccessorKind, AssemblyMetadata, FieldMetadata, MetadataSource, MethodMetadata,
    ModuleMetadata, ParameterMetadata, TypeMetadata, Visibility,
};

/// `dotscope` backed metadata source
pub use crate::metadata::loader::CilAssemblySource;

// ================================================================================================
// Reports
// ================================================================================================

/// Export predicates
pub use crate::filter::ExportFilter;

/// Namespace discovery
pub use crate::namespaces::discover_namespaces;

/// Display names for declared types
pub use crate::naming::simplify;

/// Report tree, its builder and XML serialization
pub use crate::report::{xml::to_xml, ReportBuilder, ReportNode};

// ================================================================================================
// Run Log
// ================================================================================================

/// Event sinks for run progress
pub use crate::runlog::{EventLog, Level, MemoryLog, RunLog};
