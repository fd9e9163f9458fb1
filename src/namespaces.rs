//! Namespace discovery: list the namespaces an assembly exports instead of building a report.

use std::{collections::BTreeSet, io::Write};

use crate::{filter::ExportFilter, metadata::MetadataSource, Result};

/// Header line of the namespace listing
pub const LISTING_HEADER: &str = "Available namespaces:";

/// Distinct, non-empty namespaces of all exported types, ascending in ordinal order.
///
/// Only type-level metadata is consulted; fields and methods are never inspected.
///
/// # Errors
/// Propagates errors from the metadata source.
pub fn discover_namespaces<S: MetadataSource + ?Sized>(source: &S) -> Result<Vec<String>> {
    let filter = ExportFilter::new(None);
    let mut namespaces = BTreeSet::new();

    for module in source.modules()? {
        for type_metadata in module.types {
            if !type_metadata.namespace.is_empty() && filter.is_exported_type(&type_metadata) {
                namespaces.insert(type_metadata.namespace);
            }
        }
    }

    Ok(namespaces.into_iter().collect())
}

/// Print the listing: the header, then one `- <namespace>` line per entry.
///
/// # Errors
/// Returns an error if `out` cannot be written.
pub fn write_namespace_listing(out: &mut dyn Write, namespaces: &[String]) -> Result<()> {
    writeln!(out, "{LISTING_HEADER}")?;
    for namespace in namespaces {
        writeln!(out, "- {namespace}")?;
    }
    out.flush()?;
    Ok(())
}
