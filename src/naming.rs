//! Display names for declared types.
//!
//! The report shows `Int32` rather than `System.Int32` and `List` rather than
//! `System.Collections.Generic.List`1<System.String>`. The reduced names are ambiguous by
//! construction, so they are only ever rendered, never compared or used for lookups.

/// Separator between a generic type's name and its arity
pub const GENERIC_ARITY_MARKER: char = '`';

/// Reduce a fully-qualified type name to its display form.
///
/// 1. Anything from the first generic arity marker on is dropped (a marker at position 0 is
///    kept, so the result is never emptied by this step).
/// 2. If a dot is followed by at least one character, everything up to and including the last
///    dot is dropped. A name that ends in a dot is returned as-is.
///
/// # Examples
///
/// ```rust
/// use asminspect::naming::simplify;
///
/// assert_eq!(simplify("System.Collections.Generic.List`1"), "List");
/// assert_eq!(simplify("MyNamespace.Foo"), "Foo");
/// assert_eq!(simplify("NoDotName"), "NoDotName");
/// assert_eq!(simplify(""), "");
/// ```
#[must_use]
pub fn simplify(full_name: &str) -> &str {
    let name = match full_name.find(GENERIC_ARITY_MARKER) {
        Some(index) if index > 0 => &full_name[..index],
        _ => full_name,
    };

    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[dot + 1..],
        _ => name,
    }
}
