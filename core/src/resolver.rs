//! Candidate resolution: which elements take part in a pass.
//!
//! An element is a candidate when it carries the target attribute of ANY
//! active filter. The union is deliberate: whether the element satisfies
//! every filter is decided afterwards by the [`MatchEngine`](crate::MatchEngine),
//! which classifies an element lacking one of the attributes as unmatched.

use crate::Document;

/// The candidate attribute for filter `name`: `prefix` followed by `name`.
///
/// ```
/// assert_eq!(sift::target_attribute("data-filter-", "color"), "data-filter-color");
/// ```
#[must_use]
pub fn target_attribute(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}")
}

/// Descendants of `root` carrying a target attribute for any of `names`.
///
/// Returned in document order, each element once. Empty when `names` is.
pub fn resolve_candidates<'n, D, I>(
    doc: &D,
    root: &D::Element,
    names: I,
    target_prefix: &str,
) -> Vec<D::Element>
where
    D: Document + ?Sized,
    I: IntoIterator<Item = &'n str>,
{
    let attributes: Vec<String> = names
        .into_iter()
        .map(|name| target_attribute(target_prefix, name))
        .collect();
    if attributes.is_empty() {
        return Vec::new();
    }

    doc.descendants(root)
        .into_iter()
        .filter(|element| {
            attributes
                .iter()
                .any(|attribute| doc.attribute(element, attribute).is_some())
        })
        .collect()
}
