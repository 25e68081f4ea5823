//! Parameter predicates shared by forward and backward resolution.
//!
//! The two predicates are deliberately not interchangeable:
//!
//! - [`matches_required`] gates whether a route is reachable at all. Every
//!   required key must be present with the same value.
//! - [`matches_any`] ranks backward candidates that share a handler identity.
//!   A candidate with no injected parameters always qualifies, otherwise one
//!   overlapping key/value pair is enough. Callers pick the last qualifying
//!   candidate, so default routes should be registered first.

use std::collections::BTreeMap;

/// Parameter mapping carried through resolution (name → value)
pub type Params = BTreeMap<String, String>;

/// True iff every key in `required` exists in `available` with an equal value.
#[inline]
#[must_use]
pub fn matches_required(available: &Params, required: &Params) -> bool {
    required
        .iter()
        .all(|(key, value)| available.get(key) == Some(value))
}

/// True iff `candidate` is empty or shares at least one key/value pair with `requested`.
#[inline]
#[must_use]
pub fn matches_any(candidate: &Params, requested: &Params) -> bool {
    candidate.is_empty()
        || requested
            .iter()
            .any(|(key, value)| candidate.get(key) == Some(value))
}

/// Merge `overlay` into `base`; values from `overlay` win.
pub fn merge_params(base: &mut Params, overlay: &Params) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Build a [`Params`] map from borrowed pairs.
///
/// ```
/// use pagerouter::router::params;
///
/// let p = params(&[("lang", "en")]);
/// assert_eq!(p.get("lang").map(String::as_str), Some("en"));
/// ```
#[must_use]
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
