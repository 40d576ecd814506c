//! Query-parameter reconciliation and target URL resolution.
//!
//! # Responsibilities
//! - Merge a source parameter list into a target list
//! - Honor the `nxtP<name>` passthrough convention: such a value is
//!   addressable under both its prefixed and its bare name
//! - Resolve a request's path and query against the fixed upstream base URL
//!
//! # Design Decisions
//! - Parameters are an ordered list of pairs, not a map; duplicate keys with
//!   distinct values are legal and preserved
//! - "Set" semantics replace the first occurrence of a key and drop the rest,
//!   matching single-value overwrite

use url::Url;

/// Framework-internal prefix marking a parameter that should also be visible
/// under its bare name.
const PASSTHROUGH_PREFIX: &str = "nxtP";

/// Merge `source` parameters into `target`.
///
/// A `nxtP<name>` key is set (single-value) under both the full key and
/// `<name>`. Any other pair is appended unless the target already holds that
/// exact key/value combination.
pub fn apply_search_params(target: &mut Vec<(String, String)>, source: &[(String, String)]) {
    for (key, value) in source {
        let passthrough = key
            .strip_prefix(PASSTHROUGH_PREFIX)
            .filter(|name| !name.is_empty());

        if let Some(name) = passthrough {
            set_param(target, key, value);
            set_param(target, name, value);
        } else if !target.iter().any(|(k, _)| k == key)
            || (!value.is_empty() && !target.iter().any(|(k, v)| k == key && v == value))
        {
            target.push((key.clone(), value.clone()));
        }
    }
}

/// Single-value assignment: replace the first occurrence of `key`, drop any
/// further occurrences, append when absent.
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut assigned = false;
    params.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if assigned {
            return false;
        }
        assigned = true;
        *v = value.to_owned();
        true
    });
    if !assigned {
        params.push((key.to_owned(), value.to_owned()));
    }
}

/// Resolve the request's path and query against the upstream base URL.
///
/// The base contributes scheme, authority, and default port; the request
/// contributes the path. The request's query pairs are reconciled onto the
/// target so passthrough parameters are mirrored under their bare names.
pub fn resolve_against_base(base: &Url, request_url: &Url) -> Url {
    let mut target = base.clone();
    target.set_path(request_url.path());
    target.set_query(None);

    let source: Vec<(String, String)> = request_url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut params = Vec::new();
    apply_search_params(&mut params, &source);

    if !params.is_empty() {
        target
            .query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    target
}
