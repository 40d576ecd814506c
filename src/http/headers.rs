//! Header merging and the override directive.
//!
//! # Responsibilities
//! - Merge one header set into another (`set-cookie` accumulates, everything
//!   else overwrites)
//! - Apply request-header overrides signaled via
//!   `x-middleware-override-headers`
//! - Strip override directive headers from the response
//!
//! # Design Decisions
//! - `HeaderMap` keeps repeated keys in insertion order, which is what makes
//!   multi-valued cookie headers survive a merge
//! - `HeaderName` normalizes keys to lowercase on construction, so no manual
//!   case folding is needed on write
//! - Directive keys are removed from the response whether or not the
//!   override succeeds; they must never reach the client

use std::str::FromStr;

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName};

/// Comma-separated list of request header names the middleware wants changed.
pub const OVERRIDE_HEADERS: &str = "x-middleware-override-headers";

/// Prefix of the companion key carrying the replacement value for one name.
pub const REQUEST_HEADER_PREFIX: &str = "x-middleware-request-";

/// Merge `source` into `target`.
///
/// `set-cookie` values are appended so multiple cookies accumulate; every
/// other key overwrites whatever the target held.
pub fn apply_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for (key, value) in source.iter() {
        if *key == SET_COOKIE {
            target.append(key.clone(), value.clone());
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Apply the `x-middleware-override-headers` directive.
///
/// For each listed name, the replacement value lives at
/// `x-middleware-request-<name>` on the response. The request header is set
/// to the replacement, or deleted when the replacement is absent or empty.
/// Companion keys and the directive key itself are removed from the response
/// regardless of outcome. Absent directive: no-op.
pub fn apply_header_overrides(request: &mut HeaderMap, response: &mut HeaderMap) {
    let Some(directive) = response.remove(OVERRIDE_HEADERS) else {
        return;
    };
    let Ok(names) = directive.to_str().map(str::to_owned) else {
        return;
    };

    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let Ok(key) = HeaderName::from_str(name) else {
            continue;
        };
        let mut companion = String::with_capacity(REQUEST_HEADER_PREFIX.len() + name.len());
        companion.push_str(REQUEST_HEADER_PREFIX);
        companion.push_str(name);
        let Ok(companion) = HeaderName::from_str(&companion) else {
            continue;
        };

        let replacement = response.remove(&companion);
        match replacement {
            Some(value) if !value.is_empty() => {
                if request.get(&key) != Some(&value) {
                    request.insert(key, value);
                }
            }
            // Missing or empty replacement means deletion, not an error.
            _ => {
                request.remove(&key);
            }
        }
    }
}
