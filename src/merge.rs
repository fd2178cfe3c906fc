//! Combining configuration layers.
//!
//! Layers are applied from least to most specific. Most fields follow "last set value
//! wins". The exceptions are:
//!
//! - `url`: later URLs are joined onto earlier ones with [`join_url`].
//! - `headers`, `params` and `extensions`: unioned key-wise, later keys replace earlier ones.
//! - `cancel_token`: two tokens are combined with [`CancellationToken::any_of`].

use ajaxkit_interface::{CancellationToken, RequestConfig};

/// Merges `layers` into one configuration. No input is modified.
///
/// The fold starts from an empty configuration, so merging no layers yields one and a
/// leading empty layer never changes the result.
pub fn merge<'a>(layers: impl IntoIterator<Item = &'a RequestConfig>) -> RequestConfig {
    layers
        .into_iter()
        .fold(RequestConfig::default(), |base, next| merge_pair(&base, next))
}

fn merge_pair(base: &RequestConfig, next: &RequestConfig) -> RequestConfig {
    fn last<T: Clone>(base: &Option<T>, next: &Option<T>) -> Option<T> {
        next.as_ref().or(base.as_ref()).cloned()
    }

    let mut extensions = base.extensions.clone();
    extensions.extend(next.extensions.iter().map(|(k, v)| (k.clone(), v.clone())));

    RequestConfig {
        url: match (&base.url, next.url.as_deref()) {
            (base, None | Some("")) => base.clone(),
            (base, Some(next)) => Some(join_url(base.as_deref().unwrap_or_default(), next)),
        },
        method: last(&base.method, &next.method),
        headers: base.headers.merged_with(&next.headers),
        params: base.params.merged_with(&next.params),
        body: last(&base.body, &next.body),
        timeout: last(&base.timeout, &next.timeout),
        cancel_token: match (&base.cancel_token, &next.cancel_token) {
            (Some(a), Some(b)) if a.ptr_eq(b) => Some(a.clone()),
            (Some(a), Some(b)) => Some(CancellationToken::any_of(a, b)),
            (a, b) => b.as_ref().or(a.as_ref()).cloned(),
        },
        response_type: last(&base.response_type, &next.response_type),
        auth: last(&base.auth, &next.auth),
        validate_status: last(&base.validate_status, &next.validate_status),
        max_redirects: last(&base.max_redirects, &next.max_redirects),
        max_response_size: last(&base.max_response_size, &next.max_response_size),
        extensions,
    }
}

/// Returns whether `url` starts with a scheme followed by `//`, or is protocol-relative
/// (`//` followed by a host).
pub fn is_absolute_url(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, rest))
            if !scheme.is_empty() && scheme.bytes().all(|b| b.is_ascii_alphabetic()) =>
        {
            rest.starts_with("//")
        }
        _ => url
            .strip_prefix("//")
            .is_some_and(|host| !host.is_empty() && !host.starts_with('/')),
    }
}

/// Joins `next` onto `base`.
///
/// An absolute `next` replaces `base`. An empty `next` keeps `base`. Otherwise trailing
/// slashes of `base` and leading slashes of `next` are replaced by exactly one `/`.
pub fn join_url(base: &str, next: &str) -> String {
    if next.is_empty() {
        return base.to_owned();
    }
    if is_absolute_url(next) {
        return next.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        next.trim_start_matches('/')
    )
}
