//! Request URL construction.
//!
//! Joins a service base endpoint with a static resource path and, for item
//! URLs, one caller-supplied identifier. Static path segments may carry their
//! own slashes (`"/subnets"`, `"os-keypairs/"`) and empty pieces are dropped.
//! An identifier always becomes exactly one percent-encoded segment: `/` is
//! sent as `%2F`, and identifiers that would collapse into the parent path
//! (empty, `.`, `..`) are rejected.

use crate::{Error, Result};
use url::Url;

/// Parse a base endpoint, rejecting anything that cannot carry a request path.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] for unparsable URLs, non-HTTP schemes,
/// and URLs that cannot be a base (`mailto:`, `data:`).
pub fn parse_endpoint(base: &str) -> Result<Url> {
    let url = Url::parse(base.trim())
        .map_err(|err| Error::InvalidEndpoint(format!("`{base}`: {err}")))?;
    check_endpoint(&url)?;
    Ok(url)
}

fn check_endpoint(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidEndpoint(format!(
            "`{url}`: unsupported scheme `{}`",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidEndpoint(format!("`{url}`: not a base URL")));
    }
    Ok(())
}

/// Build a request URL from a base endpoint and relative path segments.
///
/// `build_request_url("https://svc.example/v2", &["/subnets", "abc"])` yields
/// `https://svc.example/v2/subnets/abc`.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if `base` is malformed.
pub fn build_request_url(base: &str, segments: &[&str]) -> Result<Url> {
    join_segments(&parse_endpoint(base)?, segments)
}

/// Append path segments to an already parsed endpoint.
///
/// Query string and fragment of the base are discarded.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if `base` cannot carry a path.
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    check_endpoint(base)?;

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(format!("`{base}`: not a base URL")))?;
        path.pop_if_empty();
        for segment in segments {
            path.extend(segment.split('/').filter(|piece| !piece.is_empty()));
        }
    }
    Ok(url)
}

/// Check that `id` can stand as a single path segment.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] for empty identifiers and for dot
/// segments, which URL normalization would remove.
pub fn check_path_id(id: &str) -> Result<()> {
    let decoded = id.to_ascii_lowercase().replace("%2e", ".");
    if matches!(decoded.as_str(), "" | "." | "..") {
        return Err(Error::InvalidRequest(format!(
            "`{id}` is not a valid resource identifier"
        )));
    }
    Ok(())
}

/// Build the URL of a single resource: the static `path` under `base`, then
/// `id` as one encoded segment.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if `id` cannot be a path segment and
/// [`Error::InvalidEndpoint`] if `base` cannot carry a path.
pub fn join_item(base: &Url, path: &[&str], id: &str) -> Result<Url> {
    check_path_id(id)?;

    let mut url = join_segments(base, path)?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidEndpoint(format!("`{base}`: not a base URL")))?
        .push(id);
    Ok(url)
}

/// Returns true when the last path segment of `url` equals `segment`.
#[must_use]
pub fn ends_with_segment(url: &Url, segment: &str) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|piece| !piece.is_empty()))
        .is_some_and(|last| last == segment)
}
