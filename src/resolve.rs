//! Relative URL composition over ordered fragments.
//!
//! Joins a sequence of URL fragments into one normalized URL without a
//! full URL parser: each fragment is applied as a `base + relative`
//! resolution step, with `..` popping a segment and a fragment carrying
//! a protocol marker replacing everything accumulated before it.

use crate::error::{Error, Result};

/// Resolve an ordered sequence of URL fragments into one URL.
///
/// Empty fragments are ignored. Fails if nothing remains.
pub fn resolve(fragments: &[String]) -> Result<String> {
    let fragments: Vec<&str> = fragments
        .iter()
        .map(|f| f.as_str())
        .filter(|f| !f.is_empty())
        .collect();
    if fragments.is_empty() {
        return Err(Error::config("missing url"));
    }

    let mut segments: Vec<String> = Vec::new();
    for fragment in &fragments {
        if let Some(idx) = fragment.find("://") {
            // A later absolute URL replaces all prior relative context.
            segments.clear();
            segments.push(format!("{}:/", &fragment[..idx]));
            push_segments(&mut segments, &fragment[idx + 3..]);
        } else {
            push_segments(&mut segments, fragment);
        }
    }

    let mut resolved = segments
        .into_iter()
        .fold(Vec::new(), |mut out, segment| {
            if segment == ".." && !out.is_empty() {
                out.pop();
            } else if segment != "." {
                out.push(segment);
            }
            out
        })
        .join("/");

    let has_protocol = resolved.contains("://");
    if !has_protocol && fragments[0].starts_with('/') {
        resolved.insert(0, '/');
    }
    if fragments[fragments.len() - 1].ends_with('/') {
        resolved.push('/');
    }
    if resolved == "//" {
        resolved = "/".to_string();
    }
    Ok(resolved)
}

/// Split a fragment on `/`, dropping empty and literal `.` segments.
fn push_segments(segments: &mut Vec<String>, fragment: &str) {
    segments.extend(
        fragment
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string),
    );
}
