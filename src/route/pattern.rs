use crate::error::RouteError;
use crate::server::ParamVec;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// `[...name]`: one or more trailing segments
    CatchAll(String),
}

/// A route path such as `/api/todos/[id]` or `/api/todos/{id}`.
///
/// Dynamic segments use either the file-route form (`[id]`, `[...slug]`) or
/// the OpenAPI form (`{id}`). Matching is segment-wise and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                path: path.to_string(),
            });
        }
        let invalid = |segment: &str| RouteError::InvalidSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        };

        let raw_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        for (i, seg) in raw_segments.iter().enumerate() {
            let parsed = if let Some(inner) = seg.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
                if i + 1 != raw_segments.len() || !valid_name(inner) {
                    return Err(invalid(seg));
                }
                Segment::CatchAll(inner.to_string())
            } else if let Some(inner) = seg
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .or_else(|| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            {
                if !valid_name(inner) {
                    return Err(invalid(seg));
                }
                Segment::Param(inner.to_string())
            } else if seg.contains(&['[', ']', '{', '}'][..]) {
                return Err(invalid(seg));
            } else {
                Segment::Static((*seg).to_string())
            };
            segments.push(parsed);
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the pattern has no dynamic segments.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Static(_)))
    }

    /// True when both patterns match exactly the same request paths,
    /// whatever their parameter names or dynamic-segment syntax.
    #[must_use]
    pub fn is_equivalent(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Static(a), Segment::Static(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_))
                    | (Segment::CatchAll(_), Segment::CatchAll(_)) => true,
                    _ => false,
                })
    }

    /// Names of the dynamic segments, in path order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Path key in the OpenAPI document (`/api/todos/{id}`).
    #[must_use]
    pub fn openapi_path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for seg in &self.segments {
            out.push('/');
            match seg {
                Segment::Static(s) => out.push_str(s),
                Segment::Param(name) | Segment::CatchAll(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }

    /// Match a request path, returning the captured parameters.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamVec> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = ParamVec::new();
        let mut idx = 0;
        for seg in &self.segments {
            match seg {
                Segment::Static(expected) => {
                    if parts.get(idx) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(idx)?;
                    params.push((name.clone(), (*value).to_string()));
                }
                Segment::CatchAll(name) => {
                    if idx >= parts.len() {
                        return None;
                    }
                    params.push((name.clone(), parts[idx..].join("/")));
                    return Some(params);
                }
            }
            idx += 1;
        }
        if idx == parts.len() {
            Some(params)
        } else {
            None
        }
    }
}
