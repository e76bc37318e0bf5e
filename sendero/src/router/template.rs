//! Route templates such as `/users/{user_id}/items/{item_id}`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}`: exactly one non-empty segment.
    Param(String),
    /// `{name:path}`: everything left, slashes included.
    Rest(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("route template `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("route template `{template}` has a malformed segment `{segment}`")]
    MalformedSegment { template: String, segment: String },
    #[error("route template `{template}` uses unknown convertor `{convertor}`")]
    UnknownConvertor { template: String, convertor: String },
    #[error("route template `{template}` declares `{name}` more than once")]
    DuplicateParam { template: String, name: String },
    #[error("route template `{template}`: `{name}` captures the rest of the path and must come last")]
    RestNotLast { template: String, name: String },
}

/// A parsed route template.
///
/// Matching works on the percent-decoded request path. A trailing slash is
/// part of the template: `/items/` and `/items` are different routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(TemplateError::MissingLeadingSlash(raw.to_string()));
        };

        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;
        let mut segments: Vec<Segment> = Vec::with_capacity(parts.len());

        for (index, part) in parts.into_iter().enumerate() {
            let segment = parse_segment(raw, part)?;
            if let Segment::Param(name) | Segment::Rest(name) = &segment {
                let taken = segments.iter().any(|s| {
                    matches!(s, Segment::Param(n) | Segment::Rest(n) if n == name)
                });
                if taken {
                    return Err(TemplateError::DuplicateParam {
                        template: raw.to_string(),
                        name: name.clone(),
                    });
                }
            }
            if let Segment::Rest(name) = &segment {
                if index != last {
                    return Err(TemplateError::RestNotLast {
                        template: raw.to_string(),
                        name: name.clone(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Rest(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns the captured parameters, in template order, when `path`
    /// matches this template.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut remaining = Some(path.strip_prefix('/')?);
        let mut params = Vec::new();

        for segment in &self.segments {
            let current = remaining?;

            if let Segment::Rest(name) = segment {
                params.push((name.clone(), current.to_string()));
                return Some(params);
            }

            let (head, tail) = match current.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (current, None),
            };

            match segment {
                Segment::Literal(literal) if literal == head => {}
                Segment::Param(name) if !head.is_empty() => {
                    params.push((name.clone(), head.to_string()));
                }
                _ => return None,
            }

            remaining = tail;
        }

        // Unconsumed segments left over.
        if remaining.is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(template: &str, part: &str) -> Result<Segment, TemplateError> {
    let malformed = || TemplateError::MalformedSegment {
        template: template.to_string(),
        segment: part.to_string(),
    };

    let Some(inner) = part.strip_prefix('{') else {
        if part.contains(['{', '}']) {
            return Err(malformed());
        }
        return Ok(Segment::Literal(part.to_string()));
    };

    let inner = inner.strip_suffix('}').ok_or_else(malformed)?;
    let (name, convertor) = match inner.split_once(':') {
        Some((name, convertor)) => (name, Some(convertor)),
        None => (inner, None),
    };

    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(malformed());
    }

    match convertor {
        None | Some("str") => Ok(Segment::Param(name.to_string())),
        Some("path") => Ok(Segment::Rest(name.to_string())),
        Some(other) => Err(TemplateError::UnknownConvertor {
            template: template.to_string(),
            convertor: other.to_string(),
        }),
    }
}
