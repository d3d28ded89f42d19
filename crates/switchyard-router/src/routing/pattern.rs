//! Path templates with named parameters.
//!
//! A template such as `users/{id}/posts/{post}` is split into literal runs
//! and `{name}` parameter tokens. The compiled form anchors a full-path
//! regular expression in which every parameter becomes the configured
//! capture expression (`([^/]+)` by default) and every literal run is
//! escaped.

use super::params::RouteParams;
use crate::config::RouterDefaults;
use crate::errors::PatternError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// A single piece of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Literal text, matched verbatim
    Literal(String),
    /// `{name}` token, matched by the capture expression
    Parameter(String),
}

/// Compiled path template
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<PathSegment>,
    param_names: Vec<String>,
    capture: String,
    regex: Regex,
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.capture == other.capture
    }
}

impl Eq for PathPattern {}

impl PathPattern {
    /// Compile a template with the default `([^/]+)` capture
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        Self::compile_with_capture(template, RouterDefaults::PARAM_CAPTURE)
    }

    /// Compile a template, substituting `capture` for each parameter.
    ///
    /// `capture` must contain exactly one capture group so that parameter
    /// `i` lands in group `i + 1`.
    pub fn compile_with_capture(template: &str, capture: &str) -> Result<Self, PatternError> {
        let capture_regex = Regex::new(capture).map_err(|e| PatternError::Regex(e.to_string()))?;
        if capture_regex.captures_len() != 2 {
            return Err(PatternError::Regex(format!(
                "capture expression '{}' must contain exactly one group",
                capture
            )));
        }

        let segments = parse_segments(template)?;

        let mut param_names = Vec::new();
        let mut seen = HashSet::new();
        for segment in &segments {
            if let PathSegment::Parameter(name) = segment {
                if !seen.insert(name.as_str()) {
                    return Err(PatternError::DuplicateParameter(name.clone()));
                }
                param_names.push(name.clone());
            }
        }

        let source = regex_source(&segments, capture);
        let regex = Regex::new(&source).map_err(|e| PatternError::Regex(e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            segments,
            param_names,
            capture: capture.to_string(),
            regex,
        })
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Parameter names in template order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn capture(&self) -> &str {
        &self.capture
    }

    /// True when the template has no parameters
    pub fn is_static(&self) -> bool {
        self.param_names.is_empty()
    }

    /// Anchored regular expression source, e.g. `^users/([^/]+)$`
    pub fn regex_source(&self) -> &str {
        self.regex.as_str()
    }

    /// Full-path anchored match; parameter values come back in template order
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let captures = self.regex.captures(path)?;
        let mut params = RouteParams::new();
        for (index, name) in self.param_names.iter().enumerate() {
            let value = captures
                .get(index + 1)
                .map(|m| m.as_str())
                .unwrap_or_default();
            params.push(name.clone(), value);
        }
        Some(params)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Substitute parameter tokens with `args`.
    ///
    /// Tokens without a supplied value are left in place as `{name}`.
    pub fn build<I, K, V>(&self, args: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let args: HashMap<String, String> = args
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let mut path = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(text) => path.push_str(text),
                PathSegment::Parameter(name) => match args.get(name) {
                    Some(value) => path.push_str(value),
                    None => {
                        path.push('{');
                        path.push_str(name);
                        path.push('}');
                    }
                },
            }
        }
        path
    }
}

fn is_identifier(body: &str) -> bool {
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn parse_segments(template: &str) -> Result<Vec<PathSegment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            // An unterminated brace is plain text
            break;
        };

        let body = &after_open[..close];
        if !is_identifier(body) {
            return Err(PatternError::InvalidParameter(body.to_string()));
        }

        literal.push_str(&rest[..open]);
        if !literal.is_empty() {
            segments.push(PathSegment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(PathSegment::Parameter(body.to_string()));
        rest = &after_open[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(PathSegment::Literal(literal));
    }
    Ok(segments)
}

fn regex_source(segments: &[PathSegment], capture: &str) -> String {
    let mut source = String::from("^");
    for segment in segments {
        match segment {
            PathSegment::Literal(text) => source.push_str(&regex::escape(text)),
            PathSegment::Parameter(_) => source.push_str(capture),
        }
    }
    source.push('$');
    source
}
