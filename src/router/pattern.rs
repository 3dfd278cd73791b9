//! Route pattern parsing, matching and parameter extraction.
//!
//! A pattern is literal text with named placeholders written `{{name}}`, e.g.
//! `/users/{{id}}/posts/{{postId}}`. Parsing happens once at registration; the
//! compiled [`RoutePattern`] is immutable afterwards and safe to share between
//! threads.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use super::params::ParameterSet;
use crate::error::RouterError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Matcher fragment substituted for every placeholder: a capture group of one
/// or more non-slash characters.
const PLACEHOLDER_MATCHER: &str = "([^/]+)";

/// One piece of a parsed pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Text that must appear verbatim in the path
    Literal(String),
    /// A named capture of one path segment
    Placeholder(Arc<str>),
}

/// A parsed and compiled route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    tokens: Vec<PatternToken>,
    /// Distinct literal texts, longest first
    separators: Vec<String>,
    /// Anchored at both ends, one capture group per placeholder in order
    matcher: Regex,
}

impl RoutePattern {
    /// Parse a pattern string
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedPattern`] when:
    /// - a `{{` has no closing `}}`, or a `}}` appears outside a placeholder
    /// - a placeholder name is empty or contains `/`, `{` or `}`
    /// - a placeholder name is used twice in the same pattern
    /// - two placeholders follow each other without literal text in between
    pub fn parse(pattern: &str) -> Result<Self, RouterError> {
        let mut tokens = Vec::new();
        let mut rest = pattern;

        loop {
            let Some(start) = rest.find(OPEN) else {
                if rest.contains(CLOSE) {
                    return Err(RouterError::malformed(
                        pattern,
                        "'}}' without a matching '{{'",
                    ));
                }
                if !rest.is_empty() {
                    tokens.push(PatternToken::Literal(rest.to_string()));
                }
                break;
            };

            let literal = &rest[..start];
            if literal.contains(CLOSE) {
                return Err(RouterError::malformed(
                    pattern,
                    "'}}' without a matching '{{'",
                ));
            }

            let after = &rest[start + OPEN.len()..];
            let end = after
                .find(CLOSE)
                .ok_or_else(|| RouterError::malformed(pattern, "unclosed placeholder"))?;
            let name = &after[..end];
            validate_name(pattern, name)?;

            if literal.is_empty() {
                if let Some(PatternToken::Placeholder(prev)) = tokens.last() {
                    return Err(RouterError::malformed(
                        pattern,
                        format!(
                            "placeholders '{}' and '{}' need literal text between them",
                            prev, name
                        ),
                    ));
                }
            } else {
                tokens.push(PatternToken::Literal(literal.to_string()));
            }

            let duplicate = tokens
                .iter()
                .any(|t| matches!(t, PatternToken::Placeholder(n) if n.as_ref() == name));
            if duplicate {
                return Err(RouterError::malformed(
                    pattern,
                    format!("placeholder '{}' is used more than once", name),
                ));
            }
            tokens.push(PatternToken::Placeholder(Arc::from(name)));

            rest = &after[end + CLOSE.len()..];
        }

        let matcher = compile_matcher(pattern, &tokens)?;

        let mut separators: Vec<String> = Vec::new();
        for token in &tokens {
            if let PatternToken::Literal(text) = token {
                if !separators.contains(text) {
                    separators.push(text.clone());
                }
            }
        }
        // Stable sort keeps first-seen order among equal lengths
        separators.sort_by(|a, b| b.len().cmp(&a.len()));

        Ok(Self {
            raw: pattern.to_string(),
            tokens,
            separators,
            matcher,
        })
    }

    /// The pattern as registered
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Placeholder names in declaration order
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Placeholder(name) => Some(name.as_ref()),
            PatternToken::Literal(_) => None,
        })
    }

    /// Whether the whole path matches this pattern
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Extract placeholder values from `path`.
    ///
    /// On a matching path each placeholder takes the text of its capture
    /// group, so a value may equal a literal of the pattern
    /// (`/{{user}}/profile` on `/profile/profile` gives `user = "profile"`).
    ///
    /// A path that does not match falls back to separator normalization:
    /// every literal found in the path is collapsed to a single `/` in both
    /// the pattern and the path, and the pieces are paired up positionally.
    /// Placeholders whose index has no path segment are left out.
    #[must_use]
    pub fn extract(&self, path: &str) -> ParameterSet {
        let Some(captures) = self.matcher.captures(path) else {
            return self.extract_by_separators(path);
        };
        let mut params = ParameterSet::new();
        let names = self.tokens.iter().filter_map(|t| match t {
            PatternToken::Placeholder(name) => Some(name),
            PatternToken::Literal(_) => None,
        });
        for (group, name) in names.enumerate() {
            if let Some(value) = captures.get(group + 1) {
                params.insert(Arc::clone(name), value.as_str().to_string());
            }
        }
        params
    }

    fn extract_by_separators(&self, path: &str) -> ParameterSet {
        let mut normalized_path = path.to_string();
        let mut applied: Vec<&str> = Vec::with_capacity(self.separators.len());
        for sep in &self.separators {
            if normalized_path.contains(sep.as_str()) {
                normalized_path = normalized_path.replace(sep.as_str(), "/");
                applied.push(sep.as_str());
            }
        }

        // Placeholders are re-emitted verbatim so a separator can never cut
        // through a placeholder name.
        let mut normalized_pattern = String::with_capacity(self.raw.len());
        for token in &self.tokens {
            match token {
                PatternToken::Literal(text) => {
                    let mut text = text.clone();
                    for sep in &applied {
                        text = text.replace(*sep, "/");
                    }
                    normalized_pattern.push_str(&text);
                }
                PatternToken::Placeholder(name) => {
                    normalized_pattern.push_str(OPEN);
                    normalized_pattern.push_str(name);
                    normalized_pattern.push_str(CLOSE);
                }
            }
        }

        let names: HashMap<usize, &str> = normalized_pattern
            .split('/')
            .enumerate()
            .filter_map(|(index, segment)| {
                segment
                    .strip_prefix(OPEN)
                    .and_then(|s| s.strip_suffix(CLOSE))
                    .map(|name| (index, name))
            })
            .collect();

        let mut params = ParameterSet::new();
        for (index, value) in normalized_path.split('/').enumerate() {
            if let Some(name) = names.get(&index) {
                if let Some(key) = self.placeholder_arc(name) {
                    params.insert(key, value.to_string());
                }
            }
        }
        params
    }

    fn placeholder_arc(&self, name: &str) -> Option<Arc<str>> {
        self.tokens.iter().find_map(|t| match t {
            PatternToken::Placeholder(n) if n.as_ref() == name => Some(Arc::clone(n)),
            _ => None,
        })
    }
}

fn validate_name(pattern: &str, name: &str) -> Result<(), RouterError> {
    if name.is_empty() {
        return Err(RouterError::malformed(pattern, "empty placeholder name"));
    }
    if name.contains(['/', '{', '}']) {
        return Err(RouterError::malformed(
            pattern,
            format!("placeholder name '{}' contains '/', '{{' or '}}'", name),
        ));
    }
    Ok(())
}

fn compile_matcher(pattern: &str, tokens: &[PatternToken]) -> Result<Regex, RouterError> {
    let mut source = String::with_capacity(pattern.len() + 16);
    source.push('^');
    for token in tokens {
        match token {
            PatternToken::Literal(text) => source.push_str(&regex::escape(text)),
            PatternToken::Placeholder(_) => source.push_str(PLACEHOLDER_MATCHER),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| RouterError::malformed(pattern, e.to_string()))
}
