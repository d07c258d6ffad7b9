//! Wildcard and regex path patterns
//!
//! A pattern offers two operations: `check`, the authoritative anchored
//! match against a full item path, and `reach`, a cheap necessary condition
//! used to prune hierarchy prefixes before any payload is materialized.

use anyhow::{Context, Result};
use regex::Regex;

/// A compiled path pattern with optional reachability stops
///
/// Wildcard specifications use standard glob semantics: `*` matches any run
/// of characters (including `/`), `?` matches a single character, everything
/// else is literal. Raw regex specifications carry no stops and are treated
/// as reachable everywhere.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: Regex,
    stops: Vec<Regex>,
}

impl PathPattern {
    /// Compile a pattern from a path specification
    pub fn new(spec: &str, regex: bool) -> Result<Self> {
        if regex {
            return Ok(Self {
                pattern: full_match(spec)?,
                stops: Vec::new(),
            });
        }
        // One stop per '/', '*' or '?' occurrence: the literal-leaning
        // prefix a candidate must satisfy to keep this pattern alive at
        // that hierarchy depth.
        let stops = spec
            .char_indices()
            .filter(|(_, c)| matches!(c, '/' | '*' | '?'))
            .map(|(k, _)| full_match(&translate(&spec[..k])))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pattern: full_match(&translate(spec))?,
            stops,
        })
    }

    /// Wrap an already compiled regex as an anchored pattern without stops
    #[allow(dead_code)]
    pub fn from_regex(spec: Regex) -> Result<Self> {
        Ok(Self {
            pattern: full_match(spec.as_str())?,
            stops: Vec::new(),
        })
    }

    /// Cheap reachability pre-check for a candidate path
    ///
    /// Returning false guarantees that no path under this hierarchy prefix
    /// can satisfy `check`. A full match always counts as reachable, so the
    /// check never produces a false negative.
    pub fn reach(&self, path: &str) -> bool {
        if self.stops.is_empty() {
            return true;
        }
        self.stops.iter().any(|stop| stop.is_match(path)) || self.check(path)
    }

    /// Authoritative match of a candidate path, anchored at both ends
    pub fn check(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Translate a wildcard expression into regex source
fn translate(spec: &str) -> String {
    let mut out = String::with_capacity(spec.len() * 2);
    for c in spec.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c if c.is_ascii_punctuation() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Compile regex source anchored at both ends
fn full_match(source: &str) -> Result<Regex> {
    Regex::new(&format!(r"\A(?:{})\z", source))
        .with_context(|| format!("invalid path pattern: {}", source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wildcard(spec: &str) -> PathPattern {
        PathPattern::new(spec, false).unwrap()
    }

    #[test]
    fn test_check_is_anchored() {
        let p = wildcard("*.txt");
        assert!(p.check("a.txt"));
        assert!(p.check("dir/a.txt")); // '*' crosses '/'
        assert!(!p.check("a.txt.bak"));
        assert!(!p.check("xtxt"));
    }

    #[test]
    fn test_question_mark_matches_one_char() {
        let p = wildcard("a?c");
        assert!(p.check("abc"));
        assert!(p.check("a/c"));
        assert!(!p.check("ac"));
        assert!(!p.check("abbc"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = wildcard("a.b+c");
        assert!(p.check("a.b+c"));
        assert!(!p.check("aXb+c"));
        assert!(!p.check("a.bbc"));
    }

    #[test]
    fn test_reach_prunes_foreign_subtrees() {
        let p = wildcard("sub/*.txt");
        assert!(p.reach("sub"));
        assert!(p.reach("sub/a.txt"));
        assert!(!p.reach("other"));
        assert!(!p.reach("other/a.txt"));
    }

    #[test]
    fn test_reach_never_false_negative() {
        // check(s) implies reach(s) for every wildcard pattern
        let cases = [
            ("*", vec!["a", "a/b", ""]),
            ("*.txt", vec!["x.txt", "d/x.txt"]),
            ("a*b/c", vec!["axb/c", "ab/c"]),
            ("sub/*", vec!["sub/x", "sub/d/x"]),
            ("a?c", vec!["abc"]),
        ];
        for (spec, paths) in cases {
            let p = wildcard(spec);
            for path in paths {
                if p.check(path) {
                    assert!(p.reach(path), "pattern {:?} path {:?}", spec, path);
                }
            }
        }
    }

    #[test]
    fn test_raw_regex_has_no_stops() {
        let p = PathPattern::new(r"sub/.*\.txt", true).unwrap();
        assert!(p.reach("anything"));
        assert!(p.check("sub/a.txt"));
        assert!(!p.check("sub/a.txt.bak"));
    }

    #[test]
    fn test_from_regex() {
        let p = PathPattern::from_regex(Regex::new("a+").unwrap()).unwrap();
        assert!(p.check("aaa"));
        assert!(!p.check("aab"));
        assert!(p.reach("zzz"));
    }

    #[test]
    fn test_literal_pattern_reach() {
        // No metacharacters means no stops, so reach is trivially true.
        let p = wildcard("abc");
        assert!(p.reach("zzz"));
        assert!(p.check("abc"));
        assert!(!p.check("ab"));
    }
}
