//! Common utilities for the command line interface.
use regex::Regex;

pub mod analyze;
pub mod args;
pub mod config;
pub mod output;
pub mod parse;
pub mod ui;

/// Converts a basic glob pattern to a regular expression.
///
/// `*` stays within one path segment, `**` crosses segments and a leading
/// `**/` also matches at the top level.
///
/// # Example
///
/// ```
/// use smaliscan::glob_to_regex;
/// let re = glob_to_regex("com/*.smali").unwrap();
/// assert!(re.is_match("com/A.smali"));
/// assert!(!re.is_match("com/a/B.smali"));
/// let re = glob_to_regex("**/R$*.smali").unwrap();
/// assert!(re.is_match("R$id.smali"));
/// ```
pub fn glob_to_regex(pat: &str) -> Result<Regex, regex::Error> {
    if pat.contains('[') || pat.contains(']') {
        // character classes are not supported
        let invalid = "[".to_string();
        return Regex::new(&invalid);
    }
    let mut regex = String::from("^");
    let mut rest = pat;
    while let Some(stripped) = rest.strip_prefix("**/") {
        regex.push_str("(?:.*/)?");
        rest = stripped;
    }
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    regex.push_str(".*");
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            '.' => regex.push_str("\\."),
            '/' => regex.push('/'),
            '(' | ')' | '+' | '|' | '^' | '$' | '{' | '}' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    Regex::new(&regex)
}

/// Transforms a glob-style exclusion string into [`Regex`].
/// A trailing slash excludes the directory and everything below it.
///
/// # Example
///
/// ```
/// use smaliscan::parse_exclude;
/// let re = parse_exclude("android/").unwrap();
/// assert!(re.is_match("android"));
/// assert!(re.is_match("android/support/V4.smali"));
/// ```
pub fn parse_exclude(s: &str) -> Result<Regex, String> {
    match s.strip_suffix('/') {
        Some(dir) => {
            let re = glob_to_regex(dir).map_err(|e| e.to_string())?;
            let inner = re.as_str().strip_suffix('$').unwrap_or(re.as_str());
            Regex::new(&format!("{inner}(?:/.*)?$")).map_err(|e| e.to_string())
        }
        None => glob_to_regex(s).map_err(|e| e.to_string()),
    }
}

/// Parses every pattern, reporting the first bad one.
pub fn parse_excludes<'a, I>(patterns: I) -> anyhow::Result<Vec<Regex>>
where
    I: IntoIterator<Item = &'a String>,
{
    patterns
        .into_iter()
        .map(|p| parse_exclude(p).map_err(|e| anyhow::anyhow!("invalid exclude '{p}': {e}")))
        .collect()
}
