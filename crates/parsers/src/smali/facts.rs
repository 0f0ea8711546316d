//! Stateless line matchers.
//!
//! Every line is routed to at most one category by looking for its marker,
//! in a fixed order: `.class`, `.super`, `.field`, `const-string`, `.method`,
//! `invoke`. The first marker found decides the category; when the pattern
//! of that category does not match the line yields nothing.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// A construct recognised on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Class {
        class_type: String,
        name: String,
    },
    Super {
        parent: String,
    },
    Field {
        name: String,
        prop_type: String,
        info: String,
    },
    ConstString {
        var: String,
        value: String,
    },
    Method {
        name: String,
        args: String,
        ret: String,
        info: String,
    },
    Call(CallSite),
}

/// Destination of an `invoke-*` instruction, before it is attached to a
/// method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub local_args: String,
    pub to_class: String,
    pub to_method: String,
    pub dst_args: String,
    pub ret: String,
}

static CLASS_RE: OnceLock<Regex> = OnceLock::new();
static SUPER_RE: OnceLock<Regex> = OnceLock::new();
static FIELD_RE: OnceLock<Regex> = OnceLock::new();
static CONST_RE: OnceLock<Regex> = OnceLock::new();
static CONST_VALUE_RE: OnceLock<Regex> = OnceLock::new();
static METHOD_RE: OnceLock<Regex> = OnceLock::new();
static SIGNATURE_RE: OnceLock<Regex> = OnceLock::new();
static INVOKE_RE: OnceLock<Regex> = OnceLock::new();
static CALL_RE: OnceLock<Regex> = OnceLock::new();

/// Classifies one line of smali source.
///
/// # Example
/// ```
/// use parsers::smali::{match_line, Fact};
/// let fact = match_line(".class public final Lcom/a/B;").unwrap();
/// assert_eq!(
///     fact,
///     Fact::Class { class_type: "public final".into(), name: "Lcom/a/B;".into() }
/// );
/// assert!(match_line("    return-void").is_none());
/// ```
pub fn match_line(line: &str) -> Option<Fact> {
    if line.contains(".class") {
        match_class(line)
    } else if line.contains(".super") {
        match_super(line)
    } else if line.contains(".field") {
        match_field(line)
    } else if line.contains("const-string") {
        match_const_string(line)
    } else if line.contains(".method") {
        match_method(line)
    } else if line.contains("invoke") {
        match_invoke(line)
    } else {
        None
    }
}

/// Splits `a b c` into (`a b`, `c`).
fn split_last_token(decl: &str) -> Option<(String, &str)> {
    let tokens: Vec<&str> = decl.split_whitespace().collect();
    let (last, rest) = tokens.split_last()?;
    Some((rest.join(" "), last))
}

pub fn match_class(line: &str) -> Option<Fact> {
    let re = CLASS_RE
        .get_or_init(|| Regex::new(r"\.class\s+(?P<decl>.*\S)").expect("valid class regex"));
    let decl = re.captures(line)?.name("decl")?.as_str();
    let (class_type, name) = split_last_token(decl)?;
    debug!(class = name, "Found class");
    Some(Fact::Class {
        class_type,
        name: name.to_string(),
    })
}

pub fn match_super(line: &str) -> Option<Fact> {
    let re = SUPER_RE
        .get_or_init(|| Regex::new(r"\.super\s+(?P<parent>\S+)").expect("valid super regex"));
    let parent = re.captures(line)?.name("parent")?.as_str();
    debug!(parent, "Found parent class");
    Some(Fact::Super {
        parent: parent.to_string(),
    })
}

pub fn match_field(line: &str) -> Option<Fact> {
    let re = FIELD_RE
        .get_or_init(|| Regex::new(r"\.field\s+(?P<decl>.*\S)").expect("valid field regex"));
    let decl = re.captures(line)?.name("decl")?.as_str();
    // Initial values (`= 0x10`, `= "text"`) are not part of the declaration.
    let decl = decl.split_once(" = ").map_or(decl, |(d, _)| d);
    let (info, field) = split_last_token(decl)?;
    let (name, prop_type) = match field.rsplit_once(':') {
        Some((name, ty)) => (name, ty),
        None => (field, ""),
    };
    debug!(property = field, "Found property");
    Some(Fact::Field {
        name: name.to_string(),
        prop_type: prop_type.to_string(),
        info,
    })
}

pub fn match_const_string(line: &str) -> Option<Fact> {
    let re = CONST_RE.get_or_init(|| {
        Regex::new(r"const-string(?:/jumbo)?\s+(?P<const>.*)").expect("valid const-string regex")
    });
    let value_re = CONST_VALUE_RE.get_or_init(|| {
        Regex::new(r#"^(?P<var>[^,]+),\s*"(?P<value>(?:[^"\\]|\\.)*)""#)
            .expect("valid const-string value regex")
    });
    let data = re.captures(line)?.name("const")?.as_str();
    let caps = value_re.captures(data)?;
    let var = caps.name("var")?.as_str().trim();
    let value = caps.name("value")?.as_str();
    debug!(var, value, "Found const-string");
    Some(Fact::ConstString {
        var: var.to_string(),
        value: value.to_string(),
    })
}

pub fn match_method(line: &str) -> Option<Fact> {
    let re = METHOD_RE
        .get_or_init(|| Regex::new(r"\.method\s+(?P<decl>.*\S)").expect("valid method regex"));
    let sig_re = SIGNATURE_RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.*?)\((?P<args>.*)\)(?P<ret>.*)$").expect("valid signature regex")
    });
    let decl = re.captures(line)?.name("decl")?.as_str();
    let (info, signature) = split_last_token(decl)?;
    let (name, args, ret) = match sig_re.captures(signature) {
        Some(caps) => (
            caps.name("name").map_or("", |m| m.as_str()),
            caps.name("args").map_or("", |m| m.as_str()),
            caps.name("ret").map_or("", |m| m.as_str()),
        ),
        None => (signature, "", ""),
    };
    debug!(method = signature, "Found method");
    Some(Fact::Method {
        name: name.to_string(),
        args: args.to_string(),
        ret: ret.to_string(),
        info,
    })
}

pub fn match_invoke(line: &str) -> Option<Fact> {
    let re = INVOKE_RE.get_or_init(|| {
        Regex::new(r"invoke-\w+(?:/range)?\s*(?P<invoke>.*)").expect("valid invoke regex")
    });
    let call_re = CALL_RE.get_or_init(|| {
        Regex::new(
            r"(?P<local_args>\{.*\}),\s+(?P<dst_class>[^\s,]+?)->(?P<dst_method>[^(\s]*)\((?P<dst_args>.*)\)(?P<ret>[^\s,]*)",
        )
        .expect("valid call regex")
    });
    let data = re.captures(line)?.name("invoke")?.as_str().trim();
    debug!(invoke = data, "Found invoke");
    let site = match call_re.captures(data) {
        Some(caps) => {
            let get = |name: &str| caps.name(name).map_or("", |m| m.as_str()).to_string();
            CallSite {
                local_args: get("local_args"),
                to_class: get("dst_class"),
                to_method: get("dst_method"),
                dst_args: get("dst_args"),
                ret: get("ret"),
            }
        }
        None => CallSite {
            to_class: data.to_string(),
            ..CallSite::default()
        },
    };
    Some(Fact::Call(site))
}
