//! Per-file extraction state.

use ir::{CallRecord, ClassRecord, ConstStringRecord, MethodRecord, PropertyRecord};
use tracing::debug;

use super::facts::{match_line, CallSite, Fact};

/// Folds the facts of one file into class records.
///
/// Tracks the open class, the open method and the index of the next call
/// inside that method. A class fact opens a new class and closes the open
/// method; a method fact opens a new method and resets the call index.
/// Facts that need an open class (or method, for calls) are dropped when
/// there is none.
#[derive(Debug)]
pub struct FileContext {
    path: String,
    classes: Vec<ClassRecord>,
    method_open: bool,
    call_index: usize,
    dropped: usize,
}

impl FileContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classes: Vec::new(),
            method_open: false,
            call_index: 0,
            dropped: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn current_class(&self) -> Option<&ClassRecord> {
        self.classes.last()
    }

    pub fn current_method(&self) -> Option<&MethodRecord> {
        if self.method_open {
            self.classes.last()?.methods.last()
        } else {
            None
        }
    }

    /// Index the next call of the open method will receive.
    pub fn call_index(&self) -> usize {
        self.call_index
    }

    /// Facts dropped so far for lack of an enclosing class or method.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Classifies `line` and applies the resulting fact, if any.
    pub fn feed_line(&mut self, line: &str) -> bool {
        match match_line(line) {
            Some(fact) => self.apply(fact),
            None => false,
        }
    }

    /// Applies one fact. Returns `false` when the fact was dropped.
    pub fn apply(&mut self, fact: Fact) -> bool {
        match fact {
            Fact::Class { class_type, name } => {
                self.classes
                    .push(ClassRecord::new(name, class_type, self.path.clone()));
                self.method_open = false;
                self.call_index = 0;
                true
            }
            Fact::Call(site) => self.push_call(site),
            member => {
                let opens_method = matches!(member, Fact::Method { .. });
                let Some(class) = self.classes.last_mut() else {
                    debug!(path = %self.path, fact = ?member, "Fact outside of a class dropped");
                    self.dropped += 1;
                    return false;
                };
                add_member(class, member);
                if opens_method {
                    self.method_open = true;
                    self.call_index = 0;
                }
                true
            }
        }
    }

    fn push_call(&mut self, site: CallSite) -> bool {
        let method = match self.classes.last_mut().and_then(|c| c.methods.last_mut()) {
            Some(m) if self.method_open => m,
            _ => {
                debug!(
                    path = %self.path,
                    to_class = %site.to_class,
                    "Call outside of a method dropped"
                );
                self.dropped += 1;
                return false;
            }
        };
        method.calls.push(CallRecord {
            from_class: method.class.clone(),
            from_method: method.name.clone(),
            local_args: site.local_args,
            to_class: site.to_class,
            to_method: site.to_method,
            dst_args: site.dst_args,
            ret: site.ret,
            index: self.call_index,
        });
        self.call_index += 1;
        true
    }

    /// Returns the classes found, in file order.
    pub fn finish(self) -> Vec<ClassRecord> {
        self.classes
    }
}

fn add_member(class: &mut ClassRecord, fact: Fact) {
    let owner = class.name().to_string();
    match fact {
        Fact::Super { parent } => class.parent = Some(parent),
        Fact::Field {
            name,
            prop_type,
            info,
        } => class.properties.push(PropertyRecord {
            name,
            prop_type,
            info,
            class: owner,
        }),
        Fact::ConstString { var, value } => class.const_strings.push(ConstStringRecord {
            var,
            value,
            class: owner,
        }),
        Fact::Method {
            name,
            args,
            ret,
            info,
        } => class.methods.push(MethodRecord {
            name,
            args,
            ret,
            info,
            class: owner,
            calls: Vec::new(),
        }),
        Fact::Class { .. } | Fact::Call(_) => {}
    }
}
