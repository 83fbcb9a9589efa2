//! Syntax-tree traversal contract.
//!
//! pyvet does not parse source itself. Embedders that own a parser implement
//! [`Node`] for their tree, write checkers implementing [`AstChecker`], and
//! drive them with an [`AstWalker`]. A checker reports interest in node kinds
//! through visit/leave methods; the walker calls them in registration order
//! around a depth-first descent into the node's children.

use crate::checkers::Checker;
use std::cell::RefCell;
use std::rc::Rc;

/// Kind used by a checker to receive every node it has no specific
/// callback for.
pub const DEFAULT_KIND: &str = "default";

/// A syntax-tree node as seen by the walker.
pub trait Node {
    /// Lowercase node-kind name, e.g. `functiondef`.
    fn kind(&self) -> &str;

    fn children(&self) -> Vec<&Self>;

    fn is_statement(&self) -> bool {
        false
    }

    fn lineno(&self) -> Option<u32> {
        None
    }
}

/// A visit or leave function.
pub trait AstCallback<N: ?Sized> {
    fn call(&mut self, node: &N);
}

impl<N: ?Sized, F: FnMut(&N)> AstCallback<N> for F {
    fn call(&mut self, node: &N) {
        self(node)
    }
}

/// A visit or leave method of checker `C`.
pub type AstCallbackMethod<C, N> = fn(&mut C, &N);

/// A registered method together with the messages it exists to emit.
pub struct CallbackEntry<C, N> {
    pub kind: &'static str,
    pub method: AstCallbackMethod<C, N>,
    /// Empty means "always needed".
    pub requires: &'static [&'static str],
}

impl<C, N> CallbackEntry<C, N> {
    pub fn new(kind: &'static str, method: AstCallbackMethod<C, N>) -> Self {
        Self {
            kind,
            method,
            requires: &[],
        }
    }

    pub fn requiring(mut self, msgs: &'static [&'static str]) -> Self {
        self.requires = msgs;
        self
    }
}

/// A checker that is driven by tree traversal.
pub trait AstChecker<N: Node>: Checker + Sized {
    fn visit_methods(&self) -> Vec<CallbackEntry<Self, N>>;

    fn leave_methods(&self) -> Vec<CallbackEntry<Self, N>> {
        Vec::new()
    }
}

type BoxedCallback<'a, N> = Box<dyn AstCallback<N> + 'a>;

enum Selector {
    Kind(String),
    /// Every kind the owning checker has no specific callback for.
    Default { handled: Vec<&'static str> },
}

impl Selector {
    fn matches(&self, kind: &str) -> bool {
        match self {
            Selector::Kind(k) => k == kind,
            Selector::Default { handled } => !handled.iter().any(|h| *h == kind),
        }
    }
}

struct Registered<'a, N> {
    selector: Selector,
    callback: BoxedCallback<'a, N>,
}

/// Callbacks in registration order, specific and default alike.
struct Events<'a, N> {
    entries: Vec<Registered<'a, N>>,
}

impl<'a, N> Default for Events<'a, N> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<'a, N: Node + 'a> Events<'a, N> {
    fn add<C: 'a>(
        &mut self,
        checker: &Rc<RefCell<C>>,
        entries: Vec<CallbackEntry<C, N>>,
        is_enabled: &dyn Fn(&str) -> bool,
    ) -> usize {
        let enabled: Vec<_> = entries
            .into_iter()
            .filter(|e| e.requires.is_empty() || e.requires.iter().any(|m| is_enabled(m)))
            .collect();
        let handled: Vec<&'static str> = enabled
            .iter()
            .map(|e| e.kind)
            .filter(|k| *k != DEFAULT_KIND)
            .collect();
        let count = enabled.len();
        for entry in enabled {
            let target = Rc::clone(checker);
            let method = entry.method;
            let selector = if entry.kind == DEFAULT_KIND {
                Selector::Default {
                    handled: handled.clone(),
                }
            } else {
                Selector::Kind(entry.kind.to_string())
            };
            self.entries.push(Registered {
                selector,
                callback: Box::new(move |node: &N| method(&mut target.borrow_mut(), node)),
            });
        }
        count
    }

    fn add_kind(&mut self, kind: &str, callback: BoxedCallback<'a, N>) {
        self.entries.push(Registered {
            selector: Selector::Kind(kind.to_string()),
            callback,
        });
    }

    fn fire(&mut self, node: &N) {
        let kind = node.kind();
        for r in self.entries.iter_mut() {
            if r.selector.matches(kind) {
                r.callback.call(node);
            }
        }
    }
}

/// Dispatches visit/leave callbacks over a tree.
pub struct AstWalker<'a, N: Node> {
    visits: Events<'a, N>,
    leaves: Events<'a, N>,
    nbstatements: usize,
}

impl<'a, N: Node> Default for AstWalker<'a, N> {
    fn default() -> Self {
        Self {
            visits: Events::default(),
            leaves: Events::default(),
            nbstatements: 0,
        }
    }
}

impl<'a, N: Node + 'a> AstWalker<'a, N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the enabled callbacks of `checker`. A callback whose required
    /// messages are all disabled is skipped. Returns how many were registered.
    pub fn add_checker<C>(&mut self, checker: Rc<RefCell<C>>, is_enabled: impl Fn(&str) -> bool) -> usize
    where
        C: AstChecker<N> + 'a,
    {
        let (visits, leaves) = {
            let c = checker.borrow();
            (c.visit_methods(), c.leave_methods())
        };
        let name = checker.borrow().name();
        let n = self.visits.add(&checker, visits, &is_enabled)
            + self.leaves.add(&checker, leaves, &is_enabled);
        log::debug!("walker: {} callbacks registered for {}", n, name);
        n
    }

    /// Register a free-standing visit callback for `kind`.
    pub fn add_visit(&mut self, kind: &str, callback: impl AstCallback<N> + 'a) {
        self.visits.add_kind(kind, Box::new(callback));
    }

    /// Register a free-standing leave callback for `kind`.
    pub fn add_leave(&mut self, kind: &str, callback: impl AstCallback<N> + 'a) {
        self.leaves.add_kind(kind, Box::new(callback));
    }

    /// Visit `node`, walk its children, then leave it.
    pub fn walk(&mut self, node: &N) {
        if node.is_statement() {
            self.nbstatements += 1;
        }
        self.visits.fire(node);
        for child in node.children() {
            self.walk(child);
        }
        self.leaves.fire(node);
    }

    /// Statement nodes seen so far.
    pub fn statements(&self) -> usize {
        self.nbstatements
    }
}
