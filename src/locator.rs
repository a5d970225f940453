//! Lazily-resolved element descriptions.
//!
//! A [`Locator`] never holds a reference to a live element. It is a small
//! predicate tree that gets serialized to JSON and evaluated inside the page
//! by [`RESOLVE_SCRIPT`] every time something needs the matching elements.
//! Zero matches is a perfectly valid resolution; only interactions that need
//! an element fail, and they do so after the action timeout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How text is compared against an element's normalized text content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TextMatch {
    /// Case-insensitive substring
    Contains { value: String },
    /// Case-sensitive, whole normalized text
    Exact { value: String },
    /// JavaScript regular expression
    Regex { source: String, flags: String },
}

impl TextMatch {
    pub fn contains(value: impl Into<String>) -> Self {
        TextMatch::Contains {
            value: value.into(),
        }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        TextMatch::Exact {
            value: value.into(),
        }
    }

    pub fn regex(source: impl Into<String>, flags: impl Into<String>) -> Self {
        TextMatch::Regex {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Contains { value } => write!(f, "{}", value),
            TextMatch::Exact { value } => write!(f, "\"{}\"", value),
            TextMatch::Regex { source, flags } => write!(f, "/{}/{}", source, flags),
        }
    }
}

/// Description of zero-or-more DOM elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Plain CSS selector
    Css { selector: String },
    /// Smallest elements whose text matches
    Text { text: TextMatch },
    /// CSS matches filtered by their text content
    HasText { selector: String, text: TextMatch },
    /// Union of alternatives, in document order
    Any { alternatives: Vec<Locator> },
    /// Single match by position; negative counts from the end
    Nth { inner: Box<Locator>, index: i64 },
    /// `child` resolved inside every match of `parent`
    Within {
        parent: Box<Locator>,
        child: Box<Locator>,
    },
    /// Parent elements of every match
    Parent { inner: Box<Locator> },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
        }
    }

    /// Equivalent of a `text=...` engine query
    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text {
            text: TextMatch::contains(text),
        }
    }

    pub fn text_matching(text: TextMatch) -> Self {
        Locator::Text { text }
    }

    /// Equivalent of `selector:has-text("...")`
    pub fn has_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::HasText {
            selector: selector.into(),
            text: TextMatch::contains(text),
        }
    }

    pub fn has_text_matching(selector: impl Into<String>, text: TextMatch) -> Self {
        Locator::HasText {
            selector: selector.into(),
            text,
        }
    }

    /// Union of several locators; a single alternative is returned as is
    pub fn any(alternatives: impl IntoIterator<Item = Locator>) -> Self {
        let mut alternatives: Vec<Locator> = alternatives.into_iter().collect();
        if alternatives.len() == 1 {
            return alternatives.remove(0);
        }
        Locator::Any { alternatives }
    }

    pub fn or(self, other: Locator) -> Self {
        match self {
            Locator::Any { mut alternatives } => {
                alternatives.push(other);
                Locator::Any { alternatives }
            }
            first => Locator::Any {
                alternatives: vec![first, other],
            },
        }
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    pub fn last(self) -> Self {
        Locator::Nth {
            inner: Box::new(self),
            index: -1,
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Locator::Nth {
            inner: Box::new(self),
            index: index as i64,
        }
    }

    /// Scope `child` to the descendants of this locator's matches
    pub fn locator(self, child: Locator) -> Self {
        Locator::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    pub fn parent(self) -> Self {
        Locator::Parent {
            inner: Box::new(self),
        }
    }

    /// JSON descriptor consumed by [`RESOLVE_SCRIPT`]
    pub fn to_descriptor(&self) -> serde_json::Value {
        // Serializing a tree of strings and integers cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "css={}", selector),
            Locator::Text { text } => write!(f, "text={}", text),
            Locator::HasText { selector, text } => write!(f, "{}:has-text({})", selector, text),
            Locator::Any { alternatives } => {
                let parts: Vec<String> = alternatives.iter().map(|l| l.to_string()).collect();
                write!(f, "({})", parts.join(" | "))
            }
            Locator::Nth { inner, index } => write!(f, "{} >> nth={}", inner, index),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
            Locator::Parent { inner } => write!(f, "{} >> ..", inner),
        }
    }
}

/// Evaluates `arguments[0]` (a locator descriptor) against the document and
/// applies the operation named in `arguments[1]` to the matches.
///
/// Operations: `elements`, `count`, `texts`, `attribute`, `visible`,
/// `value`, `tag`. Single-element operations use the first match and return
/// `null` when there is none.
pub const RESOLVE_SCRIPT: &str = r#"
    const desc = arguments[0];
    const op = arguments[1];
    const opArg = arguments[2];

    function normalize(s) {
        return (s || '').replace(/\s+/g, ' ').trim();
    }

    function textMatches(el, m) {
        const t = normalize(el.textContent);
        if (m.mode === 'contains') return t.toLowerCase().includes(m.value.toLowerCase());
        if (m.mode === 'exact') return t === m.value;
        if (m.mode === 'regex') return new RegExp(m.source, m.flags).test(t);
        return false;
    }

    function byDocumentOrder(list) {
        const unique = Array.from(new Set(list));
        unique.sort((a, b) => {
            if (a === b) return 0;
            return (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1;
        });
        return unique;
    }

    function query(roots, selector) {
        const out = [];
        for (const root of roots) {
            out.push(...root.querySelectorAll(selector));
        }
        return byDocumentOrder(out);
    }

    const SKIP = new Set(['SCRIPT', 'STYLE', 'HEAD', 'TITLE', 'NOSCRIPT', 'HTML', 'BODY']);

    function resolve(d, roots) {
        switch (d.kind) {
            case 'css':
                return query(roots, d.selector);
            case 'text': {
                const candidates = query(roots, '*').filter(el => !SKIP.has(el.tagName));
                const hits = candidates.filter(el => textMatches(el, d.text));
                // Keep the innermost elements carrying the text
                return hits.filter(el => !Array.from(el.children).some(c => textMatches(c, d.text)));
            }
            case 'has_text':
                return query(roots, d.selector).filter(el => textMatches(el, d.text));
            case 'any': {
                const out = [];
                for (const alt of d.alternatives) out.push(...resolve(alt, roots));
                return byDocumentOrder(out);
            }
            case 'nth': {
                const all = resolve(d.inner, roots);
                const i = d.index < 0 ? all.length + d.index : d.index;
                return (i >= 0 && i < all.length) ? [all[i]] : [];
            }
            case 'within': {
                const parents = resolve(d.parent, roots);
                return parents.length ? resolve(d.child, parents) : [];
            }
            case 'parent':
                return byDocumentOrder(
                    resolve(d.inner, roots).map(el => el.parentElement).filter(Boolean)
                );
        }
        throw new Error('unknown locator kind: ' + d.kind);
    }

    function isVisible(el) {
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden';
    }

    const matches = resolve(desc, [document]);
    const first = matches.length ? matches[0] : null;

    switch (op) {
        case 'elements': return matches;
        case 'count': return matches.length;
        case 'texts': return matches.map(el => el.textContent || '');
        case 'attribute': return first ? first.getAttribute(opArg) : null;
        case 'visible': return first ? isVisible(first) : false;
        case 'value': return first ? (first.value === undefined ? null : String(first.value)) : null;
        case 'tag': return first ? first.tagName : null;
        case 'text': return first ? first.textContent : null;
    }
    throw new Error('unknown locator operation: ' + op);
"#;

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
