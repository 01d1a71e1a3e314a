//! Stable selector vocabulary
//!
//! Raw CSS and XPath strings are brittle against dashboard restyles, so the
//! harness names its targets and renders them to concrete locators only at
//! the browser boundary. Test-id targets are preferred wherever the
//! dashboard exposes one; the rest wrap the selector logic the dashboard
//! forces on us.

use std::fmt;

/// A named way of locating one element (or a set of them) on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Raw CSS selector, for the few spots with no better handle
    Css(String),
    /// `[data-testid=…]` attribute, resistant to copy and style changes
    TestId(String),
    /// Input whose sibling label text matches
    LabeledInput(String),
    /// Button-styled element containing the label text
    Button(String),
    /// Entry of the persistent `nav` element
    NavItem(String),
    /// Any element whose own text contains the string
    Text(String),
    /// Text containment scoped to a CSS selector
    TextIn { css: String, text: String },
    /// Key cell of the nth dynamic row of a key/value editor block
    KvKey { block: String, row: usize },
    /// Value cell of the nth dynamic row of a key/value editor block
    KvValue { block: String, row: usize },
}

impl Target {
    pub fn css(sel: impl AsRef<str>) -> Self {
        Target::Css(sel.as_ref().to_string())
    }

    pub fn test_id(id: impl AsRef<str>) -> Self {
        Target::TestId(id.as_ref().to_string())
    }

    pub fn label(label: impl AsRef<str>) -> Self {
        Target::LabeledInput(label.as_ref().to_string())
    }

    pub fn button(label: impl AsRef<str>) -> Self {
        Target::Button(label.as_ref().to_string())
    }

    pub fn nav(label: impl AsRef<str>) -> Self {
        Target::NavItem(label.as_ref().to_string())
    }

    pub fn text(text: impl AsRef<str>) -> Self {
        Target::Text(text.as_ref().to_string())
    }

    pub fn text_in(css: impl AsRef<str>, text: impl AsRef<str>) -> Self {
        Target::TextIn {
            css: css.as_ref().to_string(),
            text: text.as_ref().to_string(),
        }
    }

    /// Key cell of dynamic row `row` inside the key/value block `block`.
    ///
    /// Row 0 is the freshly opened editor and still has its `.kv-item`
    /// classes; rows added afterwards only exist positionally. The editor
    /// lays out three children per row (key, value, remove) and the first
    /// appended row starts at child 7, so row n >= 1 sits at 7 + 3(n-1).
    /// The layout is assumed append-only; this accessor is the single place
    /// that knows the stride.
    pub fn kv_key(block: impl AsRef<str>, row: usize) -> Self {
        Target::KvKey {
            block: block.as_ref().to_string(),
            row,
        }
    }

    /// Value cell of dynamic row `row`, laid out right after its key cell.
    pub fn kv_value(block: impl AsRef<str>, row: usize) -> Self {
        Target::KvValue {
            block: block.as_ref().to_string(),
            row,
        }
    }

    /// nth-child position of the key cell for a dynamic row.
    pub(crate) fn kv_child_index(row: usize) -> usize {
        debug_assert!(row >= 1, "row 0 is addressed by class, not position");
        7 + 3 * (row - 1)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Css(s) => write!(f, "css:{s}"),
            Target::TestId(id) => write!(f, "testid:{id}"),
            Target::LabeledInput(l) => write!(f, "label:{l}"),
            Target::Button(l) => write!(f, "button:{l}"),
            Target::NavItem(l) => write!(f, "nav:{l}"),
            Target::Text(t) => write!(f, "text:{t}"),
            Target::TextIn { css, text } => write!(f, "text-in:{css}:{text}"),
            Target::KvKey { block, row } => write!(f, "kv-key:{block}:{row}"),
            Target::KvValue { block, row } => write!(f, "kv-value:{block}:{row}"),
        }
    }
}
