//! Turns a parsed stylesheet into the flat list of selector records the
//! reducer works on.

use crate::stylesheet::{CssRule, Stylesheet};
use sweep_common::protocol::SelectorRecord;

/// Separator used to join the members of one selector list.
pub const SELECTOR_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorExtractor {
    nested_groups: bool,
}

impl SelectorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also audit style rules inside `@media`, `@supports` and the other
    /// conditional group rules. Off by default: at-rules are skipped whole.
    pub fn nested_groups(mut self, enabled: bool) -> Self {
        self.nested_groups = enabled;
        self
    }

    /// One record per style rule, in document order.
    pub fn extract(&self, sheet: &Stylesheet) -> Vec<SelectorRecord> {
        let mut records = Vec::new();
        self.collect(&sheet.rules, &mut records);
        records
    }

    fn collect(&self, rules: &[CssRule], out: &mut Vec<SelectorRecord>) {
        for rule in rules {
            match rule {
                CssRule::Style(style) if !style.selectors.is_empty() => {
                    out.push(SelectorRecord::new(
                        style.selectors.join(SELECTOR_SEPARATOR),
                        style.start,
                    ));
                }
                CssRule::Group(group) if self.nested_groups => self.collect(&group.rules, out),
                CssRule::Style(_) | CssRule::Group(_) | CssRule::Other(_) => {}
            }
        }
    }
}
