use super::expr::{Expr, write_seq};
use serde::{Deserialize, Serialize};

/// Default character budget for [`Stack::preview`] in diagnostics.
pub const PREVIEW_LIMIT: usize = 150;

/// The value stack: data and environment in one ordered sequence.
///
/// Items are kept in text order, so index 0 is the bottom and the last item
/// is the top. Depths passed to the methods below count from the top,
/// starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    items: Vec<Expr>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { items: Vec::new() }
    }

    pub fn from_vec(items: Vec<Expr>) -> Self {
        Stack { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, expr: Expr) {
        self.items.push(expr);
    }

    /// Removes the top `n` items and returns them in text order.
    pub fn take(&mut self, n: usize) -> Option<Vec<Expr>> {
        let at = self.items.len().checked_sub(n)?;
        Some(self.items.split_off(at))
    }

    /// Finds the body of the nearest definition of `name`, scanning from the
    /// top down.
    pub fn find_definition(&self, name: &str) -> Option<&[Expr]> {
        self.items.iter().rev().find_map(|item| match item {
            Expr::Def { name: n, body } if n == name => Some(body.as_slice()),
            _ => None,
        })
    }

    pub fn as_slice(&self) -> &[Expr] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Expr> {
        self.items
    }

    /// Everything except definitions, bottom to top.
    pub fn values(&self) -> impl Iterator<Item = &Expr> {
        self.items
            .iter()
            .filter(|item| !matches!(item, Expr::Def { .. }))
    }

    /// Renders the values (definitions omitted) on one line, bottom to top.
    pub fn render_values(&self) -> String {
        let values: Vec<String> = self
            .values()
            .map(|v| v.to_string())
            .filter(|s| !s.is_empty())
            .collect();
        values.join(" ")
    }

    /// Renders the top of the stack within roughly `limit` characters.
    ///
    /// The top stays rightmost; when deeper items are cut off the preview
    /// starts with `...`.
    pub fn preview(&self, limit: usize) -> String {
        let mut parts = Vec::new();
        let mut used = 0;
        for item in self.items.iter().rev() {
            let rendered = item.to_string();
            if rendered.is_empty() {
                continue;
            }
            let width = rendered.chars().count() + 1;
            if used + width > limit {
                if parts.is_empty() {
                    let cut: String = rendered.chars().take(limit).collect();
                    parts.push(format!("{}...", cut));
                }
                parts.push("...".to_string());
                break;
            }
            used += width;
            parts.push(rendered);
        }
        parts.reverse();
        parts.join(" ")
    }
}

impl std::fmt::Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_seq(f, &self.items)
    }
}

impl FromIterator<Expr> for Stack {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        Stack::from_vec(iter.into_iter().collect())
    }
}
