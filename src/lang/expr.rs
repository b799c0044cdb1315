use crate::runtime::primitives::Primitive;
use crate::runtime::runtime_error::RuntimeErrorKind;
use serde::{Deserialize, Serialize};

/// Deepest bracket nesting accepted from source text and built at run time.
///
/// Rendering, equality and dropping all recurse once per level.
pub const MAX_NESTING: usize = 256;

/// String delimiters in order of preference when rendering.
const STRING_DELIMITERS: [char; 3] = ['"', '\'', '`'];

/// A node of a Tack program, and equally a value on the stack.
///
/// Programs and stacks are the same thing: an ordered `Vec<Expr>` in text
/// order, top of stack last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// An identifier, resolved against the definitions on the stack.
    /// Unresolved words stay on the stack as data.
    Word(String),

    /// Quotation: an unevaluated code block `[ dup * ]`.
    Quot(Vec<Expr>),

    Bool(bool),

    Num(i64),

    /// Character literal `.c`.
    Chr(char),

    /// Fixed two-element node `( a b )`.
    Pair(Box<Expr>, Box<Expr>),

    /// Named binding produced by `def`. Inert until a word looks it up.
    Def { name: String, body: Vec<Expr> },

    /// A built-in operation. Appears on the stack only as a pending
    /// (deferred) application or inside a primitive's definition.
    Native(Primitive),

    /// `-- ...` annotation, erased by reduction.
    Comment(String),
}

impl Expr {
    pub fn word(name: impl Into<String>) -> Self {
        Expr::Word(name.into())
    }

    pub fn pair(first: Expr, second: Expr) -> Self {
        Expr::Pair(Box::new(first), Box::new(second))
    }

    /// Builds the quotation-of-characters a string literal desugars to.
    pub fn string(text: &str) -> Self {
        Expr::Quot(text.chars().map(Expr::Chr).collect())
    }

    /// Returns the text of a quotation made only of characters.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Expr::Quot(items) => items
                .iter()
                .map(|item| match item {
                    Expr::Chr(c) => Some(*c),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Name of this value's kind, as pushed by `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Word(_) => "Word",
            Expr::Quot(_) => "Quot",
            Expr::Bool(_) => "Bool",
            Expr::Num(_) => "Num",
            Expr::Chr(_) => "Chr",
            Expr::Pair(..) => "Pair",
            Expr::Def { .. } => "Def",
            Expr::Native(_) => "Native",
            Expr::Comment(_) => "Comment",
        }
    }

    /// Number of nested levels of quotations, pairs and definition bodies;
    /// `0` for atoms, `1` for `[]`.
    ///
    /// Walks iteratively, so it is safe on values of any depth.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((expr, level)) = pending.pop() {
            deepest = deepest.max(level);
            match expr {
                Expr::Quot(items) | Expr::Def { body: items, .. } => {
                    deepest = deepest.max(level + 1);
                    pending.extend(items.iter().map(|item| (item, level + 1)));
                }
                Expr::Pair(a, b) => {
                    deepest = deepest.max(level + 1);
                    pending.push((a, level + 1));
                    pending.push((b, level + 1));
                }
                _ => {}
            }
        }
        deepest
    }

    /// Only `False` is falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Expr::Bool(false))
    }

    /// Structural equality as seen by the language's `=`.
    ///
    /// Natives and definitions have no meaningful equality: meeting one
    /// anywhere the comparison reaches is an error rather than an answer.
    /// Quotations are compared element by element and stop at the first
    /// difference.
    pub fn try_eq(&self, other: &Expr) -> Result<bool, RuntimeErrorKind> {
        match (self, other) {
            (Expr::Native(_) | Expr::Def { .. }, _) | (_, Expr::Native(_) | Expr::Def { .. }) => {
                Err(RuntimeErrorKind::IncomparableValues {
                    left: self.to_string(),
                    right: other.to_string(),
                })
            }
            (Expr::Quot(a), Expr::Quot(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.try_eq(y)? {
                        return Ok(false);
                    }
                }
                Ok(a.len() == b.len())
            }
            (Expr::Pair(a1, a2), Expr::Pair(b1, b2)) => Ok(a1.try_eq(b1)? && a2.try_eq(b2)?),
            (Expr::Word(a), Expr::Word(b)) => Ok(a == b),
            (Expr::Bool(a), Expr::Bool(b)) => Ok(a == b),
            (Expr::Num(a), Expr::Num(b)) => Ok(a == b),
            (Expr::Chr(a), Expr::Chr(b)) => Ok(a == b),
            (Expr::Comment(a), Expr::Comment(b)) => Ok(a == b),
            _ => Ok(false),
        }
    }
}

/// Writes `items` separated by single spaces, skipping empty renderings.
pub(crate) fn write_seq(f: &mut std::fmt::Formatter<'_>, items: &[Expr]) -> std::fmt::Result {
    let mut first = true;
    for item in items {
        if matches!(item, Expr::Comment(_)) {
            continue;
        }
        if !first {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    Ok(())
}

impl std::fmt::Display for Expr {
    /// Format a value using Tack literal syntax.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Word(name) => write!(f, "{}", name),
            Expr::Bool(true) => write!(f, "True"),
            Expr::Bool(false) => write!(f, "False"),
            Expr::Num(n) => write!(f, "{}", n),
            Expr::Chr(c) => write!(f, ".{}", c),
            Expr::Quot(items) => {
                if let Some(text) = self.as_string().filter(|t| !t.is_empty()) {
                    if let Some(q) = STRING_DELIMITERS.iter().find(|q| !text.contains(**q)) {
                        return write!(f, "{q}{text}{q}");
                    }
                }
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Expr::Pair(a, b) => write!(f, "({} {})", a, b),
            Expr::Def { name, .. } => write!(f, "<def {}>", name),
            Expr::Native(p) => write!(f, "<native {}>", p.name()),
            Expr::Comment(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_literals() {
        assert_eq!(Expr::Num(42).to_string(), "42");
        assert_eq!(Expr::Num(-3).to_string(), "-3");
        assert_eq!(Expr::Bool(true).to_string(), "True");
        assert_eq!(Expr::Chr('x').to_string(), ".x");
        assert_eq!(Expr::word("dup").to_string(), "dup");
        assert_eq!(Expr::pair(Expr::Num(1), Expr::Chr('a')).to_string(), "(1 .a)");
    }

    #[test]
    fn test_render_strings_pick_a_free_delimiter() {
        assert_eq!(Expr::string("hi").to_string(), "\"hi\"");
        assert_eq!(Expr::string("say \"hi\"").to_string(), "'say \"hi\"'");
        assert_eq!(Expr::string("'\"").to_string(), "`'\"`");
        assert_eq!(Expr::string("`'\"").to_string(), "[.` .' .\"]");
    }

    #[test]
    fn test_render_quotations() {
        assert_eq!(Expr::Quot(vec![]).to_string(), "[]");
        let q = Expr::Quot(vec![
            Expr::Num(1),
            Expr::Comment("note".to_string()),
            Expr::Quot(vec![Expr::word("dup")]),
            Expr::Chr('a'),
        ]);
        assert_eq!(q.to_string(), "[1 [dup] .a]");
    }

    #[test]
    fn test_render_placeholders() {
        let def = Expr::Def {
            name: "sq".to_string(),
            body: vec![Expr::word("dup"), Expr::word("*")],
        };
        assert_eq!(def.to_string(), "<def sq>");
        assert_eq!(Expr::Native(Primitive::Add).to_string(), "<native +>");
        assert_eq!(Expr::Comment("x".to_string()).to_string(), "");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Expr::Bool(false).is_truthy());
        assert!(Expr::Bool(true).is_truthy());
        assert!(Expr::Num(0).is_truthy());
        assert!(Expr::Quot(vec![]).is_truthy());
    }

    #[test]
    fn test_try_eq_is_structural() {
        assert_eq!(Expr::Num(3).try_eq(&Expr::Num(3)).unwrap(), true);
        assert_eq!(Expr::Num(3).try_eq(&Expr::Chr('3')).unwrap(), false);
        assert_eq!(Expr::string("a").try_eq(&Expr::string("a")).unwrap(), true);
        assert_eq!(Expr::string("ab").try_eq(&Expr::string("a")).unwrap(), false);
        let p = Expr::pair(Expr::Num(1), Expr::string("x"));
        assert_eq!(p.try_eq(&p.clone()).unwrap(), true);
    }

    #[test]
    fn test_try_eq_refuses_natives_and_defs() {
        let native = Expr::Native(Primitive::Dup);
        assert!(matches!(
            native.try_eq(&native),
            Err(RuntimeErrorKind::IncomparableValues { .. })
        ));

        let def = Expr::Def {
            name: "x".to_string(),
            body: vec![],
        };
        assert!(def.try_eq(&Expr::Num(1)).is_err());

        let nested = Expr::Quot(vec![Expr::Native(Primitive::Add)]);
        assert!(nested.try_eq(&nested.clone()).is_err());
    }

    #[test]
    fn test_try_eq_stops_at_first_difference() {
        let a = Expr::Quot(vec![Expr::Num(1), Expr::Native(Primitive::Add)]);
        let b = Expr::Quot(vec![Expr::Num(2), Expr::Native(Primitive::Add)]);
        assert_eq!(a.try_eq(&b).unwrap(), false);
    }

    #[test]
    fn test_depth_counts_brackets() {
        assert_eq!(Expr::Num(1).depth(), 0);
        assert_eq!(Expr::Quot(vec![]).depth(), 1);
        assert_eq!(Expr::string("abc").depth(), 1);
        let nested = Expr::Quot(vec![
            Expr::Num(1),
            Expr::pair(Expr::Num(2), Expr::Quot(vec![Expr::Quot(vec![])])),
        ]);
        assert_eq!(nested.depth(), 4);
    }

    #[test]
    fn test_depth_of_a_very_deep_value() {
        let mut deep = Expr::Quot(vec![]);
        for _ in 0..10_000 {
            deep = Expr::Quot(vec![deep]);
        }
        assert_eq!(deep.depth(), 10_001);
        // unwind without recursing through Drop
        let mut current = deep;
        while let Expr::Quot(mut items) = current {
            match items.pop() {
                Some(inner) => current = inner,
                None => break,
            }
        }
    }

    #[test]
    fn test_kind_and_as_string() {
        assert_eq!(Expr::string("ab").kind(), "Quot");
        assert_eq!(Expr::string("ab").as_string().as_deref(), Some("ab"));
        assert_eq!(Expr::Quot(vec![Expr::Num(1)]).as_string(), None);
        assert_eq!(Expr::Native(Primitive::Drop).kind(), "Native");
    }
}
