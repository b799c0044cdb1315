//! The primitive library.
//!
//! Every primitive is registered as an ordinary definition whose body is the
//! single native node, `Def(name, [Native(p)])`, so words resolve to
//! primitives through the same lookup as user definitions.
//!
//! A primitive looks at the top of the stack and either applies, returning
//! the sequence that replaces the operands it consumed, or defers because
//! the stack is not deep enough yet. Operands are validated before anything
//! is consumed, so a deferral or an error leaves the stack untouched.

use crate::lang::{Expr, Stack};
use crate::runtime::runtime_error::{
    RuntimeErrorKind, division_by_zero, index_out_of_bounds, overflow, type_error,
};
use serde::{Deserialize, Serialize};

/// Result of invoking a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operands were consumed; the replacement (text order) is reduced
    /// next, on top of what remains.
    Applied(Vec<Expr>),

    /// Preconditions unmet; the primitive stays on the stack as a pending
    /// value.
    Deferred,
}

/// Identifier of a built-in operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    // =====================================================================
    // Stack operations
    // =====================================================================
    /// `( x -- )`
    Drop,
    /// `( x -- x x )`
    Dup,
    /// `( ... x n -- x ... )` with `n` items skipped.
    Bury,
    /// `( x ... n -- ... x )` with `n` items skipped.
    Exhume,

    // =====================================================================
    // Logic
    // =====================================================================
    /// `( x -- bool )`
    Not,
    /// `( a b -- a|b )` first falsy operand, else the last.
    And,
    /// `( a b -- a|b )` first truthy operand, else the last.
    Or,
    /// `( a b -- bool )` structural equality.
    Eq,

    // =====================================================================
    // Quotations
    // =====================================================================
    /// `( x -- [x] )`
    Quote,
    /// `( x [q] -- [x q] )`
    Cons,
    /// `( [x q] -- x [q] )`
    Uncons,
    /// `( [a] [b] -- [a b] )`
    Append,
    /// `( [q] n -- [q0..n] [qn..] )`
    SplitAt,
    /// `( [q] -- bool )`
    Null,

    // =====================================================================
    // Reflection
    // =====================================================================
    /// `( x -- "x" )`
    Show,
    /// `( x -- x "Kind" )`
    Type,

    // =====================================================================
    // Application
    // =====================================================================
    /// `( [q] -- ... )`
    Apply,
    /// `( e [q] -- ... e )`
    Dip,
    /// `( s1..sn [q] n -- ... s1..sn )`
    Dig,

    // =====================================================================
    // Arithmetic
    // =====================================================================
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // =====================================================================
    // Definitions
    // =====================================================================
    /// `( [body] name -- <def name> )`
    Def,

    // =====================================================================
    // Errors
    // =====================================================================
    /// `( msg -- )` aborts evaluation.
    Croak,
}

impl Primitive {
    pub const ALL: [Primitive; 26] = [
        Primitive::Drop,
        Primitive::Dup,
        Primitive::Bury,
        Primitive::Exhume,
        Primitive::Not,
        Primitive::And,
        Primitive::Or,
        Primitive::Eq,
        Primitive::Quote,
        Primitive::Cons,
        Primitive::Uncons,
        Primitive::Append,
        Primitive::SplitAt,
        Primitive::Null,
        Primitive::Show,
        Primitive::Type,
        Primitive::Apply,
        Primitive::Dip,
        Primitive::Dig,
        Primitive::Add,
        Primitive::Sub,
        Primitive::Mul,
        Primitive::Div,
        Primitive::Mod,
        Primitive::Def,
        Primitive::Croak,
    ];

    /// The word this primitive is defined under.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Drop => "drop",
            Primitive::Dup => "dup",
            Primitive::Bury => "bury",
            Primitive::Exhume => "exhume",
            Primitive::Not => "not",
            Primitive::And => "and",
            Primitive::Or => "or",
            Primitive::Eq => "=",
            Primitive::Quote => "quote",
            Primitive::Cons => "cons",
            Primitive::Uncons => "uncons",
            Primitive::Append => "append",
            Primitive::SplitAt => "splitAt",
            Primitive::Null => "null",
            Primitive::Show => "show",
            Primitive::Type => "type",
            Primitive::Apply => "apply",
            Primitive::Dip => "dip",
            Primitive::Dig => "dig",
            Primitive::Add => "+",
            Primitive::Sub => "-",
            Primitive::Mul => "*",
            Primitive::Div => "/",
            Primitive::Mod => "%",
            Primitive::Def => "def",
            Primitive::Croak => "croak",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }

    /// `Def(name, [Native(self)])`.
    pub fn definition(self) -> Expr {
        Expr::Def {
            name: self.name().to_string(),
            body: vec![Expr::Native(self)],
        }
    }

    /// Runs the primitive against the top of `stack`. Quotations it builds
    /// may nest at most `max_nesting` levels deep.
    pub fn invoke(self, stack: &mut Stack, max_nesting: usize) -> Result<Outcome, RuntimeErrorKind> {
        match self {
            Primitive::Drop => drop(stack),
            Primitive::Dup => dup(stack),
            Primitive::Bury => bury(stack),
            Primitive::Exhume => exhume(stack),
            Primitive::Not => not(stack),
            Primitive::And => and(stack),
            Primitive::Or => or(stack),
            Primitive::Eq => eq(stack),
            Primitive::Quote => quote(stack, max_nesting),
            Primitive::Cons => cons(stack, max_nesting),
            Primitive::Uncons => uncons(stack),
            Primitive::Append => append(stack),
            Primitive::SplitAt => split_at(stack),
            Primitive::Null => null(stack),
            Primitive::Show => show(stack),
            Primitive::Type => type_of(stack),
            Primitive::Apply => apply(stack),
            Primitive::Dip => dip(stack),
            Primitive::Dig => dig(stack),
            Primitive::Add => arithmetic(self, stack, i64::checked_add),
            Primitive::Sub => arithmetic(self, stack, i64::checked_sub),
            Primitive::Mul => arithmetic(self, stack, i64::checked_mul),
            Primitive::Div => division(self, stack, i64::checked_div),
            Primitive::Mod => division(self, stack, i64::checked_rem),
            Primitive::Def => def(stack),
            Primitive::Croak => croak(stack),
        }
    }
}

/// The whole library as definitions, ready to sit at the bottom of a program.
pub fn library() -> Vec<Expr> {
    Primitive::ALL.iter().map(|p| p.definition()).collect()
}

/// Borrows the top `N` items in text order, or `None` if the stack is
/// shallower than that.
fn operands<const N: usize>(stack: &Stack) -> Option<[&Expr; N]> {
    let items = stack.as_slice();
    let base = items.len().checked_sub(N)?;
    Some(std::array::from_fn(|i| &items[base + i]))
}

/// Discards the top `n` items and yields `replacement` in their place.
fn replace(stack: &mut Stack, n: usize, replacement: Vec<Expr>) -> Result<Outcome, RuntimeErrorKind> {
    stack.take(n);
    Ok(Outcome::Applied(replacement))
}

fn quotation<'a>(op: &'static str, expr: &'a Expr) -> Result<&'a [Expr], RuntimeErrorKind> {
    match expr {
        Expr::Quot(items) => Ok(items),
        other => Err(type_error(op, "a quotation", other)),
    }
}

fn index(op: &'static str, expr: &Expr) -> Result<usize, RuntimeErrorKind> {
    match expr {
        Expr::Num(n) => usize::try_from(*n).map_err(|_| RuntimeErrorKind::ShapeMismatch {
            op,
            message: format!("negative index {}", n),
        }),
        other => Err(type_error(op, "a number", other)),
    }
}

// =========================================================================
// Stack operations
// =========================================================================

fn drop(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([_]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    replace(stack, 1, vec![])
}

fn dup(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([x]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let x = x.clone();
    replace(stack, 1, vec![x.clone(), x])
}

/// The displaced items are handed back for reduction in their new order,
/// just like any other replacement.
fn bury(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Bury.name();
    let Some([_, n]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let depth = index(op, n)?;
    let Some(mut moved) = stack.take(depth + 2) else {
        return Err(index_out_of_bounds(op, depth as i64, stack.len() - 2));
    };
    moved.pop(); // n
    if let Some(x) = moved.pop() {
        moved.insert(0, x);
    }
    Ok(Outcome::Applied(moved))
}

fn exhume(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Exhume.name();
    let Some([n]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let depth = index(op, n)?;
    let Some(mut moved) = stack.take(depth + 2) else {
        return Err(index_out_of_bounds(op, depth as i64, stack.len() - 1));
    };
    moved.pop(); // n
    let x = moved.remove(0);
    moved.push(x);
    Ok(Outcome::Applied(moved))
}

// =========================================================================
// Logic
// =========================================================================

fn not(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([x]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = Expr::Bool(!x.is_truthy());
    replace(stack, 1, vec![result])
}

fn and(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([a, b]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = if a.is_truthy() { b.clone() } else { a.clone() };
    replace(stack, 2, vec![result])
}

fn or(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([a, b]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = if a.is_truthy() { a.clone() } else { b.clone() };
    replace(stack, 2, vec![result])
}

fn eq(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([a, b]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = Expr::Bool(a.try_eq(b)?);
    replace(stack, 2, vec![result])
}

// =========================================================================
// Quotations
// =========================================================================

/// Fails if wrapping `x` in one more quotation would exceed `max_nesting`.
fn check_nesting(op: &'static str, x: &Expr, max_nesting: usize) -> Result<(), RuntimeErrorKind> {
    if x.depth() >= max_nesting {
        return Err(RuntimeErrorKind::NestingLimit { op, limit: max_nesting });
    }
    Ok(())
}

fn quote(stack: &mut Stack, max_nesting: usize) -> Result<Outcome, RuntimeErrorKind> {
    let Some([x]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    check_nesting(Primitive::Quote.name(), x, max_nesting)?;
    let result = Expr::Quot(vec![x.clone()]);
    replace(stack, 1, vec![result])
}

fn cons(stack: &mut Stack, max_nesting: usize) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Cons.name();
    let Some([x, q]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let q = quotation(op, q)?;
    check_nesting(op, x, max_nesting)?;
    let mut items = Vec::with_capacity(q.len() + 1);
    items.push(x.clone());
    items.extend_from_slice(q);
    replace(stack, 2, vec![Expr::Quot(items)])
}

fn uncons(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Uncons.name();
    let Some([q]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let Some((head, rest)) = quotation(op, q)?.split_first() else {
        return Err(RuntimeErrorKind::ShapeMismatch {
            op,
            message: "empty quotation".to_string(),
        });
    };
    let result = vec![head.clone(), Expr::Quot(rest.to_vec())];
    replace(stack, 1, result)
}

fn append(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Append.name();
    let Some([a, b]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let items = [quotation(op, a)?, quotation(op, b)?].concat();
    replace(stack, 2, vec![Expr::Quot(items)])
}

fn split_at(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::SplitAt.name();
    let Some([q, n]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let items = quotation(op, q)?;
    let at = index(op, n)?;
    if at > items.len() {
        return Err(index_out_of_bounds(op, at as i64, items.len()));
    }
    let (front, back) = items.split_at(at);
    let result = vec![Expr::Quot(front.to_vec()), Expr::Quot(back.to_vec())];
    replace(stack, 2, result)
}

fn null(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([q]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = Expr::Bool(quotation(Primitive::Null.name(), q)?.is_empty());
    replace(stack, 1, vec![result])
}

// =========================================================================
// Reflection
// =========================================================================

fn show(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([x]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = Expr::string(&x.to_string());
    replace(stack, 1, vec![result])
}

fn type_of(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([x]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let result = vec![x.clone(), Expr::string(x.kind())];
    replace(stack, 1, result)
}

// =========================================================================
// Application
// =========================================================================

fn apply(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([f]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let program = match f {
        Expr::Quot(items) => items.clone(),
        Expr::Native(p) => vec![Expr::Native(*p)],
        other => return Err(type_error(Primitive::Apply.name(), "a quotation or native", other)),
    };
    replace(stack, 1, program)
}

fn dip(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([e, q]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let mut program = quotation(Primitive::Dip.name(), q)?.to_vec();
    program.push(e.clone());
    replace(stack, 2, program)
}

fn dig(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Dig.name();
    let Some([q, n]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let mut program = quotation(op, q)?.to_vec();
    let depth = index(op, n)?;
    let Some(mut set_aside) = stack.take(depth + 2) else {
        return Err(index_out_of_bounds(op, depth as i64, stack.len() - 2));
    };
    set_aside.truncate(depth);
    program.extend(set_aside);
    Ok(Outcome::Applied(program))
}

// =========================================================================
// Arithmetic
// =========================================================================

fn arithmetic(
    op: Primitive,
    stack: &mut Stack,
    f: fn(i64, i64) -> Option<i64>,
) -> Result<Outcome, RuntimeErrorKind> {
    let Some([Expr::Num(a), Expr::Num(b)]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let (a, b) = (*a, *b);
    let result = f(a, b).ok_or_else(|| overflow(op.name(), a, b))?;
    replace(stack, 2, vec![Expr::Num(result)])
}

fn division(
    op: Primitive,
    stack: &mut Stack,
    f: fn(i64, i64) -> Option<i64>,
) -> Result<Outcome, RuntimeErrorKind> {
    if let Some([Expr::Num(_), Expr::Num(0)]) = operands::<2>(stack) {
        return Err(division_by_zero(op.name()));
    }
    arithmetic(op, stack, f)
}

// =========================================================================
// Definitions
// =========================================================================

fn def(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let op = Primitive::Def.name();
    let Some([body, name]) = operands::<2>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let Expr::Word(name) = name else {
        return Err(type_error(op, "a word", name));
    };
    let definition = Expr::Def {
        name: name.clone(),
        body: quotation(op, body)?.to_vec(),
    };
    replace(stack, 2, vec![definition])
}

fn croak(stack: &mut Stack) -> Result<Outcome, RuntimeErrorKind> {
    let Some([message]) = operands::<1>(stack) else {
        return Ok(Outcome::Deferred);
    };
    let text = message.as_string().unwrap_or_else(|| message.to_string());
    Err(RuntimeErrorKind::Croak(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::expr::MAX_NESTING;

    fn stack(items: Vec<Expr>) -> Stack {
        Stack::from_vec(items)
    }

    fn n(v: i64) -> Expr {
        Expr::Num(v)
    }

    fn q(items: Vec<Expr>) -> Expr {
        Expr::Quot(items)
    }

    /// Invokes `p`, expecting it to apply; returns (replacement, remaining stack).
    fn applied(p: Primitive, items: Vec<Expr>) -> (Vec<Expr>, Vec<Expr>) {
        let mut s = stack(items);
        match p.invoke(&mut s, MAX_NESTING).unwrap() {
            Outcome::Applied(replacement) => (replacement, s.into_vec()),
            Outcome::Deferred => panic!("{} deferred", p.name()),
        }
    }

    fn failure(p: Primitive, items: Vec<Expr>) -> RuntimeErrorKind {
        let mut s = stack(items.clone());
        let err = p.invoke(&mut s, MAX_NESTING).unwrap_err();
        assert_eq!(s.into_vec(), items, "stack changed on failure");
        err
    }

    #[test]
    fn test_names_round_trip() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_name("swap"), None);
    }

    #[test]
    fn test_library_registers_definitions() {
        let lib = library();
        assert_eq!(lib.len(), Primitive::ALL.len());
        assert_eq!(
            lib[1],
            Expr::Def {
                name: "dup".to_string(),
                body: vec![Expr::Native(Primitive::Dup)]
            }
        );
    }

    #[test]
    fn test_empty_stack_defers_without_change() {
        for p in Primitive::ALL {
            let mut s = Stack::new();
            assert_eq!(p.invoke(&mut s, MAX_NESTING).unwrap(), Outcome::Deferred, "{}", p.name());
            assert!(s.is_empty());
        }
    }

    #[test]
    fn test_drop_and_dup() {
        assert_eq!(applied(Primitive::Drop, vec![n(1), n(2)]), (vec![], vec![n(1)]));
        assert_eq!(
            applied(Primitive::Dup, vec![n(1), n(2)]),
            (vec![n(2), n(2)], vec![n(1)])
        );
    }

    #[test]
    fn test_bury() {
        // a b c 2 bury => c a b
        let (out, rest) = applied(Primitive::Bury, vec![n(0), n(1), n(2), n(3), n(2)]);
        assert_eq!(out, vec![n(3), n(1), n(2)]);
        assert_eq!(rest, vec![n(0)]);

        // 0 bury leaves the item where it was
        let (out, _) = applied(Primitive::Bury, vec![n(7), n(0)]);
        assert_eq!(out, vec![n(7)]);

        assert!(matches!(
            failure(Primitive::Bury, vec![n(1), n(2), n(5)]),
            RuntimeErrorKind::ShapeMismatch { .. }
        ));
        assert!(matches!(
            failure(Primitive::Bury, vec![n(1), n(-1)]),
            RuntimeErrorKind::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_exhume() {
        // a b c 2 exhume => b c a
        let (out, rest) = applied(Primitive::Exhume, vec![n(0), n(1), n(2), n(3), n(2)]);
        assert_eq!(out, vec![n(2), n(3), n(1)]);
        assert_eq!(rest, vec![n(0)]);

        assert!(matches!(
            failure(Primitive::Exhume, vec![n(1), n(1)]),
            RuntimeErrorKind::ShapeMismatch { .. }
        ));
        assert!(matches!(
            failure(Primitive::Exhume, vec![n(1), Expr::Chr('x')]),
            RuntimeErrorKind::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_logic() {
        let f = Expr::Bool(false);
        let t = Expr::Bool(true);
        assert_eq!(applied(Primitive::Not, vec![f.clone()]).0, vec![t.clone()]);
        assert_eq!(applied(Primitive::Not, vec![n(0)]).0, vec![f.clone()]);
        assert_eq!(applied(Primitive::And, vec![f.clone(), n(1)]).0, vec![f.clone()]);
        assert_eq!(applied(Primitive::And, vec![n(0), n(1)]).0, vec![n(1)]);
        assert_eq!(applied(Primitive::Or, vec![n(0), n(1)]).0, vec![n(0)]);
        assert_eq!(applied(Primitive::Or, vec![f.clone(), n(1)]).0, vec![n(1)]);
    }

    #[test]
    fn test_eq() {
        assert_eq!(applied(Primitive::Eq, vec![n(3), n(3)]).0, vec![Expr::Bool(true)]);
        assert_eq!(
            applied(Primitive::Eq, vec![Expr::string("a"), Expr::string("a")]).0,
            vec![Expr::Bool(true)]
        );
        assert!(matches!(
            failure(
                Primitive::Eq,
                vec![Expr::Native(Primitive::Add), Expr::Native(Primitive::Add)]
            ),
            RuntimeErrorKind::IncomparableValues { .. }
        ));
        assert!(matches!(
            failure(Primitive::Eq, vec![Primitive::Dup.definition(), n(1)]),
            RuntimeErrorKind::IncomparableValues { .. }
        ));
    }

    #[test]
    fn test_quotation_ops() {
        assert_eq!(applied(Primitive::Quote, vec![n(1)]).0, vec![q(vec![n(1)])]);
        assert_eq!(
            applied(Primitive::Cons, vec![n(1), q(vec![n(2)])]).0,
            vec![q(vec![n(1), n(2)])]
        );
        assert_eq!(
            applied(Primitive::Uncons, vec![q(vec![n(1), n(2)])]).0,
            vec![n(1), q(vec![n(2)])]
        );
        assert_eq!(
            applied(Primitive::Append, vec![q(vec![n(1)]), q(vec![n(2)])]).0,
            vec![q(vec![n(1), n(2)])]
        );
        assert_eq!(applied(Primitive::Null, vec![q(vec![])]).0, vec![Expr::Bool(true)]);
        assert_eq!(applied(Primitive::Null, vec![q(vec![n(1)])]).0, vec![Expr::Bool(false)]);

        assert!(failure(Primitive::Uncons, vec![q(vec![])]).to_string().contains("empty"));
        assert!(failure(Primitive::Null, vec![n(1)]).to_string().contains("quotation"));
        failure(Primitive::Cons, vec![n(1), n(2)]);
    }

    #[test]
    fn test_split_at() {
        let items = q(vec![n(1), n(2), n(3)]);
        assert_eq!(
            applied(Primitive::SplitAt, vec![items.clone(), n(1)]).0,
            vec![q(vec![n(1)]), q(vec![n(2), n(3)])]
        );
        assert_eq!(
            applied(Primitive::SplitAt, vec![items.clone(), n(3)]).0,
            vec![items.clone(), q(vec![])]
        );
        let err = failure(Primitive::SplitAt, vec![q(vec![n(1)]), n(2)]);
        assert_eq!(err, index_out_of_bounds("splitAt", 2, 1));
    }

    #[test]
    fn test_reflection() {
        assert_eq!(
            applied(Primitive::Show, vec![q(vec![n(1), Expr::word("dup")])]).0,
            vec![Expr::string("[1 dup]")]
        );
        assert_eq!(
            applied(Primitive::Type, vec![Expr::Chr('a')]).0,
            vec![Expr::Chr('a'), Expr::string("Chr")]
        );
    }

    #[test]
    fn test_application() {
        assert_eq!(
            applied(Primitive::Apply, vec![q(vec![n(1), Expr::word("+")])]).0,
            vec![n(1), Expr::word("+")]
        );
        assert_eq!(
            applied(Primitive::Apply, vec![Expr::Native(Primitive::Add)]).0,
            vec![Expr::Native(Primitive::Add)]
        );
        failure(Primitive::Apply, vec![n(1)]);

        assert_eq!(
            applied(Primitive::Dip, vec![n(5), q(vec![Expr::word("drop")])]).0,
            vec![Expr::word("drop"), n(5)]
        );

        let (out, rest) = applied(
            Primitive::Dig,
            vec![n(1), n(2), n(3), q(vec![Expr::word("dup")]), n(2)],
        );
        assert_eq!(out, vec![Expr::word("dup"), n(2), n(3)]);
        assert_eq!(rest, vec![n(1)]);
        failure(Primitive::Dig, vec![q(vec![]), n(1)]);
        assert_eq!(
            failure(Primitive::Dig, vec![n(1), n(2), q(vec![]), n(3)]),
            index_out_of_bounds("dig", 3, 2)
        );
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(applied(Primitive::Add, vec![n(3), n(4)]).0, vec![n(7)]);
        assert_eq!(applied(Primitive::Sub, vec![n(10), n(3)]).0, vec![n(7)]);
        assert_eq!(applied(Primitive::Mul, vec![n(6), n(7)]).0, vec![n(42)]);
        assert_eq!(applied(Primitive::Div, vec![n(20), n(3)]).0, vec![n(6)]);
        assert_eq!(applied(Primitive::Mod, vec![n(20), n(3)]).0, vec![n(2)]);
    }

    #[test]
    fn test_arithmetic_defers_on_wrong_shape() {
        for items in [vec![n(1)], vec![Expr::Chr('a'), n(1)], vec![n(1), Expr::string("x")]] {
            let mut s = stack(items.clone());
            assert_eq!(Primitive::Add.invoke(&mut s, MAX_NESTING).unwrap(), Outcome::Deferred);
            assert_eq!(s.into_vec(), items);
        }
    }

    #[test]
    fn test_zero_divisor_with_non_number_dividend_defers() {
        let items = vec![Expr::Chr('a'), n(0)];
        let mut s = stack(items.clone());
        assert_eq!(Primitive::Div.invoke(&mut s, MAX_NESTING).unwrap(), Outcome::Deferred);
        assert_eq!(s.into_vec(), items);
    }

    #[test]
    fn test_nesting_limit() {
        let mut deep = q(vec![]);
        for _ in 1..MAX_NESTING {
            deep = q(vec![deep]);
        }
        assert_eq!(deep.depth(), MAX_NESTING);

        assert_eq!(
            failure(Primitive::Quote, vec![deep.clone()]),
            RuntimeErrorKind::NestingLimit { op: "quote", limit: MAX_NESTING }
        );
        assert_eq!(
            failure(Primitive::Cons, vec![deep.clone(), q(vec![])]),
            RuntimeErrorKind::NestingLimit { op: "cons", limit: MAX_NESTING }
        );

        let mut s = stack(vec![q(vec![n(1)])]);
        assert!(matches!(
            Primitive::Quote.invoke(&mut s, 2).unwrap(),
            Outcome::Applied(_)
        ));
        let mut s = stack(vec![q(vec![n(1)])]);
        assert_eq!(
            Primitive::Quote.invoke(&mut s, 1).unwrap_err(),
            RuntimeErrorKind::NestingLimit { op: "quote", limit: 1 }
        );
    }

    #[test]
    fn test_arithmetic_failures() {
        assert_eq!(failure(Primitive::Div, vec![n(5), n(0)]), division_by_zero("/"));
        assert_eq!(failure(Primitive::Mod, vec![n(5), n(0)]), division_by_zero("%"));
        assert!(matches!(
            failure(Primitive::Add, vec![n(i64::MAX), n(1)]),
            RuntimeErrorKind::ArithmeticFailure { .. }
        ));
    }

    #[test]
    fn test_def() {
        let body = q(vec![Expr::word("dup"), Expr::word("*")]);
        assert_eq!(
            applied(Primitive::Def, vec![body.clone(), Expr::word("sq")]).0,
            vec![Expr::Def {
                name: "sq".to_string(),
                body: vec![Expr::word("dup"), Expr::word("*")],
            }]
        );
        failure(Primitive::Def, vec![body, n(1)]);
    }

    #[test]
    fn test_croak() {
        assert_eq!(
            failure(Primitive::Croak, vec![Expr::string("bad input")]),
            RuntimeErrorKind::Croak("bad input".to_string())
        );
        assert_eq!(
            failure(Primitive::Croak, vec![n(3)]),
            RuntimeErrorKind::Croak("3".to_string())
        );
    }
}
