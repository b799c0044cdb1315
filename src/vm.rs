use crate::lang::expr::MAX_NESTING;
use crate::lang::{Expr, Stack};
use crate::runtime::primitives::Outcome;
use crate::runtime::runtime_error::{RuntimeError, RuntimeErrorKind};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub max_steps: Option<usize>,
    pub max_stack_size: usize,
    pub max_control_size: usize,
    /// Deepest quotation `quote` and `cons` may build.
    pub max_nesting: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_steps: None,
            max_stack_size: 100_000,
            max_control_size: 100_000,
            max_nesting: MAX_NESTING,
        }
    }
}

impl EvalConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn with_max_control_size(mut self, max_control_size: usize) -> Self {
        self.max_control_size = max_control_size;
        self
    }
}

/// The reduction machine.
///
/// Holds the program still to be interpreted in a control queue and the
/// already normalized values on a [`Stack`]. Items leave the control queue
/// one at a time, in text order:
/// - a word runs the body of the nearest definition below it, or stays as
///   data when nothing defines it
/// - a native invokes its primitive; whatever the primitive yields is
///   interpreted next, and a deferred primitive is pushed as a pending value
/// - comments vanish
/// - everything else is pushed unchanged
pub struct Machine {
    config: EvalConfig,
    steps: usize,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Machine { config, steps: 0 }
    }

    /// Steps taken so far, across every reduction on this machine.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Reduces `program` starting from an empty stack.
    pub fn reduce(&mut self, program: Vec<Expr>) -> Result<Stack, RuntimeError> {
        self.reduce_from(Stack::new(), program)
    }

    /// Continues reduction on top of an already normalized `base`.
    ///
    /// Reducing `a` and then continuing with `b` gives the same stack as
    /// reducing `a ++ b` in one go.
    pub fn reduce_from(&mut self, base: Stack, program: Vec<Expr>) -> Result<Stack, RuntimeError> {
        let mut stack = base;
        // next item last, so `pop` yields it
        let mut control: Vec<Expr> = program.into_iter().rev().collect();

        while let Some(expr) = control.pop() {
            let stepped = self
                .check_limits(&stack, &control)
                .and_then(|()| self.step(expr, &mut stack, &mut control));
            stepped.map_err(|kind| RuntimeError::new(kind, &stack))?;
        }

        debug!(steps = self.steps, depth = stack.len(), "reduction finished");
        Ok(stack)
    }

    fn check_limits(&mut self, stack: &Stack, control: &[Expr]) -> Result<(), RuntimeErrorKind> {
        self.steps += 1;
        if let Some(max) = self.config.max_steps {
            if self.steps > max {
                return Err(RuntimeErrorKind::StepLimit(max));
            }
        }
        if stack.len() > self.config.max_stack_size {
            return Err(RuntimeErrorKind::StackLimit {
                what: "value stack",
                limit: self.config.max_stack_size,
            });
        }
        if control.len() > self.config.max_control_size {
            return Err(RuntimeErrorKind::StackLimit {
                what: "control queue",
                limit: self.config.max_control_size,
            });
        }
        Ok(())
    }

    fn step(&mut self, expr: Expr, stack: &mut Stack, control: &mut Vec<Expr>) -> Result<(), RuntimeErrorKind> {
        trace!(step = self.steps, %expr, "step");

        match expr {
            Expr::Word(name) => match stack.find_definition(&name) {
                Some(body) => {
                    debug!(word = %name, "resolved");
                    control.extend(body.iter().rev().cloned());
                }
                None => {
                    debug!(word = %name, "unresolved, kept as data");
                    stack.push(Expr::Word(name));
                }
            },

            Expr::Native(primitive) => match primitive.invoke(stack, self.config.max_nesting)? {
                Outcome::Applied(replacement) => {
                    control.extend(replacement.into_iter().rev());
                }
                Outcome::Deferred => {
                    debug!(primitive = primitive.name(), depth = stack.len(), "deferred");
                    stack.push(Expr::Native(primitive));
                }
            },

            Expr::Comment(_) => {}

            Expr::Def { ref name, .. } => {
                debug!(word = %name, "defined");
                stack.push(expr);
            }

            other => stack.push(other),
        }
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
