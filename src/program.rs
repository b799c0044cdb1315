//! Program assembly: source files, the prelude and the primitive library
//! become the one sequence the machine reduces.

use crate::lang::{Expr, Stack};
use crate::parser::parse_source;
use crate::parser_error::ParserError;
use crate::prelude;
use crate::runtime::primitives::library;
use crate::runtime::runtime_error::RuntimeError;
use crate::vm::{EvalConfig, Machine};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{origin}:{source}")]
    Parse {
        origin: String,
        #[source]
        source: ParserError,
    },
}

/// Anything that can stop a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Prelude source placed between the primitives and user code.
    pub prelude: Cow<'static, str>,
    pub config: EvalConfig,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            prelude: Cow::Borrowed(prelude::SOURCE),
            config: EvalConfig::default(),
        }
    }
}

impl Options {
    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = Cow::Owned(prelude.into());
        self
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }
}

/// How a final stack is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    /// The whole stack, definitions shown as `<def NAME>` placeholders.
    #[default]
    Stack,
    /// Only the values; definitions are left out.
    Values,
}

/// Renders `stack` bottom to top on one line.
pub fn render(stack: &Stack, output: Output) -> String {
    match output {
        Output::Stack => stack.to_string(),
        Output::Values => stack.render_values(),
    }
}

/// Parses one text, naming it `origin` in errors.
pub fn parse_text(origin: &str, text: &str) -> Result<Vec<Expr>, LoadError> {
    parse_source(text).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Reads every file, then parses them in order and concatenates the nodes.
///
/// No file is parsed until all of them have been read.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Expr>, LoadError> {
    let mut texts = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "read source");
        texts.push((path, text));
    }

    let mut nodes = Vec::new();
    for (path, text) in &texts {
        nodes.extend(parse_text(&path.display().to_string(), text)?);
    }
    Ok(nodes)
}

/// `primitives ++ prelude ++ user`, in text order.
pub fn assemble(user: Vec<Expr>, prelude: Vec<Expr>) -> Vec<Expr> {
    let mut program = library();
    program.reserve(prelude.len() + user.len());
    program.extend(prelude);
    program.extend(user);
    program
}

fn reduce(user: Vec<Expr>, options: &Options) -> Result<Stack, Error> {
    let prelude = parse_text("<prelude>", &options.prelude)?;
    let program = assemble(user, prelude);
    debug!(nodes = program.len(), "assembled program");
    Ok(Machine::with_config(options.config.clone()).reduce(program)?)
}

/// Loads, assembles and reduces the given files.
pub fn run<P: AsRef<Path>>(paths: &[P], options: &Options) -> Result<Stack, Error> {
    let user = load_sources(paths)?;
    reduce(user, options)
}

/// Like [`run`], for in-memory texts.
pub fn run_sources<S: AsRef<str>>(sources: &[S], options: &Options) -> Result<Stack, Error> {
    let mut user = Vec::new();
    for (i, text) in sources.iter().enumerate() {
        user.extend(parse_text(&format!("<input {}>", i + 1), text.as_ref())?);
    }
    reduce(user, options)
}
