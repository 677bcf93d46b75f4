//! Lifecycle hooks reported around script interpretation.
//!
//! The interpreter narrates its run through an [`Observer`]: one callback
//! per line read, a pair bracketing every dispatched command, and one
//! final callback when the script ends. Renderers, debuggers and
//! summaries plug in here without the core knowing about any of them.

use std::io::{self, Write};

use crate::turtle::{Command, Turtle};

/// Callbacks invoked by the interpreter while a script runs.
///
/// Every method has a no-op default, so implementors override only the
/// events they care about. Hooks return nothing and cannot fail; an
/// observer never changes the outcome of a run.
pub trait Observer {
    /// Called with each line, trimmed, before it is parsed. Fires for
    /// comments, blank lines and unparseable lines too.
    fn before_read_line(&mut self, line: &str) {
        let _ = line;
    }

    /// Called immediately before a dispatched command executes.
    fn before_command(&mut self, cmd: Command) {
        let _ = cmd;
    }

    /// Called immediately after a dispatched command, whether it succeeded
    /// or halted the turtle.
    fn after_command(&mut self, cmd: Command, turtle: &Turtle) {
        let _ = (cmd, turtle);
    }

    /// Called exactly once when the script ends: normal completion, parse
    /// error, read error and halt alike.
    fn after_script(&mut self, turtle: &Turtle) {
        let _ = turtle;
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn before_read_line(&mut self, line: &str) {
        (**self).before_read_line(line);
    }

    fn before_command(&mut self, cmd: Command) {
        (**self).before_command(cmd);
    }

    fn after_command(&mut self, cmd: Command, turtle: &Turtle) {
        (**self).after_command(cmd, turtle);
    }

    fn after_script(&mut self, turtle: &Turtle) {
        (**self).after_script(turtle);
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that narrates every line and command, then dumps the final
/// turtle state. Write errors are swallowed; narration is best-effort.
#[derive(Debug)]
pub struct DebugObserver<W> {
    out: W,
}

impl DebugObserver<io::Stdout> {
    /// Debug observer writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> DebugObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the observer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Observer for DebugObserver<W> {
    fn before_read_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "reading line {line:?}");
    }

    fn before_command(&mut self, cmd: Command) {
        let _ = writeln!(self.out, "running command {cmd}");
    }

    fn after_command(&mut self, cmd: Command, _turtle: &Turtle) {
        let _ = writeln!(self.out, "finished running {cmd}");
    }

    fn after_script(&mut self, turtle: &Turtle) {
        let _ = writeln!(self.out, "script ended");
        let _ = writeln!(self.out, "{turtle:#?}");
    }
}

/// Observer that reports the painted-cell count once the script ends.
#[derive(Debug)]
pub struct SummaryObserver<W> {
    out: W,
}

impl SummaryObserver<io::Stdout> {
    /// Summary observer writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> SummaryObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the observer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Observer for SummaryObserver<W> {
    fn after_script(&mut self, turtle: &Turtle) {
        let _ = writeln!(self.out, "script ended");
        let _ = writeln!(self.out, "painted {} cells", turtle.painted_count());
    }
}
