//! Loop-stack parser and script driver.
//!
//! The entry point is [`Interpreter`]. Configure it with a [`TurtleConfig`],
//! attach an [`Observer`] via [`Interpreter::with_observer`], then run a
//! script through [`Interpreter::run_script`], [`Interpreter::run_lines`]
//! or [`Interpreter::run_reader`]. Callers that already iterate lines can
//! feed [`Interpreter::take_line`] by hand and close with
//! [`Interpreter::finish`].
//!
//! # Grammar
//!
//! One instruction per line, matched exactly (case-sensitive) after
//! trimming surrounding whitespace:
//!
//! - `up`, `down`, `left`, `right`, `paint`: primitive commands;
//! - `<N> times`: opens a repeat block, `N` a non-negative integer;
//! - `end`: closes the innermost open block;
//! - lines starting with `#`: comments, skipped at any depth;
//! - anything else, blank lines included: [`Error::UnknownLine`].
//!
//! # Replay
//!
//! At depth zero a command line is dispatched to the turtle on the spot.
//! Inside a block, lines are buffered into a tree of commands and nested
//! blocks; when the outermost `end` arrives the whole tree is replayed:
//! `N` passes over the body, in order, recursing into nested blocks. A
//! halting condition unwinds every pending repetition, aborts the rest of
//! the script, and still reaches the observer's `after_script` hook.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::observer::{NoopObserver, Observer};
use crate::turtle::{Command, Turtle, TurtleConfig};

/// One buffered `N times ... end` block: a repetition count and the body
/// collected so far.
#[derive(Debug)]
struct Frame {
    count: u64,
    body: Vec<Node>,
}

/// A buffered element of a block body.
#[derive(Debug)]
enum Node {
    Command(Command),
    Frame(Frame),
}

/// Interprets a movement script line by line against a [`Turtle`].
///
/// Owns the turtle, the observer, and the stack of open repeat blocks.
#[derive(Debug)]
pub struct Interpreter<O = NoopObserver> {
    turtle: Turtle,
    observer: O,
    open_frames: Vec<Frame>,
}

impl Interpreter<NoopObserver> {
    /// Creates an interpreter with no observer attached.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            turtle: Turtle::new(config),
            observer: NoopObserver,
            open_frames: Vec::new(),
        }
    }
}

impl<O: Observer> Interpreter<O> {
    /// Swaps in a different observer (builder pattern).
    pub fn with_observer<P: Observer>(self, observer: P) -> Interpreter<P> {
        Interpreter {
            turtle: self.turtle,
            observer,
            open_frames: self.open_frames,
        }
    }

    /// The turtle being driven. Stays inspectable after a parse error or
    /// halt, frozen at the failure point.
    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    /// The attached observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Current block nesting depth. Non-zero after the last line means the
    /// script ended inside an unclosed block, whose buffered commands were
    /// never replayed.
    pub fn depth(&self) -> usize {
        self.open_frames.len()
    }

    /// Tears the interpreter apart into its turtle and observer.
    pub fn into_parts(self) -> (Turtle, O) {
        (self.turtle, self.observer)
    }

    /// Feeds one script line to the parser.
    ///
    /// The observer sees every line, trimmed, before it is matched. Errors
    /// leave all effects of earlier lines in place; after a parse error the
    /// interpreter keeps accepting lines, while a halt makes every further
    /// command fail the same way.
    pub fn take_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        self.observer.before_read_line(line);

        if line.starts_with('#') {
            return Ok(());
        }

        if let Some(cmd) = Command::from_keyword(line) {
            return match self.open_frames.last_mut() {
                Some(frame) => {
                    frame.body.push(Node::Command(cmd));
                    Ok(())
                }
                None => self.dispatch(cmd),
            };
        }

        if line == "end" {
            let frame = self.open_frames.pop().ok_or(Error::UnmatchedEnd)?;
            return match self.open_frames.last_mut() {
                Some(parent) => {
                    parent.body.push(Node::Frame(frame));
                    Ok(())
                }
                None => {
                    debug!(count = frame.count, "replaying completed block");
                    self.replay(&frame)
                }
            };
        }

        if let Some(count) = parse_times(line) {
            self.open_frames.push(Frame {
                count,
                body: Vec::new(),
            });
            return Ok(());
        }

        Err(Error::UnknownLine {
            line: line.to_owned(),
        })
    }

    /// Runs a whole script held in one string.
    pub fn run_script(&mut self, script: &str) -> Result<()> {
        self.run_lines(script.lines())
    }

    /// Runs a script supplied one line per item.
    ///
    /// Fires `after_script` exactly once, on every exit path. A block left
    /// open at end of input is discarded without replaying.
    pub fn run_lines<I>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let result = lines
            .into_iter()
            .try_for_each(|line| self.take_line(line.as_ref()));
        self.complete(result)
    }

    /// Streams a script from a reader, line by line, without loading it
    /// whole. Same termination contract as [`Interpreter::run_lines`].
    pub fn run_reader<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let result = reader.lines().try_for_each(|line| self.take_line(&line?));
        self.complete(result)
    }

    /// Fires the observer's `after_script` hook.
    ///
    /// The `run_*` drivers call this on every exit path; call it yourself
    /// only when feeding lines by hand with [`Interpreter::take_line`].
    pub fn finish(&mut self) {
        self.observer.after_script(&self.turtle);
    }

    /// Reports the outcome and fires the terminal hook, once per run.
    fn complete(&mut self, result: Result<()>) -> Result<()> {
        match &result {
            Ok(()) => {}
            Err(err) if err.is_halt() => warn!(%err, "turtle halted"),
            Err(err) => warn!(%err, "script aborted"),
        }
        self.finish();
        result
    }

    /// Runs one command against the turtle, bracketed by the observer's
    /// before/after hooks. The after hook fires even when the command
    /// halts the turtle.
    fn dispatch(&mut self, cmd: Command) -> Result<()> {
        self.observer.before_command(cmd);
        let result = match cmd {
            Command::Up => self.turtle.up(),
            Command::Down => self.turtle.down(),
            Command::Left => self.turtle.left(),
            Command::Right => self.turtle.right(),
            Command::Paint => self.turtle.paint().map(|_| ()),
        };
        self.observer.after_command(cmd, &self.turtle);
        result
    }

    /// Replays a completed block: `count` passes over the body, in order,
    /// recursing into nested blocks.
    fn replay(&mut self, frame: &Frame) -> Result<()> {
        for _ in 0..frame.count {
            for node in &frame.body {
                match node {
                    Node::Command(cmd) => self.dispatch(*cmd)?,
                    Node::Frame(inner) => self.replay(inner)?,
                }
            }
        }
        Ok(())
    }
}

/// Matches a block-opening line: decimal digits, one space, the literal
/// `times`, nothing else. Counts that overflow `u64` do not match.
fn parse_times(line: &str) -> Option<u64> {
    let count = line.strip_suffix(" times")?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    count.parse().ok()
}
