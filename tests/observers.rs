// tests/observers.rs
use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use turtle_script::{
    Budget, Command, DebugObserver, Error, Interpreter, Observer, Resource, SummaryObserver,
    Turtle, TurtleConfig,
};

/// Everything an observer can see, in arrival order.
#[derive(Clone, Debug, PartialEq)]
enum Event {
    Line(String),
    Before(Command),
    After(Command),
    End { painted: usize },
}

#[derive(Default)]
struct Trace {
    events: Vec<Event>,
}

impl Observer for Trace {
    fn before_read_line(&mut self, line: &str) {
        self.events.push(Event::Line(line.to_owned()));
    }

    fn before_command(&mut self, cmd: Command) {
        self.events.push(Event::Before(cmd));
    }

    fn after_command(&mut self, cmd: Command, _turtle: &Turtle) {
        self.events.push(Event::After(cmd));
    }

    fn after_script(&mut self, turtle: &Turtle) {
        self.events.push(Event::End {
            painted: turtle.painted_count(),
        });
    }
}

fn unlimited() -> TurtleConfig {
    TurtleConfig {
        battery: Budget::Unlimited,
        ..TurtleConfig::default()
    }
}

#[test]
fn hooks_bracket_every_dispatch() {
    let mut interpreter = Interpreter::new(unlimited()).with_observer(Trace::default());
    interpreter.run_script("right\npaint").unwrap();
    let (_, trace) = interpreter.into_parts();
    assert_eq!(
        trace.events,
        vec![
            Event::Line("right".into()),
            Event::Before(Command::Right),
            Event::After(Command::Right),
            Event::Line("paint".into()),
            Event::Before(Command::Paint),
            Event::After(Command::Paint),
            Event::End { painted: 1 },
        ],
    );
}

#[test]
fn every_line_reaches_the_observer_trimmed() {
    let mut interpreter = Interpreter::new(unlimited()).with_observer(Trace::default());
    interpreter.take_line("  # a comment  ").unwrap();
    assert!(interpreter.take_line("   ").is_err(), "blanks are unknown lines");
    interpreter.take_line("   up  ").unwrap();

    let (_, trace) = interpreter.into_parts();
    assert_eq!(trace.events[0], Event::Line("# a comment".into()));
    assert_eq!(trace.events[1], Event::Line("".into()), "seen before rejection");
    assert_eq!(trace.events[2], Event::Line("up".into()));
}

#[test]
fn after_command_fires_even_when_the_command_halts() {
    let config = TurtleConfig {
        battery: Budget::Finite(0),
        ..TurtleConfig::default()
    };
    let mut interpreter = Interpreter::new(config).with_observer(Trace::default());
    let err = interpreter.run_script("up").unwrap_err();
    assert_eq!(err.halted_resource(), Some(Resource::Battery));

    let (_, trace) = interpreter.into_parts();
    assert_eq!(
        trace.events,
        vec![
            Event::Line("up".into()),
            Event::Before(Command::Up),
            Event::After(Command::Up),
            Event::End { painted: 0 },
        ],
    );
}

#[test]
fn after_script_fires_exactly_once_per_outcome() {
    let end_count =
        |events: &[Event]| events.iter().filter(|e| matches!(e, Event::End { .. })).count();

    // Normal completion.
    let mut completed = Interpreter::new(unlimited()).with_observer(Trace::default());
    completed.run_script("up\ndown").unwrap();
    assert_eq!(end_count(&completed.observer().events), 1);

    // Parse error.
    let mut parse_error = Interpreter::new(unlimited()).with_observer(Trace::default());
    parse_error.run_script("up\nnot a command").unwrap_err();
    assert_eq!(end_count(&parse_error.observer().events), 1);

    // Halt.
    let halted_config = TurtleConfig {
        battery: Budget::Finite(1),
        ..TurtleConfig::default()
    };
    let mut halted = Interpreter::new(halted_config).with_observer(Trace::default());
    halted.run_script("up\nup\nup").unwrap_err();
    assert_eq!(end_count(&halted.observer().events), 1);
}

#[test]
fn read_failures_surface_io_errors_and_still_finish() {
    // Reader that dies once its buffered text is consumed.
    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream died"))
        }
    }

    impl io::BufRead for BrokenPipe {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream died"))
        }

        fn consume(&mut self, _amt: usize) {}
    }

    let mut interpreter = Interpreter::new(unlimited()).with_observer(Trace::default());
    let err = interpreter
        .run_reader(io::Cursor::new("paint\n").chain(BrokenPipe))
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)), "expected a read error, got {err:?}");
    assert!(!err.is_halt());
    assert!(!err.is_parse_error());

    let (turtle, trace) = interpreter.into_parts();
    assert_eq!(turtle.painted_count(), 1, "the line before the failure landed");
    let ends = trace
        .events
        .iter()
        .filter(|e| matches!(e, Event::End { .. }))
        .count();
    assert_eq!(ends, 1, "terminal hook fired exactly once");
    assert_eq!(trace.events.last(), Some(&Event::End { painted: 1 }));
}

#[test]
fn buffered_commands_stay_undispatched_until_replay() {
    let mut interpreter = Interpreter::new(unlimited()).with_observer(Trace::default());
    interpreter.take_line("2 times").unwrap();
    interpreter.take_line("paint").unwrap();
    assert!(
        !interpreter
            .observer()
            .events
            .iter()
            .any(|e| matches!(e, Event::Before(_))),
        "nothing dispatched while the block is open"
    );

    interpreter.take_line("end").unwrap();
    let before_paints = interpreter
        .observer()
        .events
        .iter()
        .filter(|e| matches!(e, Event::Before(Command::Paint)))
        .count();
    assert_eq!(before_paints, 2);
}

#[test]
fn manual_line_feeding_ends_with_finish() {
    let mut interpreter = Interpreter::new(unlimited()).with_observer(Trace::default());
    interpreter.take_line("paint").unwrap();
    assert!(
        !interpreter
            .observer()
            .events
            .iter()
            .any(|e| matches!(e, Event::End { .. })),
        "no terminal hook before finish"
    );

    interpreter.finish();
    assert_eq!(
        interpreter.observer().events.last(),
        Some(&Event::End { painted: 1 }),
    );
}

#[test]
fn boxed_observers_forward_all_hooks() {
    struct Shared(Rc<RefCell<Vec<Event>>>);

    impl Observer for Shared {
        fn before_read_line(&mut self, line: &str) {
            self.0.borrow_mut().push(Event::Line(line.to_owned()));
        }

        fn before_command(&mut self, cmd: Command) {
            self.0.borrow_mut().push(Event::Before(cmd));
        }

        fn after_command(&mut self, cmd: Command, _turtle: &Turtle) {
            self.0.borrow_mut().push(Event::After(cmd));
        }

        fn after_script(&mut self, turtle: &Turtle) {
            self.0.borrow_mut().push(Event::End {
                painted: turtle.painted_count(),
            });
        }
    }

    let events: Rc<RefCell<Vec<Event>>> = Rc::default();
    let observer: Box<dyn Observer> = Box::new(Shared(Rc::clone(&events)));
    let mut interpreter = Interpreter::new(unlimited()).with_observer(observer);
    interpreter.run_script("paint").unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            Event::Line("paint".into()),
            Event::Before(Command::Paint),
            Event::After(Command::Paint),
            Event::End { painted: 1 },
        ],
    );
}

#[test]
fn debug_observer_narrates_lines_commands_and_exit() {
    let mut interpreter =
        Interpreter::new(unlimited()).with_observer(DebugObserver::new(Vec::new()));
    interpreter.run_script("right").unwrap();
    let (_, observer) = interpreter.into_parts();

    let output = String::from_utf8(observer.into_inner()).unwrap();
    assert!(output.contains("reading line \"right\""), "{output}");
    assert!(output.contains("running command right"), "{output}");
    assert!(output.contains("finished running right"), "{output}");
    assert!(output.contains("script ended"), "{output}");
}

#[test]
fn summary_observer_reports_painted_cells() {
    let mut interpreter =
        Interpreter::new(unlimited()).with_observer(SummaryObserver::new(Vec::new()));
    interpreter.run_script("paint\nright\npaint\nright").unwrap();
    let (_, observer) = interpreter.into_parts();

    let output = String::from_utf8(observer.into_inner()).unwrap();
    assert!(output.contains("script ended"), "{output}");
    assert!(output.contains("painted 2 cells"), "{output}");
}
