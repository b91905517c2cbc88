//! Snippet tests for the sirius compiler pipeline as a whole.
//!
//! Each snippet in `./tests/snippets` starts with a heading of `--` lines,
//! describing how to run it and what should happen:
//! ```plain
//! -- action: run
//! -- outcome: success
//! -- expect: 55
//! ```
//! The heading isn't valid Sirius, so it's blanked out before compiling.

use std::{collections::HashMap, fs, path::PathBuf};

use sirius::{
    compiler::{bind, lex, lower, parse, Compilation},
    vm::{Host, Trace, Variables},
    Data,
};

/// Represents specific success/failure modes of a snippet test.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Syntax,
    Trace,
}

impl Outcome {
    pub fn parse(outcome: &str) -> Outcome {
        match outcome {
            "success" => Outcome::Success,
            "syntax" => Outcome::Syntax,
            "trace" => Outcome::Trace,
            invalid => panic!("invalid outcome '{}' in strat heading", invalid),
        }
    }
}

/// Represents what part of the compiler a snippet tests.
#[derive(Debug)]
pub enum Action {
    Lex,
    Parse,
    Bind,
    Lower,
    Run,
}

impl Action {
    pub fn parse(action: &str) -> Action {
        match action {
            "lex" => Action::Lex,
            "parse" => Action::Parse,
            "bind" => Action::Bind,
            "lower" => Action::Lower,
            "run" => Action::Run,
            invalid => panic!("invalid action '{}' in strat heading", invalid),
        }
    }
}

/// Represents a test strategy for executing a snippet,
/// found at the top of each file.
#[derive(Debug)]
pub struct TestStrat {
    /// How to run the test.
    action: Action,
    /// The expected outcome.
    outcome: Outcome,
    /// Optional data to check against.
    /// Should only be used with Action::Run
    expect: Option<Data>,
    /// Lines the snippet should print, in order.
    /// Should only be used with Action::Run
    prints: Option<Vec<String>>,
}

impl TestStrat {
    /// Uses a heading to construct a test strat
    pub fn heading(heading: HashMap<String, String>) -> TestStrat {
        let mut outcome = None;
        let mut action = None;
        let mut expect = None;
        let mut prints = None;

        for (strat, result) in heading.iter() {
            match strat.as_str() {
                "outcome" => outcome = Some(Outcome::parse(result)),
                "action" => action = Some(Action::parse(result)),
                "expect" => {
                    // expectations are literals, so just evaluate them
                    let evaluated = sirius::run(result).expect("Could not evaluate expectation");
                    assert!(evaluated.diagnostics.is_empty(), "Invalid expectation");
                    expect = evaluated.value;
                },
                "prints" => {
                    prints = Some(result.split('|').map(|s| s.trim().to_string()).collect());
                },
                invalid => panic!("invalid strat '{}' in strat heading", invalid),
            }
        }

        TestStrat {
            outcome: outcome.expect("no outcome provided"),
            action: action.expect("no action provided"),
            expect,
            prints,
        }
    }

    /// Parses the Test Strat from a given snippet.
    pub fn snippet(source: &str) -> TestStrat {
        let mut heading = HashMap::new();

        // build up a list of key-value pairs
        for line in heading_lines(source) {
            let (strat, result) = line[2..]
                .split_once(':')
                .expect("Missing colon in test strat heading");

            if heading
                .insert(strat.trim().to_string(), result.trim().to_string())
                .is_some()
            {
                panic!("Key present twice in test strat heading");
            }
        }

        TestStrat::heading(heading)
    }
}

fn heading_lines(source: &str) -> impl Iterator<Item = &str> {
    source.lines().take_while(|line| line.starts_with("--"))
}

/// Blanks out the heading, keeping line numbers intact.
fn body(source: &str) -> String {
    let heading = heading_lines(source).count();
    source
        .lines()
        .enumerate()
        .map(|(index, line)| if index < heading { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remembers everything printed, never has any input,
/// and always picks the largest random number it can.
#[derive(Debug, Default)]
struct Recorder {
    printed: Vec<String>,
}

impl Host for Recorder {
    fn print(&mut self, text: &str) -> Result<(), Trace> {
        self.printed.push(text.to_string());
        Ok(())
    }

    fn input(&mut self) -> Result<String, Trace> {
        Ok(String::new())
    }

    fn random(&mut self, max: i32) -> i32 {
        max - 1
    }
}

fn outcome_of(diagnostics: bool) -> Outcome {
    if diagnostics {
        Outcome::Syntax
    } else {
        Outcome::Success
    }
}

fn test_snippet(source: &str, strat: TestStrat) {
    let actual_outcome = match strat.action {
        Action::Lex => outcome_of(!lex(source).1.is_empty()),

        Action::Parse => outcome_of(!parse(source).diagnostics.is_empty()),

        Action::Bind => {
            let tree = parse(source);
            outcome_of(!tree.diagnostics.is_empty() || !bind(None, &tree).diagnostics.is_empty())
        },

        Action::Lower => {
            let tree = parse(source);
            let global = bind(None, &tree);
            if tree.diagnostics.is_empty() && global.diagnostics.is_empty() {
                lower(&global.statement);
                Outcome::Success
            } else {
                Outcome::Syntax
            }
        },

        Action::Run => {
            let compilation = Compilation::new(parse(source));
            let mut host = Recorder::default();

            match compilation.evaluate_with(&mut Variables::new(), &mut host) {
                Ok(result) if !result.diagnostics.is_empty() => {
                    for diagnostic in result.diagnostics.iter() {
                        println!("{}", diagnostic);
                    }
                    Outcome::Syntax
                },
                Ok(result) => {
                    if let Some(expected) = &strat.expect {
                        if result.value.as_ref() != Some(expected) {
                            println!("Value: {:?}", result.value);
                            println!("Expected: {:?}", expected);
                            panic!("Evaluated value does not match");
                        }
                    }
                    if let Some(expected) = &strat.prints {
                        assert_eq!(&host.printed, expected, "Printed lines do not match");
                    }
                    Outcome::Success
                },
                Err(trace) => {
                    println!("{}", trace);
                    Outcome::Trace
                },
            }
        },
    };

    if actual_outcome != strat.outcome {
        println!("expected outcome {:?}", strat.outcome);
        println!("actual outcome {:?}", actual_outcome);
        panic!("test failed, outcomes are not the same");
    }
}

#[test]
fn test_snippets() {
    let paths = fs::read_dir("./tests/snippets")
        .expect("You must be in the base sirius directory, snippets in ./tests/snippets");

    let mut to_run: Vec<PathBuf> = vec![];
    for path in paths {
        to_run.push(path.expect("Could not read path").path())
    }
    to_run.sort();

    println!("\nRunning {} snippet test(s)...", to_run.len());
    assert!(!to_run.is_empty(), "No snippets found");

    for (counter, path) in to_run.iter().enumerate() {
        println!("test {}: {}...", counter, path.display());

        let source = fs::read_to_string(path).expect("Could not read snippet source");
        let test_strat = TestStrat::snippet(&source);

        test_snippet(&body(&source), test_strat);
    }

    println!("All tests passed!\n");
}
