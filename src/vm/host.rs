use std::{
    fmt::Debug,
    io::{self, BufRead, Write},
};

use rand::{rngs::ThreadRng, Rng};

use crate::{
    common::data::Data,
    construct::symbol::{FunctionSymbol, INPUT, PRINT, RND},
    vm::trace::Trace,
};

/// Everything a running program can observe about the outside world.
/// The built-in functions are implemented in terms of this,
/// so an embedder (or a test) can swap out where output goes,
/// where input comes from, and how random numbers are picked.
pub trait Host: Debug {
    /// Writes a single line.
    fn print(&mut self, text: &str) -> Result<(), Trace>;
    /// Reads a single line, without the line break.
    fn input(&mut self) -> Result<String, Trace>;
    /// Returns a number in `[0, max)`. `max` is always positive.
    fn random(&mut self, max: i32) -> i32;
}

/// The default [`Host`]: standard in, standard out, and the thread-local RNG.
#[derive(Debug, Default)]
pub struct Console {
    rng: ThreadRng,
}

impl Console {
    pub fn new() -> Console {
        Console::default()
    }
}

impl Host for Console {
    fn print(&mut self, text: &str) -> Result<(), Trace> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text).map_err(|e| Trace::Io(e.to_string()))
    }

    fn input(&mut self) -> Result<String, Trace> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Trace::Io(e.to_string()))?;

        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn random(&mut self, max: i32) -> i32 {
        self.rng.gen_range(0..max)
    }
}

/// Calls a built-in function with already evaluated arguments.
/// Returns `None` for functions without a value, like `print`.
pub fn call(
    host: &mut dyn Host,
    function: &'static FunctionSymbol,
    arguments: &[Data],
) -> Result<Option<Data>, Trace> {
    if *function == PRINT {
        let [Data::String(text)] = arguments else {
            return Err(Trace::InvalidOperands);
        };
        host.print(text)?;
        Ok(None)
    } else if *function == INPUT {
        Ok(Some(Data::String(host.input()?)))
    } else if *function == RND {
        let [Data::Integer(max)] = arguments else {
            return Err(Trace::InvalidOperands);
        };
        match *max {
            max if max < 0 => Err(Trace::NegativeBound(max)),
            0 => Ok(Some(Data::Integer(0))),
            max => Ok(Some(Data::Integer(host.random(max)))),
        }
    } else {
        Err(Trace::UnknownFunction(function.name))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Default)]
    struct Echo {
        printed: Vec<String>,
    }

    impl Host for Echo {
        fn print(&mut self, text: &str) -> Result<(), Trace> {
            self.printed.push(text.to_string());
            Ok(())
        }

        fn input(&mut self) -> Result<String, Trace> {
            Ok(self.printed.last().cloned().unwrap_or_default())
        }

        fn random(&mut self, max: i32) -> i32 {
            max - 1
        }
    }

    #[test]
    fn builtins() {
        let mut host = Echo::default();
        let printed = call(&mut host, &PRINT, &[Data::from("hello")]).unwrap();
        assert_eq!(printed, None);
        assert_eq!(call(&mut host, &INPUT, &[]).unwrap(), Some(Data::from("hello")));
        assert_eq!(call(&mut host, &RND, &[Data::Integer(7)]).unwrap(), Some(Data::Integer(6)));
    }

    #[test]
    fn rnd_bounds() {
        let mut host = Echo::default();
        assert_eq!(call(&mut host, &RND, &[Data::Integer(0)]).unwrap(), Some(Data::Integer(0)));
        assert_eq!(
            call(&mut host, &RND, &[Data::Integer(-2)]),
            Err(Trace::NegativeBound(-2)),
        );
    }

    #[test]
    fn wrong_arguments() {
        let mut host = Echo::default();
        assert_eq!(call(&mut host, &PRINT, &[Data::Integer(1)]), Err(Trace::InvalidOperands));
    }

    #[test]
    fn console_random_in_range() {
        let mut console = Console::new();
        for _ in 0..100 {
            let n = console.random(3);
            assert!((0..3).contains(&n));
        }
    }
}
