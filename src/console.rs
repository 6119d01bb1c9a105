// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;

use console::{Term, style};

/// Line-oriented user interaction used by the session
pub trait Console {
    /// Show `question` and read one line of input, without the line ending
    fn prompt(&mut self, question: &str) -> io::Result<String>;

    /// Print one line of output
    fn print_line(&mut self, line: &str) -> io::Result<()>;
}

/// Console backed by the process's terminal
pub struct TermConsole {
    term: Term,
}

impl TermConsole {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Console for TermConsole {
    fn prompt(&mut self, question: &str) -> io::Result<String> {
        self.term.write_str(&format!("{} ", style(question).bold()))?;
        self.term.read_line()
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }
}
