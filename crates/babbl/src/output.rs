//! Status lines on stderr.

use std::fmt::Display;

use console::{Style, Term};

/// How a status line is styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Done,
    Warn,
    Fail,
    Skipped,
    Heading,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Warn => Style::new().yellow(),
            Self::Fail => Style::new().red(),
            Self::Skipped => Style::new().dim(),
            Self::Heading => Style::new().cyan().bold(),
        }
    }

    /// Colors are dropped when stderr is not a terminal.
    fn paint(self, message: impl Display) -> String {
        self.style().for_stderr().apply_to(message).to_string()
    }
}

/// Writes status lines to stderr, keeping stdout free.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Write one line. A closed stderr is ignored.
    pub(crate) fn line(&self, tone: Tone, message: impl Display) {
        let _ = self.term.write_line(&tone.paint(message));
    }
}
