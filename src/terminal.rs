//! Terminal rendering of the [form](crate::form).
//!
//! The page chrome, warnings, errors and the spinner go to stderr. On a terminal the answer is rendered as
//! markdown under its heading on stdout. When stdout is piped, the heading goes to stderr and the answer is
//! written to stdout byte for byte, so `expert-qa ask ... > answer.md` captures just the answer.

use std::io::{self, IsTerminal, Stderr, Stdout, Write};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use termimad::crossterm::style::Stylize;
use termimad::terminal_size;
use crate::form::{DESCRIPTION, PERSONA_LABEL, Surface, TITLE};
use crate::persona::PromptRegistry;
use crate::utils::printing::MarkdownPrinter;

const SPINNER_TICK: Duration = Duration::from_millis(100);

pub struct TerminalSurface<O: Write = Stdout, E: Write = Stderr> {
    pub printer: MarkdownPrinter,
    out: O,
    err: E,
    spinner: Option<ProgressBar>,
    styled: bool,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSurface {
    /// Styled markdown when stdout is a terminal, plain text otherwise.
    pub fn new() -> Self {
        let styled = io::stdout().is_terminal();
        Self::with_writers(io::stdout(), io::stderr(), styled)
    }
}

impl<O: Write, E: Write> TerminalSurface<O, E> {
    /// Write the answer to `out` and everything else to `err`.
    pub fn with_writers(out: O, err: E, styled: bool) -> Self {
        let printer = if styled {
            MarkdownPrinter::default().with_wrap_width(terminal_size().0 as usize)
        } else {
            MarkdownPrinter::plain()
        };
        Self {
            printer,
            out,
            err,
            spinner: None,
            styled,
        }
    }

    /// Print the title, the description and the numbered persona list.
    pub fn print_header(&mut self, registry: &PromptRegistry) {
        let mut markdown = format!("# {}\n\n{}\n\n{}\n", TITLE, DESCRIPTION, PERSONA_LABEL);
        for (idx, name) in registry.names().enumerate() {
            markdown.push_str(&format!("{}. {}\n", idx + 1, name));
        }
        if let Err(e) = self.printer.print_to(&mut self.err, &markdown) {
            warn!("cannot write to stderr: {}", e);
        }
    }

    fn notice(&mut self, styled_message: String, message: &str) {
        let result = if self.styled {
            writeln!(self.err, "{}", styled_message)
        } else {
            writeln!(self.err, "{}", message)
        };
        if let Err(e) = result {
            warn!("cannot write to stderr: {}", e);
        }
    }
}

impl<O: Write, E: Write> Surface for TerminalSurface<O, E> {
    fn warning(&mut self, message: &str) {
        self.notice(message.yellow().to_string(), message);
    }

    fn error(&mut self, message: &str) {
        self.notice(message.red().bold().to_string(), message);
    }

    fn busy(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(SPINNER_TICK);
        self.spinner = Some(spinner);
    }

    fn idle(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn answer(&mut self, heading: &str, text: &str) {
        let result = if self.styled {
            let markdown = format!("## {}\n\n{}\n", heading, text);
            self.printer.print_to(&mut self.out, &markdown)
        } else {
            writeln!(self.err, "## {}\n", heading)
                .and_then(|_| self.out.write_all(text.as_bytes()))
                .and_then(|_| self.out.flush())
        };
        if let Err(e) = result {
            warn!("cannot write the answer: {}", e);
        }
    }
}

impl<O: Write, E: Write> Drop for TerminalSurface<O, E> {
    fn drop(&mut self) {
        self.idle();
    }
}
