use std::io::{self, Write};
use termimad::{FmtLine, FmtText, MadSkin};

/// Markdown rendered for the terminal.
pub struct RenderedMarkdown {
    pub text: String,
    line_width: Vec<usize>,
}

impl From<FmtText<'_, '_>> for RenderedMarkdown {
    fn from(fmt_text: FmtText<'_, '_>) -> Self {
        let text = format!("{}", fmt_text);
        let line_width = fmt_text.lines.iter().map(FmtLine::visible_length).collect();
        Self {
            text,
            line_width,
        }
    }
}

impl RenderedMarkdown {
    /// Number of rendered lines.
    #[inline]
    pub fn height(&self) -> usize {
        self.line_width.len()
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
    pub wrap_width: Option<usize>,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self {
            skin: MadSkin::default(),
            wrap_width: None,
        }
    }
}

impl MarkdownPrinter {
    /// A printer without colors or styles, for output that is not a terminal.
    pub fn plain() -> Self {
        Self {
            skin: MadSkin::no_style(),
            wrap_width: None,
        }
    }

    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = Some(wrap_width);
        self
    }

    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        FmtText::from(&self.skin, markdown, self.wrap_width).into()
    }

    pub fn print_to(&self, out: &mut impl Write, markdown: &str) -> io::Result<()> {
        let rendered = self.render(markdown);
        out.write_all(rendered.text.as_bytes())?;
        out.flush()
    }
}
