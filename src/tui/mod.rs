pub mod grid;
pub mod input;
pub mod panel;
pub mod view;

use std::io::Stdout;

use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::hal::DisplaySink;
use crate::shared::DisplayState;

use panel::Controls;

/// The terminal standing in for the 7-segment display, the pixel, and the
/// front panel controls around them.
pub struct TerminalPanel {
    term: Terminal<CrosstermBackend<Stdout>>,
    controls: Controls,
}

impl TerminalPanel {
    pub fn new() -> std::io::Result<Self> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut term = Terminal::new(backend)?;
        term.clear()?;
        Ok(Self { term, controls: Controls::default() })
    }

    // knob and key state to draw alongside the next frame
    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
    }
}

impl DisplaySink for TerminalPanel {
    fn show(&mut self, state: &DisplayState) -> std::io::Result<()> {
        let controls = self.controls;
        self.term.draw(|frame| {
            view::render(frame, frame.area(), state, &controls);
        })?;
        Ok(())
    }
}
