use crate::shared::{DisplayState, NUM_STEPS};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

const LABELS: [&str; NUM_STEPS] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

// one bordered cell per step button: border lights up on the sounding step,
// fill shows a pressed key, dim text a muted step, `x` a step out of the rotation
pub fn draw_step_row(frame: &mut Frame, area: Rect, state: &DisplayState, pressed: &[bool; NUM_STEPS]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, NUM_STEPS as u32); NUM_STEPS])
        .split(area);

    for (i, cell_area) in cols.iter().enumerate() {
        let sounding = i + 1 == state.sounding_step;
        let excluded = i >= state.span;

        let border = if sounding {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut text = if state.active[i] {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if pressed[i] {
            text = text.bg(Color::Magenta);
        }

        let label = if excluded { "x" } else { LABELS[i] };
        let cell = Paragraph::new(label)
            .style(text)
            .centered()
            .block(Block::bordered().border_style(border));
        frame.render_widget(cell, *cell_area);
    }
}
