use crate::shared::{DisplayCell, DisplayState, PixelColor};
use crate::audio::volts_to_hz;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};
use ratatui::Frame;

use super::grid::draw_step_row;
use super::panel::Controls;

const HELP: &str = "1-9 steps (tap mute, hold edit, 9 x2 drop)  [ ] tune  - = tempo  ; ' gate  shift = coarse  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, controls: &Controls) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 7-segment display + pixel
            Constraint::Length(3), // step buttons
            Constraint::Length(3), // pots
            Constraint::Length(1), // status
            Constraint::Min(1),    // help
        ])
        .split(area);

    draw_screen(frame, sections[0], state);
    draw_step_row(frame, sections[1], state, &controls.pressed);
    draw_knobs(frame, sections[2], controls);
    draw_status(frame, sections[3], state);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[4],
    );
}

fn cell_spans(cell: DisplayCell) -> [Span<'static>; 2] {
    let lit = Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD);
    let dot = if cell.sharp { "." } else { " " };
    [Span::styled(format!(" {}", cell.glyph), lit), Span::styled(dot, lit)]
}

fn pixel_color(p: PixelColor) -> Color {
    if p.is_off() {
        Color::DarkGray
    } else {
        Color::Rgb(p.r, p.g, p.b.saturating_mul(4))
    }
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let [a, b, c, d] = state.cells.map(cell_spans);
    let colon = if state.colon { " :" } else { "  " };

    let mut spans = Vec::with_capacity(12);
    spans.extend(a);
    spans.extend(b);
    spans.push(Span::styled(colon, Style::default().fg(Color::LightRed)));
    spans.extend(c);
    spans.extend(d);
    spans.push(Span::raw("    "));
    spans.push(Span::styled("●", Style::default().fg(pixel_color(state.pixel))));

    let screen = Paragraph::new(Line::from(spans)).block(Block::bordered().title(" cvseq "));
    frame.render_widget(screen, area);
}

fn draw_knobs(frame: &mut Frame, area: Rect, controls: &Controls) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let max = controls.analog_max.max(1) as f64;
    let knobs = [("TUNE", controls.tuning), ("TEMPO", controls.tempo), ("GATE", controls.gate)];
    for ((label, value), col) in knobs.into_iter().zip(cols.iter()) {
        let gauge = Gauge::default()
            .block(Block::bordered().title(label))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio((value as f64 / max).clamp(0.0, 1.0))
            .label(value.to_string());
        frame.render_widget(gauge, *col);
    }
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let gate = if state.gate { "GATE" } else { "gate" };
    let mut text = format!(
        " {:5.1} bpm   step {}/{}   {:.2} V {:6.1} Hz   {gate}",
        state.bpm,
        state.sounding_step,
        state.span,
        state.sounding_pitch,
        volts_to_hz(state.sounding_pitch),
    );
    if let Some(held) = state.held_step {
        text.push_str(&format!("   editing step {}", held + 1));
    }
    frame.render_widget(Paragraph::new(text), area);
}
