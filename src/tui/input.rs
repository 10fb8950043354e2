use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::{InputEvent, Knob, StepId};

const FINE: i32 = 8;
const COARSE: i32 = 64;

// drain pending terminal input within `timeout`, resolving keys to panel events
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    if !event::poll(timeout)? {
        return Ok(events);
    }
    // take everything already queued so a burst of autorepeat doesn't lag
    loop {
        if let Event::Key(key) = event::read()? {
            events.extend(handle_key(key.code, key.kind));
        }
        if !event::poll(Duration::ZERO)? {
            return Ok(events);
        }
    }
}

fn handle_key(code: KeyCode, kind: KeyEventKind) -> Option<InputEvent> {
    let down = kind != KeyEventKind::Release;
    match code {
        KeyCode::Esc if down => Some(InputEvent::Quit),

        // step buttons 1-9, the only keys that care about release
        KeyCode::Char(c @ '1'..='9') => {
            let step = StepId(c as u8 - b'1');
            Some(if down { InputEvent::StepDown(step) } else { InputEvent::StepUp(step) })
        }

        // every pot is wired backwards, so "up" turns the reading down.
        // shifted keys take bigger steps
        KeyCode::Char(c) if down => knob_turn(c),
        _ => None,
    }
}

fn knob_turn(c: char) -> Option<InputEvent> {
    let (knob, delta) = match c {
        '[' => (Knob::Tuning, FINE),
        ']' => (Knob::Tuning, -FINE),
        '{' => (Knob::Tuning, COARSE),
        '}' => (Knob::Tuning, -COARSE),
        '-' => (Knob::Tempo, FINE),
        '=' => (Knob::Tempo, -FINE),
        '_' => (Knob::Tempo, COARSE),
        '+' => (Knob::Tempo, -COARSE),
        ';' => (Knob::GateWidth, FINE),
        '\'' => (Knob::GateWidth, -FINE),
        ':' => (Knob::GateWidth, COARSE),
        '"' => (Knob::GateWidth, -COARSE),
        _ => return None,
    };
    Some(InputEvent::KnobTurn(knob, delta))
}
