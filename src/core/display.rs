// builds the four-cell display from the step store. Each cell shows one step:
//   `_`  not the step that is sounding
//   `-`  the sounding step, muted
//   note letter of the sounding step otherwise
// The cell's decimal point always marks a sharp pitch.

use crate::core::pitch_table::PitchTable;
use crate::core::SequencerState;
use crate::shared::{DisplayCell, DisplayState, PixelColor, NUM_CELLS, NUM_STEPS};

fn step_cell(state: &SequencerState, table: &PitchTable, index: usize, sounding: usize) -> DisplayCell {
    let note = table.lookup(state.steps.pitch(index));
    let glyph = if index + 1 != sounding {
        '_'
    } else if state.steps.is_active(index) {
        note.letter
    } else {
        '-'
    };
    DisplayCell { glyph, sharp: note.sharp }
}

pub fn build(state: &SequencerState, table: &PitchTable, bpm: f32) -> DisplayState {
    let sounding = state.clock.sounding_step();
    let held = state.held_step();

    let cells = if let Some(index) = held {
        // editing: the held step's note fills the display
        let note = table.lookup(state.steps.pitch(index));
        [DisplayCell { glyph: note.letter, sharp: note.sharp }; NUM_CELLS]
    } else if sounding == NUM_STEPS {
        // the odd step out gets the whole display to itself
        [step_cell(state, table, NUM_STEPS - 1, sounding); NUM_CELLS]
    } else {
        let offset = if sounding > NUM_CELLS { NUM_CELLS } else { 0 };
        std::array::from_fn(|i| step_cell(state, table, offset + i, sounding))
    };

    let blink = state.clock.blink();
    DisplayState {
        cells,
        colon: blink,
        pixel: if blink { PixelColor::OFF } else { PixelColor::BEAT },
        bpm,
        sounding_step: sounding,
        sounding_pitch: state.steps.pitch(sounding.saturating_sub(1)),
        span: state.steps.span(),
        held_step: held,
        gate: state.clock.gate(),
        active: std::array::from_fn(|i| state.steps.is_active(i)),
    }
}
