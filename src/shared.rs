// Front panel layout of the instrument:
//
//   [ C  D : E  F ]   <- four 7-segment cells, a colon between cells 2 and 3
//    (o)              <- one RGB indicator pixel, blinks with the step clock
//
//   1 2 3 4 5 6 7 8 9 <- step buttons; tap = mute/unmute, hold = edit pitch,
//                        double tap on 9 = drop it from the rotation
//
//   TUNE   TEMPO   GATE   <- potentiometers (tempo and gate are wired backwards)
//
// The control loop owns everything above the step store; the display only ever
// sees a `DisplayState`, rebuilt each control cycle.

pub const NUM_STEPS: usize = 9;
pub const NUM_CELLS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepId(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Knob {
    Tuning,
    Tempo,
    GateWidth,
}

// events the host front panel resolves from the keyboard
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    StepDown(StepId),
    StepUp(StepId),
    KnobTurn(Knob, i32), // delta in analog units
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayCell {
    pub glyph: char,
    pub sharp: bool, // drawn as the cell's decimal point
}

impl DisplayCell {
    pub const BLANK: Self = Self { glyph: ' ', sharp: false };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelColor {
    pub const OFF: Self = Self { r: 0, g: 0, b: 0 };
    pub const BEAT: Self = Self { r: 0, g: 0, b: 64 };

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub cells: [DisplayCell; NUM_CELLS],
    pub colon: bool,
    pub pixel: PixelColor,

    // not shown on the hardware, the host panel prints them as a status line
    pub bpm: f32,
    pub sounding_step: usize, // 1-based
    pub sounding_pitch: f32,  // volts
    pub span: usize,
    pub held_step: Option<usize>,
    pub gate: bool,
    pub active: [bool; NUM_STEPS],
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            cells: [DisplayCell::BLANK; NUM_CELLS],
            colon: false,
            pixel: PixelColor::OFF,
            bpm: 0.0,
            sounding_step: 1,
            sounding_pitch: 0.0,
            span: NUM_STEPS,
            held_step: None,
            gate: false,
            active: [true; NUM_STEPS],
        }
    }
}
