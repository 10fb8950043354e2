// volt-per-octave note table used by the display; 7 octaves of chromatic
// thresholds, looked up with a floor match

pub const NUM_OCTAVES: usize = 7;
pub const SEMITONES: usize = 12;
pub const NUM_ENTRIES: usize = NUM_OCTAVES * SEMITONES;

// (offset within the octave in volts, letter, sharp)
const SEMITONE_LAYOUT: [(f32, char, bool); SEMITONES] = [
    (0.0, 'C', false),
    (0.08, 'C', true),
    (0.16, 'D', false),
    (0.25, 'D', true),
    (0.33, 'E', false),
    (0.41, 'F', false),
    (0.50, 'F', true),
    (0.58, 'G', false),
    (0.66, 'G', true),
    (0.75, 'A', false),
    (0.83, 'A', true),
    (0.91, 'B', false),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEntry {
    pub threshold: f32,
    pub letter: char,
    pub sharp: bool,
    pub octave: u8,
}

impl NoteEntry {
    pub fn name(&self) -> String {
        let sharp = if self.sharp { "#" } else { "" };
        format!("{}{}{}", self.letter, sharp, self.octave)
    }
}

#[derive(Clone, Debug)]
pub struct PitchTable {
    entries: [NoteEntry; NUM_ENTRIES],
}

impl PitchTable {
    pub fn new() -> Self {
        let entries = std::array::from_fn(|i| {
            let octave = i / SEMITONES;
            let (offset, letter, sharp) = SEMITONE_LAYOUT[i % SEMITONES];
            NoteEntry {
                threshold: offset + octave as f32,
                letter,
                sharp,
                octave: octave as u8,
            }
        });
        Self { entries }
    }

    /// The last entry whose threshold is at or below `voltage`. Anything below
    /// the table (including NaN) reads as the lowest entry, C0.
    pub fn lookup(&self, voltage: f32) -> &NoteEntry {
        let below = self.entries.partition_point(|e| e.threshold <= voltage);
        &self.entries[below.saturating_sub(1)]
    }

    pub fn lowest(&self) -> &NoteEntry {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        Self::new()
    }
}
