// what the tick handler can say to the audio engine. The engine thread can't
// be blocked, so everything goes through a bounded channel as plain values.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CvCommand {
    // DAC code for the pitch output, in the configured dac range
    Pitch(u16),
    Gate(bool),
}
