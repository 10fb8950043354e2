// press / hold / tap / double-tap classification for the step buttons.
// Runs once per control cycle on the main loop only.

use crate::shared::NUM_STEPS;

#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonState {
    pub pressed: bool,
    pub was_pressed: bool,
    pub press_started_ms: u64,
    pub last_tap_ms: Option<u64>,
}

impl ButtonState {
    fn held_for(&self, now: u64) -> u64 {
        now.saturating_sub(self.press_started_ms)
    }

    fn released_this_cycle(&self) -> bool {
        self.was_pressed && !self.pressed
    }
}

/// What one control cycle of button activity asks the step store to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditEvent {
    /// step is held: the tuning pot rewrites its pitch
    Edit(usize),
    ToggleActive(usize),
    /// double tap on the last step: drop it from (or return it to) the rotation
    ToggleEnabled(usize),
}

#[derive(Clone, Debug)]
pub struct ButtonMachine {
    buttons: [ButtonState; NUM_STEPS],
    hold_ms: u64,
    double_tap_ms: u64,
}

impl ButtonMachine {
    pub fn new(hold_ms: u64, double_tap_ms: u64) -> Self {
        Self {
            buttons: [ButtonState::default(); NUM_STEPS],
            hold_ms,
            double_tap_ms,
        }
    }

    /// Shift in a fresh set of levels, stamping press edges with `now`.
    pub fn update(&mut self, levels: [bool; NUM_STEPS], now: u64) {
        for (button, pressed) in self.buttons.iter_mut().zip(levels) {
            button.was_pressed = button.pressed;
            button.pressed = pressed;
            if button.pressed && !button.was_pressed {
                button.press_started_ms = now;
            }
        }
    }

    /// Lowest-index step pressed for longer than the hold threshold.
    pub fn held(&self, now: u64) -> Option<usize> {
        self.buttons
            .iter()
            .position(|b| b.pressed && b.held_for(now) > self.hold_ms)
    }

    /// Lowest-index step released this cycle after a short press.
    pub fn tapped(&self, now: u64) -> Option<usize> {
        self.buttons
            .iter()
            .position(|b| b.released_this_cycle() && b.held_for(now) < self.hold_ms)
    }

    /// Classify this cycle. Hold beats tap, and only one tap is handled per
    /// cycle. A tap on the last step is checked against that step's previous
    /// tap to tell a single tap from a double tap.
    pub fn classify(&mut self, now: u64) -> Option<EditEvent> {
        if let Some(step) = self.held(now) {
            return Some(EditEvent::Edit(step));
        }

        let step = self.tapped(now)?;
        let last = NUM_STEPS - 1;
        let button = &mut self.buttons[step];
        let previous_tap = button.last_tap_ms.replace(now);

        if step != last {
            return Some(EditEvent::ToggleActive(step));
        }

        match previous_tap {
            Some(prev) if now.saturating_sub(prev) <= self.double_tap_ms => {
                Some(EditEvent::ToggleEnabled(step))
            }
            _ => Some(EditEvent::ToggleActive(step)),
        }
    }

    pub fn levels(&self) -> [bool; NUM_STEPS] {
        std::array::from_fn(|i| self.buttons[i].pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST: usize = NUM_STEPS - 1;

    fn only(index: usize) -> [bool; NUM_STEPS] {
        let mut levels = [false; NUM_STEPS];
        levels[index] = true;
        levels
    }

    fn tap(m: &mut ButtonMachine, index: usize, at: u64) -> Option<EditEvent> {
        m.update(only(index), at);
        assert_eq!(m.classify(at), None);
        m.update([false; NUM_STEPS], at + 50);
        m.classify(at + 50)
    }

    #[test]
    fn test_short_press_is_tap() {
        let mut m = ButtonMachine::new(500, 500);
        assert_eq!(tap(&mut m, 3, 1_000), Some(EditEvent::ToggleActive(3)));
        // nothing left to report on the next cycle
        m.update([false; NUM_STEPS], 1_060);
        assert_eq!(m.classify(1_060), None);
    }

    #[test]
    fn test_long_press_release_is_not_tap() {
        let mut m = ButtonMachine::new(500, 500);
        m.update(only(2), 0);
        m.update([false; NUM_STEPS], 700);
        assert_eq!(m.classify(700), None);
    }

    #[test]
    fn test_hold_after_threshold() {
        let mut m = ButtonMachine::new(500, 500);
        m.update(only(4), 1_000);
        m.update(only(4), 1_500);
        assert_eq!(m.held(1_500), None);
        m.update(only(4), 1_501);
        assert_eq!(m.held(1_501), Some(4));
        assert_eq!(m.classify(1_501), Some(EditEvent::Edit(4)));
    }

    #[test]
    fn test_lowest_index_hold_wins() {
        let mut m = ButtonMachine::new(500, 500);
        let mut levels = [false; NUM_STEPS];
        levels[6] = true;
        m.update(levels, 0);
        levels[2] = true;
        m.update(levels, 300);
        // step 6 has been held longer, but step 2 has the lower index
        m.update(levels, 900);
        assert_eq!(m.held(900), Some(2));
    }

    #[test]
    fn test_hold_takes_priority_over_tap() {
        let mut m = ButtonMachine::new(500, 500);
        let mut levels = only(5);
        m.update(levels, 0);
        levels[1] = true;
        m.update(levels, 600);
        levels[1] = false;
        m.update(levels, 650);
        assert_eq!(m.classify(650), Some(EditEvent::Edit(5)));
    }

    #[test]
    fn test_one_tap_per_cycle_lowest_first() {
        let mut m = ButtonMachine::new(500, 500);
        let mut levels = [false; NUM_STEPS];
        levels[1] = true;
        levels[3] = true;
        m.update(levels, 0);
        m.update([false; NUM_STEPS], 100);
        assert_eq!(m.classify(100), Some(EditEvent::ToggleActive(1)));
    }

    #[test]
    fn test_last_step_double_tap_toggles_enabled() {
        let mut m = ButtonMachine::new(500, 500);
        assert_eq!(tap(&mut m, LAST, 10_000), Some(EditEvent::ToggleActive(LAST)));
        assert_eq!(tap(&mut m, LAST, 10_300), Some(EditEvent::ToggleEnabled(LAST)));
    }

    #[test]
    fn test_last_step_slow_taps_toggle_active() {
        let mut m = ButtonMachine::new(500, 500);
        assert_eq!(tap(&mut m, LAST, 10_000), Some(EditEvent::ToggleActive(LAST)));
        assert_eq!(tap(&mut m, LAST, 10_700), Some(EditEvent::ToggleActive(LAST)));
    }

    #[test]
    fn test_first_tap_after_boot_is_single() {
        let mut m = ButtonMachine::new(500, 500);
        assert_eq!(tap(&mut m, LAST, 100), Some(EditEvent::ToggleActive(LAST)));
    }

    #[test]
    fn test_quick_taps_on_other_steps_only_toggle_active() {
        let mut m = ButtonMachine::new(500, 500);
        assert_eq!(tap(&mut m, 0, 1_000), Some(EditEvent::ToggleActive(0)));
        assert_eq!(tap(&mut m, 0, 1_100), Some(EditEvent::ToggleActive(0)));
    }
}
