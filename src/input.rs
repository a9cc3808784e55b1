use crate::entity::Dir;

/// Single-slot buffer for the most recent direction request.
///
/// Written by the input handler between ticks and read by the tick. The
/// request stays latched until a newer one replaces it, so a turn that is
/// blocked now is retried on every following tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputLatch {
    pending: Option<Dir>,
}

impl InputLatch {
    pub fn new() -> Self {
        InputLatch::default()
    }

    pub fn request(&mut self, dir: Dir) {
        self.pending = Some(dir);
    }

    pub fn get(&self) -> Option<Dir> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
