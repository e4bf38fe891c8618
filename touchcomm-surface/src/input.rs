/// Key roles the experiment reacts to. The application maps physical keys
/// onto these; space is `Start`, escape is `Abort`, and the keyboard
/// selection mode has two aliases each for forward, backward and confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Start,
    Abort,
    Forward,
    Backward,
    Confirm,
}

/// Pointer input in normalized window coordinates (0..1, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { x: f32, y: f32 },
    Pressed { x: f32, y: f32 },
}
