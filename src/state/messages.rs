use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Once a second: keeps spinners and "updated Ns ago" labels moving.
    Tick,
}
