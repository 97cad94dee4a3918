use super::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Notify(Notify),
    SetDifficulty(Difficulty),
    Disconnected,
}
