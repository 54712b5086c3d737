use super::types::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Turn(Direction),
    TogglePause,
}

/// Maps a DOM `KeyboardEvent.key`/`code` value to a command. Reversal rules
/// are left to the game state.
pub fn map_key(key: &str) -> Option<Command> {
    match key {
        "ArrowUp" => Some(Command::Turn(Direction::Up)),
        "ArrowDown" => Some(Command::Turn(Direction::Down)),
        "ArrowLeft" => Some(Command::Turn(Direction::Left)),
        "ArrowRight" => Some(Command::Turn(Direction::Right)),
        "Space" | " " => Some(Command::TogglePause),
        _ => None,
    }
}
