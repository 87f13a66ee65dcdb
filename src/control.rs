//! Steering commands for the controllable agent.
//!
//! A [`Controller`] is polled once per tick for the commands to apply before
//! the tick runs. Two controllers ship with the crate:
//!
//! - [`CommandQueue`] - commands pushed from elsewhere (a UI thread, a test)
//! - [`Script`] - commands scheduled by tick, parsed from `TICK:KIND[:ARGS]`
//!
//! Any `FnMut(u64) -> Vec<Command>` is a controller too:
//!
//! ```ignore
//! flock.run(
//!     |tick| if tick == 100 { vec![Command::Quit] } else { vec![] },
//!     (),
//!     None,
//! )?;
//! ```

use crate::error::CommandParseError;
use glam::Vec2;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};

/// Turn magnitude used when a script omits one (one arrow-key press).
pub const DEFAULT_TURN_MAGNITUDE: f32 = 2.0;

/// A discrete command for the controllable agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Turn counter-clockwise on screen by this many turn-rate units.
    TurnLeft(f32),
    /// Turn clockwise on screen by this many turn-rate units.
    TurnRight(f32),
    /// Add to the velocity (or re-point the heading in heading-driven motion).
    Accelerate(Vec2),
    /// Stop the flock. No tick runs afterwards.
    Quit,
}

/// Source of commands, polled once per tick.
pub trait Controller {
    /// Commands to apply before tick `tick` runs.
    fn poll(&mut self, tick: u64) -> Vec<Command>;
}

impl<F> Controller for F
where
    F: FnMut(u64) -> Vec<Command>,
{
    fn poll(&mut self, tick: u64) -> Vec<Command> {
        self(tick)
    }
}

/// A controller that never issues commands.
impl Controller for () {
    fn poll(&mut self, _tick: u64) -> Vec<Command> {
        Vec::new()
    }
}

/// Commands pushed from outside the tick loop.
///
/// Clone the [`sender`](Self::sender) into another thread to feed the queue;
/// every poll drains whatever has arrived.
pub struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Handle for pushing commands from another thread.
    pub fn sender(&self) -> Sender<Command> {
        self.tx.clone()
    }

    pub fn push(&self, command: Command) {
        // the receiver lives in self, so sending cannot fail
        let _ = self.tx.send(command);
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for CommandQueue {
    fn poll(&mut self, _tick: u64) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}

/// A command bound to the tick it fires on.
///
/// Parses from `TICK:KIND[:ARGS]`:
///
/// | Text | Command |
/// |------|---------|
/// | `120:left` | `TurnLeft(2.0)` |
/// | `120:right:0.5` | `TurnRight(0.5)` |
/// | `40:accel:0.2,-0.2` | `Accelerate((0.2, -0.2))` |
/// | `900:quit` | `Quit` |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledCommand {
    pub tick: u64,
    pub command: Command,
}

impl FromStr for ScheduledCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CommandParseError::Malformed(s.to_string());

        let mut parts = s.trim().splitn(3, ':');
        let tick = parts
            .next()
            .and_then(|t| t.trim().parse::<u64>().ok())
            .ok_or_else(malformed)?;
        let kind = parts.next().map(str::trim).ok_or_else(malformed)?;
        let args = parts.next().map(str::trim);

        let command = match kind {
            "left" => Command::TurnLeft(parse_magnitude(args)?),
            "right" => Command::TurnRight(parse_magnitude(args)?),
            "accel" => Command::Accelerate(parse_vector(args)?),
            "quit" => Command::Quit,
            other => return Err(CommandParseError::UnknownKind(other.to_string())),
        };

        Ok(ScheduledCommand { tick, command })
    }
}

fn parse_magnitude(args: Option<&str>) -> Result<f32, CommandParseError> {
    match args {
        None | Some("") => Ok(DEFAULT_TURN_MAGNITUDE),
        Some(text) => text
            .parse::<f32>()
            .ok()
            .filter(|m| m.is_finite())
            .ok_or_else(|| CommandParseError::BadArgument(text.to_string())),
    }
}

fn parse_vector(args: Option<&str>) -> Result<Vec2, CommandParseError> {
    let text = args.unwrap_or("");
    let bad = || CommandParseError::BadArgument(text.to_string());

    let mut components = text.split(',').map(|c| c.trim().parse::<f32>());
    match (components.next(), components.next(), components.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => {
            Ok(Vec2::new(x, y))
        }
        _ => Err(bad()),
    }
}

/// Commands scheduled by tick.
///
/// Each command fires once, on the first poll at or after its tick.
#[derive(Clone, Debug, Default)]
pub struct Script {
    commands: Vec<ScheduledCommand>,
    cursor: usize,
}

impl Script {
    pub fn new(mut commands: Vec<ScheduledCommand>) -> Self {
        // stable: commands on the same tick keep their order
        commands.sort_by_key(|c| c.tick);
        Self {
            commands,
            cursor: 0,
        }
    }

    /// Parse one `TICK:KIND[:ARGS]` entry per item.
    pub fn parse<'a, I>(lines: I) -> Result<Self, CommandParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let commands = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::parse::<ScheduledCommand>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(commands))
    }

    /// Whether every command has fired.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the script ever quits.
    pub fn quits(&self) -> bool {
        self.commands.iter().any(|c| c.command == Command::Quit)
    }
}

impl Controller for Script {
    fn poll(&mut self, tick: u64) -> Vec<Command> {
        let due = self.commands[self.cursor..]
            .iter()
            .take_while(|c| c.tick <= tick)
            .count();
        let fired = self.commands[self.cursor..self.cursor + due]
            .iter()
            .map(|c| c.command)
            .collect();
        self.cursor += due;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("120:left", 120, Command::TurnLeft(2.0))]
    #[case("5:right:0.5", 5, Command::TurnRight(0.5))]
    #[case(" 40:accel:0.2,-0.2 ", 40, Command::Accelerate(Vec2::new(0.2, -0.2)))]
    #[case("900:quit", 900, Command::Quit)]
    fn test_parse_scheduled_command(
        #[case] text: &str,
        #[case] tick: u64,
        #[case] command: Command,
    ) {
        let parsed: ScheduledCommand = text.parse().unwrap();
        assert_eq!(parsed, ScheduledCommand { tick, command });
    }

    #[rstest]
    #[case("left", CommandParseError::Malformed("left".into()))]
    #[case("-3:left", CommandParseError::Malformed("-3:left".into()))]
    #[case("10", CommandParseError::Malformed("10".into()))]
    #[case("10:jump", CommandParseError::UnknownKind("jump".into()))]
    #[case("10:left:fast", CommandParseError::BadArgument("fast".into()))]
    #[case("10:accel:1", CommandParseError::BadArgument("1".into()))]
    #[case("10:accel", CommandParseError::BadArgument("".into()))]
    #[case("10:accel:1,2,3", CommandParseError::BadArgument("1,2,3".into()))]
    fn test_parse_errors(#[case] text: &str, #[case] expected: CommandParseError) {
        assert_eq!(text.parse::<ScheduledCommand>().unwrap_err(), expected);
    }

    #[test]
    fn test_script_fires_each_command_once() {
        let mut script = Script::parse(["3:right", "1:left:1", "3:quit", ""]).unwrap();
        assert_eq!(script.len(), 3);
        assert!(script.quits());

        assert!(script.poll(0).is_empty());
        assert_eq!(script.poll(1), vec![Command::TurnLeft(1.0)]);
        assert!(script.poll(2).is_empty());
        assert_eq!(
            script.poll(3),
            vec![Command::TurnRight(2.0), Command::Quit]
        );
        assert!(script.is_finished());
        assert!(script.poll(4).is_empty());
    }

    #[test]
    fn test_script_catches_up_on_skipped_ticks() {
        let mut script = Script::parse(["2:left", "4:right"]).unwrap();
        assert!(!script.quits());
        assert_eq!(script.poll(10).len(), 2);
    }

    #[test]
    fn test_command_queue_drains() {
        let mut queue = CommandQueue::new();
        queue.push(Command::TurnLeft(1.0));
        let sender = queue.sender();
        std::thread::spawn(move || sender.send(Command::Quit).unwrap())
            .join()
            .unwrap();

        assert_eq!(queue.poll(0), vec![Command::TurnLeft(1.0), Command::Quit]);
        assert!(queue.poll(1).is_empty());
    }

    #[test]
    fn test_closure_controller() {
        let mut controller = |tick: u64| {
            if tick == 2 {
                vec![Command::Quit]
            } else {
                Vec::new()
            }
        };
        assert!(Controller::poll(&mut controller, 1).is_empty());
        assert_eq!(Controller::poll(&mut controller, 2), vec![Command::Quit]);
    }
}
