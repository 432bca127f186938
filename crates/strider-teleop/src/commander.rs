//! Input commands and the state they drive.
//!
//! Any input source (mouse picking, a script, a network peer) produces
//! [`Command`]s; [`InputState`] folds them into the target and cursor the
//! locomotion controller follows.

use std::collections::VecDeque;
use std::str::FromStr;

use bevy::prelude::Resource;
use nalgebra::Vector3;
use strider_core::error::CommandError;
use tracing::warn;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Walk toward a ground point.
    SetTarget(Vector3<f64>),
    /// Look at a point. While following, the target tracks the cursor too.
    SetCursor(Vector3<f64>),
    /// Make the target track the cursor (held drag) or stop doing so.
    Follow(bool),
    /// Request a shot.
    Fire,
    /// Stop where the body currently is.
    Stop,
}

impl Command {
    /// Parse a text command.
    ///
    /// ```
    /// use strider_teleop::Command;
    /// use nalgebra::Vector3;
    ///
    /// let cmd = Command::parse("target 1 0 -2.5").unwrap();
    /// assert_eq!(cmd, Command::SetTarget(Vector3::new(1.0, 0.0, -2.5)));
    /// assert!(Command::parse("jump").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        line.parse()
    }
}

fn malformed(command: &str, message: impl Into<String>) -> CommandError {
    CommandError::MalformedArguments {
        command: command.to_owned(),
        message: message.into(),
    }
}

fn parse_point(command: &str, args: &[&str]) -> Result<Vector3<f64>, CommandError> {
    let [x, y, z] = args else {
        return Err(malformed(command, format!("expected 3 coordinates, got {}", args.len())));
    };
    let coord = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(command, format!("not a finite number: {s}")))
    };
    Ok(Vector3::new(coord(*x)?, coord(*y)?, coord(*z)?))
}

fn no_args(command: &str, args: &[&str], value: Command) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(value)
    } else {
        Err(malformed(command, "takes no arguments"))
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::UnknownCommand(String::new()));
        };
        let args: Vec<&str> = words.collect();
        match name.to_ascii_lowercase().as_str() {
            "target" => parse_point(name, &args).map(Command::SetTarget),
            "cursor" => parse_point(name, &args).map(Command::SetCursor),
            "follow" => match args.as_slice() {
                ["on"] => Ok(Command::Follow(true)),
                ["off"] => Ok(Command::Follow(false)),
                _ => Err(malformed(name, "expected on or off")),
            },
            "fire" => no_args(name, &args, Command::Fire),
            "stop" => no_args(name, &args, Command::Stop),
            _ => Err(CommandError::UnknownCommand(name.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

/// Current target and cursor, plus a one-shot fire latch.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub target: Vector3<f64>,
    pub cursor: Vector3<f64>,
    pub following: bool,
    fire_requested: bool,
}

impl InputState {
    pub fn new(target: Vector3<f64>, cursor: Vector3<f64>) -> Self {
        Self {
            target,
            cursor,
            ..Self::default()
        }
    }

    /// Fold one command in. `body` is the body's current ground point, used by
    /// [`Command::Stop`].
    pub fn apply(&mut self, command: Command, body: &Vector3<f64>) {
        match command {
            Command::SetTarget(target) => self.target = target,
            Command::SetCursor(cursor) => {
                self.cursor = cursor;
                if self.following {
                    self.target = cursor;
                }
            }
            Command::Follow(on) => {
                self.following = on;
                if on {
                    self.target = self.cursor;
                }
            }
            Command::Fire => self.fire_requested = true,
            Command::Stop => {
                self.following = false;
                self.target = *body;
            }
        }
    }

    /// Whether a shot is pending.
    pub const fn fire_requested(&self) -> bool {
        self.fire_requested
    }

    /// Consume the pending shot, if any.
    pub const fn take_fire(&mut self) -> bool {
        let fire = self.fire_requested;
        self.fire_requested = false;
        fire
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting to be applied on the next tick, oldest first.
#[derive(Resource, Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Parse and queue a text command. Unparseable lines are logged and dropped.
    pub fn push_line(&mut self, line: &str) -> Result<(), CommandError> {
        match Command::parse(line) {
            Ok(command) => {
                self.push(command);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "dropping input command");
                Err(err)
            }
        }
    }

    /// Remove and return every pending command in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
