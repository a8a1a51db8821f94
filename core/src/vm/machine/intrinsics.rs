//! Host services the VM calls out to: console I/O, the game renderer and
//! the shell.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::process;
use std::thread;
use std::time::Duration;

use crate::vm::bytecode::{Animation, Command, Value};

pub trait Intrinsics {
    /// Write one line of program output.
    fn print(&mut self, text: &str);

    /// Show `prompt` and read one line, without its line terminator.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Open a game scene. `title` is the block's leading expression.
    fn begin_scene(&mut self, title: &Value);

    fn render(&mut self, animation: &Animation);

    /// Run a command line, returning its exit status.
    fn shell(&mut self, command: &Command) -> io::Result<i32>;
}

/// Console-backed intrinsics: stdout, stdin, ANSI animation frames and
/// `sh -c`.
#[derive(Debug, Clone)]
pub struct StdIntrinsics {
    step_delay: Duration,
}

impl Default for StdIntrinsics {
    fn default() -> Self {
        Self::new()
    }
}

impl StdIntrinsics {
    pub fn new() -> Self {
        Self {
            step_delay: Duration::from_secs(1),
        }
    }

    /// Time one animation step takes at speed 1. Speed `n` divides it by `n`.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
    Down,
}

fn direction(action: &str) -> Direction {
    match action {
        "left" | "back" => Direction::Left,
        "down" | "fall" | "drop" => Direction::Down,
        _ => Direction::Right,
    }
}

impl Intrinsics for StdIntrinsics {
    fn print(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{text}");
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        {
            let mut out = io::stdout().lock();
            write!(out, "{prompt} ")?;
            out.flush()?;
        }
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn begin_scene(&mut self, title: &Value) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\x1b[2J\x1b[H== {title} ==");
        let _ = out.flush();
    }

    fn render(&mut self, animation: &Animation) {
        let direction = direction(&animation.action);
        let delay = self.step_delay / animation.speed.max(1);
        let distance = animation.distance as usize;
        let mut out = io::stdout().lock();

        for _ in 0..animation.repeat {
            for step in 0..=distance {
                let _ = match direction {
                    Direction::Right => write!(out, "\r\x1b[K{}{}", " ".repeat(step), animation.emoji),
                    Direction::Left => write!(
                        out,
                        "\r\x1b[K{}{}",
                        " ".repeat(distance - step),
                        animation.emoji
                    ),
                    Direction::Down if step > 0 => write!(out, "\x1b[1A\r\x1b[K\n{}", animation.emoji),
                    Direction::Down => write!(out, "\r\x1b[K{}", animation.emoji),
                };
                let _ = out.flush();
                if step < distance {
                    thread::sleep(delay);
                }
            }
            let _ = writeln!(out);
        }
    }

    fn shell(&mut self, command: &Command) -> io::Result<i32> {
        let status = process::Command::new("sh")
            .arg("-c")
            .arg(&command.line)
            .status()?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// In-memory intrinsics that record every effect. Input lines are served
/// from a queue.
#[derive(Debug, Clone, Default)]
pub struct RecordingIntrinsics {
    pub printed: Vec<String>,
    pub prompts: Vec<String>,
    pub inputs: VecDeque<String>,
    pub scenes: Vec<String>,
    pub animations: Vec<Animation>,
    pub commands: Vec<String>,
}

impl RecordingIntrinsics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            inputs: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Everything printed, one line per `print`.
    pub fn output(&self) -> String {
        self.printed.iter().map(|line| format!("{line}\n")).collect()
    }
}

impl Intrinsics for RecordingIntrinsics {
    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }

    fn begin_scene(&mut self, title: &Value) {
        self.scenes.push(title.to_string());
    }

    fn render(&mut self, animation: &Animation) {
        self.animations.push(animation.clone());
    }

    fn shell(&mut self, command: &Command) -> io::Result<i32> {
        self.commands.push(command.line.clone());
        Ok(0)
    }
}
