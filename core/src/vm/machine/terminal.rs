//! Terminal passthrough for interactive sessions. `cd`, `pwd` and `ls` run
//! in-process; any other line goes to the shell intrinsic.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::{Intrinsics, Vm};
use crate::vm::bytecode::Command;

impl<I: Intrinsics> Vm<I> {
    /// Run one terminal line and return its exit status. Built-ins report 0
    /// or an I/O error; shell commands report the shell's status.
    pub fn run_terminal_command(&mut self, line: &str) -> io::Result<i32> {
        let line = line.trim();
        let (program, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match (program, rest) {
            ("", _) => Ok(0),
            ("cd", path) => {
                let target: PathBuf = if path.is_empty() {
                    env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from)
                } else {
                    PathBuf::from(path)
                };
                env::set_current_dir(&target)?;
                tracing::debug!(dir = %target.display(), "changed directory");
                Ok(0)
            }
            ("pwd", "") => {
                let dir = env::current_dir()?;
                self.intrinsics.print(&dir.display().to_string());
                Ok(0)
            }
            ("ls", "") => {
                let mut names = Vec::new();
                for entry in fs::read_dir(env::current_dir()?)? {
                    let name = entry?.file_name().to_string_lossy().into_owned();
                    if !name.starts_with('.') {
                        names.push(name);
                    }
                }
                names.sort();
                for name in &names {
                    self.intrinsics.print(name);
                }
                Ok(0)
            }
            _ => self.intrinsics.shell(&Command {
                line: line.to_string(),
            }),
        }
    }
}
