mod completer;
mod helper;
mod highlighter;
mod hinter;

use std::fs;
use std::path::Path;

use ibery::vm::machine::StdIntrinsics;
use ibery::{Engine, Vm};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};

use self::helper::ReplHelper;

pub fn run(engine: &Engine) -> Result<(), ReadlineError> {
    let config = Config::builder()
        .history_ignore_dups(true)?
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(ReplHelper::default()));

    let mut vm = engine.new_vm();

    println!(
        "{} {}",
        "Ibery++".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "Type .help for REPL commands".bright_black());

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match handle_command(trimmed, &mut vm) {
                    Command::Exit => break,
                    Command::Handled => {}
                    Command::Snippet => run_snippet(&mut vm, trimmed, Path::new("<repl>")),
                }

                if let Some(helper) = rl.helper_mut() {
                    helper.names = vm.globals().iter().map(|(name, _)| name.to_string()).collect();
                    helper.names.sort();
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "bye".bright_black());
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

enum Command {
    Exit,
    Handled,
    Snippet,
}

fn handle_command(trimmed: &str, vm: &mut Vm<StdIntrinsics>) -> Command {
    match trimmed {
        ".exit" | "exit" => return Command::Exit,
        ".help" => {
            println!("{}", ".help                show commands".bright_blue());
            println!("{}", ".clear               forget all globals".bright_blue());
            println!("{}", ".load <file.ibp>     load and run a script".bright_blue());
            println!("{}", ".sh <cmd>, !<cmd>    run a terminal command".bright_blue());
            println!("{}", ".exit                leave the REPL".bright_blue());
            return Command::Handled;
        }
        ".clear" => {
            vm.reset();
            println!("{}", "globals cleared".green());
            return Command::Handled;
        }
        _ => {}
    }

    if let Some(line) = trimmed.strip_prefix(".sh ").or_else(|| trimmed.strip_prefix('!')) {
        run_terminal(vm, line);
        return Command::Handled;
    }

    if let Some(path) = trimmed.strip_prefix(".load ") {
        let path = Path::new(path.trim());
        match fs::read_to_string(path) {
            Ok(source) => run_snippet(vm, &source, path),
            Err(err) => eprintln!("{} {err}", "load error:".red().bold()),
        }
        return Command::Handled;
    }
    Command::Snippet
}

fn run_snippet(vm: &mut Vm<StdIntrinsics>, source: &str, origin: &Path) {
    if let Err(err) = vm.interpret(source) {
        crate::report_error(&err, Some(source), origin);
    }
}

fn run_terminal(vm: &mut Vm<StdIntrinsics>, line: &str) {
    match vm.run_terminal_command(line) {
        Ok(0) => {}
        Ok(status) => eprintln!("{} exit code {status}", "command failed:".red().bold()),
        Err(err) => eprintln!("{} {err}", "terminal error:".red().bold()),
    }
}

/// Whether `source` leaves a brace block or a string open. REPL commands and
/// terminal lines are always complete.
pub fn needs_more_input(source: &str) -> bool {
    if source.trim_start().starts_with(['.', '!']) {
        return false;
    }

    let mut braces = 0i32;
    let mut in_string = false;
    let mut in_comment = false;
    let mut prev = '\0';

    for ch in source.chars() {
        if in_comment {
            in_comment = ch != '\n';
        } else if in_string {
            in_string = ch != '"';
        } else {
            match ch {
                '"' => in_string = true,
                '/' if prev == '/' => in_comment = true,
                '{' => braces += 1,
                '}' => braces -= 1,
                _ => {}
            }
        }
        prev = ch;
    }

    in_string || braces > 0
}

#[cfg(test)]
mod tests {
    use super::needs_more_input;

    #[test]
    fn open_blocks_and_strings_continue() {
        assert!(needs_more_input("function greet {"));
        assert!(needs_more_input("text \"multi"));
        assert!(!needs_more_input("function greet { text \"hi\"; }"));
        assert!(!needs_more_input("text \"{\";"));
        assert!(!needs_more_input("// {"));
        assert!(!needs_more_input("!echo \"unbalanced"));
        assert!(!needs_more_input(".sh awk '{print}'"));
    }
}
