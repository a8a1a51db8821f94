use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use ibery::diagnostics::{Fix, SourceMap};
use ibery::errors::{CompileError, IberyError, RuntimeError, SyntaxError};
use ibery::vm::bytecode::format;
use ibery::{Chunk, Engine, Status};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod repl;

/// Exit code when the input file cannot be read.
const EXIT_NO_INPUT: i32 = 66;

#[derive(Parser)]
#[command(
    name = "iberypp",
    version,
    about = "Compiler and bytecode VM for the Ibery++ scripting language"
)]
struct Cli {
    /// Log every executed VM instruction to stderr
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file into a bytecode chunk
    Compile { input: PathBuf, output: PathBuf },
    /// Run a source file or a compiled chunk
    Run {
        input: PathBuf,
        /// Apply suggested source fixes before compiling
        #[arg(long)]
        fix: bool,
        /// Operand stack limit, in values
        #[arg(long)]
        max_stack: Option<usize>,
        /// Call depth limit, in frames
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Print the bytecode listing of a source file or a compiled chunk
    Disassemble { input: PathBuf },
    /// Start an interactive session
    Repl,
}

enum Input {
    Source(String),
    Compiled(Chunk),
}

fn main() {
    let cli = Cli::parse();
    install_tracing(cli.trace);

    let engine = Engine::new().with_trace(cli.trace);
    let code = match cli.command {
        Command::Compile { input, output } => compile(&input, &output),
        Command::Run {
            input,
            fix,
            max_stack,
            max_frames,
        } => {
            let mut engine = engine.with_fixes(fix);
            if let Some(max) = max_stack {
                engine = engine.with_max_stack(max);
            }
            if let Some(max) = max_frames {
                engine = engine.with_max_frames(max);
            }
            run(&input, &engine)
        }
        Command::Disassemble { input } => disassemble(&input),
        Command::Repl => match repl::run(&engine) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{} {err}", "repl error:".red().bold());
                1
            }
        },
    };
    process::exit(code);
}

fn install_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("ibery=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn compile(input: &Path, output: &Path) -> i32 {
    let source = match load(input) {
        Ok(Input::Source(source)) => source,
        Ok(Input::Compiled(_)) => {
            eprintln!(
                "{} '{}' is already a compiled chunk",
                "error:".red().bold(),
                input.display().yellow()
            );
            return 1;
        }
        Err(err) => {
            report_error(&err, None, input);
            return 1;
        }
    };

    let chunk = match ibery::compile_source(&source) {
        Ok(chunk) => chunk,
        Err(err) => {
            report_error(&err.into(), Some(&source), input);
            print_hints(&Engine::new().prepare(&source).fixes);
            return 1;
        }
    };

    if let Err(err) = write_output(&chunk, output) {
        report_error(&err, None, output);
        return 1;
    }
    println!(
        "{} {}",
        "Compiled successfully to".green(),
        output.display().cyan()
    );
    0
}

fn run(input: &Path, engine: &Engine) -> i32 {
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(err) => {
            report_error(&err, None, input);
            return match err {
                IberyError::Io(_) => EXIT_NO_INPUT,
                other => other.status().exit_code(),
            };
        }
    };

    let mut vm = engine.new_vm();
    match loaded {
        Input::Compiled(chunk) => {
            let result = vm.run(chunk).map_err(IberyError::from);
            if let Err(err) = &result {
                report_error(err, None, input);
            }
            Status::of(&result).exit_code()
        }
        Input::Source(source) => {
            let prepared = engine.prepare(&source);
            if prepared.applied {
                for fix in &prepared.fixes {
                    eprintln!("{} {fix}", "applied".yellow().bold());
                }
            }

            let result = vm.interpret(&prepared.source);
            if let Err(err) = &result {
                report_error(err, Some(&prepared.source), input);
                if err.status() == Status::CompileError && !prepared.applied {
                    print_hints(&prepared.fixes);
                }
            }
            Status::of(&result).exit_code()
        }
    }
}

fn disassemble(input: &Path) -> i32 {
    let chunk = match load(input) {
        Ok(Input::Compiled(chunk)) => chunk,
        Ok(Input::Source(source)) => match ibery::compile_source(&source) {
            Ok(chunk) => chunk,
            Err(err) => {
                report_error(&err.into(), Some(&source), input);
                return 1;
            }
        },
        Err(err) => {
            report_error(&err, None, input);
            return 1;
        }
    };
    print!("{}", chunk.disassemble());
    0
}

/// Read `path`, telling compiled chunks apart from source by their magic.
fn load(path: &Path) -> Result<Input, IberyError> {
    let bytes = fs::read(path)?;
    if format::is_compiled(&bytes) {
        return Ok(Input::Compiled(format::from_bytes(&bytes)?));
    }
    String::from_utf8(bytes)
        .map(Input::Source)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}

fn write_output(chunk: &Chunk, path: &Path) -> Result<(), IberyError> {
    let file = fs::File::create(path)?;
    format::write_chunk(chunk, BufWriter::new(file))?;
    Ok(())
}

pub(crate) fn report_error(err: &IberyError, source: Option<&str>, path: &Path) {
    match (err, source) {
        (IberyError::Syntax(err), Some(source))
        | (IberyError::Compile(CompileError::Parse(err)), Some(source)) => {
            eprintln!("{}", format_syntax_error(source, path, err));
        }
        (IberyError::Runtime(err), _) => eprintln!("{}", format_runtime_error(err, source)),
        (IberyError::Io(io_err), _) => eprintln!(
            "{} could not access '{}': {io_err}",
            "error:".red().bold(),
            path.display().yellow()
        ),
        (other, _) => eprintln!("{} {other}", "error:".red().bold()),
    }
}

fn format_syntax_error(source: &str, path: &Path, err: &SyntaxError) -> String {
    let map = SourceMap::from_source(source);
    let (line, column) = error_position(&map, err);
    let mut out = format!(
        "{} at {}:{line}:{column}: {}",
        "syntax error".red().bold(),
        path.display().to_string().cyan(),
        err.message.bright_white()
    );
    if let Some(text) = map.line_text(source, line) {
        let gutter = line.to_string();
        out.push_str(&format!(
            "\n {} {} {text}\n {} {} {}{}",
            gutter.bright_black(),
            "|".bright_black(),
            " ".repeat(gutter.len()),
            "|".bright_black(),
            " ".repeat(column.saturating_sub(1)),
            "^".red().bold()
        ));
    }
    out
}

/// Line and character column of a syntax error. Errors built without a
/// token carry no position, so fall back to the span's byte offset.
fn error_position(map: &SourceMap, err: &SyntaxError) -> (usize, usize) {
    if err.line > 0 {
        (err.line, err.column)
    } else {
        let pos = map.byte_to_pos(err.span.offset());
        (pos.line, pos.col)
    }
}

fn format_runtime_error(err: &RuntimeError, source: Option<&str>) -> String {
    let mut out = format!("{} {err}", "runtime error:".red().bold());
    if let Some(text) = source.and_then(|source| {
        SourceMap::from_source(source)
            .line_text(source, err.line)
            .map(str::trim)
    }) {
        out.push_str(&format!("\n    {}", text.bright_black()));
    }
    if !err.trace.is_empty() {
        out.push('\n');
        out.push_str(err.trace.format_trace().trim_end());
    }
    out
}

fn print_hints(fixes: &[Fix]) {
    if fixes.is_empty() {
        return;
    }
    for fix in fixes {
        eprintln!("{} {fix}", "hint:".cyan().bold());
    }
    if fixes.iter().any(|fix| fix.replacement.is_some()) {
        eprintln!("{}", "rerun with --fix to apply the suggested fixes".bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\u{1b}' {
                for skipped in chars.by_ref() {
                    if skipped == 'm' {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    #[test]
    fn syntax_errors_are_placed_by_character_column() {
        let source = "text \"🎮\" @;\n";
        let err = ibery::parser::parse(source).expect_err("'@' is not a token");
        let map = SourceMap::from_source(source);
        assert_eq!(error_position(&map, &err), (1, 10));

        let report = strip_ansi(&format_syntax_error(source, Path::new("game.ibp"), &err));
        assert!(report.starts_with("syntax error at game.ibp:1:10:"));
        let caret = report.lines().last().expect("caret line");
        assert_eq!(caret, format!("   | {}^", " ".repeat(9)));
    }

    #[test]
    fn positionless_errors_use_the_span_offset() {
        let source = "a\nbc";
        let err = SyntaxError::new("boom", 3, 1);
        assert_eq!(error_position(&SourceMap::from_source(source), &err), (2, 2));
    }
}
