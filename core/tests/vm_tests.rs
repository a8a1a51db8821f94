use ibery::errors::{IberyError, RuntimeError, RuntimeErrorKind};
use ibery::vm::bytecode::{Animation, Chunk, Opcode, Value};
use ibery::vm::machine::{RecordingIntrinsics, Vm, VmConfig, VmState};
use ibery::Status;

fn run_recorded(source: &str) -> (Result<(), IberyError>, RecordingIntrinsics) {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let result = vm.interpret(source);
    (result, vm.intrinsics().clone())
}

fn runtime_error(result: Result<(), IberyError>) -> RuntimeError {
    match result {
        Err(IberyError::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

fn chunk(instructions: Vec<Opcode>, constants: Vec<Value>) -> Chunk {
    let mut chunk = Chunk::new("<test>");
    for op in instructions {
        chunk.write(op, 1);
    }
    chunk.constants = constants;
    chunk
}

fn run_chunk(chunk: Chunk) -> (Result<(), RuntimeError>, Vec<String>) {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let result = vm.run(chunk);
    (result, vm.intrinsics().printed.clone())
}

#[test]
fn hello_world() {
    let (result, io) = run_recorded("text \"hello\";");
    assert!(result.is_ok());
    assert_eq!(io.output(), "hello\n");
}

#[test]
fn function_call_runs_its_body() {
    let (result, io) = run_recorded("function greet { text \"hi\"; }\ngreet;\ngreet;");
    assert!(result.is_ok());
    assert_eq!(io.printed, vec!["hi", "hi"]);
}

#[test]
fn definition_alone_prints_nothing() {
    let (result, io) = run_recorded("function greet { text \"hi\"; }");
    assert!(result.is_ok());
    assert!(io.printed.is_empty());
}

#[test]
fn parse_failure_reports_compile_status_without_output() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let result = vm.interpret("text \"oops\"");
    assert_eq!(Status::of(&result), Status::CompileError);
    assert_eq!(Status::of(&result).exit_code(), 65);
    assert_eq!(vm.state(), VmState::Halted(Status::CompileError));
    assert!(vm.intrinsics().printed.is_empty());
}

#[test]
fn calling_an_undefined_name_is_a_runtime_error() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let result = vm.interpret("text \"before\";\nmissing;");
    assert_eq!(Status::of(&result).exit_code(), 70);
    assert_eq!(vm.state(), VmState::Halted(Status::RuntimeError));
    assert_eq!(vm.intrinsics().printed, vec!["before"]);

    let err = runtime_error(result);
    assert_eq!(
        err.kind,
        RuntimeErrorKind::UndefinedVariable {
            name: "missing".into()
        }
    );
    assert_eq!(err.line, 2);
    assert_eq!(err.to_string(), "[line 2] undefined variable 'missing'");
}

#[test]
fn adding_a_number_and_a_string_is_a_type_mismatch() {
    let mut chunk = Chunk::new("<test>");
    chunk.constants = vec![Value::Number(1.0), Value::String("a".into())];
    for op in [Opcode::Constant(0), Opcode::Constant(1), Opcode::Add, Opcode::Return] {
        chunk.write(op, 7);
    }

    let (result, _) = run_chunk(chunk);
    let err = result.unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::OperandTypeMismatch {
            op: "+",
            expected: "two numbers",
            found: "string",
        }
    );
    assert_eq!(err.line, 7);
}

#[test]
fn arithmetic_on_numbers() {
    let program = chunk(
        vec![
            Opcode::Constant(0),
            Opcode::Constant(1),
            Opcode::Constant(2),
            Opcode::Multiply,
            Opcode::Add,
            Opcode::Print,
            Opcode::Constant(1),
            Opcode::Constant(0),
            Opcode::Divide,
            Opcode::Negate,
            Opcode::Print,
            Opcode::Null,
            Opcode::Return,
        ],
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
    );
    let (result, printed) = run_chunk(program);
    assert!(result.is_ok());
    assert_eq!(printed, vec!["7", "-2"]);
}

#[test]
fn comparisons_equality_and_not() {
    let program = chunk(
        vec![
            Opcode::Constant(0),
            Opcode::Constant(1),
            Opcode::Less,
            Opcode::Print,
            Opcode::Constant(0),
            Opcode::Constant(1),
            Opcode::Greater,
            Opcode::Print,
            Opcode::Constant(2),
            Opcode::Constant(3),
            Opcode::Equal,
            Opcode::Print,
            Opcode::Null,
            Opcode::Not,
            Opcode::Print,
            Opcode::Null,
            Opcode::Return,
        ],
        vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::String("a".into()),
            Value::String("a".into()),
        ],
    );
    let (result, printed) = run_chunk(program);
    assert!(result.is_ok());
    assert_eq!(printed, vec!["true", "false", "true", "true"]);
}

#[test]
fn negating_a_string_is_a_type_mismatch() {
    let program = chunk(
        vec![Opcode::Constant(0), Opcode::Negate, Opcode::Return],
        vec![Value::String("a".into())],
    );
    let err = run_chunk(program).0.unwrap_err();
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::OperandTypeMismatch { op: "negate", .. }
    ));
}

#[test]
fn countdown_loop_with_jumps() {
    // n = 3; while (n > 0) { print n; n = n - 1; }
    let program = chunk(
        vec![
            Opcode::Constant(0),
            Opcode::DefineGlobal(1),
            Opcode::GetGlobal(1),
            Opcode::Constant(2),
            Opcode::Greater,
            Opcode::JumpIfFalse(9),
            Opcode::Pop,
            Opcode::GetGlobal(1),
            Opcode::Print,
            Opcode::GetGlobal(1),
            Opcode::Constant(3),
            Opcode::Subtract,
            Opcode::SetGlobal(1),
            Opcode::Pop,
            Opcode::Loop(13),
            Opcode::Pop,
            Opcode::Null,
            Opcode::Return,
        ],
        vec![
            Value::Number(3.0),
            Value::String("n".into()),
            Value::Number(0.0),
            Value::Number(1.0),
        ],
    );
    let (result, printed) = run_chunk(program);
    assert!(result.is_ok());
    assert_eq!(printed, vec!["3", "2", "1"]);
}

#[test]
fn forward_jump_skips_code() {
    let program = chunk(
        vec![
            Opcode::Jump(2),
            Opcode::Constant(0),
            Opcode::Print,
            Opcode::Constant(1),
            Opcode::Print,
            Opcode::Null,
            Opcode::Return,
        ],
        vec![Value::String("skipped".into()), Value::String("shown".into())],
    );
    let (result, printed) = run_chunk(program);
    assert!(result.is_ok());
    assert_eq!(printed, vec!["shown"]);
}

#[test]
fn locals_are_read_and_written_by_slot() {
    let program = chunk(
        vec![
            Opcode::Constant(0),
            Opcode::Constant(1),
            Opcode::SetLocal(0),
            Opcode::Pop,
            Opcode::GetLocal(0),
            Opcode::Print,
            Opcode::Null,
            Opcode::Return,
        ],
        vec![Value::Number(5.0), Value::Number(9.0)],
    );
    let (result, printed) = run_chunk(program);
    assert!(result.is_ok());
    assert_eq!(printed, vec!["9"]);
}

#[test]
fn setting_an_unknown_global_is_an_error() {
    let program = chunk(
        vec![Opcode::Null, Opcode::SetGlobal(0), Opcode::Return],
        vec![Value::String("ghost".into())],
    );
    let err = run_chunk(program).0.unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::UndefinedVariable {
            name: "ghost".into()
        }
    );
}

#[test]
fn popping_an_empty_stack_underflows() {
    let program = chunk(vec![Opcode::Pop, Opcode::Pop, Opcode::Return], vec![]);
    let err = run_chunk(program).0.unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::StackUnderflow);
}

#[test]
fn operand_stack_limit_is_enforced() {
    let config = VmConfig::default().with_max_stack(2);
    let mut vm = Vm::with_config(config, RecordingIntrinsics::new());
    let err = vm
        .run(chunk(vec![Opcode::Null, Opcode::Null, Opcode::Return], vec![]))
        .unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::StackOverflow { limit: 2 });
}

#[test]
fn capped_recursion_overflows_the_call_stack() {
    let config = VmConfig::default().with_max_frames(8);
    let mut vm = Vm::with_config(config, RecordingIntrinsics::new());
    let err = runtime_error(vm.interpret("function f {\n  f;\n}\nf;"));

    assert_eq!(err.kind, RuntimeErrorKind::FrameOverflow { limit: 8 });
    assert_eq!(err.line, 2);
    let frames = err.trace.frames();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0].function, "<script>");
    assert_eq!(frames[0].line, 4);
    assert!(frames[1..].iter().all(|frame| frame.function == "f"));
    assert!(err.trace.format_trace().starts_with("    at f (line 2)\n"));
}

#[test]
fn deep_terminating_call_chain_runs_to_completion() {
    let depth = 1_100;
    let mut source = String::new();
    for i in 0..depth {
        source.push_str(&format!("function f{i} {{ f{}; }}\n", i + 1));
    }
    source.push_str(&format!("function f{depth} {{ text \"deep\"; }}\nf0;\n"));

    let (result, intrinsics) = run_recorded(&source);
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(intrinsics.printed, vec!["deep"]);
}

#[test]
fn uncapped_recursion_is_stopped_by_the_operand_stack() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let err = runtime_error(vm.interpret("function f {\n  f;\n}\nf;"));
    assert_eq!(err.kind, RuntimeErrorKind::StackOverflow { limit: 65_536 });
    assert_eq!(err.line, 2);
}

#[test]
fn input_is_converted_to_a_number() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::with_inputs(["42"]));
    let result = vm.interpret("age {num} input {\"Age?\"};\ntext age;");
    assert!(result.is_ok());
    assert_eq!(vm.intrinsics().prompts, vec!["Age?"]);
    assert_eq!(vm.intrinsics().printed, vec!["42"]);
    assert_eq!(vm.global("age"), Some(&Value::Number(42.0)));
}

#[test]
fn non_numeric_input_converts_to_zero() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::with_inputs(["twelve"]));
    vm.interpret("age {num} input {\"Age?\"};").unwrap();
    assert_eq!(vm.global("age"), Some(&Value::Number(0.0)));
}

#[test]
fn exhausted_input_is_an_intrinsic_failure() {
    let (result, _) = run_recorded("name {num} input {\"Name?\"};");
    let err = runtime_error(result);
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::Intrinsic {
            intrinsic: "input",
            ..
        }
    ));
}

#[test]
fn game_block_opens_a_scene_and_renders_animations() {
    let (result, io) = run_recorded("game { \"intro\" \"🙂\" \"fly\" 5 \"🐢\" \"walk\" 2 3 4 }");
    assert!(result.is_ok());
    assert_eq!(io.scenes, vec!["intro"]);
    assert_eq!(
        io.animations,
        vec![
            Animation {
                emoji: "🙂".into(),
                action: "fly".into(),
                distance: 5,
                repeat: 1,
                speed: 1,
            },
            Animation {
                emoji: "🐢".into(),
                action: "walk".into(),
                distance: 2,
                repeat: 3,
                speed: 4,
            },
        ]
    );
}

#[test]
fn invoking_a_command_global_runs_the_shell() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    vm.define_global("list", Value::command("ls -la"));
    vm.interpret("list;").unwrap();
    assert_eq!(vm.intrinsics().commands, vec!["ls -la"]);
}

#[test]
fn invoking_a_number_is_not_callable() {
    let (result, _) = run_recorded("age {num} \"5\";\nage;");
    let err = runtime_error(result);
    assert_eq!(
        err.kind,
        RuntimeErrorKind::NotCallable {
            type_name: "number"
        }
    );
}

#[test]
fn globals_persist_across_runs_until_reset() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    vm.interpret("function greet { text \"hi\"; }").unwrap();
    vm.interpret("greet;").unwrap();
    assert_eq!(vm.intrinsics().printed, vec!["hi"]);
    assert_eq!(vm.globals().len(), 1);

    vm.reset();
    assert_eq!(vm.state(), VmState::Ready);
    assert!(vm.global("greet").is_none());
    assert!(vm.interpret("greet;").is_err());
}

#[test]
fn exit_codes() {
    assert_eq!(Status::Ok.exit_code(), 0);
    assert_eq!(Status::CompileError.exit_code(), 65);
    assert_eq!(Status::RuntimeError.exit_code(), 70);
}
