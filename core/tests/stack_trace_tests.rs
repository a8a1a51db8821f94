use ibery::IberyError;
use ibery::vm::machine::{RecordingIntrinsics, Vm};

const NESTED: &str = "function inner {\n  missing;\n}\nfunction outer {\n  inner;\n}\nouter;\n";

#[test]
fn nested_runtime_error_includes_stack_frames() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let err = match vm.interpret(NESTED) {
        Err(IberyError::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };

    assert_eq!(err.line, 2);
    let names: Vec<&str> = err
        .trace
        .frames()
        .iter()
        .map(|frame| frame.function.as_str())
        .collect();
    assert_eq!(names, vec!["<script>", "outer", "inner"]);
    assert_eq!(
        err.trace.format_trace(),
        "    at inner (line 2)\n    at outer (line 5)\n    at <script> (line 7)\n"
    );
}

#[test]
fn top_level_errors_have_a_single_frame() {
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());
    let err = match vm.interpret("text \"ok\";\n\nmissing;\n") {
        Err(IberyError::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };

    assert_eq!(err.line, 3);
    assert_eq!(err.trace.frames().len(), 1);
    assert_eq!(err.trace.format_trace(), "    at <script> (line 3)\n");
}
