use std::env;
use std::path::Path;

use ibery::vm::machine::{RecordingIntrinsics, Vm};

// One test owns the process working directory for this whole file.
#[test]
fn terminal_builtins_and_shell_passthrough() {
    let original = env::current_dir().unwrap();
    let tests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests");
    let mut vm = Vm::with_intrinsics(RecordingIntrinsics::new());

    let cd = format!("cd {}", tests_dir.display());
    assert_eq!(vm.run_terminal_command(&cd).unwrap(), 0);
    assert_eq!(
        env::current_dir().unwrap().canonicalize().unwrap(),
        tests_dir.canonicalize().unwrap()
    );

    assert_eq!(vm.run_terminal_command("pwd").unwrap(), 0);
    let printed = Path::new(&vm.intrinsics().printed[0]).canonicalize().unwrap();
    assert_eq!(printed, tests_dir.canonicalize().unwrap());

    vm.intrinsics_mut().printed.clear();
    assert_eq!(vm.run_terminal_command("ls").unwrap(), 0);
    let listed = vm.intrinsics().printed.clone();
    assert!(listed.iter().any(|name| name == "terminal_tests.rs"));
    assert!(listed.iter().all(|name| !name.starts_with('.')));
    let mut sorted = listed.clone();
    sorted.sort();
    assert_eq!(listed, sorted);

    assert!(vm.run_terminal_command("cd no-such-directory-here").is_err());
    assert_eq!(
        env::current_dir().unwrap().canonicalize().unwrap(),
        tests_dir.canonicalize().unwrap()
    );

    assert_eq!(vm.run_terminal_command("  echo hi  ").unwrap(), 0);
    assert_eq!(vm.run_terminal_command("").unwrap(), 0);
    assert_eq!(vm.intrinsics().commands, vec!["echo hi"]);

    env::set_current_dir(original).unwrap();
}
