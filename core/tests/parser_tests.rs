use ibery::parser::ast::{AnimationSpec, Expr, Program, Stmt, StmtKind};
use ibery::parser::{Parser, parse};

fn parse_ok(source: &str) -> Program {
    parse(source).expect("parse should succeed")
}

#[test]
fn parse_text_statement() {
    let program = parse_ok("text \"hello\";");
    assert_eq!(
        program.body,
        vec![Stmt::new(StmtKind::Text(Expr::StringLiteral("hello".into())), 1)]
    );
}

#[test]
fn text_accepts_an_identifier() {
    let program = parse_ok("text name;");
    assert_eq!(
        program.body[0].kind,
        StmtKind::Text(Expr::Identifier("name".into()))
    );
}

#[test]
fn parse_function_definition_and_call() {
    let program = parse_ok("function greet { text \"hi\"; }\ngreet;");
    assert_eq!(program.body.len(), 2);
    assert_eq!(
        program.body[0].kind,
        StmtKind::FunctionDefinition {
            name: "greet".into(),
            body: Program {
                body: vec![Stmt::new(StmtKind::Text(Expr::StringLiteral("hi".into())), 1)],
            },
        }
    );
    assert_eq!(
        program.body[1],
        Stmt::new(StmtKind::Expression(Expr::Identifier("greet".into())), 2)
    );
}

#[test]
fn empty_function_body() {
    let program = parse_ok("function noop { }");
    let StmtKind::FunctionDefinition { body, .. } = &program.body[0].kind else {
        panic!("expected a function definition");
    };
    assert!(body.body.is_empty());
}

#[test]
fn missing_semicolon_sets_the_error_flag() {
    let mut parser = Parser::new("text \"oops\"");
    let program = parser.parse_program();
    assert!(parser.had_error());
    assert!(program.body.is_empty());

    let err = parser.error().expect("error should be recorded");
    assert_eq!(err.message, "expected ';', found end of input");
    assert!(parse("text \"oops\"").is_err());
}

#[test]
fn animation_defaults_repeat_and_speed_to_one() {
    let program = parse_ok("game { player \"🙂\" \"fly\" 5 }");
    let StmtKind::GameEngine(block) = &program.body[0].kind else {
        panic!("expected a game block");
    };
    assert_eq!(block.expr, Expr::Identifier("player".into()));
    assert_eq!(
        block.animations,
        vec![AnimationSpec {
            emoji: "🙂".into(),
            action: "fly".into(),
            distance: 5,
            repeat: 1,
            speed: 1,
            line: 1,
        }]
    );
}

#[test]
fn animations_take_optional_repeat_and_speed() {
    let program = parse_ok("game {\n  \"scene\"\n  \"🚀\" \"fly\" 10 3 2\n  \"🐢\" \"walk\" 2 4\n}");
    let StmtKind::GameEngine(block) = &program.body[0].kind else {
        panic!("expected a game block");
    };
    assert_eq!(block.expr, Expr::StringLiteral("scene".into()));
    let counts: Vec<(u32, u32, u32, usize)> = block
        .animations
        .iter()
        .map(|a| (a.distance, a.repeat, a.speed, a.line))
        .collect();
    assert_eq!(counts, vec![(10, 3, 2, 3), (2, 4, 1, 4)]);
}

#[test]
fn parse_number_conversion_of_input() {
    let program = parse_ok("age {num} input {\"Age?\"};");
    assert_eq!(
        program.body[0].kind,
        StmtKind::Expression(Expr::NumberConversion {
            target: "age".into(),
            expr: Box::new(Expr::Input {
                prompt: "Age?".into()
            }),
        })
    );
}

#[test]
fn conversion_requires_the_num_keyword() {
    let err = parse("x { text } 5;").unwrap_err();
    assert_eq!(err.message, "expected 'num', found 'text'");
}

#[test]
fn first_error_aborts_the_parse() {
    let mut parser = Parser::new("text \"a\";\ntext;\ntext \"b\";");
    let program = parser.parse_program();
    assert_eq!(program.body.len(), 1);

    let err = parser.error().expect("error should be recorded");
    assert_eq!((err.line, err.column), (2, 5));
}

#[test]
fn lexer_errors_surface_as_syntax_errors() {
    let err = parse("text \"unterminated").unwrap_err();
    assert_eq!(err.message, "unterminated string literal");
    assert_eq!((err.line, err.column), (1, 6));
}

#[test]
fn reserved_keywords_cannot_start_a_statement() {
    let err = parse("if;").unwrap_err();
    assert_eq!(err.message, "expected a statement, found 'if'");
}

#[test]
fn unclosed_function_body_is_an_error() {
    let err = parse("function greet { text \"hi\";").unwrap_err();
    assert_eq!(err.message, "expected '}', found end of input");
}

#[test]
fn empty_source_is_an_empty_program() {
    assert_eq!(parse_ok("  // nothing\n"), Program::default());
}

#[test]
fn node_count_includes_nested_nodes() {
    let program = parse_ok("function f { text \"a\"; } x {num} \"5\";");
    // program, function stmt, body, text stmt, literal, expr stmt, conversion, literal
    assert_eq!(program.node_count(), 8);
}
