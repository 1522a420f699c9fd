#[cfg(test)]
mod tests {
    use crate::error::MenuError;
    use crate::menu::{parse_selection, MenuConfig, MenuEngine};
    use crate::models::{Action, Arguments, ValueKind};
    use crate::terminal::StreamTerminal;
    use anyhow::anyhow;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::rc::Rc;

    type Scripted = StreamTerminal<Cursor<Vec<u8>>, Vec<u8>>;

    const MENU_PROMPT: &str = "Select an option by number: ";
    const FOOTER: &str = "Press Enter to continue...";

    fn scripted(input: &str) -> Scripted {
        StreamTerminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn engine(actions: Vec<Action>, input: &str) -> MenuEngine<Scripted> {
        let config = MenuConfig::new("Test App").with_color(false);
        MenuEngine::with_config(config, actions, scripted(input)).unwrap()
    }

    // Runs a whole session and returns the engine and everything it printed.
    fn run_session(actions: Vec<Action>, input: &str) -> (MenuEngine<Scripted>, String) {
        let mut engine = engine(actions, input);
        engine.run().unwrap();
        let transcript = String::from_utf8_lossy(engine.terminal().output()).into_owned();
        (engine, transcript)
    }

    // An action that counts its invocations and returns nothing.
    fn counted(label: &str) -> (Action, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let action = Action::new(label, move |_| {
            seen.set(seen.get() + 1);
            Ok(Value::Null)
        });
        (action, calls)
    }

    fn returning(label: &str, value: Value) -> Action {
        Action::new(label, move |_| Ok(value.clone()))
    }

    #[rstest]
    #[case("1", Ok(0))]
    #[case(" 3 ", Ok(2))]
    #[case("03", Ok(2))]
    #[case("0", Err(()))]
    #[case("4", Err(()))]
    #[case("", Err(()))]
    #[case("-1", Err(()))]
    #[case("+1", Err(()))]
    #[case("1.0", Err(()))]
    #[case("abc", Err(()))]
    #[case("99999999999999999999999", Err(()))]
    fn test_parse_selection(#[case] input: &str, #[case] expected: Result<usize, ()>) {
        let parsed = parse_selection(input, 3);
        match expected {
            Ok(index) => assert_eq!(parsed.unwrap(), index),
            Err(()) => assert!(matches!(parsed, Err(MenuError::InvalidSelection { .. }))),
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    fn test_menu_has_exit_appended(#[case] count: usize) {
        let actions = (0..count)
            .map(|i| returning(&format!("Action {}", i + 1), Value::Null))
            .collect();
        let exit_choice = format!("{}\n", count + 1);
        let (engine, transcript) = run_session(actions, &exit_choice);

        let labels = engine.labels();
        assert_eq!(labels.len(), count + 1);
        assert_eq!(labels.last(), Some(&"Exit"));
        assert!(transcript.contains(&format!("{}. Exit\n", count + 1)));
        for i in 0..count {
            assert!(transcript.contains(&format!("{}. Action {}\n", i + 1, i + 1)));
        }
    }

    #[test]
    fn test_exit_stops_without_rendering_menu_again() {
        let (engine, transcript) = run_session(Vec::new(), "1\n");

        assert!(!engine.is_running());
        assert!(transcript.contains("Exiting Program!"));
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 1);
        assert!(!transcript.contains(FOOTER));
    }

    #[rstest]
    #[case("abc")]
    #[case("0")]
    #[case("3")]
    #[case("")]
    #[case("1x")]
    fn test_invalid_selection_redisplays_menu(#[case] choice: &str) {
        let (action, calls) = counted("Only");
        let input = format!("{}\n\n2\n", choice);
        let (engine, transcript) = run_session(vec![action], &input);

        assert!(transcript.contains("Invalid selection - please try again."));
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 2);
        assert_eq!(transcript.matches(FOOTER).count(), 1);
        assert_eq!(calls.get(), 0);
        assert_eq!(engine.labels(), vec!["Only", "Exit"]);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn test_cancel_on_any_prompt_skips_invocation(#[case] cancel_at: usize) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let action = Action::new("Three Prompts", move |_| {
            seen.set(seen.get() + 1);
            Ok(Value::Null)
        })
        .prompt("First")
        .prompt("Second")
        .prompt("Third");

        let answers = "answer\n".repeat(cancel_at);
        let input = format!("1\n{}\x1b\n2\n", answers);
        let (engine, transcript) = run_session(vec![action], &input);

        assert_eq!(calls.get(), 0);
        assert!(transcript.contains("Press ESC to cancel and go back . . ."));
        assert!(transcript.contains("Input cancelled."));
        assert!(transcript.contains(FOOTER));
        assert!(!engine.terminal().is_raw());
        // Back at the menu, then Exit.
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_conversion_error_skips_invocation() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let action = Action::new("Square", move |args| {
            seen.set(seen.get() + 1);
            let n = args.i64(0)?;
            Ok(json!(n * n))
        })
        .typed_prompt("n", ValueKind::Integer);

        let (_, transcript) = run_session(vec![action], "1\nabc\n\n2\n");

        assert_eq!(calls.get(), 0);
        assert!(transcript.contains("Invalid input 'abc' - expected integer."));
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 2);
    }

    #[test]
    fn test_arguments_are_static_then_prompted_with_kwargs() {
        let captured: Rc<RefCell<Option<Arguments>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&captured);
        let action = Action::new("Capture", move |args| {
            *sink.borrow_mut() = Some(args.clone());
            Ok(Value::Null)
        })
        .arg("static")
        .kwarg("verbose", true)
        .typed_prompt("Count", ValueKind::Integer)
        .prompt("Name");

        run_session(vec![action], "1\n7\nBob\n\n2\n");

        let args = captured.borrow().clone().expect("action was not invoked");
        assert_eq!(args.positional, vec![json!("static"), json!(7), json!("Bob")]);
        assert_eq!(args.named("verbose"), Some(&json!(true)));
    }

    #[test]
    fn test_scalar_result_is_printed() {
        let greet = Action::new("Greet", |args| {
            Ok(json!(format!("Hello, {}!", args.str(0)?)))
        })
        .prompt("Name");

        let (_, transcript) = run_session(vec![greet], "1\nBob\n\n2\n");
        assert!(transcript.contains("Hello, Bob!\n"));
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(0.0))]
    #[case(json!(false))]
    #[case(json!(""))]
    fn test_falsy_scalar_result_prints_no_data(#[case] value: Value) {
        let (_, transcript) = run_session(vec![returning("Falsy", value)], "1\n\n2\n");
        assert!(transcript.contains("No data to display."));
    }

    #[rstest]
    #[case(json!(1), "1")]
    #[case(json!(true), "true")]
    fn test_truthy_scalar_result_is_printed(#[case] value: Value, #[case] shown: &str) {
        let (_, transcript) = run_session(vec![returning("Truthy", value)], "1\n\n2\n");
        assert!(transcript.contains(&format!("\n{}\n", shown)));
        assert!(!transcript.contains("No data to display."));
    }

    #[test]
    fn test_table_result_is_rendered() {
        let action = returning("Rows", json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}])).table(["a", "b"]);
        let (_, transcript) = run_session(vec![action], "1\n\n2\n");

        let rule = "-".repeat(50);
        let expected = format!(
            "{rule}\n{:<25}{:<25}\n{rule}\n{:<25}{:<25}\n{:<25}{:<25}\n",
            "a",
            "b",
            "1",
            "2",
            "3",
            "4",
            rule = rule
        );
        assert!(transcript.contains(&expected), "transcript:\n{}", transcript);
    }

    #[test]
    fn test_mapping_result_renders_key_value_pairs() {
        let action = returning("Totals", json!({"NL": 12, "DE": 9})).table(["country", "total"]);
        let (_, transcript) = run_session(vec![action], "1\n\n2\n");

        assert!(transcript.contains(&format!("{:<25}{:<25}\n", "NL", "12")));
        assert!(transcript.contains(&format!("{:<25}{:<25}\n", "DE", "9")));
    }

    #[rstest]
    #[case(json!([]))]
    #[case(Value::Null)]
    #[case(json!({}))]
    fn test_empty_table_result_prints_no_data(#[case] value: Value) {
        let action = returning("Empty", value).table(["a", "b", "c"]);
        let (_, transcript) = run_session(vec![action], "1\n\n2\n");

        assert!(transcript.contains("No data to display."));
        assert!(!transcript.contains(&"-".repeat(75)));
    }

    #[test]
    fn test_table_shape_mismatch_is_reported() {
        let action = returning("Narrow", json!([{"a": 1}])).table(["a", "b"]);
        let (_, transcript) = run_session(vec![action], "1\n\n2\n");

        assert!(transcript.contains(
            "Cannot render table: expected 2 columns but the first record has 1 fields."
        ));
        assert!(!transcript.contains(&format!("{:<25}{:<25}\n", "a", "b")));
    }

    #[test]
    fn test_action_error_is_reported_and_loop_continues() {
        let failing = Action::new("Boom", |_| Err(anyhow!("something broke")));
        let (engine, transcript) = run_session(vec![failing], "1\n\n2\n");

        assert!(transcript.contains("Error while executing 'Boom': something broke"));
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_arity_mismatch_is_an_action_error() {
        let strict = Action::new("Strict", |args| {
            args.expect_len(2)?;
            Ok(Value::Null)
        })
        .arg(1);
        let (_, transcript) = run_session(vec![strict], "1\n\n2\n");

        assert!(transcript
            .contains("Error while executing 'Strict': takes 2 positional argument(s) but 1 were given"));
    }

    #[test]
    fn test_panicking_action_is_contained() {
        let panicking = Action::new("Panics", |_| panic!("kaboom"));
        let (_, transcript) = run_session(vec![panicking], "1\n\n2\n");

        assert!(transcript.contains("Error while executing 'Panics': panicked: kaboom"));
        assert!(transcript.contains("Exiting Program!"));
    }

    #[test]
    fn test_crlf_session_matches_lf_session() {
        let greet = || {
            Action::new("Greet", |args| Ok(json!(format!("Hi {}", args.str(0)?)))).prompt("Name")
        };
        let (_, lf) = run_session(vec![greet()], "1\nBob\n\n2\n");
        let (_, crlf) = run_session(vec![greet()], "1\r\nBob\r\n\r\n2\r\n");
        let (_, cr) = run_session(vec![greet()], "1\rBob\r\r2\r");

        assert!(lf.contains("Hi Bob\n"));
        assert_eq!(lf, crlf);
        assert_eq!(lf, cr);
    }

    #[test]
    fn test_sessions_are_deterministic() {
        let build = || {
            vec![
                returning("Rows", json!([["x", 1], ["y", 2]])).table(["name", "n"]),
                Action::new("Fail", |_| Err(anyhow!("nope"))),
            ]
        };
        let input = "1\n\n9\n\n2\n\n3\n";
        let (_, first) = run_session(build(), input);
        let (_, second) = run_session(build(), input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_end_of_input_stops_session() {
        let (engine, transcript) = run_session(Vec::new(), "");
        assert!(!engine.is_running());
        assert_eq!(transcript.matches(MENU_PROMPT).count(), 1);
    }

    #[test]
    fn test_interrupt_during_prompt_stops_session() {
        let (action, calls) = counted("Ask");
        let action = action.prompt("Value");
        let (engine, transcript) = run_session(vec![action], "1\n\x03");

        assert_eq!(calls.get(), 0);
        assert!(!engine.is_running());
        assert!(!engine.terminal().is_raw());
        assert!(transcript.contains("Interrupted."));
    }

    #[test]
    fn test_invalid_action_rejected_at_construction() {
        let bad = returning("Table", json!([])).table(Vec::<String>::new());
        let config = MenuConfig::default().with_color(false);
        let result = MenuEngine::with_config(config, vec![bad], scripted(""));
        assert!(matches!(result, Err(MenuError::InvalidAction(_))));
    }

    #[test]
    fn test_header_frames_title_and_subtitle() {
        let config = MenuConfig::new("Demo").with_subtitle("Start").with_color(false);
        let mut engine = MenuEngine::with_config(config, Vec::new(), scripted("1\n")).unwrap();
        engine.run().unwrap();
        let transcript = String::from_utf8_lossy(engine.terminal().output()).into_owned();

        let rule = "=".repeat(50);
        let expected = format!("{rule}\n{:^50}\nStart\n{rule}\n\n1. Exit\n", "Demo", rule = rule);
        assert!(transcript.starts_with(&expected), "transcript:\n{}", transcript);
    }
}
