use interpreter::run_source;
use itertools::Itertools;
use lazy_regex::regex;
use test_suite_proc_macro::generate_tests;

use pretty_assertions::assert_eq;

/// Runs a `.lox` fixture and checks it against its annotations:
///
/// - `// expect: <value>` the expression evaluates to `<value>`
/// - `// Error<where>: <message>` a diagnostic is reported on this line
pub fn lox_expect(code: &str) {
    let mut expected_errors = vec![];
    let mut expected_value = None;

    let error_regex = regex!(r"// (Error( at '.*')?: .*)");
    let value_regex = regex!(r"// expect: (.*)");

    for (i, line) in code.lines().enumerate() {
        if let Some(cap) = error_regex.captures(line) {
            expected_errors.push(format!("[line {}] {}", i + 1, &cap[1]));
        } else if let Some(cap) = value_regex.captures(line) {
            assert!(expected_value.is_none(), "Only one expected value per test");
            expected_value = Some(cap[1].to_string());
        }
    }

    assert!(
        expected_errors.is_empty() != expected_value.is_none(),
        "A test expects either a value or errors"
    );

    match run_source(code) {
        Ok(value) => {
            assert!(expected_errors.is_empty(), "Expected errors but got value {value}");
            assert_eq!(Some(value.to_string()), expected_value);
        }
        Err(diagnostics) => {
            assert!(expected_value.is_none(), "Expected a value but got\n{diagnostics}");
            assert_eq!(diagnostics.iter().map(|d| d.to_string()).collect_vec(), expected_errors);
        }
    }
}

generate_tests!();
