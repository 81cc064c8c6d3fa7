//! Module body execution.
//!
//! Executes the statement subset that module bodies are made of: constant
//! bindings (`NAME = <literal>`), `pass`, comments and a leading docstring.
//! Literals are `None`, `True`, `False`, integers (with `_` separators) and
//! single- or double-quoted strings.
//!
//! Statements execute top to bottom against the module namespace, so a
//! failing line leaves the bindings of earlier lines in place.

use crate::error::{ImportError, ImportResult};
use crate::module_object::ModuleObject;
use crate::value::Value;
use std::path::Path;
use std::sync::Arc;

/// Names that cannot be assignment targets.
const RESERVED: &[&str] = &["None", "True", "False", "pass", "import", "from", "def", "class"];

#[derive(Debug, PartialEq)]
enum Statement<'a> {
    Pass,
    Assign(&'a str, Value),
    Expr(Value),
}

/// Execute `source` in the namespace of `module`.
///
/// `path` is only used for error locations.
pub fn execute_source(module: &ModuleObject, source: &str, path: &Path) -> ImportResult<()> {
    let mut first_statement = true;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let syntax_error = |message: String| ImportError::Syntax {
            module: Arc::from(module.name()),
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        if raw.starts_with([' ', '\t']) {
            return Err(syntax_error("unexpected indent".to_string()));
        }

        match parse_statement(line).map_err(syntax_error)? {
            Statement::Pass => {}
            Statement::Assign(name, value) => module.set_attr(name, value),
            Statement::Expr(value) => {
                if first_statement && matches!(value, Value::Str(_)) {
                    module.set_attr("__doc__", value);
                }
            }
        }
        first_statement = false;
    }

    Ok(())
}

fn parse_statement(line: &str) -> Result<Statement<'_>, String> {
    let ident_len = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let (head, rest) = line.split_at(ident_len);
    let rest = rest.trim_start();

    if head == "pass" && (rest.is_empty() || rest.starts_with('#')) {
        return Ok(Statement::Pass);
    }

    if is_identifier(head) && rest.starts_with('=') && !rest.starts_with("==") {
        if RESERVED.contains(&head) {
            return Err(format!("cannot assign to {}", head));
        }
        let value = parse_expression(rest[1..].trim_start())?;
        return Ok(Statement::Assign(head, value));
    }

    parse_expression(line).map(Statement::Expr)
}

fn parse_expression(text: &str) -> Result<Value, String> {
    let (value, rest) = parse_literal(text)?;
    let rest = rest.trim_start();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(value)
    } else {
        Err(format!("invalid syntax near '{}'", rest))
    }
}

fn parse_literal(text: &str) -> Result<(Value, &str), String> {
    match text.chars().next() {
        None => return Err("expected an expression".to_string()),
        Some(quote @ ('\'' | '"')) => return parse_string(text, quote),
        Some(_) => {}
    }

    let end = text
        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .unwrap_or(text.len());
    let (word, rest) = text.split_at(end);

    let value = match word {
        "None" => Value::None,
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        _ => parse_int(word)
            .map(Value::Int)
            .ok_or_else(|| format!("invalid syntax near '{}'", text))?,
    };
    Ok((value, rest))
}

fn parse_int(word: &str) -> Option<i64> {
    let digits = word.strip_prefix(['+', '-']).unwrap_or(word);
    if digits.is_empty()
        || !digits.starts_with(|c: char| c.is_ascii_digit())
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    word.replace('_', "").parse().ok()
}

fn parse_string(text: &str, quote: char) -> Result<(Value, &str), String> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, e @ ('\\' | '\'' | '"'))) => out.push(e),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            c if c == quote => {
                return Ok((Value::string(out), &text[i + c.len_utf8()..]));
            }
            c => out.push(c),
        }
    }

    Err("EOL while scanning string literal".to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> ImportResult<ModuleObject> {
        let module = ModuleObject::new("m");
        execute_source(&module, source, Path::new("m.py"))?;
        Ok(module)
    }

    #[test]
    fn test_constant_bindings() {
        let module = run("A = 1\nNAME = 'alpha'\nFLAG = True\nNOTHING = None\n").unwrap();
        assert_eq!(module.get_attr("A"), Some(Value::int(1)));
        assert_eq!(module.get_attr("NAME"), Some(Value::string("alpha")));
        assert_eq!(module.get_attr("FLAG"), Some(Value::bool(true)));
        assert_eq!(module.get_attr("NOTHING"), Some(Value::none()));
    }

    #[test]
    fn test_comments_blank_lines_and_pass() {
        let module = run("# header\n\npass\nX = -42  # trailing\n").unwrap();
        assert_eq!(module.get_attr("X"), Some(Value::int(-42)));
    }

    #[test]
    fn test_rebinding_keeps_last_value() {
        let module = run("X = 1\nX = 2\n").unwrap();
        assert_eq!(module.get_attr("X"), Some(Value::int(2)));
    }

    #[test]
    fn test_leading_docstring() {
        let module = run("\"Package docs.\"\nX = 1\n'not a docstring'\n").unwrap();
        assert_eq!(module.get_attr("__doc__"), Some(Value::string("Package docs.")));
    }

    #[test]
    fn test_string_escapes() {
        let module = run(r#"S = "a\"b\n" "#).unwrap();
        assert_eq!(module.get_attr("S"), Some(Value::string("a\"b\n")));
    }

    #[test]
    fn test_integer_separators() {
        let module = run("BIG = 1_000_000\n").unwrap();
        assert_eq!(module.get_attr("BIG"), Some(Value::int(1_000_000)));
        assert!(run("BAD = 1__0\n").is_err());
        assert!(run("BAD = 10_\n").is_err());
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = run("A = 1\nthis is not python\n").unwrap_err();
        match err {
            ImportError::Syntax { line, module, .. } => {
                assert_eq!(line, 2);
                assert_eq!(&*module, "m");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            run("S = 'open\n"),
            Err(ImportError::Syntax { .. })
        ));
    }

    #[test]
    fn test_reserved_target() {
        assert!(run("True = 1\n").is_err());
    }

    #[test]
    fn test_unexpected_indent() {
        assert!(run("A = 1\n    B = 2\n").is_err());
    }

    #[test]
    fn test_partial_execution_on_error() {
        let module = ModuleObject::new("m");
        let result = execute_source(&module, "A = 1\n?\nB = 2\n", Path::new("m.py"));
        assert!(result.is_err());
        assert!(module.has_attr("A"));
        assert!(!module.has_attr("B"));
    }
}
