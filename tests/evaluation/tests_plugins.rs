//! Plugin functions called from expressions.

use fieldexpr::{
    ArgumentReader, Driver, ErrorCode, EvalError, Kind, Location, PluginError, PluginFunction,
    PluginRegistry, TextSize, TypedField, ValueType,
};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars};
use crate::helpers::fixtures::standard_database;

/// `poly(x, c0, c1, ...)`: `c0 + c1*x + c2*x^2 + ...` over a volume scalar.
struct Poly;

impl PluginFunction for Poly {
    fn name(&self) -> &str {
        "poly"
    }

    fn description(&self) -> &str {
        "polynomial with literal coefficients"
    }

    fn evaluate(
        &self,
        text: &str,
        driver: &mut Driver<'_>,
    ) -> Result<(TypedField, usize), PluginError> {
        let mut args = ArgumentReader::new(text);
        args.open()?;
        let x = args.expression(driver, Some(ValueType::volume(Kind::Scalar)))?;
        let mut coefficients = Vec::new();
        while !args.at_close() {
            args.separator()?;
            coefficients.push(args.scalar()?);
        }
        args.close()?;
        let values = x
            .scalar_values()
            .unwrap_or_default()
            .iter()
            .map(|v| coefficients.iter().rev().fold(0.0, |acc, c| acc * v + c))
            .collect();
        Ok((TypedField::scalar(Location::Volume, values), args.consumed()))
    }
}

/// `answer()`: an empty argument list.
struct Answer;

impl PluginFunction for Answer {
    fn name(&self) -> &str {
        "answer"
    }

    fn description(&self) -> &str {
        "the constant 42"
    }

    fn evaluate(&self, text: &str, _: &mut Driver<'_>) -> Result<(TypedField, usize), PluginError> {
        let mut args = ArgumentReader::new(text);
        args.open()?;
        args.close()?;
        Ok((TypedField::constant_scalar(42.0), args.consumed()))
    }
}

/// Claims more text than it was given.
struct Greedy;

impl PluginFunction for Greedy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn description(&self) -> &str {
        "misreports its consumption"
    }

    fn evaluate(&self, text: &str, _: &mut Driver<'_>) -> Result<(TypedField, usize), PluginError> {
        Ok((TypedField::constant_scalar(1.0), text.len() + 1))
    }
}

/// Stands in for a builtin name.
struct Shadow(&'static str);

impl PluginFunction for Shadow {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "never reached"
    }

    fn evaluate(&self, _: &str, _: &mut Driver<'_>) -> Result<(TypedField, usize), PluginError> {
        Err(PluginError::Failed("shadowed plugin was called".to_string()))
    }
}

fn evaluate(expression: &str) -> Result<TypedField, EvalError> {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver.register_plugin(Poly);
    driver.register_plugin(Answer);
    driver.register_plugin(Greedy);
    driver.parse(expression).cloned()
}

/// The innermost syntax error behind nested plugin argument failures.
fn innermost(err: &EvalError) -> &EvalError {
    match err {
        EvalError::Plugin {
            source: PluginError::Argument { source, .. },
            ..
        } => innermost(source),
        other => other,
    }
}

#[rstest]
#[case("clamp(p, 0, 2)", &[1.0, 2.0, 2.0])]
#[case("2*clamp(p,0,2)+1", &[3.0, 5.0, 5.0])]
#[case("clamp(q, -1, pi)", &[std::f64::consts::PI, 0.5, -1.0])]
#[case("clamp(5, 0, 2)", &[2.0, 2.0, 2.0])]
#[case("clamp(clamp(p, 0, 2), 1.5, 5)", &[1.5, 2.0, 2.0])]
#[case("inRange(p, 1.5, 3) ? 1 : 0", &[0.0, 1.0, 1.0])]
#[case("clamp(p, 0, 2) > 1 ? q : -q", &[-4.0, 0.5, -2.0])]
#[case("poly(p, 1, 0, 2)", &[3.0, 9.0, 19.0])]
#[case("poly(2, 1, 1)", &[3.0, 3.0, 3.0])]
#[case("poly(p) + 1", &[1.0, 1.0, 1.0])]
#[case("answer() + p", &[43.0, 44.0, 45.0])]
#[case("p*answer( )", &[42.0, 84.0, 126.0])]
fn test_plugin_values(#[case] expression: &str, #[case] expected: &[f64]) {
    let value = evaluate(expression).unwrap_or_else(|e| panic!("{}: {}", expression, e));
    assert_close(&scalars(&value), expected);
}

#[test]
fn test_in_range_is_logical() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let mask = driver
        .parse_logical("inRange(q, 0, 5)", Location::Volume)
        .unwrap();
    assert_eq!(mask.truth_values(), Some(vec![true, true, false]));
}

#[test]
fn test_argument_error_offsets_are_absolute() {
    let err = evaluate("1 + clamp(p + U, 0, 1)").unwrap_err();
    let EvalError::Plugin {
        ref name,
        source: PluginError::Argument { offset, .. },
    } = err
    else {
        panic!("expected an argument failure, got {:?}", err);
    };
    assert_eq!(name, "clamp");
    assert_eq!(offset, 1);
    let syntax = innermost(&err).syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0403);
    assert_eq!(syntax.range.start(), TextSize::from(12));
}

#[test]
fn test_nested_plugin_error_offsets() {
    let err = evaluate("clamp(clamp(p + U, 0, 1), 0, 1)").unwrap_err();
    let syntax = innermost(&err).syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0403);
    assert_eq!(syntax.range.start(), TextSize::from(14));
}

#[test]
fn test_plugin_grammar_errors() {
    let err = evaluate("clamp(p 0, 1)").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Plugin {
            source: PluginError::Expected { expected: "','", offset: 3 },
            ..
        }
    ));

    let err = evaluate("clamp(U, 0, 1)").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Plugin { source: PluginError::WrongType { ref expected, .. }, .. }
            if expected == "scalar"
    ));

    let err = evaluate("clamp(p, 2, 1)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "plugin function 'clamp' failed: lower bound 2 exceeds upper bound 1"
    );

    let err = evaluate("poly(U, 1)").unwrap_err();
    let syntax = innermost(&err).syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0409);
}

#[test]
fn test_overrun_is_rejected() {
    let err = evaluate("greedy(p)").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Plugin {
            source: PluginError::Overrun { consumed: 4, available: 3 },
            ..
        }
    ));
}

#[test]
fn test_builtins_and_tables_shadow_plugins() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver.register_plugin(Shadow("mag"));
    driver.register_plugin(Shadow("ramp"));
    assert_close(&scalars(driver.parse("mag(U)").unwrap()), &[1.0, 5.0, 5f64.sqrt()]);
    assert_close(&scalars(driver.parse("ramp(p)").unwrap()), &[10.0, 20.0, 30.0]);
}

#[test]
fn test_empty_registry() {
    let db = standard_database();
    let mut driver = Driver::new(&db).with_plugins(PluginRegistry::new());
    assert!(driver.plugins().is_empty());
    let err = driver.parse("clamp(p, 0, 1)").unwrap_err();
    assert!(matches!(err, EvalError::UnknownFunction(ref name) if name == "clamp"));

    driver.register_plugin(Poly);
    assert_eq!(driver.plugins().names(), vec!["poly"]);
    assert_close(&scalars(driver.parse("poly(p, 0, 1)").unwrap()), &[1.0, 2.0, 3.0]);
}
