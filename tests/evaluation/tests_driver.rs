//! Driver entry points, variables and options.

use fieldexpr::{
    Dimensions, Driver, DriverOptions, ErrorCode, EvalError, Kind, Location, ValueType,
};

use crate::helpers::assertions::{assert_close, scalars, syntax_code};
use crate::helpers::fixtures::{database_with, scalar, standard_database};

#[test]
fn test_variables_shadow_fields() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver.set_variable("p", scalar(&[9.0, 9.0, 9.0]));
    assert_close(&scalars(driver.parse("p + 1").unwrap()), &[10.0; 3]);

    driver.clear_variables();
    assert_close(&scalars(driver.parse("p + 1").unwrap()), &[2.0, 3.0, 4.0]);
}

#[test]
fn test_add_variables_builds_on_earlier_assignments() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver
        .add_variables("k = 2; v = k*U; big = mag(v) > 5")
        .unwrap();
    assert_eq!(driver.variable("k").unwrap().location(), None);
    assert_eq!(
        driver.variable("v").unwrap().value_type(),
        Some(ValueType::volume(Kind::Vector))
    );
    assert!(driver.variable("big").unwrap().is_logical());

    let value = driver.parse("big ? v.x : k").unwrap();
    assert_close(&scalars(value), &[2.0, 6.0, 2.0]);
}

#[test]
fn test_add_variables_errors() {
    let db = standard_database();
    let mut driver = Driver::new(&db);

    let err = driver.add_variables("a = p +").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0406);

    let err = driver.add_variables("a = 1 b = 2").unwrap_err();
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0902);
    assert_eq!(syntax.expected, vec!["';'".to_string()]);

    let err = driver.add_variables("3 = p").unwrap_err();
    assert_eq!(err.syntax_error().unwrap().expected, vec!["identifier".to_string()]);

    let err = driver.add_variables("a = p $").unwrap_err();
    assert!(matches!(err, EvalError::Lexical(_)));

    // an empty list assigns nothing
    driver.clear_variables();
    driver.add_variables("  ").unwrap();
    assert_eq!(driver.variables().count(), 0);
}

#[test]
fn test_parse_as_broadcasts_constants() {
    let db = standard_database();
    let mut driver = Driver::new(&db);

    let value = driver.parse_as("1", ValueType::surface(Kind::Scalar)).unwrap();
    assert_eq!(value.len(), 16);
    assert_eq!(driver.result_type(), Some(ValueType::surface(Kind::Scalar)));

    let value = driver.parse_as("vector(1, 2, 3)", ValueType::point(Kind::Vector)).unwrap();
    assert_eq!(value.len(), 16);

    let err = driver.parse_as("p", ValueType::surface(Kind::Scalar)).unwrap_err();
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0409);
    assert_eq!(syntax.found, "volume scalar");
}

#[test]
fn test_parse_logical() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let mask = driver.parse_logical("p >= 2 && q > 0", Location::Volume).unwrap();
    assert_eq!(mask.truth_values(), Some(vec![false, true, false]));
    assert!(driver.is_logical());

    let err = driver.parse_logical("p", Location::Volume).unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0409);
    assert!(!driver.is_logical());
}

#[test]
fn test_default_location_option() {
    let db = standard_database();
    let options = DriverOptions::new().with_default_location(Location::Point);
    let mut driver = Driver::new(&db).with_options(options);
    let value = driver.parse("2").unwrap();
    assert_eq!(value.location(), Some(Location::Point));
    assert_eq!(value.len(), 16);
    // located results keep their own location
    assert_eq!(driver.parse("p").unwrap().location(), Some(Location::Volume));
}

#[test]
fn test_dimension_checking_option() {
    let pressure: Dimensions = "[1 -1 -2 0 0 0 0]".parse().unwrap();
    let temperature: Dimensions = "[0 0 0 1 0 0 0]".parse().unwrap();
    let db = database_with(
        2,
        vec![
            ("p", scalar(&[1.0, 2.0]).with_dimensions(Some(pressure))),
            ("T", scalar(&[300.0, 310.0]).with_dimensions(Some(temperature))),
        ],
    );

    let mut checked = Driver::new(&db);
    let err = checked.parse("p + T").unwrap_err();
    assert!(matches!(err, EvalError::DimensionMismatch { op: "+", .. }));
    assert!(checked.parse("p * T + 1").is_ok());

    let options = DriverOptions::new().with_check_dimensions(false).with_trace(true);
    let mut unchecked = Driver::new(&db).with_options(options);
    assert_close(&scalars(unchecked.parse("p + T").unwrap()), &[301.0, 312.0]);
}

#[test]
fn test_position_tracks_the_cursor() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver.parse("p + q").unwrap();
    assert_eq!(driver.position(), 5);
    assert!(driver.parse("p + (q * U").is_err());
    assert_eq!(driver.position(), 10);
}

#[test]
fn test_drivers_share_one_repository() {
    let db = standard_database();
    let mut first = Driver::new(&db);
    let mut second = Driver::new(&db);
    first.set_variable("a", scalar(&[1.0, 1.0, 1.0]));
    assert!(first.parse("a").is_ok());
    assert!(matches!(second.parse("a"), Err(EvalError::UnknownField(_))));
    assert_eq!(first.mesh().n_cells(), second.mesh().n_cells());
}
