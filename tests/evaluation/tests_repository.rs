//! Name resolution against the repository: fields, tables, foreign meshes.

use fieldexpr::{
    Database, Driver, DriverOptions, ErrorCode, EvalError, InterpolationOrder, Location,
    LookupTable, RepositoryError, TextSize, TypedField,
};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars, syntax_code};
use crate::helpers::fixtures::{database_with, row_mesh, scalar, standard_database};

#[rstest]
#[case("ramp(p)", &[10.0, 20.0, 30.0])]
#[case("ramp(p*10)", &[100.0, 100.0, 100.0])]
#[case("ramp(-p)", &[0.0, 0.0, 0.0])]
#[case("ramp()", &[20.0, 20.0, 20.0])]
#[case("ramp(2.5) + p", &[26.0, 27.0, 28.0])]
fn test_lookup_tables(#[case] expression: &str, #[case] expected: &[f64]) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse(expression).unwrap();
    assert_close(&scalars(value), expected);
}

#[test]
fn test_lookup_table_needs_scalar_argument() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("ramp(U)").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0405);
    assert_eq!(err.syntax_error().unwrap().range.start(), TextSize::from(5));
}

#[test]
fn test_lookup_table_passes_nan_through() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let values = scalars(driver.parse("ramp(sqrt(-p))").unwrap());
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| v.is_nan()));
}

#[test]
fn test_lookup_table_rejects_bad_points() {
    assert_eq!(LookupTable::new(vec![]), Err(RepositoryError::EmptyTable));
    assert_eq!(
        LookupTable::new(vec![(0.0, f64::NAN)]),
        Err(RepositoryError::NonFiniteTable)
    );
}

fn with_foreign(order: InterpolationOrder) -> (Database, DriverOptions) {
    let mut coarse = Database::new(row_mesh(1));
    coarse.insert("T", scalar(&[7.0])).unwrap();
    coarse.insert_old("T", 1, scalar(&[5.0])).unwrap();
    coarse
        .insert("phi", TypedField::scalar(Location::Surface, vec![0.0; 6]))
        .unwrap();

    let mut same = Database::new(row_mesh(3));
    same.insert("h", scalar(&[0.5, 1.5, 2.5])).unwrap();

    let mut db = standard_database();
    db.insert_foreign("coarse", coarse);
    db.insert_foreign("same", same);
    (db, DriverOptions::new().with_interpolation_order(order))
}

#[rstest]
#[case(InterpolationOrder::Nearest)]
#[case(InterpolationOrder::Linear)]
fn test_foreign_mesh_fields(#[case] order: InterpolationOrder) {
    let (db, options) = with_foreign(order);
    let mut driver = Driver::new(&db).with_options(options);
    assert_close(&scalars(driver.parse("coarse(T)").unwrap()), &[7.0; 3]);
    assert_close(&scalars(driver.parse("coarse(oldTime(T))").unwrap()), &[5.0; 3]);
    assert_close(&scalars(driver.parse("same(h) + p").unwrap()), &[1.5, 3.5, 5.5]);
}

#[test]
fn test_foreign_mesh_rejects_surface_fields() {
    let (db, options) = with_foreign(InterpolationOrder::Linear);
    let mut driver = Driver::new(&db).with_options(options);
    let err = driver.parse("coarse(phi)").unwrap_err();
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0405);
    assert!(syntax.hint.as_deref().is_some_and(|h| h.contains("volume")));
    assert!(syntax.message.contains("scalar"), "{}", syntax.message);
    assert!(syntax.message.contains("'coarse'"), "{}", syntax.message);
    let err = driver.parse("coarse(oldTime(phi))").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0405);
}

#[test]
fn test_foreign_mesh_unknown_field() {
    let (db, options) = with_foreign(InterpolationOrder::Linear);
    let mut driver = Driver::new(&db).with_options(options);
    let err = driver.parse("coarse(p)").unwrap_err();
    assert!(matches!(err, EvalError::UnknownField(ref name) if name == "p"));
    let err = driver.parse("coarse(oldTime(p))").unwrap_err();
    assert!(matches!(err, EvalError::UnknownField(ref name) if name == "p"));
    let err = driver.parse("coarse(T").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0203);
}

#[test]
fn test_unknown_names() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("p + missing").unwrap_err();
    assert!(matches!(err, EvalError::UnknownField(ref name) if name == "missing"));
    let err = driver.parse("missing(p)").unwrap_err();
    assert!(matches!(err, EvalError::UnknownFunction(ref name) if name == "missing"));
    assert_eq!(err.to_string(), "unknown function 'missing'");
}

#[test]
fn test_insert_checks_field_size() {
    let mut db = database_with(3, vec![]);
    let err = db.insert("p", scalar(&[1.0, 2.0])).unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::SizeMismatch { expected: 3, found: 2, .. }
    ));
    let err = db
        .insert("c", TypedField::constant_scalar(1.0))
        .unwrap_err();
    assert_eq!(err, RepositoryError::Unlocated("c".into()));
}

#[test]
fn test_old_time_levels() {
    let mut db = database_with(2, vec![("T", scalar(&[3.0, 4.0]))]);
    db.insert_old("T", 1, scalar(&[2.0, 2.0])).unwrap();
    let mut driver = Driver::new(&db);
    assert_close(&scalars(driver.parse("T - oldTime(T)").unwrap()), &[1.0, 2.0]);
    let err = driver.parse("oldTime(2*T)").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0902);
}
