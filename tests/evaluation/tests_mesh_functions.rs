//! Finite-volume operators, mesh constructors and time derivatives.

use fieldexpr::{Driver, DriverOptions, EvalError, Kind, Location, MeshError, TypedField, ValueType};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars};
use crate::helpers::fixtures::{database_with, scalar, standard_database};

fn evaluate(expression: &str) -> TypedField {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    driver
        .parse(expression)
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e))
        .clone()
}

#[rstest]
#[case("grad(p).x", &[1.5, 3.0, 1.5])]
#[case("grad(p).y + grad(p).z", &[0.0, 0.0, 0.0])]
#[case("div(vector(p, 0, 0))", &[1.5, 3.0, 1.5])]
#[case("curl(vector(0, p, 0)).z", &[1.5, 3.0, 1.5])]
#[case("laplacian(p)", &[9.0, 0.0, -9.0])]
#[case("laplacian(2, p)", &[18.0, 0.0, -18.0])]
#[case("laplacian(p*0 + 2, p)", &[18.0, 0.0, -18.0])]
#[case("laplacian(surf(2), p)", &[18.0, 0.0, -18.0])]
#[case("laplacian(tau*0 + 2*unitTensor, p)", &[18.0, 0.0, -18.0])]
#[case("magSqrGradGrad(p)", &[5.0625, 0.0, 5.0625])]
#[case("faceAverage(interpolate(p))", &[1.15, 2.0, 2.85])]
#[case("surfSum(surf(1))", &[6.0, 6.0, 6.0])]
#[case("integrate(face() & vector(1, 0, 0))", &[0.0, 0.0, 0.0])]
#[case("div(face() & vector(1, 0, 0), p)", &[1.5, 3.0, 1.5])]
#[case("reconstruct(face() & vector(1, 2, 3)).y", &[2.0, 2.0, 2.0])]
#[case("interpolateToCell(interpolateToPoint(p*0 + 2))", &[2.0, 2.0, 2.0])]
fn test_volume_results(#[case] expression: &str, #[case] expected: &[f64]) {
    let value = evaluate(expression);
    assert_eq!(value.location(), Some(Location::Volume), "{}", expression);
    assert_close(&scalars(&value), expected);
}

#[rstest]
#[case("interpolate(p)", ValueType::surface(Kind::Scalar))]
#[case("interpolate(tau)", ValueType::surface(Kind::Tensor))]
#[case("snGrad(U)", ValueType::surface(Kind::Vector))]
#[case("flux(face() & vector(1, 0, 0), U)", ValueType::surface(Kind::Vector))]
#[case("interpolateToPoint(p)", ValueType::point(Kind::Scalar))]
#[case("grad(U)", ValueType::volume(Kind::Tensor))]
#[case("div(tau)", ValueType::volume(Kind::Vector))]
#[case("fpos()", ValueType::surface(Kind::Vector))]
#[case("pts()", ValueType::point(Kind::Vector))]
#[case("area()", ValueType::surface(Kind::Scalar))]
#[case("face()", ValueType::surface(Kind::Vector))]
fn test_result_types(#[case] expression: &str, #[case] expected: ValueType) {
    let value = evaluate(expression);
    assert_eq!(value.value_type(), Some(expected), "{}", expression);
}

#[test]
fn test_surface_gradient_range() {
    assert_close(&scalars(&evaluate("max(snGrad(p))")), &[3.0; 3]);
    assert_close(&scalars(&evaluate("min(snGrad(p))")), &[0.0; 3]);
}

#[rstest]
#[case("grad(tau)")]
#[case("grad(interpolate(p))")]
#[case("div(p)")]
#[case("curl(p)")]
#[case("interpolate(interpolate(p))")]
#[case("interpolateToCell(p)")]
#[case("integrate(p)")]
#[case("reconstruct(interpolate(U))")]
#[case("laplacian(U, p)")]
#[case("flux(p, U)")]
fn test_operator_argument_errors(#[case] expression: &str) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse(expression).unwrap_err();
    assert_eq!(
        err.syntax_error().map(|e| e.code),
        Some(fieldexpr::ErrorCode::E0405),
        "{}",
        expression
    );
}

#[rstest]
#[case("pos().x", &[1.0 / 6.0, 0.5, 5.0 / 6.0])]
#[case("vol()", &[1.0 / 3.0; 3])]
#[case("sum(area())", &[8.0; 3])]
#[case("id()", &[0.0, 1.0, 2.0])]
#[case("time()", &[2.0; 3])]
#[case("deltaT()", &[0.5; 3])]
#[case("distToPatch(xmin)", &[1.0 / 6.0, 0.5, 5.0 / 6.0])]
#[case("set(left) ? 1 : 0", &[1.0, 0.0, 0.0])]
#[case("zone(core) ? 1 : 0", &[0.0, 1.0, 1.0])]
#[case("sum(fset(cut) ? 1 : 0)", &[1.0; 3])]
#[case("sum(onPatch(ymin) ? 1 : 0)", &[3.0; 3])]
#[case("sum(internalFace() ? 1 : 0)", &[2.0; 3])]
#[case("sum(meshPhi(U))", &[0.0; 3])]
fn test_mesh_constructors(#[case] expression: &str, #[case] expected: &[f64]) {
    assert_close(&scalars(&evaluate(expression)), expected);
}

#[test]
fn test_unknown_selection_is_mesh_error() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("set(nothing)").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Mesh(MeshError::UnknownSelection { kind: "cellSet", .. })
    ));
    let err = driver.parse("onPatch(inlet)").unwrap_err();
    assert!(matches!(err, EvalError::Mesh(MeshError::UnknownPatch(_))));
}

#[test]
fn test_processor_id_comes_from_options() {
    let db = standard_database();
    let mut driver = Driver::new(&db).with_options(DriverOptions::new().with_processor_id(3));
    assert_close(&scalars(driver.parse("cpu()").unwrap()), &[3.0; 3]);
}

#[test]
fn test_random_fields() {
    let db = standard_database();
    let mut first = Driver::new(&db).with_options(DriverOptions::new().with_random_seed(11));
    let mut second = Driver::new(&db).with_options(DriverOptions::new().with_random_seed(11));
    let a = first.parse("rand()").unwrap().clone();
    let b = second.parse("rand()").unwrap().clone();
    assert_eq!(a, b);
    assert!(scalars(&a).iter().all(|v| (0.0..1.0).contains(v)));

    // the driver's generator advances between calls
    let c = first.parse("rand()").unwrap().clone();
    assert_ne!(a, c);

    assert_close(&scalars(first.parse("rand(5) - rand(5)").unwrap()), &[0.0; 3]);
    assert_close(&scalars(first.parse("randFixed() - randFixed()").unwrap()), &[0.0; 3]);
    let normal = first.parse("randNormal(3)").unwrap();
    assert_eq!(normal.len(), 3);
    assert!(scalars(normal).iter().all(|v| v.is_finite()));
    assert!(first.parse("rand(p)").is_err());
}

#[test]
fn test_time_derivatives() {
    let mut db = database_with(3, vec![("p", scalar(&[1.0, 2.0, 3.0]))]);
    db.insert_old("p", 1, scalar(&[0.0, 0.0, 0.0])).unwrap();
    db.insert_old("p", 2, scalar(&[1.0, 1.0, 1.0])).unwrap();
    db.set_time(1.0, 0.5);
    let mut driver = Driver::new(&db);
    assert_close(&scalars(driver.parse("ddt(p)").unwrap()), &[2.0, 4.0, 6.0]);
    assert_close(&scalars(driver.parse("d2dt2(p)").unwrap()), &[8.0, 12.0, 16.0]);
    assert_close(&scalars(driver.parse("oldTime(p)").unwrap()), &[0.0; 3]);
}

#[test]
fn test_time_derivative_without_history_is_zero() {
    let mut db = database_with(2, vec![("T", scalar(&[300.0, 310.0]))]);
    db.set_time(1.0, 0.1);
    let mut driver = Driver::new(&db);
    assert_close(&scalars(driver.parse("ddt(T)").unwrap()), &[0.0, 0.0]);
    let err = driver.parse("ddt(missing)").unwrap_err();
    assert!(matches!(err, EvalError::UnknownField(ref name) if name == "missing"));
}

#[test]
fn test_time_operators_see_variables_first() {
    let mut db = database_with(3, vec![("p", scalar(&[1.0, 2.0, 3.0]))]);
    db.insert_old("p", 1, scalar(&[0.0, 0.0, 0.0])).unwrap();
    db.set_time(1.0, 0.5);
    let mut driver = Driver::new(&db);
    driver.set_variable("p", scalar(&[7.0, 8.0, 9.0]));
    assert_close(&scalars(driver.parse("ddt(p)").unwrap()), &[0.0; 3]);
    assert_close(&scalars(driver.parse("d2dt2(p)").unwrap()), &[0.0; 3]);
    assert_close(&scalars(driver.parse("oldTime(p)").unwrap()), &[7.0, 8.0, 9.0]);
    driver.set_variable("flag", TypedField::logical(Location::Volume, vec![true; 3]));
    assert!(driver.parse("ddt(flag)").is_err());
}

#[test]
fn test_mesh_phi_from_repository() {
    let mut db = database_with(3, vec![("U", crate::helpers::fixtures::vector(&[[0.0; 3]; 3]))]);
    db.set_mesh_phi(TypedField::scalar(Location::Surface, vec![0.25; 16]))
        .unwrap();
    let mut driver = Driver::new(&db);
    assert_close(&scalars(driver.parse("sum(meshPhi(U))").unwrap()), &[4.0; 3]);
}
