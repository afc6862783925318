//! Operator legality, precedence, components and location rules.

use fieldexpr::{Driver, ErrorCode, Kind, Location, TextSize, ValueType};
use rstest::rstest;

use crate::helpers::assertions::{assert_close, scalars, syntax_code};
use crate::helpers::fixtures::standard_database;

#[rstest]
#[case("p + p", Kind::Scalar)]
#[case("2 * U", Kind::Vector)]
#[case("U / 2", Kind::Vector)]
#[case("U & V", Kind::Scalar)]
#[case("U ^ V", Kind::Vector)]
#[case("tau & U", Kind::Vector)]
#[case("sigma & tau", Kind::Tensor)]
#[case("tau && sigma", Kind::Scalar)]
#[case("iso && iso", Kind::Scalar)]
#[case("sigma + sigma", Kind::SymmTensor)]
#[case("p * iso", Kind::SphericalTensor)]
#[case("p < q", Kind::Logical)]
#[case("p < q && q > 0", Kind::Logical)]
#[case("p < q || !(q > 0)", Kind::Logical)]
fn test_legal_combinations(#[case] expression: &str, #[case] kind: Kind) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver
        .parse(expression)
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e));
    assert_eq!(value.kind(), kind, "{}", expression);
    assert_eq!(value.location(), Some(Location::Volume));
}

#[rstest]
#[case("U + tau", 2)]
#[case("p + U", 2)]
#[case("U * V", 2)]
#[case("p ^ q", 2)]
#[case("tau ^ tau", 4)]
#[case("U % p", 2)]
#[case("(p > q) + 1", 8)]
#[case("U < V", 2)]
#[case("p < q && 1", 6)]
fn test_illegal_combinations(#[case] expression: &str, #[case] offset: u32) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse(expression).unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0403, "{}", expression);
    assert_eq!(u32::from(err.syntax_error().unwrap().offset()), offset);
}

#[test]
fn test_double_ampersand_after_scalar_is_rejected() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("p && q").unwrap_err();
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0403);
    assert_eq!(syntax.found, "&&");
    assert!(syntax.expected.contains(&"'+'".to_string()));
    assert!(!syntax.expected.contains(&"'&&'".to_string()));
}

#[test]
fn test_operator_without_right_operands_fails_before_operand() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("(p > 1) + missing").unwrap_err();
    let syntax = err
        .syntax_error()
        .unwrap_or_else(|| panic!("expected a type error, got {:?}", err));
    assert_eq!(syntax.code, ErrorCode::E0403);
    assert_eq!(syntax.offset(), TextSize::from(8));
    assert!(syntax.expected.contains(&"'||'".to_string()));
    let err = driver.parse("tau ^ undefinedFunction(p)").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0403);
}

#[test]
fn test_expected_set_lists_right_operands() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("tau & p").unwrap_err();
    let expected = &err.syntax_error().unwrap().expected;
    for kind in ["vector", "tensor", "symmTensor", "sphericalTensor"] {
        assert!(expected.contains(&kind.to_string()), "missing {}", kind);
    }
}

#[rstest]
#[case("1 + 2 * 3", 7.0)]
#[case("(1 + 2) * 3", 9.0)]
#[case("8 / 4 / 2", 1.0)]
#[case("10 - 4 - 3", 3.0)]
#[case("-2 * -3", 6.0)]
#[case("7 % 4 * 2", 6.0)]
#[case("1 < 2 ? 3 : 4", 3.0)]
#[case("1 > 2 ? 3 : 2 > 1 ? 5 : 6", 5.0)]
#[case("true || false && false ? 1 : 0", 1.0)]
#[case("!true || true ? 1 : 0", 1.0)]
#[case("1 + 1 == 2 && 3 >= 3 ? 1 : 0", 1.0)]
#[case(".5e1 + 2.", 7.0)]
fn test_precedence_and_associativity(#[case] expression: &str, #[case] expected: f64) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse(expression).unwrap();
    assert_close(&scalars(value), &[expected; 3]);
}

#[rstest]
#[case("U.x", &[1.0, 3.0, 0.0])]
#[case("U.z", &[0.0, 0.0, 1.0])]
#[case("tau.xy", &[2.0, 2.0, 2.0])]
#[case("tau.zz", &[10.0, 10.0, 10.0])]
#[case("sigma.yz", &[0.5, 0.5, 0.5])]
#[case("iso.ii", &[1.0, 2.0, 3.0])]
#[case("tau.T().xy", &[4.0, 4.0, 4.0])]
#[case("-U.y", &[0.0, -4.0, 2.0])]
#[case("(U ^ V).z", &[1.0, -1.0, 4.0])]
fn test_component_access(#[case] expression: &str, #[case] expected: &[f64]) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse(expression).unwrap();
    assert_close(&scalars(value), expected);
}

#[rstest]
#[case("U.w")]
#[case("p.x")]
#[case("sigma.yx")]
fn test_invalid_component(#[case] expression: &str) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse(expression).unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0408);
}

#[test]
fn test_postfix_transpose_needs_tensor() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("U.T()").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0405);
}

#[test]
fn test_mixed_locations_are_rejected() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("p + interpolate(p)").unwrap_err();
    let syntax = err.syntax_error().unwrap();
    assert_eq!(syntax.code, ErrorCode::E0407);
    assert_eq!(syntax.found, "+");
}

#[test]
fn test_constants_broadcast_against_any_location() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let faces = driver.parse("interpolate(p) * 2 + 1").unwrap();
    assert_eq!(faces.value_type(), Some(ValueType::surface(Kind::Scalar)));
    assert_eq!(faces.len(), 16);
}

#[rstest]
#[case("surf(2)", Location::Surface, 16)]
#[case("point(2)", Location::Point, 16)]
#[case("2", Location::Volume, 3)]
fn test_constant_location_builders(
    #[case] expression: &str,
    #[case] location: Location,
    #[case] len: usize,
) {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse(expression).unwrap();
    assert_eq!(value.location(), Some(location));
    assert_eq!(value.len(), len);
    assert!(scalars(value).iter().all(|v| *v == 2.0));
}

#[test]
fn test_location_builder_rejects_located_argument() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("surf(p)").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0405);
}

#[test]
fn test_named_constants() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let value = driver.parse("unitTensor && unitTensor").unwrap();
    assert_close(&scalars(value), &[3.0; 3]);
    let value = driver.parse("pi").unwrap();
    assert_close(&scalars(value), &[std::f64::consts::PI; 3]);
}

#[test]
fn test_conditional_branches_must_agree() {
    let db = standard_database();
    let mut driver = Driver::new(&db);
    let err = driver.parse("p > 1 ? p : U").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0403);
    let err = driver.parse("p ? p : q").unwrap_err();
    assert_eq!(syntax_code(&err), ErrorCode::E0403);
}
