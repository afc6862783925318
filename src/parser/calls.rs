//! Call reductions: builtins, lookup tables, foreign meshes and plugin
//! functions.
//!
//! The argument kinds of each builtin are checked here and the call is then
//! handed to the field-algebra or finite-volume layer unchanged.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::errors::ErrorCode;
use super::evaluator::{Evaluator, describe};
use super::grammar::builtins::{self, Arguments, Builtin};
use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use crate::base::{Kind, Location, ValueType};
use crate::error::EvalError;
use crate::field::functions::{self, Reduction, ScalarFunction};
use crate::field::{FieldData, TypedField, algebra};
use crate::mesh::{Mesh, Selection, fvc};
use crate::plugin::{PluginError, PluginFunction};
use crate::repository::{FieldRepository, LookupTable, RepositoryError, map_cells};

const NUMERIC: &[&str] = &["scalar", "vector", "tensor", "symmTensor", "sphericalTensor"];
const TENSORS: &[&str] = &["tensor", "symmTensor", "sphericalTensor"];

/// An evaluated call argument and the token it started at.
struct Argument<'s> {
    value: TypedField,
    at: Token<'s>,
}

impl Argument<'_> {
    fn kind(&self) -> Kind {
        self.value.kind()
    }

    fn is(&self, location: Location) -> bool {
        self.value.location() == Some(location)
    }

    fn is_located(&self, location: Location, kinds: &[Kind]) -> bool {
        self.is(location) && kinds.contains(&self.kind())
    }
}

/// Remove the first argument; the caller has already checked the arity.
fn take<'s>(args: &mut Vec<Argument<'s>>) -> Argument<'s> {
    args.remove(0)
}

fn sample(rng: &mut StdRng, normal: bool, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| {
            if normal {
                // Box-Muller
                let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
                let u2: f64 = rng.gen_range(0.0..1.0);
                (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
            } else {
                rng.gen_range(0.0..1.0)
            }
        })
        .collect()
}

fn mask(location: Location, n: usize, selected: impl IntoIterator<Item = usize>) -> TypedField {
    let mut values = vec![false; n];
    for i in selected {
        if let Some(v) = values.get_mut(i) {
            *v = true;
        }
    }
    TypedField::logical(location, values)
}

impl<'s, 'd, 'r> Evaluator<'s, 'd, 'r> {
    /// `name(...)`: builtin, then lookup table, foreign mesh, plugin.
    pub(super) fn call(&mut self, name: Token<'s>) -> Result<TypedField, EvalError> {
        if let Some(builtin) = builtins::lookup(name.text) {
            let value = self.builtin(builtin, &name)?;
            self.trace_reduction(|| format!("{}(...) -> {}", name.text, describe(&value)));
            return Ok(value);
        }
        let repository = self.driver.repository();
        if let Some(table) = repository.lookup_table(name.text) {
            return self.table(&name, table);
        }
        if let Some(foreign) = repository.foreign(name.text) {
            return self.foreign(&name, foreign);
        }
        if let Some(plugin) = self.driver.plugin(name.text) {
            return self.plugin(&name, plugin);
        }
        Err(EvalError::UnknownFunction(name.text.into()))
    }

    // =========================================================================
    // ARGUMENT LISTS
    // =========================================================================

    fn expression_arguments(&mut self) -> Result<Vec<Argument<'s>>, EvalError> {
        let open = self.expect(SyntaxKind::L_PAREN)?;
        let mut args = Vec::new();
        if self.at(SyntaxKind::R_PAREN) {
            self.advance();
            return Ok(args);
        }
        loop {
            let at = self.current().clone();
            let value = self.expression(0)?;
            args.push(Argument { value, at });
            match self.current().kind {
                SyntaxKind::COMMA => {
                    self.advance();
                }
                SyntaxKind::R_PAREN => {
                    self.advance();
                    return Ok(args);
                }
                SyntaxKind::ERROR => return Err(self.lexical_error()),
                SyntaxKind::EOF => return Err(self.unclosed(&open)),
                _ => return Err(self.unexpected(ErrorCode::E0902, ["','", "')'"])),
            }
        }
    }

    /// `( name )`
    fn name_argument(&mut self) -> Result<Token<'s>, EvalError> {
        let open = self.expect(SyntaxKind::L_PAREN)?;
        let name = self.expect(SyntaxKind::IDENT)?;
        if !self.at(SyntaxKind::R_PAREN) {
            return Err(self.unclosed(&open));
        }
        self.advance();
        Ok(name)
    }

    /// `( [integer] )`
    fn seed_argument(&mut self) -> Result<Option<u64>, EvalError> {
        let open = self.expect(SyntaxKind::L_PAREN)?;
        let mut seed = None;
        if self.at(SyntaxKind::INTEGER) {
            let token = self.advance();
            let value = token.text.parse::<u64>().map_err(|_| {
                self.type_error(
                    ErrorCode::E0104,
                    &token,
                    format!("seed '{}' is out of range", token.text),
                    ["integer"],
                )
            })?;
            seed = Some(value);
        } else if !self.at(SyntaxKind::R_PAREN) {
            return Err(self.unexpected(ErrorCode::E0405, ["integer", "')'"]));
        }
        if !self.at(SyntaxKind::R_PAREN) {
            return Err(self.unclosed(&open));
        }
        self.advance();
        Ok(seed)
    }

    fn reject(&self, function: &Token<'_>, arg: &Argument<'_>, expected: &[&str]) -> EvalError {
        self.type_error(
            ErrorCode::E0405,
            &arg.at,
            format!("'{}' does not accept {}", function.text, describe(&arg.value)),
            expected.iter().copied(),
        )
    }

    fn require(
        &self,
        function: &Token<'_>,
        arg: &Argument<'_>,
        accepted: bool,
        expected: &[&str],
    ) -> Result<(), EvalError> {
        if accepted {
            Ok(())
        } else {
            Err(self.reject(function, arg, expected))
        }
    }

    fn arity_error(&self, function: &Token<'_>, min: usize, max: usize, found: usize) -> EvalError {
        let wanted = match (min, max) {
            (0, 0) => "no arguments".to_string(),
            (1, 1) => "1 argument".to_string(),
            (a, b) if a == b => format!("{} arguments", a),
            (a, b) => format!("{} to {} arguments", a, b),
        };
        self.type_error(
            ErrorCode::E0405,
            function,
            format!("'{}' takes {}, found {}", function.text, wanted, found),
            [wanted.clone()],
        )
    }

    // =========================================================================
    // BUILTINS
    // =========================================================================

    fn builtin(&mut self, builtin: Builtin, name: &Token<'s>) -> Result<TypedField, EvalError> {
        match builtin.arguments() {
            Arguments::Name => {
                let arg = self.name_argument()?;
                self.named(builtin, &arg)
            }
            Arguments::Seed => {
                let seed = self.seed_argument()?;
                let Builtin::Random { normal, .. } = builtin else {
                    return Err(self.arity_error(name, 0, 0, 1));
                };
                Ok(self.random(normal, seed))
            }
            Arguments::Expressions { min, max } => {
                let args = self.expression_arguments()?;
                if args.len() < min || args.len() > max {
                    return Err(self.arity_error(name, min, max, args.len()));
                }
                self.apply(builtin, name, args)
            }
        }
    }

    fn apply(
        &mut self,
        builtin: Builtin,
        name: &Token<'s>,
        mut args: Vec<Argument<'s>>,
    ) -> Result<TypedField, EvalError> {
        let repository = self.driver.repository();
        let mesh = repository.mesh();
        let value = match builtin {
            Builtin::Scalar(ScalarFunction::Pos) if args.is_empty() => {
                TypedField::vector(Location::Volume, mesh.cell_centres().to_vec())
            }
            Builtin::Scalar(function) => {
                let a = take(&mut args);
                self.require(name, &a, a.kind() == Kind::Scalar, &["scalar"])?;
                functions::apply_scalar(function, a.value)?
            }
            Builtin::Mag | Builtin::MagSqr => {
                let a = take(&mut args);
                self.require(name, &a, a.kind().is_numeric(), NUMERIC)?;
                if builtin == Builtin::Mag {
                    functions::mag(a.value)
                } else {
                    functions::mag_sqr(a.value)
                }
            }
            Builtin::Sqr => {
                let a = take(&mut args);
                let accepted = matches!(a.kind(), Kind::Scalar | Kind::Vector);
                self.require(name, &a, accepted, &["scalar", "vector"])?;
                functions::sqr(a.value)?
            }
            Builtin::Pow => {
                let base = take(&mut args);
                let exponent = take(&mut args);
                self.require(name, &base, base.kind() == Kind::Scalar, &["scalar"])?;
                self.require(name, &exponent, exponent.kind() == Kind::Scalar, &["scalar"])?;
                self.check_locations("pow", &base.value, &exponent.value, name)?;
                functions::pow(base.value, exponent.value)?
            }
            Builtin::MinMax { maximum } if args.len() == 1 => {
                let a = take(&mut args);
                self.require(name, &a, a.kind().is_numeric(), NUMERIC)?;
                let reduction = if maximum { Reduction::Max } else { Reduction::Min };
                functions::reduce(reduction, a.value)?
            }
            Builtin::MinMax { maximum } => {
                let a = take(&mut args);
                let b = take(&mut args);
                self.require(name, &a, a.kind().is_numeric(), NUMERIC)?;
                self.require(name, &b, b.kind() == a.kind(), &[a.kind().as_str()])?;
                self.check_locations(name.text, &a.value, &b.value, name)?;
                if maximum {
                    functions::max_of(a.value, b.value)?
                } else {
                    functions::min_of(a.value, b.value)?
                }
            }
            Builtin::Reduce(reduction) => {
                let a = take(&mut args);
                self.require(name, &a, a.kind().is_numeric(), NUMERIC)?;
                functions::reduce(reduction, a.value)?
            }
            Builtin::ExtremumPosition { maximum } => {
                let a = take(&mut args);
                let location = a.value.location();
                let accepted = a.kind() == Kind::Scalar && location.is_some();
                self.require(name, &a, accepted, &["located scalar"])?;
                let location = location.unwrap_or_default();
                functions::extremum_position(&a.value, mesh.positions(location), maximum)?
            }
            Builtin::Tensor(function) => {
                let a = take(&mut args);
                self.require(name, &a, a.kind().is_tensor_like(), TENSORS)?;
                functions::apply_tensor(function, a.value)?
            }
            Builtin::Build(kind) => {
                let mut components = Vec::with_capacity(args.len());
                for (i, arg) in args.iter().enumerate() {
                    self.require(name, arg, arg.kind() == Kind::Scalar, &["scalar"])?;
                    if let Some(located) = args[..i].iter().find(|a| a.value.location().is_some()) {
                        self.check_locations(name.text, &located.value, &arg.value, &arg.at)?;
                    }
                }
                for arg in args {
                    components.push(arg.value);
                }
                functions::build(kind, components)?
            }
            _ => return self.apply_mesh(builtin, name, args),
        };
        Ok(value)
    }

    /// Differential operators, interpolation and mesh constructors.
    fn apply_mesh(
        &mut self,
        builtin: Builtin,
        name: &Token<'s>,
        mut args: Vec<Argument<'s>>,
    ) -> Result<TypedField, EvalError> {
        use Kind::{Scalar, SphericalTensor, SymmTensor, Tensor, Vector};
        use Location::{Point, Surface, Volume};
        const ALL_NUMERIC: &[Kind] = &[Scalar, Vector, Tensor, SymmTensor, SphericalTensor];

        let repository = self.driver.repository();
        let mesh = repository.mesh();
        let value = match builtin {
            Builtin::Grad => {
                let a = take(&mut args);
                let accepted = a.is_located(Volume, &[Scalar, Vector]);
                self.require(name, &a, accepted, &["volume scalar", "volume vector"])?;
                fvc::grad(mesh, &a.value)?
            }
            Builtin::Div if args.len() == 2 => {
                let phi = take(&mut args);
                let field = take(&mut args);
                self.require(name, &phi, phi.is_located(Surface, &[Scalar]), &["surface scalar"])?;
                let accepted = field.is_located(Volume, ALL_NUMERIC);
                self.require(name, &field, accepted, &["volume field"])?;
                fvc::div_flux(mesh, &phi.value, &field.value)?
            }
            Builtin::Div => {
                let a = take(&mut args);
                let accepted = a.is_located(Volume, &[Vector, Tensor, SymmTensor, SphericalTensor])
                    || a.is_located(Surface, &[Scalar, Vector]);
                let expected = ["volume vector", "volume tensor", "surface scalar", "surface vector"];
                self.require(name, &a, accepted, &expected)?;
                fvc::div(mesh, &a.value)?
            }
            Builtin::Curl => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, &[Vector]), &["volume vector"])?;
                fvc::curl(mesh, &a.value)?
            }
            Builtin::SnGrad => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, ALL_NUMERIC), &["volume field"])?;
                fvc::sn_grad(mesh, &a.value)?
            }
            Builtin::Laplacian if args.len() == 2 => {
                let gamma = take(&mut args);
                let field = take(&mut args);
                let accepted = field.is_located(Volume, ALL_NUMERIC);
                self.require(name, &field, accepted, &["volume field"])?;
                if gamma.value.is_constant() && gamma.kind() == Scalar {
                    let plain = fvc::laplacian(mesh, None, &field.value)?;
                    algebra::mul(gamma.value.with_dimensions(None), plain)?.with_dimensions(None)
                } else {
                    let accepted = gamma.is_located(Volume, &[Scalar, Tensor, SymmTensor])
                        || gamma.is_located(Surface, &[Scalar]);
                    let expected = ["volume scalar", "volume tensor", "volume symmTensor", "surface scalar"];
                    self.require(name, &gamma, accepted, &expected)?;
                    fvc::laplacian(mesh, Some(&gamma.value), &field.value)?
                }
            }
            Builtin::Laplacian => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, ALL_NUMERIC), &["volume field"])?;
                fvc::laplacian(mesh, None, &a.value)?
            }
            Builtin::Interpolate | Builtin::InterpolateToPoint => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, ALL_NUMERIC), &["volume field"])?;
                if builtin == Builtin::Interpolate {
                    fvc::interpolate(mesh, &a.value)?
                } else {
                    fvc::interpolate_to_point(mesh, &a.value)?
                }
            }
            Builtin::InterpolateToCell => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Point, ALL_NUMERIC), &["point field"])?;
                fvc::interpolate_to_cell(mesh, &a.value)?
            }
            Builtin::FaceAverage | Builtin::Integrate | Builtin::SurfSum => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Surface, ALL_NUMERIC), &["surface field"])?;
                match builtin {
                    Builtin::FaceAverage => fvc::face_average(mesh, &a.value)?,
                    Builtin::Integrate => fvc::surface_integrate(mesh, &a.value)?,
                    _ => fvc::surface_sum(mesh, &a.value)?,
                }
            }
            Builtin::Reconstruct => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Surface, &[Scalar]), &["surface scalar"])?;
                fvc::reconstruct(mesh, &a.value)?
            }
            Builtin::Flux => {
                let phi = take(&mut args);
                let field = take(&mut args);
                self.require(name, &phi, phi.is_located(Surface, &[Scalar]), &["surface scalar"])?;
                let accepted = field.is_located(Volume, ALL_NUMERIC);
                self.require(name, &field, accepted, &["volume field"])?;
                fvc::flux(mesh, &phi.value, &field.value)?
            }
            Builtin::MagSqrGradGrad => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, &[Scalar]), &["volume scalar"])?;
                fvc::mag_sqr_grad_grad(mesh, &a.value)?
            }
            Builtin::MeshPhi => {
                let a = take(&mut args);
                self.require(name, &a, a.is_located(Volume, &[Vector]), &["volume vector"])?;
                repository
                    .mesh_phi()
                    .unwrap_or_else(|| TypedField::zeros(ValueType::surface(Scalar), mesh.n_faces()))
            }
            Builtin::Position(location) => {
                TypedField::vector(location, mesh.positions(location).to_vec())
            }
            Builtin::CellVolume => TypedField::scalar(Volume, mesh.cell_volumes().to_vec()),
            Builtin::FaceArea => TypedField::scalar(
                Surface,
                mesh.face_areas().iter().map(|s| s.norm()).collect(),
            ),
            Builtin::FaceAreaVector => TypedField::vector(Surface, mesh.face_areas().to_vec()),
            Builtin::CellId => {
                TypedField::scalar(Volume, (0..mesh.n_cells()).map(|i| i as f64).collect())
            }
            Builtin::Cpu => TypedField::constant_scalar(f64::from(self.driver.options().processor_id)),
            Builtin::Time => TypedField::constant_scalar(repository.time()),
            Builtin::DeltaT => TypedField::constant_scalar(repository.delta_t()),
            Builtin::Random { normal, .. } => {
                let mut rng = StdRng::seed_from_u64(self.driver.options().random_seed);
                TypedField::scalar(Volume, sample(&mut rng, normal, mesh.n_cells()))
            }
            Builtin::InternalFace => mask(
                Surface,
                mesh.n_faces(),
                (0..mesh.n_faces()).filter(|&f| mesh.is_internal_face(f)),
            ),
            Builtin::Broadcast(location) => {
                let a = take(&mut args);
                self.require(name, &a, a.value.is_constant(), &["constant"])?;
                a.value.broadcast_to(location, mesh.size(location))
            }
            _ => return Err(self.arity_error(name, 0, 0, args.len())),
        };
        Ok(value)
    }

    /// Builtins taking a bare field, set, zone or patch name.
    fn named(&mut self, builtin: Builtin, arg: &Token<'s>) -> Result<TypedField, EvalError> {
        let repository = self.driver.repository();
        let mesh = repository.mesh();
        let value = match builtin {
            Builtin::OldTime => self.adopt(self.history(arg.text, 1)?),
            Builtin::Ddt | Builtin::D2dt2 => self.time_derivative(builtin, arg)?,
            Builtin::Selection(selection) => self.selection(mesh, selection, arg.text)?,
            Builtin::OnPatch => {
                let patch = mesh.patch(arg.text)?;
                mask(Location::Surface, mesh.n_faces(), patch.faces())
            }
            Builtin::DistToPatch => fvc::distance_to_faces(mesh, mesh.patch(arg.text)?.faces()),
            _ => return Err(self.arity_error(arg, 0, 0, 1)),
        };
        Ok(value)
    }

    fn selection(&self, mesh: &Mesh, selection: Selection, name: &str) -> Result<TypedField, EvalError> {
        let location = selection.location();
        let members = mesh.selection(selection, name)?;
        Ok(mask(location, mesh.size(location), members.iter().copied()))
    }

    /// Value of `name` `level` steps back. A driver variable shadows the
    /// repository and has no stored history, so every level is its current value.
    fn history(&self, name: &str, level: usize) -> Result<TypedField, EvalError> {
        match self.driver.variable(name) {
            Some(value) => Ok(value.clone()),
            None => Ok(self.driver.repository().resolve_old(name, level)?),
        }
    }

    /// Backward differences over the stored old-time values.
    fn time_derivative(&mut self, builtin: Builtin, arg: &Token<'s>) -> Result<TypedField, EvalError> {
        let current = self.history(arg.text, 0)?.with_dimensions(None);
        if !current.kind().is_numeric() {
            return Err(self.type_error(
                ErrorCode::E0405,
                arg,
                format!("'{}' is {}", arg.text, describe(&current)),
                NUMERIC.iter().copied(),
            ));
        }
        let dt = self.driver.repository().delta_t();
        let old = self.history(arg.text, 1)?.with_dimensions(None);
        let value = if builtin == Builtin::Ddt {
            let change = algebra::sub(current, old)?;
            algebra::div(change, TypedField::constant_scalar(dt))?
        } else {
            let older = self.history(arg.text, 2)?.with_dimensions(None);
            let twice_old = algebra::mul(TypedField::constant_scalar(2.0), old)?;
            let change = algebra::add(algebra::sub(current, twice_old)?, older)?;
            algebra::div(change, TypedField::constant_scalar(dt * dt))?
        };
        Ok(value.with_dimensions(None))
    }

    /// `rand()` draws from the driver's generator; `rand(seed)` from a fresh one.
    fn random(&mut self, normal: bool, seed: Option<u64>) -> TypedField {
        let n = self.driver.repository().mesh().n_cells();
        let values = match seed {
            Some(seed) => sample(&mut StdRng::seed_from_u64(seed), normal, n),
            None => sample(self.driver.rng(), normal, n),
        };
        TypedField::scalar(Location::Volume, values)
    }

    // =========================================================================
    // TABLES, FOREIGN MESHES, PLUGINS
    // =========================================================================

    /// `table(x)` maps a scalar through the table; `table()` samples it at the current time.
    fn table(&mut self, name: &Token<'s>, table: &LookupTable) -> Result<TypedField, EvalError> {
        let mut args = self.expression_arguments()?;
        match args.len() {
            0 => Ok(TypedField::constant_scalar(
                table.value(self.driver.repository().time()),
            )),
            1 => {
                let a = take(&mut args);
                self.require(name, &a, a.kind() == Kind::Scalar, &["scalar"])?;
                let location = a.value.location();
                let values = a
                    .value
                    .scalar_values()
                    .map(|v| v.iter().map(|&x| table.value(x)).collect())
                    .unwrap_or_default();
                self.trace_reduction(|| format!("{}({}) -> scalar", name.text, describe(&a.value)));
                Ok(TypedField::from_parts(Kind::Scalar, location, FieldData::Scalar(values)))
            }
            n => Err(self.arity_error(name, 0, 1, n)),
        }
    }

    /// `mesh(field)` or `mesh(oldTime(field))` mapped onto this mesh's cells.
    fn foreign(
        &mut self,
        mesh_name: &Token<'s>,
        foreign: &dyn FieldRepository,
    ) -> Result<TypedField, EvalError> {
        let open = self.expect(SyntaxKind::L_PAREN)?;
        let first = self.expect(SyntaxKind::IDENT)?;
        let (field_name, level) = if first.text == "oldTime" && self.at(SyntaxKind::L_PAREN) {
            (self.name_argument()?, 1)
        } else {
            (first, 0)
        };
        if !self.at(SyntaxKind::R_PAREN) {
            return Err(self.unclosed(&open));
        }
        self.advance();

        let Some(value_type) = foreign.classify(field_name.text) else {
            return Err(RepositoryError::NotFound(field_name.text.into()).into());
        };
        if value_type.location != Location::Volume {
            return Err(self
                .type_error(
                    ErrorCode::E0405,
                    &field_name,
                    format!("cannot map {} from mesh '{}'", value_type, mesh_name.text),
                    ["volume field"],
                )
                .with_hint("only volume fields can be mapped between meshes"));
        }
        let field = match level {
            0 => foreign.resolve_as(field_name.text, value_type)?,
            _ => foreign.resolve_old(field_name.text, level)?,
        };
        let order = self.driver.options().interpolation_order;
        let target = self.driver.repository().mesh();
        let mapped = map_cells(foreign.mesh(), &field, target, order)?;
        tracing::debug!(
            mesh = mesh_name.text,
            field = field_name.text,
            ?order,
            "mapped field from foreign mesh"
        );
        Ok(self.adopt(mapped))
    }

    /// Hand the text after `name` to a plugin and resume where it stopped.
    fn plugin(&mut self, name: &Token<'s>, plugin: Arc<dyn PluginFunction>) -> Result<TypedField, EvalError> {
        let source = self.source();
        let start = name.end();
        let rest = &source[start..];
        let origin = self.base() + start;
        tracing::debug!(plugin = name.text, offset = origin, "delegating to plugin function");

        self.driver.push_origin(origin);
        let outcome = plugin.evaluate(rest, &mut *self.driver);
        self.driver.pop_origin();

        let (value, consumed) = outcome.map_err(|source| EvalError::Plugin {
            name: name.text.into(),
            source,
        })?;
        if consumed > rest.len() || !rest.is_char_boundary(consumed) {
            return Err(EvalError::Plugin {
                name: name.text.into(),
                source: PluginError::Overrun {
                    consumed,
                    available: rest.len(),
                },
            });
        }
        tracing::debug!(plugin = name.text, consumed, "resuming after plugin function");
        self.resume_at(start + consumed);
        self.trace_reduction(|| format!("{}<plugin> -> {}", name.text, describe(&value)));
        Ok(self.adopt(value))
    }
}
