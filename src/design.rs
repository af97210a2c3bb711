use crate::gradient::Grad;
use nalgebra::DVector;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("invalid bounds for '{id}': lower {lower} must be strictly below upper {upper}")]
    InvalidBounds { id: String, lower: f64, upper: f64 },
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("variable '{0}' already declared")]
    Duplicate(String),
    #[error("'{id}' value {value} outside bounds [{lower}, {upper}]")]
    OutOfBounds {
        id: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("design vector length {got} does not match ndv {expected}")]
    DimensionMismatch { got: usize, expected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Fixed,
    Design { lower: f64, upper: f64 },
}

#[derive(Debug, Clone)]
struct Binding {
    id: String,
    value: f64,
    kind: Kind,
}

/// Bookkeeping for the design vector chi: named scalar bindings that are
/// either fixed parameters or bounded design variables. Free variables get
/// gradient columns assigned in declaration order; columns are reassigned on
/// every conversion so gradient rows always match the current ndv.
#[derive(Debug, Clone, Default)]
pub struct DesignVariableSet {
    bindings: Vec<Binding>,
    strict: bool,
}

impl DesignVariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// In strict mode an out-of-bounds value is an error instead of being
    /// clamped with a warning.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    fn position(&self, id: &str) -> Result<usize, DesignError> {
        self.bindings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| DesignError::UnknownVariable(id.to_string()))
    }

    pub fn add_fixed(&mut self, id: &str, value: f64) -> Result<(), DesignError> {
        if self.position(id).is_ok() {
            return Err(DesignError::Duplicate(id.to_string()));
        }
        self.bindings.push(Binding {
            id: id.to_string(),
            value,
            kind: Kind::Fixed,
        });
        Ok(())
    }

    pub fn add_design(
        &mut self,
        id: &str,
        value: f64,
        bounds: (f64, f64),
    ) -> Result<(), DesignError> {
        if self.position(id).is_ok() {
            return Err(DesignError::Duplicate(id.to_string()));
        }
        check_bounds(id, bounds)?;
        self.bindings.push(Binding {
            id: id.to_string(),
            value,
            kind: Kind::Design {
                lower: bounds.0,
                upper: bounds.1,
            },
        });
        let pos = self.bindings.len() - 1;
        self.enforce_bounds(pos)
    }

    pub fn convert_to_design(&mut self, id: &str, bounds: (f64, f64)) -> Result<(), DesignError> {
        check_bounds(id, bounds)?;
        let pos = self.position(id)?;
        self.bindings[pos].kind = Kind::Design {
            lower: bounds.0,
            upper: bounds.1,
        };
        self.enforce_bounds(pos)
    }

    pub fn convert_to_fixed(&mut self, id: &str) -> Result<(), DesignError> {
        let pos = self.position(id)?;
        self.bindings[pos].kind = Kind::Fixed;
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, value: f64) -> Result<(), DesignError> {
        let pos = self.position(id)?;
        self.bindings[pos].value = value;
        self.enforce_bounds(pos)
    }

    fn enforce_bounds(&mut self, pos: usize) -> Result<(), DesignError> {
        let b = &mut self.bindings[pos];
        if let Kind::Design { lower, upper } = b.kind {
            if b.value < lower || b.value > upper {
                if self.strict {
                    return Err(DesignError::OutOfBounds {
                        id: b.id.clone(),
                        value: b.value,
                        lower,
                        upper,
                    });
                }
                let clamped = b.value.clamp(lower, upper);
                eprintln!(
                    "WARNING: '{}' value {:.6e} outside bounds [{}, {}], clamped to {:.6e}",
                    b.id, b.value, lower, upper, clamped
                );
                b.value = clamped;
            }
        }
        Ok(())
    }

    /// Number of free design variables.
    pub fn ndv(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| matches!(b.kind, Kind::Design { .. }))
            .count()
    }

    /// Column index of a free variable in the design vector.
    pub fn dv_index(&self, id: &str) -> Result<usize, DesignError> {
        let pos = self.position(id)?;
        if !matches!(self.bindings[pos].kind, Kind::Design { .. }) {
            return Err(DesignError::UnknownVariable(id.to_string()));
        }
        Ok(self.bindings[..pos]
            .iter()
            .filter(|b| matches!(b.kind, Kind::Design { .. }))
            .count())
    }

    pub fn raw_value(&self, id: &str) -> Result<f64, DesignError> {
        Ok(self.bindings[self.position(id)?].value)
    }

    /// Value with its gradient row: a unit basis vector for a free variable,
    /// a zero row for a fixed parameter.
    pub fn value(&self, id: &str) -> Result<Grad, DesignError> {
        let pos = self.position(id)?;
        let ndv = self.ndv();
        let b = &self.bindings[pos];
        match b.kind {
            Kind::Fixed => Ok(Grad::constant(b.value, ndv)),
            Kind::Design { .. } => {
                let idx = self.dv_index(id)?;
                Ok(Grad::basis(b.value, ndv, idx))
            }
        }
    }

    pub fn dv_ids(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|b| matches!(b.kind, Kind::Design { .. }))
            .map(|b| b.id.as_str())
            .collect()
    }

    pub fn dv_vector(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.ndv(),
            self.bindings
                .iter()
                .filter(|b| matches!(b.kind, Kind::Design { .. }))
                .map(|b| b.value),
        )
    }

    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.bindings
            .iter()
            .filter_map(|b| match b.kind {
                Kind::Design { lower, upper } => Some((lower, upper)),
                Kind::Fixed => None,
            })
            .collect()
    }

    /// Affine map of each free variable onto [0, 1] from its bounds.
    pub fn normalized_vector(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.ndv(),
            self.bindings.iter().filter_map(|b| match b.kind {
                Kind::Design { lower, upper } => Some((b.value - lower) / (upper - lower)),
                Kind::Fixed => None,
            }),
        )
    }

    pub fn set_from_vector(&mut self, x: &[f64]) -> Result<(), DesignError> {
        let ndv = self.ndv();
        if x.len() != ndv {
            return Err(DesignError::DimensionMismatch {
                got: x.len(),
                expected: ndv,
            });
        }
        let free: Vec<usize> = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b.kind, Kind::Design { .. }))
            .map(|(i, _)| i)
            .collect();
        for (pos, &v) in free.iter().zip(x.iter()) {
            self.bindings[*pos].value = v;
            self.enforce_bounds(*pos)?;
        }
        Ok(())
    }

    pub fn set_from_normalized(&mut self, x: &[f64]) -> Result<(), DesignError> {
        let ndv = self.ndv();
        if x.len() != ndv {
            return Err(DesignError::DimensionMismatch {
                got: x.len(),
                expected: ndv,
            });
        }
        let physical: Vec<f64> = self
            .bindings
            .iter()
            .filter_map(|b| match b.kind {
                Kind::Design { lower, upper } => Some((lower, upper)),
                Kind::Fixed => None,
            })
            .zip(x.iter())
            .map(|((lower, upper), &n)| lower + n * (upper - lower))
            .collect();
        self.set_from_vector(&physical)
    }
}

fn check_bounds(id: &str, bounds: (f64, f64)) -> Result<(), DesignError> {
    if bounds.0 >= bounds.1 {
        return Err(DesignError::InvalidBounds {
            id: id.to_string(),
            lower: bounds.0,
            upper: bounds.1,
        });
    }
    Ok(())
}
