use nalgebra::DVector;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar carrying its derivative row with respect to the full design
/// vector. Forward-mode differentiation stored explicitly: every arithmetic
/// operation propagates the gradient row alongside the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Grad {
    pub val: f64,
    pub grad: DVector<f64>,
}

impl Grad {
    /// A quantity that does not depend on any design variable.
    pub fn constant(val: f64, ndv: usize) -> Self {
        Self {
            val,
            grad: DVector::zeros(ndv),
        }
    }

    /// A design variable itself: unit gradient at its own column.
    pub fn basis(val: f64, ndv: usize, index: usize) -> Self {
        let mut grad = DVector::zeros(ndv);
        grad[index] = 1.0;
        Self { val, grad }
    }

    pub fn ndv(&self) -> usize {
        self.grad.len()
    }

    /// Multiply by a plain scalar (no gradient of its own).
    pub fn scale(&self, f: f64) -> Self {
        Self {
            val: self.val * f,
            grad: &self.grad * f,
        }
    }

    pub fn sin(&self) -> Self {
        Self {
            val: self.val.sin(),
            grad: &self.grad * self.val.cos(),
        }
    }

    pub fn cos(&self) -> Self {
        Self {
            val: self.val.cos(),
            grad: &self.grad * -self.val.sin(),
        }
    }

    pub fn sqrt(&self) -> Self {
        let s = self.val.sqrt();
        Self {
            val: s,
            grad: &self.grad * (0.5 / s),
        }
    }

    pub fn powi(&self, n: i32) -> Self {
        Self {
            val: self.val.powi(n),
            grad: &self.grad * (f64::from(n) * self.val.powi(n - 1)),
        }
    }

    pub fn powf(&self, p: f64) -> Self {
        Self {
            val: self.val.powf(p),
            grad: &self.grad * (p * self.val.powf(p - 1.0)),
        }
    }

    pub fn recip(&self) -> Self {
        let inv = 1.0 / self.val;
        Self {
            val: inv,
            grad: &self.grad * (-inv * inv),
        }
    }
}

impl Add for &Grad {
    type Output = Grad;
    fn add(self, rhs: &Grad) -> Grad {
        Grad {
            val: self.val + rhs.val,
            grad: &self.grad + &rhs.grad,
        }
    }
}

impl Sub for &Grad {
    type Output = Grad;
    fn sub(self, rhs: &Grad) -> Grad {
        Grad {
            val: self.val - rhs.val,
            grad: &self.grad - &rhs.grad,
        }
    }
}

impl Mul for &Grad {
    type Output = Grad;
    fn mul(self, rhs: &Grad) -> Grad {
        Grad {
            val: self.val * rhs.val,
            grad: &self.grad * rhs.val + &rhs.grad * self.val,
        }
    }
}

impl Div for &Grad {
    type Output = Grad;
    fn div(self, rhs: &Grad) -> Grad {
        // quotient rule: (u'v - uv') / v^2
        Grad {
            val: self.val / rhs.val,
            grad: (&self.grad * rhs.val - &rhs.grad * self.val) / (rhs.val * rhs.val),
        }
    }
}

impl Neg for &Grad {
    type Output = Grad;
    fn neg(self) -> Grad {
        Grad {
            val: -self.val,
            grad: -&self.grad,
        }
    }
}

impl Add for Grad {
    type Output = Grad;
    fn add(self, rhs: Grad) -> Grad {
        &self + &rhs
    }
}

impl Sub for Grad {
    type Output = Grad;
    fn sub(self, rhs: Grad) -> Grad {
        &self - &rhs
    }
}

impl Mul for Grad {
    type Output = Grad;
    fn mul(self, rhs: Grad) -> Grad {
        &self * &rhs
    }
}

impl Div for Grad {
    type Output = Grad;
    fn div(self, rhs: Grad) -> Grad {
        &self / &rhs
    }
}

impl Neg for Grad {
    type Output = Grad;
    fn neg(self) -> Grad {
        -&self
    }
}

impl Add<&Grad> for Grad {
    type Output = Grad;
    fn add(self, rhs: &Grad) -> Grad {
        &self + rhs
    }
}

impl Sub<&Grad> for Grad {
    type Output = Grad;
    fn sub(self, rhs: &Grad) -> Grad {
        &self - rhs
    }
}

impl Mul<&Grad> for Grad {
    type Output = Grad;
    fn mul(self, rhs: &Grad) -> Grad {
        &self * rhs
    }
}

impl Div<&Grad> for Grad {
    type Output = Grad;
    fn div(self, rhs: &Grad) -> Grad {
        &self / rhs
    }
}

impl Add<f64> for &Grad {
    type Output = Grad;
    fn add(self, rhs: f64) -> Grad {
        Grad {
            val: self.val + rhs,
            grad: self.grad.clone(),
        }
    }
}

impl Sub<f64> for &Grad {
    type Output = Grad;
    fn sub(self, rhs: f64) -> Grad {
        Grad {
            val: self.val - rhs,
            grad: self.grad.clone(),
        }
    }
}

impl Mul<f64> for &Grad {
    type Output = Grad;
    fn mul(self, rhs: f64) -> Grad {
        self.scale(rhs)
    }
}

impl Div<f64> for &Grad {
    type Output = Grad;
    fn div(self, rhs: f64) -> Grad {
        self.scale(1.0 / rhs)
    }
}
