//! Small GF(2^8) polynomial abstraction shared by the Reed-Solomon encoder
//! and decoder.
//!
//! Kept deliberately minimal: `create`, `degree`, `coefficient`, `add`,
//! `multiply_scalar`, `multiply_by_monomial`, `evaluate`, `inv` are the only
//! operations the CIRC code needs, mirroring the set the donor reference
//! implementation used for Berlekamp-Massey and the Forney syndrome fold.
//!
//! `evaluate` is implemented with direct Horner's-method summation rather
//! than routed through any cached/sentinel coefficient representation: the
//! reference implementation this spec is modeled on was known to mis-evaluate
//! degenerate syndromes when a stored parity byte was zero, and a bare
//! `sum c_i * alpha^(i*k)` sidesteps that class of bug entirely.

use crate::gf256::{field, Gf256};

/// A polynomial over GF(2^8), coefficients stored low-degree first
/// (`coeffs[i]` is the coefficient of `x^i`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<Gf256>,
}

impl Poly {
    /// Build a polynomial from low-degree-first coefficients.
    pub fn create(coeffs: Vec<Gf256>) -> Poly {
        let mut p = Poly { coeffs };
        p.trim();
        p
    }

    /// The zero polynomial.
    pub fn zero() -> Poly {
        Poly { coeffs: vec![] }
    }

    /// The constant polynomial `1`.
    pub fn one() -> Poly {
        Poly { coeffs: vec![Gf256(1)] }
    }

    fn trim(&mut self) {
        while matches!(self.coeffs.last(), Some(Gf256(0))) {
            self.coeffs.pop();
        }
    }

    /// Degree of the polynomial, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        if self.coeffs.is_empty() {
            None
        } else {
            Some(self.coeffs.len() - 1)
        }
    }

    /// Coefficient of `x^i`, or zero if `i` is beyond the stored degree.
    pub fn coefficient(&self, i: usize) -> Gf256 {
        self.coeffs.get(i).copied().unwrap_or(Gf256(0))
    }

    /// `self + other` (identical to subtraction in characteristic 2).
    pub fn add(&self, other: &Poly) -> Poly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(len);

        for i in 0..len {
            out.push(field().add(self.coefficient(i), other.coefficient(i)));
        }

        Poly::create(out)
    }

    /// `self * scalar`.
    pub fn multiply_scalar(&self, scalar: Gf256) -> Poly {
        if scalar.0 == 0 {
            return Poly::zero();
        }

        Poly::create(self.coeffs.iter().map(|&c| field().mul(c, scalar)).collect())
    }

    /// `self * x^degree` (a left shift by `degree` coefficients).
    pub fn multiply_by_monomial(&self, degree: usize) -> Poly {
        if self.coeffs.is_empty() {
            return Poly::zero();
        }

        let mut out = vec![Gf256(0); degree];
        out.extend_from_slice(&self.coeffs);

        Poly::create(out)
    }

    /// `self * other`, full polynomial multiplication.
    pub fn multiply(&self, other: &Poly) -> Poly {
        if self.coeffs.is_empty() || other.coeffs.is_empty() {
            return Poly::zero();
        }

        let mut out = vec![Gf256(0); self.coeffs.len() + other.coeffs.len() - 1];

        for (i, &a) in self.coeffs.iter().enumerate() {
            if a.0 == 0 {
                continue;
            }
            for (j, &b) in other.coeffs.iter().enumerate() {
                out[i + j] = field().add(out[i + j], field().mul(a, b));
            }
        }

        Poly::create(out)
    }

    /// Evaluate `self` at `x` using direct Horner summation:
    /// `sum_i coeffs[i] * x^i`, computed term by term rather than via
    /// repeated Horner multiplication, so a zero leading/trailing
    /// coefficient never perturbs the result.
    pub fn evaluate(&self, x: Gf256) -> Gf256 {
        let f = field();
        let mut acc = Gf256(0);

        if x.0 == 0 {
            return self.coefficient(0);
        }

        let lx = f.log(x).unwrap() as usize;

        for (i, &c) in self.coeffs.iter().enumerate() {
            if c.0 == 0 {
                continue;
            }
            acc = f.add(acc, f.mul(c, f.exp(lx * i)));
        }

        acc
    }

    /// Raw coefficients, low-degree first.
    pub fn coeffs(&self) -> &[Gf256] {
        &self.coeffs
    }
}

impl Default for Poly {
    fn default() -> Self {
        Poly::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn evaluate_zero_coefficient_is_harmless() {
        // x^2 with a zero constant and zero linear term: evaluate at alpha^1.
        let p = Poly::create(vec![Gf256(0), Gf256(0), Gf256(1)]);
        let f = field();
        let x = f.exp(1);
        assert_eq!(p.evaluate(x), f.mul(x, x));
    }

    #[test]
    fn add_is_its_own_inverse() {
        let a = Poly::create(vec![Gf256(1), Gf256(2), Gf256(3)]);
        let b = Poly::create(vec![Gf256(9), Gf256(8)]);

        let sum = a.add(&b);
        assert_eq!(sum.add(&b), a);
    }

    #[test]
    fn multiply_by_monomial_shifts() {
        let a = Poly::create(vec![Gf256(5), Gf256(6)]);
        let shifted = a.multiply_by_monomial(2);

        assert_eq!(shifted.coefficient(0), Gf256(0));
        assert_eq!(shifted.coefficient(1), Gf256(0));
        assert_eq!(shifted.coefficient(2), Gf256(5));
        assert_eq!(shifted.coefficient(3), Gf256(6));
    }
}
