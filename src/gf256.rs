//! Arithmetic in GF(2^8) with the primitive polynomial used by the Red Book
//! CIRC code: x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
//!
//! Addition and subtraction in this field are both XOR; multiplication and
//! division are implemented through `exp`/`log` tables built once at
//! startup. `0` has no logarithm: callers that need `log(0)` have made a
//! mistake and get `None` rather than a panic, since table lookups here sit
//! on the hot path of both Reed-Solomon encoders.

/// Primitive polynomial for GF(2^8), as used throughout the CD Red Book.
pub const PRIMITIVE_POLY: u16 = 0x11D;

/// A single element of GF(2^8). Thin enough to be `Copy` everywhere.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Gf256(pub u8);

/// Precomputed `exp`/`log` tables for GF(2^8).
///
/// `exp` is doubled to 0..=509 so that `exp(a + b)` never needs a `% 255`
/// on the hot path; `log[0]` is unused (stored as 0) since 0 has no
/// logarithm.
pub struct Tables {
    exp: [u8; 510],
    log: [u8; 256],
}

/// The GF(2^8) field, parameterized by its exp/log tables.
///
/// Built once (see [`field`]) and shared by reference everywhere; the
/// tables are immutable after construction so sharing across threads is
/// safe without synchronization.
pub struct Field {
    tables: Tables,
}

impl Field {
    /// Build the exp/log tables for [`PRIMITIVE_POLY`].
    fn new() -> Field {
        let mut exp = [0u8; 510];
        let mut log = [0u8; 256];

        let mut x: u16 = 1;
        for i in 0..255usize {
            exp[i] = x as u8;
            log[x as usize] = i as u8;

            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLY;
            }
        }

        // Double up so callers can index with sums up to 2*254 without a
        // modulo.
        for i in 255..510 {
            exp[i] = exp[i - 255];
        }

        Field { tables: Tables { exp, log } }
    }

    /// `a + b` and `a - b` (identical in characteristic 2).
    pub fn add(&self, a: Gf256, b: Gf256) -> Gf256 {
        Gf256(a.0 ^ b.0)
    }

    /// Alias for [`Field::add`]; subtraction is addition in GF(2^n).
    pub fn sub(&self, a: Gf256, b: Gf256) -> Gf256 {
        self.add(a, b)
    }

    /// `a * b`. Returns `Gf256(0)` if either operand is zero.
    pub fn mul(&self, a: Gf256, b: Gf256) -> Gf256 {
        if a.0 == 0 || b.0 == 0 {
            return Gf256(0);
        }

        let la = self.tables.log[a.0 as usize] as usize;
        let lb = self.tables.log[b.0 as usize] as usize;

        Gf256(self.tables.exp[la + lb])
    }

    /// `1 / a`. `inv(0)` is a programming error; the caller must check for
    /// zero beforehand, as the spec mandates.
    pub fn inv(&self, a: Gf256) -> Gf256 {
        assert!(a.0 != 0, "Gf256::inv(0) is undefined");

        let la = self.tables.log[a.0 as usize] as usize;

        Gf256(self.tables.exp[255 - la])
    }

    /// `a / b`.
    pub fn div(&self, a: Gf256, b: Gf256) -> Gf256 {
        self.mul(a, self.inv(b))
    }

    /// `alpha^i`, the canonical generator raised to `i`. `i` is taken
    /// modulo 255 implicitly by the doubled table, so negative-looking
    /// wraparounds (i up to ~508) are fine without an explicit modulo.
    pub fn exp(&self, i: usize) -> Gf256 {
        Gf256(self.tables.exp[i % 255])
    }

    /// `log_alpha(a)`. `None` if `a == 0`, since 0 has no logarithm.
    pub fn log(&self, a: Gf256) -> Option<u8> {
        if a.0 == 0 {
            None
        } else {
            Some(self.tables.log[a.0 as usize])
        }
    }
}

/// Lazily-built, process-wide GF(2^8) tables.
///
/// The tables are immutable once constructed, so a single shared instance
/// is safe to use from any thread.
pub fn field() -> &'static Field {
    use std::sync::OnceLock;
    static FIELD: OnceLock<Field> = OnceLock::new();
    FIELD.get_or_init(Field::new)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exp_log_are_inverses() {
        let f = field();

        for b in 1..=255u8 {
            let a = Gf256(b);
            let l = f.log(a).unwrap();
            assert_eq!(f.exp(l as usize), a);
        }
    }

    #[test]
    fn mul_by_zero_is_zero() {
        let f = field();

        assert_eq!(f.mul(Gf256(0), Gf256(200)), Gf256(0));
        assert_eq!(f.mul(Gf256(200), Gf256(0)), Gf256(0));
    }

    #[test]
    fn mul_is_commutative_and_has_identity() {
        let f = field();

        for a in 1..=255u8 {
            for b in [1u8, 2, 3, 200, 255] {
                assert_eq!(f.mul(Gf256(a), Gf256(b)), f.mul(Gf256(b), Gf256(a)));
            }
            assert_eq!(f.mul(Gf256(a), Gf256(1)), Gf256(a));
        }
    }

    #[test]
    fn inv_round_trips() {
        let f = field();

        for b in 1..=255u8 {
            let a = Gf256(b);
            let inv = f.inv(a);
            assert_eq!(f.mul(a, inv), Gf256(1));
        }
    }

    #[test]
    fn add_is_xor_and_self_inverse() {
        let f = field();

        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(f.add(Gf256(a), Gf256(b)).0, a ^ b);
            }
            assert_eq!(f.add(Gf256(a), Gf256(a)), Gf256(0));
        }
    }
}
