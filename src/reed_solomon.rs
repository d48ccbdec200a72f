//! Reed-Solomon encoding and decode-side diagnostics for the CIRC code.
//!
//! Three encoding paths are provided, matching the three call sites in the
//! CIRC frame:
//!
//! - [`encode_generic`]: a textbook systematic encoder (generator built
//!   from roots `alpha^0..alpha^{r-1}`, parity appended at the end of the
//!   codeword). Generator polynomials are cached by parity count.
//! - [`encode_c1`]: specialized `(32,28)` encoder, parity at the end.
//! - [`encode_c2`]: specialized `(28,24)` encoder, parity in the *middle*
//!   of the codeword (the four parity bytes occupy positions 12..16 of the
//!   28-symbol virtual codeword, with the first 12 message bytes at
//!   positions 0..12 and the last 12 at positions 16..28). A pure
//!   polynomial-division remainder can only ever produce end-of-codeword
//!   parity, so this is solved instead as a small linear system over the
//!   known codeword positions — see [`PositionedEncoder`].
//!
//! Decode-side helpers (syndromes, Forney-modified syndromes,
//! Berlekamp-Massey, Chien search) are provided for diagnostics; applying
//! corrections is out of scope (see `circ::decoder`).

use crate::gf256::{field, Gf256};
use crate::poly::Poly;

/// Number of parity bytes in both the C1 and C2 codes.
pub const NUM_PARITY: usize = 4;

/// Cache of systematic-RS generator polynomials, keyed by parity count
/// (`0..=32`, matching the CIRC frame's largest codeword).
///
/// A fixed-size array of `Option<Poly>` is sufficient since the key space is
/// tiny and known at compile time.
pub struct GeneratorCache {
    cache: [Option<Poly>; 33],
}

impl GeneratorCache {
    fn new() -> GeneratorCache {
        GeneratorCache { cache: std::array::from_fn(|_| None) }
    }

    fn get_or_build(&mut self, num_parity: usize) -> &Poly {
        if self.cache[num_parity].is_none() {
            self.cache[num_parity] = Some(build_generator(num_parity));
        }

        self.cache[num_parity].as_ref().unwrap()
    }
}

fn build_generator(num_parity: usize) -> Poly {
    let f = field();
    let mut g = Poly::one();

    for i in 0..num_parity {
        // (x - alpha^i), and since we're in characteristic 2, -alpha^i == alpha^i.
        let root = Poly::create(vec![f.exp(i), Gf256(1)]);
        g = g.multiply(&root);
    }

    g
}

fn generator_cache() -> &'static std::sync::Mutex<GeneratorCache> {
    use std::sync::OnceLock;
    static CACHE: OnceLock<std::sync::Mutex<GeneratorCache>> = OnceLock::new();
    CACHE.get_or_init(|| std::sync::Mutex::new(GeneratorCache::new()))
}

/// Generic systematic Reed-Solomon encoder: `message` (most-significant
/// symbol first) is shifted up by `num_parity` symbols and reduced modulo
/// the cached generator; the remainder is the parity, appended to the end
/// of `message`.
pub fn encode_generic(message: &[u8], num_parity: usize) -> Vec<u8> {
    let cache = generator_cache();
    let mut cache = cache.lock().unwrap();
    let generator = cache.get_or_build(num_parity);

    // Message polynomial, high-degree-first symbol order turned into our
    // low-degree-first `Poly` representation, shifted left by num_parity.
    let msg_coeffs: Vec<Gf256> =
        message.iter().rev().map(|&b| Gf256(b)).collect();
    let shifted = Poly::create(msg_coeffs).multiply_by_monomial(num_parity);

    let remainder = poly_rem(&shifted, generator);

    let mut parity = vec![0u8; num_parity];
    for (i, slot) in parity.iter_mut().enumerate() {
        // remainder is low-degree-first; parity is emitted high-degree
        // first to match the systematic convention (first parity byte is
        // the highest-degree remainder coefficient).
        *slot = remainder.coefficient(num_parity - 1 - i).0;
    }

    parity
}

/// Polynomial long division remainder, `dividend mod divisor`.
fn poly_rem(dividend: &Poly, divisor: &Poly) -> Poly {
    let f = field();
    let dvd_deg = match dividend.degree() {
        Some(d) => d,
        None => return Poly::zero(),
    };
    let dvs_deg = divisor.degree().expect("division by zero polynomial");

    let mut remainder: Vec<Gf256> = (0..=dvd_deg).map(|i| dividend.coefficient(i)).collect();
    let dvs_lead = divisor.coefficient(dvs_deg);
    let dvs_lead_inv = f.inv(dvs_lead);

    for i in (dvs_deg..=dvd_deg).rev() {
        let coeff = remainder[i];
        if coeff.0 == 0 {
            continue;
        }

        let factor = f.mul(coeff, dvs_lead_inv);

        for j in 0..=dvs_deg {
            let idx = i - dvs_deg + j;
            remainder[idx] = f.add(remainder[idx], f.mul(factor, divisor.coefficient(j)));
        }
    }

    Poly::create(remainder[..dvs_deg].to_vec())
}

/// An encoder for a systematic RS codeword whose message and parity
/// symbols occupy arbitrary, fixed positions (as opposed to the
/// contiguous "message then parity" layout of [`encode_generic`]).
///
/// Used to place C2's four parity bytes in the middle of its codeword.
/// Internally this solves, once, the small linear system that the parity
/// positions must satisfy for the whole codeword to be a root of
/// `alpha^0..alpha^{r-1}`, then caches a per-message-position contribution
/// row so that encoding is a straight sum of per-byte multiplies — the same
/// shape as the matrix form the spec describes (`c1s`/`c2s`).
pub struct PositionedEncoder {
    /// `rows[i][k]` is the GF(2^8) coefficient that message byte `i`
    /// contributes to parity index `k`.
    rows: Vec<[Gf256; NUM_PARITY]>,
}

impl PositionedEncoder {
    /// Build an encoder for a codeword where message bytes sit at
    /// `data_positions` (in message order) and the `NUM_PARITY` parity
    /// bytes sit at `parity_positions`. Roots used are `alpha^0..alpha^{r-1}`.
    pub fn new(data_positions: &[usize], parity_positions: [usize; NUM_PARITY]) -> PositionedEncoder {
        let f = field();

        // M[j][k] = alpha^(parity_positions[k] * j), j,k = 0..NUM_PARITY
        let mut m = [[Gf256(0); NUM_PARITY]; NUM_PARITY];
        for j in 0..NUM_PARITY {
            for k in 0..NUM_PARITY {
                m[j][k] = f.exp(parity_positions[k] * j);
            }
        }

        let inv_m = invert_matrix(m);

        let rows = data_positions
            .iter()
            .map(|&pos| {
                let mut row = [Gf256(0); NUM_PARITY];
                for k in 0..NUM_PARITY {
                    let mut acc = Gf256(0);
                    for j in 0..NUM_PARITY {
                        acc = f.add(acc, f.mul(inv_m[k][j], f.exp(pos * j)));
                    }
                    row[k] = acc;
                }
                row
            })
            .collect();

        PositionedEncoder { rows }
    }

    /// Compute the `NUM_PARITY` parity bytes for `message` (same order as
    /// the `data_positions` the encoder was built with).
    pub fn encode(&self, message: &[u8]) -> [u8; NUM_PARITY] {
        assert_eq!(message.len(), self.rows.len(), "message length mismatch");

        let f = field();
        let mut parity = [Gf256(0); NUM_PARITY];

        for (&byte, row) in message.iter().zip(self.rows.iter()) {
            if byte == 0 {
                continue;
            }
            let m = Gf256(byte);
            for k in 0..NUM_PARITY {
                parity[k] = f.add(parity[k], f.mul(m, row[k]));
            }
        }

        [parity[0].0, parity[1].0, parity[2].0, parity[3].0]
    }

    /// Compute only parity byte `index` (`0..NUM_PARITY`) for `message`.
    ///
    /// Used by the CIRC encoder, which gathers a distinct time-skewed
    /// message per parity byte rather than a single shared message for the
    /// whole codeword (each C2 parity check samples the interleaved data at
    /// its own delay) — see `circ::encoder`.
    pub fn encode_index(&self, message: &[u8], index: usize) -> u8 {
        assert_eq!(message.len(), self.rows.len(), "message length mismatch");

        let f = field();
        let mut parity = Gf256(0);

        for (&byte, row) in message.iter().zip(self.rows.iter()) {
            if byte == 0 {
                continue;
            }
            parity = f.add(parity, f.mul(Gf256(byte), row[index]));
        }

        parity.0
    }
}

/// Invert a `NUM_PARITY x NUM_PARITY` GF(2^8) matrix via Gauss-Jordan
/// elimination. The matrices this module builds are always Vandermonde
/// matrices over distinct nonzero points, hence always invertible.
fn invert_matrix(m: [[Gf256; NUM_PARITY]; NUM_PARITY]) -> [[Gf256; NUM_PARITY]; NUM_PARITY] {
    let f = field();
    const N: usize = NUM_PARITY;

    let mut a = m;
    let mut inv = [[Gf256(0); N]; N];
    for i in 0..N {
        inv[i][i] = Gf256(1);
    }

    for col in 0..N {
        let pivot_row = (col..N).find(|&r| a[r][col].0 != 0).expect("singular matrix");

        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot_inv = f.inv(a[col][col]);
        for j in 0..N {
            a[col][j] = f.mul(a[col][j], pivot_inv);
            inv[col][j] = f.mul(inv[col][j], pivot_inv);
        }

        for row in 0..N {
            if row == col || a[row][col].0 == 0 {
                continue;
            }
            let factor = a[row][col];
            for j in 0..N {
                a[row][j] = f.add(a[row][j], f.mul(factor, a[col][j]));
                inv[row][j] = f.add(inv[row][j], f.mul(factor, inv[col][j]));
            }
        }
    }

    inv
}

fn c1_encoder() -> &'static PositionedEncoder {
    use std::sync::OnceLock;
    static ENC: OnceLock<PositionedEncoder> = OnceLock::new();
    ENC.get_or_init(|| {
        // Parity at the end: positions 28..32, data at 0..28.
        let data_positions: Vec<usize> = (0..28).collect();
        PositionedEncoder::new(&data_positions, [28, 29, 30, 31])
    })
}

fn c2_encoder() -> &'static PositionedEncoder {
    use std::sync::OnceLock;
    static ENC: OnceLock<PositionedEncoder> = OnceLock::new();
    ENC.get_or_init(|| {
        // Parity in the middle: data at {0..12} U {16..28}, parity at 12..16.
        let data_positions: Vec<usize> = (0..12).chain(16..28).collect();
        PositionedEncoder::new(&data_positions, [12, 13, 14, 15])
    })
}

/// Specialized C1 (32,28) encoder. `message` MUST be exactly 28 bytes
/// (feeding any other length is a programming error). Parity goes at the
/// end of the 32-symbol codeword.
pub fn encode_c1(message: &[u8]) -> [u8; NUM_PARITY] {
    assert_eq!(message.len(), 28, "C1 requires exactly 28 input bytes");
    c1_encoder().encode(message)
}

/// Specialized C2 (28,24) encoder. `message` MUST be exactly 24 bytes
/// (feeding any other length is a programming error). Parity goes in the
/// middle of the 28-symbol codeword (conceptually, positions 12..16).
pub fn encode_c2(message: &[u8]) -> [u8; NUM_PARITY] {
    assert_eq!(message.len(), 24, "C2 requires exactly 24 input bytes");
    c2_encoder().encode(message)
}

/// Compute a single C2 parity byte (`index` in `0..NUM_PARITY`) for a
/// 24-byte message gathered at that parity index's own time-skew. See
/// [`PositionedEncoder::encode_index`].
pub fn encode_c2_index(message: &[u8], index: usize) -> u8 {
    assert_eq!(message.len(), 24, "C2 requires exactly 24 input bytes");
    c2_encoder().encode_index(message, index)
}

/// Syndrome vector `S_k = sum_i codeword[i] * alpha^(i*k)` for
/// `k = 0..NUM_PARITY`, i.e. the codeword polynomial evaluated at
/// `alpha^0..alpha^{NUM_PARITY-1}`.
///
/// `codeword` is given low-index-first (position 0 first), matching the
/// positions used when building the encoders above. All zero means no
/// detected error.
pub fn syndromes(codeword: &[u8]) -> [Gf256; NUM_PARITY] {
    let f = field();
    let mut s = [Gf256(0); NUM_PARITY];

    for k in 0..NUM_PARITY {
        let root = f.exp(k);
        let mut acc = Gf256(0);
        // Horner from the highest-position symbol down, evaluating the
        // codeword as a polynomial in its position index.
        for &byte in codeword.iter().rev() {
            acc = f.add(f.mul(acc, root), Gf256(byte));
        }
        s[k] = acc;
    }

    s
}

/// `true` if all syndromes are zero, i.e. the codeword is (as far as this
/// parity can tell) error-free.
pub fn syndromes_are_zero(s: &[Gf256; NUM_PARITY]) -> bool {
    s.iter().all(|c| c.0 == 0)
}

/// One erasure: a codeword position known (from side information, e.g. an
/// EFM decode failure) to be unreliable.
#[derive(Clone, Copy, Debug)]
pub struct Erasure {
    /// Position within the codeword (same indexing as [`syndromes`]).
    pub position: usize,
}

/// Fold known erasure locations into Forney-modified syndromes.
///
/// This follows the standard construction: the erasure locator polynomial
/// `Gamma(x) = prod (1 - X_i x)` (with `X_i = alpha^{position_i}`) is
/// convolved with the syndrome polynomial; Berlekamp-Massey is then run on
/// the *modified* syndromes to find only the additional, unknown error
/// locations.
pub fn forney_syndromes(s: &[Gf256; NUM_PARITY], erasures: &[Erasure]) -> Poly {
    let f = field();
    let mut gamma = Poly::one();

    for e in erasures {
        let xi = f.exp(e.position);
        let factor = Poly::create(vec![Gf256(1), xi]);
        gamma = gamma.multiply(&factor);
    }

    let syn_poly = Poly::create(s.to_vec());
    let product = gamma.multiply(&syn_poly);

    // Keep only the terms Berlekamp-Massey needs (same degree as the
    // original syndrome vector).
    Poly::create((0..NUM_PARITY).map(|i| product.coefficient(i)).collect())
}

/// Berlekamp-Massey: compute the error-locator polynomial `Lambda(x)` for
/// the given syndrome sequence. Returns `Lambda(x) = 1` (no errors) when
/// `syndromes` are all zero.
pub fn berlekamp_massey(syndromes: &[Gf256]) -> Poly {
    let f = field();

    let mut c = Poly::one(); // current LFSR connection polynomial
    let mut b = Poly::one(); // previous connection polynomial before last discrepancy
    let mut l = 0usize; // current LFSR length
    let mut m = 1usize; // steps since last discrepancy update
    let mut prev_discrepancy = Gf256(1);

    for n in 0..syndromes.len() {
        // discrepancy = syndromes[n] + sum_{i=1}^{l} c_i * syndromes[n-i]
        let mut delta = syndromes[n];
        for i in 1..=l {
            delta = f.add(delta, f.mul(c.coefficient(i), syndromes[n - i]));
        }

        if delta.0 == 0 {
            m += 1;
        } else if 2 * l <= n {
            let t = c.clone();
            let scale = f.mul(delta, f.inv(prev_discrepancy));
            let correction = b.multiply_by_monomial(m).multiply_scalar(scale);
            c = c.add(&correction);
            l = n + 1 - l;
            b = t;
            prev_discrepancy = delta;
            m = 1;
        } else {
            let scale = f.mul(delta, f.inv(prev_discrepancy));
            let correction = b.multiply_by_monomial(m).multiply_scalar(scale);
            c = c.add(&correction);
            m += 1;
        }
    }

    c
}

/// Chien search: evaluate `lambda` at `alpha^{-i}` for `i` in `0..search_width`
/// (equivalently at `alpha^{255-i}`) and report the positions `i` that are
/// roots, i.e. likely error locations.
pub fn chien_search(lambda: &Poly, search_width: usize) -> Vec<usize> {
    let f = field();
    let mut positions = Vec::new();

    for i in 0..search_width {
        // Root at alpha^{-i} means codeword position i is an error locus
        // (X_i = alpha^i is the reciprocal root of lambda).
        let x = f.exp((255 - (i % 255)) % 255);
        if lambda.evaluate(x).0 == 0 {
            positions.push(i);
        }
    }

    positions
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generic_zero_message_has_zero_parity() {
        let parity = encode_generic(&[0u8; 28], NUM_PARITY);
        assert!(parity.iter().all(|&b| b == 0));
    }

    #[test]
    fn c1_zero_message_has_zero_parity() {
        let parity = encode_c1(&[0u8; 28]);
        assert_eq!(parity, [0, 0, 0, 0]);
    }

    #[test]
    fn c2_zero_message_has_zero_parity() {
        let parity = encode_c2(&[0u8; 24]);
        assert_eq!(parity, [0, 0, 0, 0]);
    }

    #[test]
    fn c1_parity_gives_zero_syndromes() {
        let msg: Vec<u8> = (0..28).map(|i| (i * 7 + 3) as u8).collect();
        let parity = encode_c1(&msg);

        let mut codeword = msg.clone();
        codeword.extend_from_slice(&parity);

        let s = syndromes(&codeword);
        assert!(syndromes_are_zero(&s));
    }

    #[test]
    fn c2_parity_gives_zero_syndromes() {
        let msg: Vec<u8> = (0..24).map(|i| (i * 11 + 5) as u8).collect();
        let parity = encode_c2(&msg);

        // Assemble the 28-symbol virtual codeword: data[0..12], parity, data[12..24].
        let mut codeword = Vec::with_capacity(28);
        codeword.extend_from_slice(&msg[0..12]);
        codeword.extend_from_slice(&parity);
        codeword.extend_from_slice(&msg[12..24]);

        let s = syndromes(&codeword);
        assert!(syndromes_are_zero(&s));
    }

    #[test]
    fn c2_linearity() {
        let a: Vec<u8> = (0..24).map(|i| (i * 3 + 1) as u8).collect();
        let b: Vec<u8> = (0..24).map(|i| (i * 5 + 2) as u8).collect();

        let pa = encode_c2(&a);
        let pb = encode_c2(&b);

        let xored: Vec<u8> = a.iter().zip(b.iter()).map(|(&x, &y)| x ^ y).collect();
        let pxor = encode_c2(&xored);

        for k in 0..4 {
            assert_eq!(pxor[k], pa[k] ^ pb[k]);
        }
    }

    #[test]
    fn single_error_is_located_by_berlekamp_massey() {
        let msg: Vec<u8> = (0..28).map(|i| (i * 13 + 9) as u8).collect();
        let parity = encode_c1(&msg);

        let mut codeword = msg.clone();
        codeword.extend_from_slice(&parity);

        // Corrupt a single byte.
        let error_pos = 5;
        codeword[error_pos] ^= 0x42;

        let s = syndromes(&codeword);
        assert!(!syndromes_are_zero(&s));

        let lambda = berlekamp_massey(&s);
        let positions = chien_search(&lambda, codeword.len());

        assert_eq!(positions, vec![error_pos]);
    }

    #[test]
    fn error_free_codeword_has_trivial_locator() {
        let msg: Vec<u8> = (0..24).map(|i| (i * 17 + 1) as u8).collect();
        let parity = encode_c2(&msg);
        let mut codeword = Vec::with_capacity(28);
        codeword.extend_from_slice(&msg[0..12]);
        codeword.extend_from_slice(&parity);
        codeword.extend_from_slice(&msg[12..24]);

        let s = syndromes(&codeword);
        let lambda = berlekamp_massey(&s);

        assert_eq!(lambda, Poly::one());
        assert!(chien_search(&lambda, codeword.len()).is_empty());
    }
}
