//! SHA-256 bit-blaster: encodes the compression function as CNF so a SAT
//! solver can search for preimages (optionally with a reduced round
//! count).
//!
//! Grounded on `original_source/src/sat/register.h` (`Register<N>`, gate
//! constructors, ripple-carry adder) and `src/commands/sha256.cpp` (round
//! constants, message schedule, compression loop).

use crate::cnf::Cnf;
use crate::lit::Lit;

/// A 32-bit register of literals, the bit-blasted analogue of a `u32`.
#[derive(Clone)]
pub struct Reg32 {
    pub bits: [Lit; 32],
}

/// Allocate one fresh variable, growing `cnf`'s variable count and binary
/// adjacency table to match. `compress` allocates on this path continuously,
/// so `cnf.bins` must never lag behind `next_var`.
fn fresh_lit(cnf: &mut Cnf, next_var: &mut u32) -> Lit {
    let v = *next_var;
    *next_var += 1;
    cnf.num_vars = *next_var;
    cnf.bins.resize(cnf.num_lits(), Vec::new());
    Lit::new(v, false)
}

impl Reg32 {
    /// A register of fresh, unconstrained variables.
    pub fn unknown(cnf: &mut Cnf, next_var: &mut u32) -> Reg32 {
        let mut bits = [Lit::undef(); 32];
        for b in bits.iter_mut() {
            *b = fresh_lit(cnf, next_var);
        }
        Reg32 { bits }
    }

    /// A register fixed to a known constant.
    pub fn constant(value: u32) -> Reg32 {
        let mut bits = [Lit::zero(); 32];
        for (i, b) in bits.iter_mut().enumerate() {
            *b = if (value >> i) & 1 == 1 {
                Lit::one()
            } else {
                Lit::zero()
            };
        }
        Reg32 { bits }
    }

    fn gate2(
        cnf: &mut Cnf,
        next_var: &mut u32,
        a: &Reg32,
        b: &Reg32,
        f: impl Fn(&mut Cnf, Lit, Lit, Lit),
    ) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        for i in 0..32 {
            let o = fresh_lit(cnf, next_var);
            f(cnf, o, a.bits[i], b.bits[i]);
            out[i] = o;
        }
        Reg32 { bits: out }
    }

    pub fn and(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32) -> Reg32 {
        Self::gate2(cnf, next_var, a, b, |c, o, x, y| c.add_and(o, x, y))
    }
    pub fn or(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32) -> Reg32 {
        Self::gate2(cnf, next_var, a, b, |c, o, x, y| c.add_or(o, x, y))
    }
    pub fn xor(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32) -> Reg32 {
        Self::gate2(cnf, next_var, a, b, |c, o, x, y| c.add_xor(o, x, y))
    }

    pub fn xor3(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32, c: &Reg32) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        for i in 0..32 {
            let o = fresh_lit(cnf, next_var);
            cnf.add_xor3(o, a.bits[i], b.bits[i], c.bits[i]);
            out[i] = o;
        }
        Reg32 { bits: out }
    }

    pub fn maj(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32, c: &Reg32) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        for i in 0..32 {
            let o = fresh_lit(cnf, next_var);
            cnf.add_maj(o, a.bits[i], b.bits[i], c.bits[i]);
            out[i] = o;
        }
        Reg32 { bits: out }
    }

    pub fn choose(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32, c: &Reg32) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        for i in 0..32 {
            let o = fresh_lit(cnf, next_var);
            cnf.add_choose(o, a.bits[i], b.bits[i], c.bits[i]);
            out[i] = o;
        }
        Reg32 { bits: out }
    }

    pub fn rotr(&self, n: u32) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        for i in 0..32 {
            out[i] = self.bits[(i + n as usize) % 32];
        }
        Reg32 { bits: out }
    }

    pub fn shr(&self, n: u32) -> Reg32 {
        let mut out = [Lit::zero(); 32];
        for i in 0..32 {
            let src = i + n as usize;
            if src < 32 {
                out[i] = self.bits[src];
            }
        }
        Reg32 { bits: out }
    }

    /// Ripple-carry addition mod 2^32: `out = a + b`, full-adder chain
    /// built from the same xor3/maj gates as `register.h`'s `operator+`.
    pub fn add(cnf: &mut Cnf, next_var: &mut u32, a: &Reg32, b: &Reg32) -> Reg32 {
        let mut out = [Lit::undef(); 32];
        let mut carry = Lit::zero();
        for i in 0..32 {
            let s = fresh_lit(cnf, next_var);
            cnf.add_xor3(s, a.bits[i], b.bits[i], carry);
            out[i] = s;

            if i < 31 {
                let c = fresh_lit(cnf, next_var);
                cnf.add_maj(c, a.bits[i], b.bits[i], carry);
                carry = c;
            }
        }
        Reg32 { bits: out }
    }

    /// Force this register to equal a known value, via one binary clause
    /// per bit (both directions of the biconditional, as
    /// `Register::equal` does for a general comparison).
    pub fn fix_to(&self, cnf: &mut Cnf, value: u32) {
        for i in 0..32 {
            let want = (value >> i) & 1 == 1;
            cnf.add_unary(if want { self.bits[i] } else { self.bits[i].neg() });
        }
    }
}

/// The 64 round constants `K` used by SHA-256's compression function.
pub const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x9b05688c, 0x510e527f, 0x1f83d9ab, 0x5be0cd19,
];

fn ep0(cnf: &mut Cnf, nv: &mut u32, x: &Reg32) -> Reg32 {
    let a = x.rotr(2);
    let b = x.rotr(13);
    let c = x.rotr(22);
    Reg32::xor3(cnf, nv, &a, &b, &c)
}
fn ep1(cnf: &mut Cnf, nv: &mut u32, x: &Reg32) -> Reg32 {
    let a = x.rotr(6);
    let b = x.rotr(11);
    let c = x.rotr(25);
    Reg32::xor3(cnf, nv, &a, &b, &c)
}
fn sig0(cnf: &mut Cnf, nv: &mut u32, x: &Reg32) -> Reg32 {
    let a = x.rotr(7);
    let b = x.rotr(18);
    let c = x.shr(3);
    Reg32::xor3(cnf, nv, &a, &b, &c)
}
fn sig1(cnf: &mut Cnf, nv: &mut u32, x: &Reg32) -> Reg32 {
    let a = x.rotr(17);
    let b = x.rotr(19);
    let c = x.shr(10);
    Reg32::xor3(cnf, nv, &a, &b, &c)
}

/// Encode one 512-bit block of SHA-256 compression, for the first
/// `rounds` rounds only (`rounds <= 64`), over `message` (16 message-
/// schedule words) and `state` (8 working-hash words). Returns the 8
/// output words.
pub fn compress(cnf: &mut Cnf, next_var: &mut u32, message: &[Reg32; 16], state: &[Reg32; 8], rounds: u32) -> [Reg32; 8] {
    let mut w: Vec<Reg32> = message.to_vec();
    for t in 16..64usize {
        let s0 = sig0(cnf, next_var, &w[t - 15]);
        let s1 = sig1(cnf, next_var, &w[t - 2]);
        let sum1 = Reg32::add(cnf, next_var, &w[t - 16], &s0);
        let sum2 = Reg32::add(cnf, next_var, &sum1, &w[t - 7]);
        let wt = Reg32::add(cnf, next_var, &sum2, &s1);
        w.push(wt);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = state.clone();

    for t in 0..rounds.min(64) as usize {
        let s1 = ep1(cnf, next_var, &e);
        let ch = Reg32::choose(cnf, next_var, &e, &f, &g);
        let k_t = Reg32::constant(K[t]);
        let temp1 = Reg32::add(cnf, next_var, &h, &s1);
        let temp1 = Reg32::add(cnf, next_var, &temp1, &ch);
        let temp1 = Reg32::add(cnf, next_var, &temp1, &k_t);
        let temp1 = Reg32::add(cnf, next_var, &temp1, &w[t]);

        let s0 = ep0(cnf, next_var, &a);
        let maj = Reg32::maj(cnf, next_var, &a, &b, &c);
        let temp2 = Reg32::add(cnf, next_var, &s0, &maj);

        h = g;
        g = f;
        f = e;
        e = Reg32::add(cnf, next_var, &d, &temp1);
        d = c;
        c = b;
        b = a;
        a = Reg32::add(cnf, next_var, &temp1, &temp2);
    }

    [
        Reg32::add(cnf, next_var, &state[0], &a),
        Reg32::add(cnf, next_var, &state[1], &b),
        Reg32::add(cnf, next_var, &state[2], &c),
        Reg32::add(cnf, next_var, &state[3], &d),
        Reg32::add(cnf, next_var, &state[4], &e),
        Reg32::add(cnf, next_var, &state[5], &f),
        Reg32::add(cnf, next_var, &state[6], &g),
        Reg32::add(cnf, next_var, &state[7], &h),
    ]
}

/// Build a CNF instance searching for a one-block message whose SHA-256
/// (reduced to `rounds` rounds) output has its low `fixed_zero_bits` bits
/// forced to zero — a scaled-down preimage search usable as a solver
/// benchmark.
pub fn build_sha256_instance(rounds: u32, fixed_zero_bits: u32) -> Cnf {
    let mut cnf = Cnf::new(0);
    let mut next_var = 0u32;

    let message: Vec<Reg32> = (0..16).map(|_| Reg32::unknown(&mut cnf, &mut next_var)).collect();
    let message: [Reg32; 16] = message.try_into().unwrap_or_else(|_| unreachable!());
    let state: [Reg32; 8] = H0.map(Reg32::constant);

    let digest = compress(&mut cnf, &mut next_var, &message, &state, rounds);

    for word in &digest {
        for i in 0..fixed_zero_bits.min(32) {
            cnf.add_unary(word.bits[i as usize].neg());
        }
    }

    cnf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_register_has_fixed_bits() {
        let r = Reg32::constant(0b101);
        assert_eq!(r.bits[0], Lit::one());
        assert_eq!(r.bits[1], Lit::zero());
        assert_eq!(r.bits[2], Lit::one());
    }

    #[test]
    fn builds_reduced_round_instance_without_panicking() {
        let cnf = build_sha256_instance(4, 1);
        assert!(cnf.num_vars > 0);
        assert!(!cnf.contradiction);
    }
}
