use std::fmt;
use std::ops::{BitXor, BitXorAssign, Not};

/// An edge of a majority-inverter graph: a reference to a driver plus a polarity bit
///
/// The driver is either the constant, a primary input or a majority node.
/// The lowest bit holds the inversion, so that `!s` is a single xor.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct Signal {
    a: u32,
}

const INPUT_FLAG: u32 = 0x8000_0000;

impl Signal {
    /// Constant zero signal
    pub fn zero() -> Signal {
        Signal { a: 0 }
    }

    /// Constant one signal, the complement of zero
    pub fn one() -> Signal {
        Signal { a: 1 }
    }

    /// Signal driven by the majority node at index v
    pub fn from_var(v: u32) -> Signal {
        Self::from_ind(v + 1)
    }

    /// Signal driven by the primary input at index v
    pub fn from_input(v: u32) -> Signal {
        Self::from_ind(!v)
    }

    fn from_ind(v: u32) -> Signal {
        Signal { a: v << 1 }
    }

    /// Index of the majority node driving the signal
    pub fn var(&self) -> u32 {
        assert!(self.is_var());
        self.ind() - 1u32
    }

    /// Index of the primary input driving the signal
    pub fn input(&self) -> u32 {
        assert!(self.is_input());
        !self.ind() & !INPUT_FLAG
    }

    /// Internal index: 0 for the constant, otherwise var() + 1
    pub fn ind(&self) -> u32 {
        self.a >> 1
    }

    /// Returns true if the signal is a constant
    pub fn is_constant(&self) -> bool {
        self.ind() == 0
    }

    /// Returns true if the signal is driven by a primary input
    pub fn is_input(&self) -> bool {
        self.a & INPUT_FLAG != 0
    }

    /// Returns true if the signal is driven by a majority node
    pub fn is_var(&self) -> bool {
        !self.is_input() && !self.is_constant()
    }

    /// Returns true if the edge is inverted
    ///
    /// Note that the constant one is an inverted zero.
    pub fn is_inverted(&self) -> bool {
        self.a & 1 != 0
    }

    /// The same driver, without inversion
    pub fn without_inversion(&self) -> Signal {
        Signal { a: self.a & !1u32 }
    }

    /// Raw encoding of the signal
    pub fn raw(&self) -> u32 {
        self.a
    }

    /// Translate the signal through a node renumbering; inputs and constants are unchanged
    pub(crate) fn remap_order(&self, t: &[Signal]) -> Signal {
        if self.is_var() {
            t[self.var() as usize] ^ self.is_inverted()
        } else {
            *self
        }
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Signal {
        Signal { a: b as u32 }
    }
}

impl Not for Signal {
    type Output = Signal;
    fn not(self) -> Signal {
        Signal { a: self.a ^ 1u32 }
    }
}

impl Not for &'_ Signal {
    type Output = Signal;
    fn not(self) -> Signal {
        !*self
    }
}

impl BitXorAssign<bool> for Signal {
    fn bitxor_assign(&mut self, rhs: bool) {
        self.a ^= rhs as u32;
    }
}

impl BitXor<bool> for Signal {
    type Output = Signal;
    fn bitxor(mut self, rhs: bool) -> Self::Output {
        self ^= rhs;
        self
    }
}

impl BitXor<bool> for &'_ Signal {
    type Output = Signal;
    fn bitxor(self, rhs: bool) -> Self::Output {
        *self ^ rhs
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write!(f, "{}", self.a & 1);
        }
        if self.is_inverted() {
            write!(f, "!")?;
        }
        if self.is_input() {
            write!(f, "i{}", self.input())
        } else {
            write!(f, "x{}", self.var())
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let l0 = Signal::zero();
        let l1 = Signal::one();
        assert_eq!(l0, !l1);
        assert!(l0.is_constant() && l1.is_constant());
        assert!(!l0.is_inverted());
        assert!(l1.is_inverted());
        assert_eq!(Signal::from(false), l0);
        assert_eq!(Signal::from(true), l1);
        assert_eq!(format!("{l0}"), "0");
        assert_eq!(format!("{l1}"), "1");
    }

    #[test]
    fn test_var() {
        for v in 0u32..10u32 {
            let l = Signal::from_var(v);
            assert!(l.is_var());
            assert!(!l.is_input());
            assert_eq!(l.var(), v);
            assert_eq!((!l).var(), v);
            assert_eq!(l ^ true, !l);
            assert_eq!((!l).without_inversion(), l);
            assert_eq!(format!("{}", !l), format!("!x{v}"));
        }
    }

    #[test]
    fn test_input() {
        for v in 0u32..10u32 {
            let l = Signal::from_input(v);
            assert!(l.is_input());
            assert!(!l.is_var());
            assert!(!l.is_constant());
            assert_eq!(l.input(), v);
            assert_eq!((!l).input(), v);
            assert_eq!(l ^ false, l);
            assert_eq!(format!("{l}"), format!("i{v}"));
        }
        assert_ne!(Signal::from_input(0), Signal::from_var(0));
    }

    #[test]
    fn test_ordering() {
        // Constants sort first, so that canonical gates start with them
        assert!(Signal::zero() < Signal::one());
        assert!(Signal::one() < Signal::from_var(0));
        assert!(Signal::from_var(0) < !Signal::from_var(0));
        assert!(Signal::from_var(3) < Signal::from_input(0));
    }

    #[test]
    fn test_remap() {
        let t = [Signal::from_var(4), !Signal::from_input(1)];
        assert_eq!(Signal::from_var(0).remap_order(&t), Signal::from_var(4));
        assert_eq!((!Signal::from_var(1)).remap_order(&t), Signal::from_input(1));
        assert_eq!(Signal::one().remap_order(&t), Signal::one());
    }
}
