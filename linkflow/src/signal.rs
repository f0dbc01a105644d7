use std::fmt::{self, Debug};

use thiserror::Error;

use crate::utils::{join_options, u64_to_bitvec};

/// Signal error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The value has bits set above the width of the signal.
    #[error("value {value:#x} does not fit in {width} bits")]
    Overflow {
        /// Offending value.
        value: u64,
        /// Width of the signal.
        width: usize,
    },

    /// The value is not the encoding of any variant.
    #[error("{value} is not a valid encoding of {typ}")]
    UnknownEncoding {
        /// Offending value.
        value: u64,
        /// Name of the enum.
        typ: &'static str,
    },
}

/// Port names and bitwidths of a signal.
///
/// A struct signal is represented by its members, each optionally named. An unnamed member is
/// flattened into its parent when the ports are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortDecls {
    /// Struct of named members.
    Struct(Vec<(Option<String>, PortDecls)>),
    /// Bits with the given width.
    Bits(usize),
}

impl PortDecls {
    /// Total width.
    pub fn width(&self) -> usize {
        match self {
            PortDecls::Struct(inner) => inner.iter().map(|(_, m)| m.width()).sum(),
            PortDecls::Bits(width) => *width,
        }
    }

    /// Lists the leaf ports with their widths, in bit order (least significant first).
    ///
    /// Names of nested members are joined by `_`.
    pub fn ports(&self) -> Vec<(String, usize)> {
        let mut ports = Vec::new();
        self.collect_ports(None, &mut ports);
        ports
    }

    fn collect_ports(&self, prefix: Option<String>, ports: &mut Vec<(String, usize)>) {
        match self {
            PortDecls::Struct(inner) => {
                for (name, member) in inner {
                    member.collect_ports(join_options("_", [prefix.clone(), name.clone()]), ports);
                }
            }
            PortDecls::Bits(width) => ports.push((prefix.unwrap_or_default(), *width)),
        }
    }
}

/// Bit-representable values.
pub trait Signal: 'static + Debug + Clone {
    /// Signal's bit width.
    ///
    /// # Note
    ///
    /// `Self::WIDTH` and `Self::port_decls().width()` should be equal.
    const WIDTH: usize;

    /// Bit representation, least significant bit first.
    fn transl(self) -> Vec<bool>;

    /// Port names and bitwidths.
    fn port_decls() -> PortDecls;
}

impl Signal for bool {
    const WIDTH: usize = 1;

    fn transl(self) -> Vec<bool> { vec![self] }

    fn port_decls() -> PortDecls { PortDecls::Bits(1) }
}

/// Enum encoded as a fixed-width code. Implemented by `#[derive(Signal)]` on unit enums.
pub trait EnumValue: Signal + Copy {
    /// Returns the code of the variant.
    fn encode(self) -> u64;

    /// Returns the variant of the code, or `None` if the code is unused.
    fn decode(value: u64) -> Option<Self>;

    /// Same as `decode`, but reports an unused code as an error.
    fn try_decode(value: u64) -> Result<Self, SignalError> {
        Self::decode(value).ok_or(SignalError::UnknownEncoding { value, typ: std::any::type_name::<Self>() })
    }

    /// Returns the code as `Bits`.
    fn to_bits<const N: usize>(self) -> Bits<N> { Bits::truncate(self.encode()) }
}

/// Bits with width `N`, at most 64.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Bits<const N: usize>(u64);

impl<const N: usize> Bits<N> {
    /// Mask of the bits inside the width.
    pub const MASK: u64 = if N == 0 { 0 } else { u64::MAX >> (64 - N) };

    /// All bits cleared.
    pub const ZERO: Self = Self(0);

    /// Creates bits from a value, failing if the value is wider than `N`.
    pub fn new(value: u64) -> Result<Self, SignalError> {
        if value & !Self::MASK != 0 {
            return Err(SignalError::Overflow { value, width: N });
        }
        Ok(Self(value))
    }

    /// Creates bits from the `N` least significant bits of a value.
    pub const fn truncate(value: u64) -> Self { Self(value & Self::MASK) }

    /// Returns the value.
    pub const fn value(self) -> u64 { self.0 }

    /// Returns the `idx`-th bit. Bits outside the width are zero.
    pub const fn bit(self, idx: usize) -> bool { idx < N && ((self.0 >> idx) & 1) != 0 }

    /// Returns `M` bits starting from `lsb`.
    pub const fn clip<const M: usize>(self, lsb: usize) -> Bits<M> {
        if lsb >= 64 {
            Bits::<M>::ZERO
        } else {
            Bits::<M>::truncate(self.0 >> lsb)
        }
    }
}

impl<const N: usize> Debug for Bits<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}'h{:x}", N, self.0) }
}

impl<const N: usize> Signal for Bits<N> {
    const WIDTH: usize = N;

    fn transl(self) -> Vec<bool> { u64_to_bitvec(N, self.0) }

    fn port_decls() -> PortDecls { PortDecls::Bits(N) }
}
