//! LinkFlow: cycle-accurate models of synchronous control logic.
//!
//! A module is a Mealy machine ([`Fsm`]) whose state holds every register of the circuit. A
//! [`Reg`] keeps the committed state, evaluates the next state from an immutable snapshot, and
//! commits it in one step, which is how a clock edge updates all flip-flops at once. Values that
//! cross module boundaries are [`Signal`]s with a fixed bit width, so the port vocabulary of a
//! model can be checked and dumped as a waveform ([`vcd::VcdWriter`]).

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

mod fsm;
mod signal;
pub mod utils;
pub mod vcd;

pub use fsm::{Fsm, Reg};
pub use linkflow_macro::Signal;
pub use signal::{Bits, EnumValue, PortDecls, Signal, SignalError};
pub use utils::*;
