//! Implementation of proc macros on fixed-width signal values.
//!
//! # Note
//!
//! `#[derive(Signal)]` on a struct concatenates its fields, first field at the least significant
//! bit. The port declarations of the struct are the struct of its fields' port declarations.
//!
//! For example, the derived `port_decls()` of the following struct:
//!
//! ```ignore
//! #[derive(Debug, Clone, Signal)]
//! pub struct Request {
//!     valid: bool,
//!     #[member(name = "addr")]
//!     address: Bits<8>,
//!     #[member(name = "")]
//!     payload: Payload,
//! }
//! ```
//!
//! is
//!
//! ```ignore
//! PortDecls::Struct(vec![
//!     (Some("valid".to_string()), PortDecls::Bits(1)),
//!     (Some("addr".to_string()), PortDecls::Bits(8)),
//!     (None, <Payload>::port_decls()),
//! ])
//! ```
//!
//! On a unit-only enum, the variants are encoded in `#[width(N)]` bits (`clog2` of the variant
//! count by default), using `#[encode(V)]` per variant or the declaration index otherwise. The
//! derive also implements `EnumValue`, whose `decode` returns `None` for unused encodings.

mod signal;
mod utils;

use proc_macro::{self, TokenStream};

#[proc_macro_derive(Signal, attributes(member, width, encode))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
