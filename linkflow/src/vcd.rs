//! Value Change Dump (IEEE 1364) writer for signal traces.

use std::io::{self, Write};
use std::marker::PhantomData;

use thiserror::Error;

use crate::Signal;

/// Printable characters usable in VCD identifier codes.
const ID_FIRST: u8 = b'!';
const ID_RADIX: usize = (b'~' - b'!' + 1) as usize;

/// VCD error.
#[derive(Debug, Error)]
pub enum VcdError {
    /// Error from the underlying writer.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// `transl()` returned a different number of bits than declared.
    #[error("signal width mismatch: declared {expected}, got {actual}")]
    WidthMismatch {
        /// Declared width.
        expected: usize,
        /// Number of bits produced.
        actual: usize,
    },

    /// Timestamps must strictly increase.
    #[error("timestamp {time} is not after {last}")]
    TimeReversal {
        /// Offending timestamp.
        time: u64,
        /// Last written timestamp.
        last: u64,
    },
}

#[derive(Debug)]
struct Var {
    name: String,
    width: usize,
    id: String,
}

fn id_code(mut index: usize) -> String {
    let mut id = String::new();
    loop {
        id.push(char::from(ID_FIRST + (index % ID_RADIX) as u8));
        index /= ID_RADIX;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    id
}

/// Writes a stream of `S` values as a VCD waveform, one scope with one variable per port.
#[derive(Debug)]
pub struct VcdWriter<W: Write, S: Signal> {
    out: W,
    vars: Vec<Var>,
    last: Option<(u64, Vec<bool>)>,
    _marker: PhantomData<S>,
}

impl<W: Write, S: Signal> VcdWriter<W, S> {
    /// Creates a writer and writes the header declaring the ports of `S` inside `scope`.
    pub fn new(mut out: W, scope: &str, timescale: &str) -> Result<Self, VcdError> {
        let decls = S::port_decls();
        if decls.width() != S::WIDTH {
            return Err(VcdError::WidthMismatch { expected: S::WIDTH, actual: decls.width() });
        }

        let vars = decls
            .ports()
            .into_iter()
            .enumerate()
            .map(|(index, (name, width))| Var { name, width, id: id_code(index) })
            .collect::<Vec<_>>();

        writeln!(out, "$timescale {} $end", timescale)?;
        writeln!(out, "$scope module {} $end", scope)?;
        for var in &vars {
            writeln!(out, "$var wire {} {} {} $end", var.width, var.id, var.name)?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;

        Ok(Self { out, vars, last: None, _marker: PhantomData })
    }

    /// Records `value` at `time`. Only ports whose value changed are written.
    pub fn dump(&mut self, time: u64, value: S) -> Result<(), VcdError> {
        let bits = value.transl();
        if bits.len() != S::WIDTH {
            return Err(VcdError::WidthMismatch { expected: S::WIDTH, actual: bits.len() });
        }
        if let Some((last, _)) = self.last {
            if time <= last {
                return Err(VcdError::TimeReversal { time, last });
            }
        }

        let prev = self.last.as_ref().map(|(_, bits)| bits);
        let mut changes = Vec::new();
        let mut lsb = 0;
        for var in &self.vars {
            let range = lsb..lsb + var.width;
            lsb += var.width;
            if prev.map_or(false, |prev| prev[range.clone()] == bits[range.clone()]) {
                continue;
            }
            changes.push((var, &bits[range]));
        }

        if !changes.is_empty() {
            writeln!(self.out, "#{}", time)?;
            for (var, value) in changes {
                let msb_first = value.iter().rev().map(|b| if *b { '1' } else { '0' }).collect::<String>();
                if var.width == 1 {
                    writeln!(self.out, "{}{}", msb_first, var.id)?;
                } else {
                    writeln!(self.out, "b{} {}", msb_first, var.id)?;
                }
            }
        }

        self.last = Some((time, bits));
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, VcdError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bits, PortDecls};

    #[derive(Debug, Clone)]
    struct Probe {
        strobe: bool,
        code: Bits<4>,
    }

    impl Signal for Probe {
        const WIDTH: usize = 5;

        fn transl(self) -> Vec<bool> { self.strobe.transl().into_iter().chain(self.code.transl()).collect() }

        fn port_decls() -> PortDecls {
            PortDecls::Struct(vec![
                (Some("strobe".to_string()), PortDecls::Bits(1)),
                (Some("code".to_string()), PortDecls::Bits(4)),
            ])
        }
    }

    #[test]
    fn id_codes_are_unique() {
        let ids = (0..500).map(id_code).collect::<std::collections::HashSet<_>>();
        assert_eq!(ids.len(), 500);
        assert_eq!(id_code(0), "!");
        assert_eq!(id_code(93), "~");
    }

    #[test]
    fn dumps_only_changes() {
        let mut vcd = VcdWriter::<_, Probe>::new(Vec::new(), "top", "1ns").unwrap();
        vcd.dump(0, Probe { strobe: false, code: Bits::truncate(9) }).unwrap();
        vcd.dump(1, Probe { strobe: true, code: Bits::truncate(9) }).unwrap();
        vcd.dump(2, Probe { strobe: true, code: Bits::truncate(9) }).unwrap();
        vcd.dump(3, Probe { strobe: true, code: Bits::truncate(4) }).unwrap();
        let text = String::from_utf8(vcd.finish().unwrap()).unwrap();

        assert!(text.contains("$var wire 1 ! strobe $end"));
        assert!(text.contains("$var wire 4 \" code $end"));
        let body = text.split("$enddefinitions $end\n").nth(1).unwrap();
        assert_eq!(body, "#0\n0!\nb1001 \"\n#1\n1!\n#3\nb0100 \"\n");
    }

    #[test]
    fn rejects_time_reversal() {
        let mut vcd = VcdWriter::<_, Probe>::new(Vec::new(), "top", "1ns").unwrap();
        vcd.dump(5, Probe { strobe: false, code: Bits::ZERO }).unwrap();
        assert!(matches!(
            vcd.dump(5, Probe { strobe: true, code: Bits::ZERO }),
            Err(VcdError::TimeReversal { time: 5, last: 5 })
        ));
    }
}
