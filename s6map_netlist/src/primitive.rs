//! Spartan-6 primitive catalog.
//!
//! Only the cells needed for I/O buffering, constant sources and LUTs are
//! described here. Every library entry is a `static`; boundary ports are built
//! at run time through [`Primitive::port`].

use std::borrow::Cow;
use std::fmt;

use contracts::*;

use crate::Pin;

/// Largest LUT available on the target.
pub const MAX_LUT_INPUTS: usize = 6;

/// Direction of a design-boundary port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Signal enters the design.
    In,
    /// Signal leaves the design.
    Out,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "INPUT"),
            Self::Out => write!(f, "OUTPUT"),
        }
    }
}

/// What a primitive stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// A cell of the vendor library.
    Cell,
    /// A port of the design boundary.
    Port(PortDirection),
}

/// Immutable template of a technology cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Primitive {
    name: Cow<'static, str>,
    kind: PrimitiveKind,
    default_attributes: &'static [(&'static str, &'static str)],
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
}

impl Primitive {
    const fn cell(
        name: &'static str,
        default_attributes: &'static [(&'static str, &'static str)],
        inputs: &'static [&'static str],
        outputs: &'static [&'static str],
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: PrimitiveKind::Cell,
            default_attributes,
            inputs,
            outputs,
        }
    }

    /// Builds the primitive of a boundary port.
    ///
    /// An input port drives its pad net through a single output pin; an output
    /// port consumes its pad net through a single input pin.
    pub fn port(direction: PortDirection, name: impl Into<String>) -> Self {
        let (inputs, outputs): (&'static [&'static str], &'static [&'static str]) = match direction {
            PortDirection::In => (&[], &["PAD"]),
            PortDirection::Out => (&["PAD"], &[]),
        };
        Self {
            name: Cow::Owned(name.into()),
            kind: PrimitiveKind::Port(direction),
            default_attributes: &[],
            inputs,
            outputs,
        }
    }

    /// Cell name, or the port name for boundary ports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library cell or boundary port.
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// True for boundary ports.
    pub fn is_port(&self) -> bool {
        matches!(self.kind, PrimitiveKind::Port(_))
    }

    /// Attributes every instance starts with.
    pub fn default_attributes(&self) -> &'static [(&'static str, &'static str)] {
        self.default_attributes
    }

    /// Default value of one attribute.
    pub fn default_attribute(&self, name: &str) -> Option<&'static str> {
        self.default_attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Input pin names, by index.
    pub fn input_names(&self) -> &'static [&'static str] {
        self.inputs
    }

    /// Output pin names, by index.
    pub fn output_names(&self) -> &'static [&'static str] {
        self.outputs
    }

    /// Number of input pins.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output pins.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Name of the given pin, if the primitive has it.
    pub fn pin_name(&self, pin: Pin) -> Option<&'static str> {
        match pin {
            Pin::Input(index) => self.inputs.get(index).copied(),
            Pin::Output(index) => self.outputs.get(index).copied(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

const BUF_IN: &[&str] = &["I"];
const BUF_OUT: &[&str] = &["O"];

/// Input buffer.
pub static IBUF: Primitive = Primitive::cell("IBUF", &[], BUF_IN, BUF_OUT);
/// Output buffer.
pub static OBUF: Primitive = Primitive::cell("OBUF", &[], BUF_IN, BUF_OUT);
/// Global clock buffer with a dedicated pad.
pub static BUFGP: Primitive = Primitive::cell("BUFGP", &[], BUF_IN, BUF_OUT);

/// `IBUF` pad-side input.
pub const IBUF_I: Pin = Pin::Input(0);
/// `IBUF` fabric-side output.
pub const IBUF_O: Pin = Pin::Output(0);
/// `OBUF` fabric-side input.
pub const OBUF_I: Pin = Pin::Input(0);
/// `OBUF` pad-side output.
pub const OBUF_O: Pin = Pin::Output(0);
/// `BUFGP` pad-side input.
pub const BUFGP_I: Pin = Pin::Input(0);
/// `BUFGP` clock-tree output.
pub const BUFGP_O: Pin = Pin::Output(0);

/// Logic-one source.
pub static VCC: Primitive = Primitive::cell("VCC", &[], &[], &["P"]);
/// Logic-zero source.
pub static GND: Primitive = Primitive::cell("GND", &[], &[], &["G"]);

/// 1-input lookup table.
pub static LUT1: Primitive = Primitive::cell("LUT1", &[("INIT", "0")], &["I0"], &["O"]);
/// 2-input lookup table.
pub static LUT2: Primitive = Primitive::cell("LUT2", &[("INIT", "0")], &["I0", "I1"], &["O"]);
/// 3-input lookup table.
pub static LUT3: Primitive = Primitive::cell("LUT3", &[("INIT", "00")], &["I0", "I1", "I2"], &["O"]);
/// 4-input lookup table.
pub static LUT4: Primitive = Primitive::cell(
    "LUT4",
    &[("INIT", "0000")],
    &["I0", "I1", "I2", "I3"],
    &["O"],
);
/// 5-input lookup table.
pub static LUT5: Primitive = Primitive::cell(
    "LUT5",
    &[("INIT", "00000000")],
    &["I0", "I1", "I2", "I3", "I4"],
    &["O"],
);
/// 6-input lookup table.
pub static LUT6: Primitive = Primitive::cell(
    "LUT6",
    &[("INIT", "0000000000000000")],
    &["I0", "I1", "I2", "I3", "I4", "I5"],
    &["O"],
);

/// Output pin of every LUT.
pub const LUT_O: Pin = Pin::Output(0);

/// Selects the LUT primitive with the given number of inputs.
///
/// # Panics
///
/// Panics when `inputs` is not in `1..=6`.
#[debug_requires((1..=MAX_LUT_INPUTS).contains(&inputs), "LUT input count must be 1..=6")]
pub fn lut(inputs: usize) -> &'static Primitive {
    match inputs {
        1 => &LUT1,
        2 => &LUT2,
        3 => &LUT3,
        4 => &LUT4,
        5 => &LUT5,
        6 => &LUT6,
        _ => panic!("no LUT primitive with {inputs} inputs"),
    }
}

/// Number of hex digits of the `INIT` attribute of a LUT.
#[debug_requires((1..=MAX_LUT_INPUTS).contains(&inputs))]
#[ensures(ret >= 1)]
pub fn lut_init_digits(inputs: usize) -> usize {
    if inputs <= 2 { 1 } else { 1 << (inputs - 2) }
}

/// Formats LUT contents as the zero-padded hex `INIT` string.
///
/// Bit `k` of `contents` is the output for the input combination whose binary
/// encoding (`I0` least significant) is `k`. Bits above `2^inputs` are ignored.
#[debug_requires((1..=MAX_LUT_INPUTS).contains(&inputs))]
#[ensures(ret.len() == lut_init_digits(inputs))]
pub fn lut_init(inputs: usize, contents: u64) -> String {
    let bits = 1u32 << inputs;
    let masked = if bits >= 64 { contents } else { contents & ((1u64 << bits) - 1) };
    format!("{:0width$x}", masked, width = lut_init_digits(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0b10, "2")]
    #[case(2, 0b1000, "8")]
    #[case(3, 0xca, "ca")]
    #[case(4, 0x6, "0006")]
    #[case(5, 0x8000_0001, "80000001")]
    #[case(6, 0x1, "0000000000000001")]
    #[case(6, u64::MAX, "ffffffffffffffff")]
    fn lut_init_is_zero_padded(#[case] inputs: usize, #[case] contents: u64, #[case] expected: &str) {
        assert_eq!(lut_init(inputs, contents), expected);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(4, 4)]
    #[case(5, 8)]
    #[case(6, 16)]
    fn lut_init_width(#[case] inputs: usize, #[case] digits: usize) {
        assert_eq!(lut_init(inputs, 0).len(), digits);
        assert_eq!(lut(inputs).input_count(), inputs);
        assert_eq!(lut(inputs).default_attribute("INIT").map(str::len), Some(digits));
    }

    #[test]
    fn catalog_entries_are_shared() {
        assert!(std::ptr::eq(lut(2), &LUT2));
        assert!(std::ptr::eq(lut(6), &LUT6));
        let source: &'static Primitive = &VCC;
        assert_eq!(source.name(), "VCC");
    }

    #[test]
    fn lut_init_masks_unused_bits() {
        assert_eq!(lut_init(1, 0xff), "3");
        assert_eq!(lut_init(3, 0x1ff), "ff");
    }

    #[test]
    fn port_primitives_have_one_pin() {
        let input = Primitive::port(PortDirection::In, "clk");
        assert_eq!(input.name(), "clk");
        assert_eq!((input.input_count(), input.output_count()), (0, 1));
        let output = Primitive::port(PortDirection::Out, "led");
        assert_eq!((output.input_count(), output.output_count()), (1, 0));
        assert!(output.is_port());
        assert!(!IBUF.is_port());
    }

    #[test]
    fn pin_names() {
        assert_eq!(BUFGP.pin_name(BUFGP_I), Some("I"));
        assert_eq!(BUFGP.pin_name(BUFGP_O), Some("O"));
        assert_eq!(LUT4.pin_name(Pin::Input(3)), Some("I3"));
        assert_eq!(VCC.pin_name(Pin::Output(0)), Some("P"));
        assert_eq!(GND.pin_name(Pin::Input(0)), None);
    }
}
