// Vector format dispatch engine
//
// rule lookup -> format synthesis -> element extraction -> iteration -> sink

use crate::config::EngineConfig;
use crate::extract::{extract, Scalar};
use crate::host::{ArgType, PrintfHost};
use crate::modifier::{ModifierKind, ModifierRegistry};
use crate::request::FormatRequest;
use crate::rules::{self, ConversionRule, Family};
use crate::scalar::{LibcFormatter, ScalarFormatter};
use crate::sink::Sink;
use crate::synth::{synthesize, ScalarFormat};
use crate::vector::{ByteOrder, VectorValue};
use crate::FormatError;
use log::{debug, trace};

/// An initialized engine.
///
/// Built once by [`Engine::initialize`]; nothing mutates it afterwards, so a
/// shared reference can format from any number of threads.
#[derive(Debug)]
pub struct Engine<F = LibcFormatter> {
    registry: ModifierRegistry,
    vector_type: Option<ArgType>,
    byte_order: ByteOrder,
    formatter: F,
}

impl Engine<LibcFormatter> {
    /// Register the vector type, the modifiers and one dispatch entry per
    /// supported conversion with `host`, and return the resulting engine.
    pub fn initialize<H: PrintfHost + ?Sized>(config: &EngineConfig, host: &mut H) -> Self {
        Self::with_formatter(config, host, LibcFormatter::new())
    }
}

impl<F: ScalarFormatter> Engine<F> {
    pub fn with_formatter<H: PrintfHost + ?Sized>(
        config: &EngineConfig,
        host: &mut H,
        formatter: F,
    ) -> Self {
        let vector_type = host.register_vector_type();
        if vector_type.is_none() {
            debug!("host refused the vector argument type");
        }

        let registry = ModifierRegistry::register(host, config);

        for family in [Family::Integer, Family::Float] {
            for &conversion in family.conversions() {
                if !host.register_specifier(conversion, family) {
                    debug!("host refused specifier '{}'", conversion);
                }
            }
        }

        Self {
            registry,
            vector_type,
            byte_order: config.effective_byte_order(),
            formatter,
        }
    }

    pub fn registry(&self) -> &ModifierRegistry {
        &self.registry
    }

    /// Argument type the host assigned to vectors
    pub fn vector_type(&self) -> Option<ArgType> {
        self.vector_type
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    /// Request for `%<modifier><conversion>` with no flags, width or
    /// precision, using the handle the host assigned to `modifier`.
    pub fn request(&self, conversion: char, modifier: ModifierKind) -> Option<FormatRequest> {
        let bits = self.registry.bits(modifier)?;
        Some(FormatRequest::new(conversion, bits))
    }

    /// Rule that will handle `request`, or `Declined`
    pub fn resolve(&self, request: &FormatRequest) -> Result<&'static ConversionRule, FormatError> {
        rules::resolve(request.conversion, request.modifier_bits, &self.registry).ok_or(
            FormatError::Declined {
                conversion: request.conversion,
                modifier_bits: request.modifier_bits,
            },
        )
    }

    /// Format `vector` into `sink` and return the number of bytes written.
    ///
    /// The whole rendering is produced before anything reaches the sink: a
    /// declined request, a formatter failure or an overflow leaves the sink
    /// exactly as it was.
    pub fn format<S: Sink + ?Sized>(
        &self,
        request: &FormatRequest,
        vector: &VectorValue,
        sink: &mut S,
    ) -> Result<usize, FormatError> {
        let rendered = self.render(request, vector)?;
        sink.write_all_or_nothing(&rendered)?;
        Ok(rendered.len())
    }

    /// Format into a fresh byte buffer
    pub fn format_to_vec(
        &self,
        request: &FormatRequest,
        vector: &VectorValue,
    ) -> Result<Vec<u8>, FormatError> {
        self.render(request, vector)
    }

    /// Format into a `String`. Bytes that are not UTF-8 (possible with `%vc`
    /// on lanes >= 0x80) are replaced.
    pub fn format_to_string(
        &self,
        request: &FormatRequest,
        vector: &VectorValue,
    ) -> Result<String, FormatError> {
        let bytes = self.render(request, vector)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn render(&self, request: &FormatRequest, vector: &VectorValue) -> Result<Vec<u8>, FormatError> {
        let rule = self.resolve(request)?;
        let format = synthesize(rule, &request.flags);
        let elements = extract(vector, rule, self.byte_order);
        self.format_all(rule, &format, request, &elements)
    }

    /// Format each element, with one separator between consecutive elements
    /// when the rule has one.
    fn format_all(
        &self,
        rule: &ConversionRule,
        format: &ScalarFormat,
        request: &FormatRequest,
        elements: &[Scalar],
    ) -> Result<Vec<u8>, FormatError> {
        let width = request.width_arg();
        let precision = request.precision_arg();
        let separator = rule.separator();

        let mut out = Vec::with_capacity(elements.len() * 12);
        for (index, &element) in elements.iter().enumerate() {
            if index > 0 {
                if let Some(separator) = separator {
                    out.push(separator);
                }
            }
            trace!("element {}: {:?} with {}", index, element, format);
            self.formatter
                .format_scalar(format, width, precision, element, &mut out)?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BitHost;
    use crate::request::Flags;
    use crate::sink::SizedWriter;

    fn engine() -> Engine {
        Engine::initialize(&EngineConfig::default(), &mut BitHost::new())
    }

    #[test]
    fn test_initialize_registers_everything() {
        let mut host = BitHost::new();
        let engine = Engine::initialize(&EngineConfig::default(), &mut host);

        assert!(engine.vector_type().is_some());
        assert_eq!(host.modifiers().len(), 8);
        let conversions: String = host.specifiers().iter().map(|(c, _)| *c).collect();
        assert_eq!(conversions, "diouxXcfFeEgGaA");
    }

    #[test]
    fn test_unsigned_words() {
        let engine = engine();
        let request = engine.request('u', ModifierKind::Vl).unwrap();
        let vector = VectorValue::from_u32s([4294967295, 0, 39, 2147483647], ByteOrder::native());

        assert_eq!(
            engine.format_to_string(&request, &vector).unwrap(),
            "4294967295 0 39 2147483647"
        );
    }

    #[test]
    fn test_character_vector_has_no_separator() {
        let engine = engine();
        let vector = VectorValue::from_u8s(*b"this space is fo");

        let chars = engine.request('c', ModifierKind::V).unwrap();
        assert_eq!(engine.format_to_string(&chars, &vector).unwrap(), "this space is fo");

        let decimal = engine.request('d', ModifierKind::V).unwrap();
        assert_eq!(
            engine.format_to_string(&decimal, &vector).unwrap(),
            "116 104 105 115 32 115 112 97 99 101 32 105 115 32 102 111"
        );
    }

    #[test]
    fn test_declined_leaves_sink_untouched() {
        let engine = engine();
        let mut out = b"prefix".to_vec();
        let request = engine.request('f', ModifierKind::Vl).unwrap();

        let err = engine
            .format(&request, &VectorValue::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, FormatError::Declined { conversion: 'f', .. }));
        assert_eq!(out, b"prefix");
    }

    #[test]
    fn test_no_modifier_bits_declines() {
        let engine = engine();
        let request = FormatRequest::new('d', 0);
        assert!(engine.resolve(&request).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let engine = engine();
        let request = engine.request('u', ModifierKind::Vl).unwrap();
        let vector = VectorValue::from_u32s([4294967295, 0, 39, 2147483647], ByteOrder::native());

        let mut buf = [0u8; 10];
        let mut writer = SizedWriter::new(&mut buf);
        let err = engine.format(&request, &vector, &mut writer).unwrap_err();
        assert_eq!(
            err,
            FormatError::OutputOverflow {
                needed: 26,
                capacity: 10
            }
        );
        assert!(writer.is_empty());

        let mut buf = [0u8; 26];
        let mut writer = SizedWriter::new(&mut buf);
        assert_eq!(engine.format(&request, &vector, &mut writer).unwrap(), 26);
        assert_eq!(writer.written(), b"4294967295 0 39 2147483647");
    }

    #[test]
    fn test_width_and_flags_apply_per_element() {
        let engine = engine();
        let request = engine
            .request('d', ModifierKind::Hv)
            .unwrap()
            .with_flags(Flags {
                showsign: true,
                ..Flags::none()
            })
            .with_width(5);
        let vector = VectorValue::from_i16s([-32768, -127, -1, 0, 127, 256, 16384, 32767], ByteOrder::native());

        assert_eq!(
            engine.format_to_string(&request, &vector).unwrap(),
            "-32768  -127    -1    +0  +127  +256 +16384 +32767"
        );
    }

    #[test]
    fn test_int128_halves_concatenate() {
        let engine = engine();
        let request = engine
            .request('x', ModifierKind::Vz)
            .unwrap()
            .with_flags(Flags {
                zero_pad: true,
                ..Flags::none()
            })
            .with_width(16);
        let value = 0x0000_0000_0000_00ab_0000_0000_0000_00cdu128;
        let vector = VectorValue::from_u128(value, ByteOrder::native());

        assert_eq!(
            engine.format_to_string(&request, &vector).unwrap(),
            "00000000000000ab00000000000000cd"
        );
    }

    #[test]
    fn test_disabled_capability_declines() {
        let config = EngineConfig {
            vector_double: false,
            ..EngineConfig::default()
        };
        let engine = Engine::initialize(&config, &mut BitHost::new());
        assert!(engine.request('f', ModifierKind::Vv).is_none());
        // The bit the host would have handed to vv is not claimed by anything
        assert!(!engine.registry().claims(0x8000));
    }
}
