// Engine-level properties that hold for any vector value

use vecpf_core::{
    BitHost, ByteOrder, Directive, Engine, EngineConfig, FormatError, ModifierKind, VectorValue,
};

fn engine_for(order: ByteOrder) -> Engine {
    let config = EngineConfig {
        byte_order: Some(order),
        ..EngineConfig::default()
    };
    Engine::initialize(&config, &mut BitHost::new())
}

fn format(engine: &Engine, directive: &str, vector: &VectorValue) -> Result<String, FormatError> {
    let request = Directive::parse(directive)
        .unwrap()
        .to_request(engine.registry())
        .unwrap();
    engine.format_to_string(&request, vector)
}

#[test]
fn test_int128_reparses_in_both_byte_orders() {
    let values = [
        0u128,
        1,
        u128::MAX,
        0x0123_4567_89ab_cdef_fedc_ba98_7654_3210,
        (((-0x0123_4567_89ab_cdefi128) << 64) + 0xfedc_ba98_7654_3210) as u128,
    ];

    for order in [ByteOrder::Little, ByteOrder::Big] {
        let engine = engine_for(order);
        for value in values {
            let vector = VectorValue::from_u128(value, order);
            let text = format(&engine, "%016vzx", &vector).unwrap();
            assert_eq!(text.len(), 32, "{:?} {}", order, text);
            assert_eq!(u128::from_str_radix(&text, 16).unwrap(), value, "{:?}", order);
        }
    }
}

#[test]
fn test_lane_order_follows_configured_byte_order() {
    for order in [ByteOrder::Little, ByteOrder::Big] {
        let engine = engine_for(order);
        let vector = VectorValue::from_u32s([1, 2, 3, 4], order);
        assert_eq!(format(&engine, "%vlu", &vector).unwrap(), "1 2 3 4");
    }
}

#[test]
fn test_signed_halfwords_round_trip() {
    let engine = engine_for(ByteOrder::native());
    let lanes = [i16::MIN, -12345, -1, 0, 1, 255, 12345, i16::MAX];
    let vector = VectorValue::from_i16s(lanes, ByteOrder::native());

    let text = format(&engine, "%vhd", &vector).unwrap();
    let parsed: Vec<i16> = text.split(' ').map(|s| s.parse().unwrap()).collect();
    assert_eq!(parsed, lanes);
}

#[test]
fn test_unsigned_bytes_round_trip_in_hex() {
    let engine = engine_for(ByteOrder::native());
    let lanes: [u8; 16] = std::array::from_fn(|i| (i as u8).wrapping_mul(37));
    let vector = VectorValue::from_u8s(lanes);

    let text = format(&engine, "%vx", &vector).unwrap();
    let parsed: Vec<u8> = text
        .split(' ')
        .map(|s| u8::from_str_radix(s, 16).unwrap())
        .collect();
    assert_eq!(parsed, lanes);
}

#[test]
fn test_floats_round_trip_at_full_precision() {
    let engine = engine_for(ByteOrder::native());
    let lanes = [-(11.0f32 / 9.0f32), 1.0e-30, 3.402_823_5e38, 0.1];
    let vector = VectorValue::from_f32s(lanes, ByteOrder::native());

    let text = format(&engine, "%.9ve", &vector).unwrap();
    let parsed: Vec<f32> = text.split(' ').map(|s| s.parse().unwrap()).collect();
    assert_eq!(parsed, lanes);
}

#[test]
fn test_doubles_round_trip_at_full_precision() {
    let engine = engine_for(ByteOrder::native());
    let lanes = [std::f64::consts::PI, -2.5e-300];
    let vector = VectorValue::from_f64s(lanes, ByteOrder::native());

    let text = format(&engine, "%.17vve", &vector).unwrap();
    let parsed: Vec<f64> = text.split(' ').map(|s| s.parse().unwrap()).collect();
    assert_eq!(parsed, lanes);
}

#[test]
fn test_flag_order_does_not_matter() {
    let engine = engine_for(ByteOrder::native());
    let vector = VectorValue::from_i32s([-7, 0, 7, 70000], ByteOrder::native());

    let expected = format(&engine, "%#-+ '9vld", &vector).unwrap();
    for permutation in ["%+-#' 9vld", "%' +-#9vld", "%-'#+ 9vld"] {
        assert_eq!(format(&engine, permutation, &vector).unwrap(), expected);
    }
}

#[test]
fn test_aliases_are_equivalent() {
    let engine = engine_for(ByteOrder::native());
    let vector = VectorValue::from_u8s(*b"0123456789abcdef");

    for (a, b) in [("%vlx", "%lvx"), ("%vhd", "%hvd"), ("%vzu", "%zvu")] {
        assert_eq!(format(&engine, a, &vector).unwrap(), format(&engine, b, &vector).unwrap());
    }
}

#[test]
fn test_requests_outside_the_rule_table_decline() {
    let engine = engine_for(ByteOrder::native());
    let vector = VectorValue::default();

    for directive in ["%vlc", "%hvc", "%vvd", "%vlf", "%vze"] {
        let err = format(&engine, directive, &vector).unwrap_err();
        assert!(matches!(err, FormatError::Declined { .. }), "{}", directive);
    }
}

#[test]
fn test_int128_disabled() {
    let config = EngineConfig {
        int128: false,
        ..EngineConfig::default()
    };
    let engine = Engine::initialize(&config, &mut BitHost::new());
    assert!(engine.request('x', ModifierKind::Vz).is_none());
    assert!(engine.request('x', ModifierKind::Vl).is_some());
}
