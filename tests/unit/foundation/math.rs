use super::*;

#[test]
fn fnv_split_writes_match_single_write() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"cover");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'c');
    b.write_bytes(b"over");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_distinguishes_float_bit_patterns() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(0.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(-0.0);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn splitmix_is_deterministic_and_in_unit_range() {
    let mut a = SplitMix64::new(42);
    let mut b = SplitMix64::new(42);
    for _ in 0..64 {
        let x = a.next_f64();
        assert_eq!(x.to_bits(), b.next_f64().to_bits());
        assert!((0.0..1.0).contains(&x));
    }
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = [200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px[3], 128);
    let back = unpremultiply_px(px);
    for c in 0..3 {
        assert!((i32::from(back[c]) - i32::from([200u8, 100, 50][c])).abs() <= 2);
    }
    assert_eq!(unpremultiply_px([9, 9, 9, 0]), [0, 0, 0, 0]);
}
