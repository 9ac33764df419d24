use std::io::Cursor;
use zipdiff::utils::{
    DualHasher, as_string, compute_crc32, exhaust, is_equal, size_to_string, to_bytes,
};

const HELLO_WORLD_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

#[test]
fn is_equal_distinguishes_absent_from_empty() {
    let empty: &[u8] = &[];
    let a = to_bytes("abcdefg");
    let b = to_bytes("abcefg");

    assert!(is_equal(None, None));
    assert!(is_equal(Some(empty), Some(empty)));
    assert!(!is_equal(None, Some(empty)));
    assert!(!is_equal(Some(empty), None));
    assert!(!is_equal(Some(&a), Some(empty)));
    assert!(!is_equal(Some(empty), Some(&b)));
    assert!(!is_equal(Some(&a), Some(&b)));
    assert!(is_equal(Some(&a), Some(&a)));
    assert!(is_equal(Some(&b), Some(&b)));
}

#[test]
fn size_to_string_keeps_small_multiples_in_smaller_unit() {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;
    const PB: u64 = TB * 1024;
    const EB: u64 = PB * 1024;

    assert_eq!(size_to_string(100), "100 B");
    assert_eq!(size_to_string(1024), "1024 B");
    assert_eq!(size_to_string(4 * KB), "4096 B");
    assert_eq!(size_to_string(5 * KB), "5 KB");
    assert_eq!(size_to_string(10 * KB), "10 KB");
    assert_eq!(size_to_string(125 * KB), "125 KB");
    assert_eq!(size_to_string(4 * MB), "4096 KB");
    assert_eq!(size_to_string(5 * MB), "5 MB");
    assert_eq!(size_to_string(18 * MB), "18 MB");
    assert_eq!(size_to_string(4 * GB), "4096 MB");
    assert_eq!(size_to_string(5 * GB), "5 GB");
    assert_eq!(size_to_string(500 * GB), "500 GB");
    assert_eq!(size_to_string(4 * TB), "4096 GB");
    assert_eq!(size_to_string(5 * TB), "5 TB");
    assert_eq!(size_to_string(789 * TB), "789 TB");
    assert_eq!(size_to_string(4 * PB), "4096 TB");
    assert_eq!(size_to_string(5 * PB), "5 PB");
    assert_eq!(size_to_string(2 * EB), "2048 PB");
    assert_eq!(size_to_string(8 * EB - 1), "8191 PB");
    assert_eq!(size_to_string(u64::MAX), "16383 PB");
}

#[test]
fn utf8_conversion_round_trips() {
    assert_eq!(to_bytes("héllo"), "héllo".as_bytes());
    assert_eq!(as_string(&to_bytes("héllo")), "héllo");
    assert_eq!(as_string(&[0x66, 0xff, 0x6f]), "f\u{fffd}o");
}

#[test]
fn exhaust_reads_whole_stream() -> anyhow::Result<()> {
    let data: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    assert_eq!(exhaust(Cursor::new(data.clone()))?, data);
    assert!(exhaust(Cursor::new(Vec::new()))?.is_empty());
    Ok(())
}

#[test]
fn crc32_matches_known_value() {
    assert_eq!(compute_crc32(b"hello world"), 0x0d4a_1185);
}

#[test]
fn dual_hasher_matches_one_shot_checksums() {
    let mut hasher = DualHasher::new();
    hasher.update(b"hello");
    hasher.update(b" ");
    hasher.update(b"world");

    let (crc, sha) = hasher.finalize();
    assert_eq!(crc, compute_crc32(b"hello world"));
    assert_eq!(sha, HELLO_WORLD_SHA256);
}
