use rstest::rstest;

use lupine::managers::context_allocator::{
    format_context_label, format_context_tag, ContextAllocator, MAX_LABEL_DIGITS,
};
use lupine::types::context::ContextId;

#[rstest]
#[case(0, "A")]
#[case(1, "B")]
#[case(24, "Y")]
#[case(25, "Z")]
#[case(26, "AA")]
#[case(27, "AB")]
#[case(51, "AZ")]
#[case(52, "BA")]
#[case(53, "BB")]
#[case(4294967296, "QKWW")]
#[case(9223372036854775808, "JFHI")]
#[case(18446744073709551614, "TLPO")]
#[case(18446744073709551615, "TLPP")]
fn test_label_vectors(#[case] id: u64, #[case] expected: &str) {
    assert_eq!(format_context_label(id), expected, "label for {id}");
}

#[test]
fn test_label_never_exceeds_bound() {
    for id in [0, 25, 26, 701, 702, 18277, 18278, 1 << 32, 1 << 63, u64::MAX - 1, u64::MAX] {
        let label = format_context_label(id);
        assert!(!label.is_empty());
        assert!(label.len() <= MAX_LABEL_DIGITS, "{id} -> {label}");
        assert!(label.chars().all(|c| c.is_ascii_uppercase()));
    }
}

#[test]
fn test_third_letter_boundary() {
    assert_eq!(format_context_label(675), "YZ");
    assert_eq!(format_context_label(676), "AZA");
    assert_eq!(format_context_label(702), "AAA");
}

#[test]
fn test_allocations_strictly_increase() {
    let mut alloc = ContextAllocator::new();
    let ids: Vec<ContextId> = (0..100).map(|_| alloc.allocate()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ids[0], ContextId(0));
    assert_eq!(alloc.allocated(), 100);
}

#[test]
fn test_tag_is_label_plus_separator() {
    assert_eq!(format_context_tag(ContextId(0)), "A: ");
    assert_eq!(format_context_tag(ContextId(52)), "BA: ");
}
