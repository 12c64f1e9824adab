use kernelspec_core::{ComputeCapability, InMemoryMultiVersionText};

fn three_targets() -> InMemoryMultiVersionText<'static> {
    InMemoryMultiVersionText::from_specs(
        [(3, 0, "ptxA"), (5, 2, "ptxB"), (7, 0, "ptxC")],
        "kernel",
        false,
    )
}

#[test]
fn explicit_version_list_scenario() {
    let table = three_targets();

    let default = table.default_text().expect("non-empty table has a default");
    assert_eq!(&*default, b"ptxA");
    assert_eq!(&*table.text((5, 2)).expect("5.2 is present"), b"ptxB");
    assert!(table.text((6, 0)).is_none());
    assert_eq!(table.original_text((7, 0)), Some(&b"ptxC"[..]));
}

#[test]
fn lookups_never_fall_back_to_neighbours() {
    let table = three_targets();
    for missing in [(2, 9), (3, 1), (5, 0), (5, 3), (7, 1), (9, 0)] {
        assert!(table.text(missing).is_none(), "{missing:?} must not resolve");
        assert!(table.original_text(missing).is_none(), "{missing:?} must not resolve");
    }
}

#[test]
fn default_is_smallest_capability_regardless_of_insertion_order() {
    let table = InMemoryMultiVersionText::from_specs(
        [(9, 0, "newest"), (6, 1, "middle"), (4, 0, "oldest")],
        "kernel",
        false,
    );
    assert_eq!(table.original_default_text(), Some(&b"oldest"[..]));
    assert_eq!(
        table.capabilities().collect::<Vec<_>>(),
        vec![
            ComputeCapability::new(4, 0),
            ComputeCapability::new(6, 1),
            ComputeCapability::new(9, 0),
        ]
    );
}

#[test]
fn single_buffer_default_matches_minimum_lookup() {
    let ptx = b"// single".to_vec();
    let table = InMemoryMultiVersionText::new(ptx.as_slice(), "kernel", false);

    let default = table.default_text().expect("default");
    let minimum = table
        .text(ComputeCapability::MINIMUM)
        .expect("minimum capability entry");
    assert_eq!(default, minimum);
    assert_eq!(default.as_ptr(), ptx.as_ptr());
}

#[test]
fn empty_string_text_is_found_not_missing() {
    let table = InMemoryMultiVersionText::from_specs([(7, 0, "")], "kernel", false);
    let text = table.text((7, 0)).expect("empty text is still an entry");
    assert!(text.is_empty());
    assert_eq!(table.original_default_text(), Some(&b""[..]));
}

#[test]
fn owned_buffers_are_accepted() {
    let table = InMemoryMultiVersionText::new(b"owned".to_vec(), "kernel", false);
    assert_eq!(table.original_default_text(), Some(&b"owned"[..]));
    assert_eq!(table.kernel_name(), "kernel");
}
