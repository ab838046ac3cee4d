//! Integration test: row allocation, reuse and traversal through the
//! public container API, checked against the structural invariants after
//! every step.

use strata_container::{AttributeContainer, ContainerConfig, IndexListBrowser};
use strata_core::{ContainerError, Row};
use strata_test_utils::{check_invariants, container_with_live, Position};

// ── Allocation and reuse ────────────────────────────────────────────

#[test]
fn freed_row_is_reused_before_growth() {
    let mut c = AttributeContainer::default();
    let pos = c.add_attribute::<[f32; 3]>("pos").unwrap();
    for expected in 0..5 {
        let r = c.allocate_rows::<1>();
        assert_eq!(r, Row(expected));
        c.set_value(pos, r, [expected as f32; 3]);
    }

    c.deallocate_rows::<1>(Row(2));
    assert!((c.fragmentation() - 0.8).abs() < f32::EPSILON);
    check_invariants(&c);

    assert_eq!(c.allocate_rows::<1>(), Row(2));
    assert_eq!(c.fragmentation(), 1.0);
    assert_eq!(c.high_water_mark(), 5);
    check_invariants(&c);
}

#[test]
fn reuse_is_last_in_first_out() {
    let mut c = container_with_live(4, 8, &[0, 1, 2, 3, 4, 5, 6, 7]);
    for r in [6, 1, 3] {
        c.deallocate_rows::<1>(Row(r));
    }
    assert_eq!(c.allocate_rows::<1>(), Row(3));
    assert_eq!(c.allocate_rows::<1>(), Row(1));
    assert_eq!(c.allocate_rows::<1>(), Row(6));
    assert_eq!(c.allocate_rows::<1>(), Row(8));
    check_invariants(&c);
}

#[test]
fn released_references_feed_the_free_list() {
    let mut c = AttributeContainer::new(ContainerConfig::new(2));
    let a = c.allocate_rows::<1>();
    let b = c.allocate_rows::<1>();
    c.ref_row(b);
    c.ref_row(b);

    assert!(c.unref_row(a));
    assert!(!c.unref_row(b));
    assert!(!c.unref_row(b));
    assert_eq!(c.nb_refs(b), 1);
    check_invariants(&c);

    assert_eq!(c.allocate_rows::<1>(), a);
}

#[test]
fn values_survive_growth_across_chunks() {
    let mut c = AttributeContainer::new(ContainerConfig::new(3));
    let w = c.add_attribute::<u64>("w").unwrap();
    for i in 0..20u64 {
        let r = c.allocate_rows::<1>();
        c.set_value(w, r, i * i);
    }
    assert_eq!(c.capacity(), 21);
    for i in 0..20u32 {
        assert_eq!(c.value(w, Row(i)), Some(&(i as u64 * i as u64)));
    }
}

// ── Attributes ──────────────────────────────────────────────────────

#[test]
fn custom_element_types_register_on_first_use() {
    let mut c = AttributeContainer::default();
    assert!(!c.registry().contains("Position"));
    let anchor = c.add_attribute::<Position>("anchor").unwrap();
    assert!(c.registry().contains("Position"));

    let r = c.allocate_rows::<1>();
    c.set_value(anchor, r, Position::new(1.0, 2.0, 3.0));
    assert_eq!(c.value(anchor, r), Some(&Position::new(1.0, 2.0, 3.0)));
}

#[test]
fn lookup_errors_are_recoverable() {
    let mut c = AttributeContainer::default();
    c.add_attribute::<Position>("anchor").unwrap();

    assert_eq!(
        c.add_attribute::<u8>("anchor").unwrap_err(),
        ContainerError::DuplicateName {
            name: "anchor".into()
        }
    );
    assert!(matches!(
        c.get_attribute::<[f64; 3]>("anchor"),
        Err(ContainerError::TypeMismatch { .. })
    ));
    assert!(matches!(
        c.get_attribute_untyped("nope"),
        Err(ContainerError::NotFound { .. })
    ));
    assert!(!c.remove_attribute("nope"));
    assert_eq!(c.attribute_count(), 1);
}

#[test]
fn removing_markers_keeps_prefix_contiguous() {
    let mut c = AttributeContainer::default();
    c.add_attribute::<u32>("a").unwrap();
    let m1 = c.add_marker_attribute("m1").unwrap();
    c.add_attribute::<u32>("b").unwrap();
    c.add_marker_attribute("m2").unwrap();
    c.add_marker_attribute("m3").unwrap();
    c.add_attribute::<u32>("c").unwrap();
    check_invariants(&c);

    assert!(c.remove_attribute_by_id(m1.id()));
    assert!(c.remove_attribute("b"));
    assert_eq!(c.marker_count(), 2);
    check_invariants(&c);

    let mut names: Vec<_> = c.attribute_names().take(2).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["m2", "m3"]);
}

// ── Traversal ───────────────────────────────────────────────────────

#[test]
fn grouped_traversal_visits_group_starts() {
    let mut c = AttributeContainer::default();
    for _ in 0..4 {
        c.allocate_rows::<3>();
    }
    c.deallocate_rows::<3>(Row(4));

    let mut starts = Vec::new();
    let mut r = c.begin();
    while r != c.end() {
        starts.push(r);
        c.next_primitive(&mut r, 3);
    }
    assert_eq!(starts, vec![Row(0), Row(6), Row(9)]);
}

#[test]
fn index_list_browser_skips_rows_freed_after_install() {
    let mut c = container_with_live(4, 6, &[0, 1, 2, 3, 4, 5]);
    c.set_current_browser(IndexListBrowser::new([Row(5), Row(0), Row(3)]));
    c.deallocate_rows::<1>(Row(0));

    assert_eq!(c.rows().collect::<Vec<_>>(), vec![Row(5), Row(3)]);

    c.set_standard_browser();
    assert_eq!(
        c.rows().collect::<Vec<_>>(),
        vec![Row(1), Row(2), Row(3), Row(4), Row(5)]
    );
}

#[test]
fn clear_resets_rows_but_keeps_browser() {
    let mut c = container_with_live(4, 6, &[1, 2]);
    c.set_current_browser(IndexListBrowser::new([Row(1)]));
    c.clear(false);
    assert!(c.has_custom_browser());
    assert_eq!(c.rows().count(), 0);
    assert_eq!(c.rbegin(), None);
    check_invariants(&c);
}
