//! Test fixtures and invariant checks for Strata development.
//!
//! Provides container builders with a chosen live-row pattern, custom
//! [`Element`](strata_core::Element) types for registry tests, and
//! [`check_invariants`], which panics with a description of the first
//! broken container invariant.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashSet;

use strata_container::{AttributeContainer, ContainerConfig};
use strata_core::Row;

pub use fixtures::{Position, Rgb};

/// Name of the `u32` column [`container_with_live`] fills with row ids.
pub const ID_ATTRIBUTE: &str = "id";

/// Container of `extent` single rows where only `live` remain allocated.
///
/// Row `r` holds `r` in the [`ID_ATTRIBUTE`] column, so tests can tell
/// where a row's data went after compaction. Holes are freed in
/// ascending order, so the highest hole is reused first.
pub fn container_with_live(chunk_size: u32, extent: u32, live: &[u32]) -> AttributeContainer {
    let mut c = AttributeContainer::new(ContainerConfig::new(chunk_size));
    let id = c
        .add_attribute::<u32>(ID_ATTRIBUTE)
        .expect("fresh container accepts the id column");
    for r in 0..extent {
        let row = c.allocate_rows::<1>();
        c.set_value(id, row, r);
    }
    for r in (0..extent).filter(|r| !live.contains(r)) {
        c.deallocate_rows::<1>(Row(r));
    }
    c
}

/// Container with one column of each common kind and `rows` live rows.
///
/// Columns: marker `"flag"`, `[f32; 3]` `"pos"`, `String` `"name"`,
/// [`Position`] `"anchor"`. Every third row is then freed.
pub fn mixed_container(chunk_size: u32, rows: u32) -> AttributeContainer {
    let mut c = AttributeContainer::new(ContainerConfig::new(chunk_size));
    let pos = c.add_attribute::<[f32; 3]>("pos").expect("pos");
    let name = c.add_attribute::<String>("name").expect("name");
    let anchor = c.add_attribute::<Position>("anchor").expect("anchor");
    let flag = c.add_marker_attribute("flag").expect("flag");
    for i in 0..rows {
        let r = c.allocate_rows::<1>();
        let f = i as f32;
        c.set_value(pos, r, [f, f * 2.0, f * 3.0]);
        c.set_value(name, r, format!("cell-{i}"));
        c.set_value(anchor, r, Position::new(i as f64, -(i as f64), 0.25));
        c.set_value(flag, r, i % 2 == 0);
    }
    for i in (0..rows).filter(|i| i % 3 == 2) {
        c.deallocate_rows::<1>(Row(i));
    }
    c
}

/// Panic unless every structural container invariant holds.
///
/// Checks that the live count matches the non-zero reference counts, that
/// each free-list entry is a distinct hole below the high-water mark and,
/// for single-row groups, that every hole is on the free list.
pub fn check_invariants(c: &AttributeContainer) {
    let extent = c.high_water_mark();
    assert!(
        c.size() <= extent,
        "live rows {} above high-water mark {extent}",
        c.size()
    );
    assert!(
        c.capacity() >= extent as usize,
        "capacity {} below extent {extent}",
        c.capacity()
    );

    let live = (0..extent).filter(|&r| c.is_used(Row(r))).count();
    assert_eq!(live, c.size() as usize, "live count disagrees with liveness");

    let mut free = HashSet::new();
    for row in c.free_rows() {
        assert!(row.0 < extent, "free row {row} beyond extent {extent}");
        assert!(!c.is_used(row), "free row {row} is live");
        assert!(free.insert(row), "free row {row} listed twice");
    }
    if c.primitive_size().unwrap_or(1) == 1 {
        for r in (0..extent).map(Row).filter(|&r| !c.is_used(r)) {
            assert!(free.contains(&r), "hole {r} missing from the free list");
        }
    }

    let markers = c.marker_count() as usize;
    let tags: Vec<_> = c.type_tags().collect();
    assert!(markers <= tags.len(), "marker count {markers} above attribute count");
    assert!(
        tags[..markers].iter().all(|&t| t == "bool"),
        "non-boolean column inside the marker prefix"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_with_live_frees_the_rest() {
        let c = container_with_live(4, 6, &[1, 4]);
        assert_eq!(c.size(), 2);
        assert_eq!(c.high_water_mark(), 6);
        assert_eq!(c.free_rows().next(), Some(Row(5)));
        check_invariants(&c);
    }

    #[test]
    fn mixed_container_is_consistent() {
        let c = mixed_container(8, 12);
        assert_eq!(c.size(), 8);
        assert_eq!(c.marker_count(), 1);
        check_invariants(&c);
    }
}
