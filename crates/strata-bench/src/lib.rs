//! Benchmark workloads for the Strata attribute store.
//!
//! - [`reference_container`]: 100K rows over four mesh-style attributes.
//! - [`fragment`]: free a deterministic fraction of rows.
//! - [`churn`]: interleaved allocate/free traffic driven by a seed.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_container::{AttributeContainer, ContainerConfig};
use strata_core::Row;

/// Rows in the reference workload.
pub const REFERENCE_ROWS: u32 = 100_000;

/// Build the reference container: `rows` live rows with a position,
/// a normal, a label and one marker column.
pub fn reference_container(rows: u32) -> AttributeContainer {
    let mut c = AttributeContainer::new(ContainerConfig::default());
    let pos = c.add_attribute::<[f32; 3]>("position").unwrap();
    let normal = c.add_attribute::<[f32; 3]>("normal").unwrap();
    let label = c.add_attribute::<u32>("label").unwrap();
    c.add_marker_attribute("visited").unwrap();
    for i in 0..rows {
        let r = c.allocate_rows::<1>();
        let f = i as f32;
        c.set_value(pos, r, [f, f * 0.5, -f]);
        c.set_value(normal, r, [0.0, 0.0, 1.0]);
        c.set_value(label, r, i % 7);
    }
    c
}

/// Deterministic pseudo-random sequence (64-bit LCG), one value per call.
fn lcg(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state >> 33
}

/// Free roughly `percent`% of the live rows, chosen by `seed`.
///
/// Returns the number of rows freed.
pub fn fragment(c: &mut AttributeContainer, percent: u64, seed: u64) -> u32 {
    let mut state = seed;
    let mut freed = 0;
    for r in 0..c.high_water_mark() {
        if c.is_used(Row(r)) && lcg(&mut state) % 100 < percent {
            c.deallocate_rows::<1>(Row(r));
            freed += 1;
        }
    }
    freed
}

/// Run `steps` rounds of allocate/free traffic. Roughly half the steps
/// free a previously allocated row.
pub fn churn(c: &mut AttributeContainer, steps: u32, seed: u64) {
    let mut state = seed;
    let mut held: Vec<Row> = Vec::new();
    for _ in 0..steps {
        if held.is_empty() || lcg(&mut state) % 2 == 0 {
            held.push(c.allocate_rows::<1>());
        } else {
            let at = (lcg(&mut state) % held.len() as u64) as usize;
            c.deallocate_rows::<1>(held.swap_remove(at));
        }
    }
}
