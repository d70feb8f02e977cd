#![no_main]

use libfuzzer_sys::fuzz_target;
use prism_router::upgrade::{CutAction, CutEntry};
use prism_router::{Address, Router, Selector};

const MAX_ENTRIES: usize = 24;
const MAX_SELECTORS_PER_ENTRY: usize = 8;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    run_cut_program(data);
});

/// Drive a sequence of cut batches derived from raw bytes and check that
/// the routing table either commits a fully-valid batch or stays exactly
/// as it was.
fn run_cut_program(data: &[u8]) {
    let owner = Address::from_bytes([0x01; 20]);
    let mut router = match Router::new(Address::from_bytes([0xD0; 20]), owner) {
        Ok(router) => router,
        Err(_) => return,
    };

    let mut cursor = 0usize;
    while cursor + 2 < data.len() {
        let entry_count = 1 + usize::from(byte(data, cursor)) % MAX_ENTRIES;
        cursor += 1;

        let mut batch = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            let action = match byte(data, cursor) % 3 {
                0 => CutAction::Add,
                1 => CutAction::Replace,
                _ => CutAction::Remove,
            };
            let facet_seed = byte(data, cursor + 1) % 8;
            let facet = if action == CutAction::Remove && facet_seed < 6 {
                Address::ZERO
            } else {
                Address::from_bytes([facet_seed; 20])
            };
            let selector_count = usize::from(byte(data, cursor + 2)) % MAX_SELECTORS_PER_ENTRY;
            let mut selectors = Vec::with_capacity(selector_count);
            for i in 0..selector_count {
                let seed = byte(data, cursor + 3 + i);
                selectors.push(Selector::from_bytes([seed % 16, 0, 0, seed % 4]));
            }
            cursor += 3 + selector_count;
            batch.push(CutEntry {
                facet,
                action,
                selectors,
            });
        }

        let before = serde_json::to_string(router.state()).expect("state serializes");
        match router.apply_cut(owner, &batch, None) {
            Ok(applied) => {
                assert_eq!(applied.entries.len(), batch.len());
                assert!(router.state().table().is_consistent());
            }
            Err(_) => {
                let after =
                    serde_json::to_string(router.state()).expect("state serializes");
                assert_eq!(before, after, "failed batch must not mutate state");
            }
        }

        // Every routed selector must resolve back to its facet.
        for info in router.facets() {
            for selector in &info.selectors {
                assert_eq!(router.facet_address(selector), Some(info.facet));
            }
        }
    }
}

fn byte(data: &[u8], index: usize) -> u8 {
    data[index % data.len()]
}
