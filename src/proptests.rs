//! Property-based tests for the normalizing rewrites and version checks.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::cmp::Ordering;
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use crate::definition::ClassDocument;
    use crate::serialized::{decode_value, reencode};
    use crate::version::{compare_modified, is_current};

    fn legacy_string(value: &str) -> String {
        format!("s:{}:\"{}\";", value.len(), value)
    }

    fn legacy_map(map: &BTreeMap<String, String>) -> String {
        let body: String = map
            .iter()
            .map(|(k, v)| format!("{}{}", legacy_string(k), legacy_string(v)))
            .collect();
        format!("a:{}:{{{}}}", map.len(), body)
    }

    fn class_with_placements(placements: &[u32]) -> String {
        let attributes: String = placements
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "<attribute datatype=\"ezstring\"><identifier>a{i}</identifier>\
                     <placement>{p}</placement></attribute>"
                )
            })
            .collect();
        format!(
            "<content-class><identifier>c</identifier>\
             <ezcontentclass-attri:attributes xmlns:ezcontentclass-attri=\"http://ezpublish/contentclassattribute\">\
             {attributes}</ezcontentclass-attri:attributes></content-class>"
        )
    }

    fn placements(doc: &ClassDocument) -> Vec<u32> {
        doc.definition("eng-GB")
            .unwrap()
            .attributes
            .iter()
            .map(|a| a.placement)
            .collect()
    }

    proptest! {
        /// Property: a timestamp is always current against itself
        #[test]
        fn version_check_is_reflexive(modified in "[0-9a-fA-F]{0,12}") {
            prop_assert!(is_current(&modified, &modified));
            prop_assert_eq!(compare_modified(&modified, &modified), Ordering::Equal);
        }

        /// Property: swapping the operands reverses the ordering
        #[test]
        fn version_compare_is_antisymmetric(a in "[0-9]{1,11}", b in "[0-9]{1,11}") {
            prop_assert_eq!(compare_modified(&a, &b), compare_modified(&b, &a).reverse());
        }

        /// Property: equal-length numeric strings order like numbers
        #[test]
        fn version_compare_matches_numbers_for_ten_digits(a in 1_000_000_000u64..9_999_999_999, b in 1_000_000_000u64..9_999_999_999) {
            prop_assert_eq!(compare_modified(&a.to_string(), &b.to_string()), a.cmp(&b));
        }

        /// Property: re-encoding is idempotent and keeps the content
        #[test]
        fn reencode_is_idempotent(map in prop::collection::btree_map("[a-z]{3}-[A-Z]{2}", "[a-zA-Z0-9 <>&]{0,12}", 1..4)) {
            let legacy = legacy_map(&map);
            let once = reencode(&legacy);
            let twice = reencode(&once);
            prop_assert_eq!(&once, &twice);

            let decoded = decode_value(&once).unwrap();
            let expected: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            prop_assert_eq!(decoded, serde_json::Value::Object(expected));
        }

        /// Property: placement normalization yields 1..N and is idempotent
        #[test]
        fn placement_normalization_is_idempotent(input in prop::collection::vec(0u32..100, 0..12)) {
            let mut doc = ClassDocument::parse_str(&class_with_placements(&input), "c.xml").unwrap();
            let count = doc.normalize_placement().unwrap();
            let once = placements(&doc);
            doc.normalize_placement().unwrap();
            let twice = placements(&doc);

            let expected: Vec<u32> = (1..=input.len() as u32).collect();
            prop_assert_eq!(count, input.len());
            prop_assert_eq!(&once, &expected);
            prop_assert_eq!(once, twice);
        }
    }
}
