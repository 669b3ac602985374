//! Property-based tests for the strategy engine.
//!
//! Every strategy must reach a fixed point: rolling the same template out
//! again over its own output changes nothing.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use crate::strategies::test_support::meta;
    use crate::strategies::{StrategyInput, StrategyKind, StrategyNode};
    use proptest::prelude::*;

    fn node(kind: StrategyKind, config: &str) -> StrategyNode {
        let raw: serde_yaml::Value = serde_yaml::from_str(config).unwrap();
        StrategyNode::new(kind, &raw).unwrap()
    }

    fn apply(node: &StrategyNode, template: &[u8], target: Option<&[u8]>, dirty: bool) -> Vec<u8> {
        let meta = meta(dirty);
        node.apply(StrategyInput::new(target, template, &meta)).unwrap()
    }

    fn lines() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Z0-9_.*]{1,8}", 0..8).prop_map(|lines| {
            lines.iter().map(|line| format!("{line}\n")).collect()
        })
    }

    fn ini() -> impl Strategy<Value = String> {
        prop::collection::btree_map(
            "[a-z]{1,5}",
            prop::collection::btree_map("[a-z]{1,5}", "[a-z0-9]{1,5}", 0..4),
            0..4,
        )
        .prop_map(|sections: BTreeMap<String, BTreeMap<String, String>>| {
            let mut text = String::new();
            for (section, entries) in sections {
                text.push_str(&format!("[{section}]\n"));
                for (key, value) in entries {
                    text.push_str(&format!("{key} = {value}\n"));
                }
            }
            text
        })
    }

    proptest! {
        /// Property: Overwrite returns the template bytes exactly
        #[test]
        fn overwrite_is_template(
            template in prop::collection::vec(any::<u8>(), 0..64),
            target in prop::option::of(prop::collection::vec(any::<u8>(), 0..64)),
        ) {
            let node = node(StrategyKind::Overwrite, "null");
            prop_assert_eq!(apply(&node, &template, target.as_deref(), false), template);
        }

        /// Property: IfMissing keeps any existing target
        #[test]
        fn if_missing_keeps_target(
            template in prop::collection::vec(any::<u8>(), 0..64),
            target in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let node = node(StrategyKind::IfMissing, "null");
            prop_assert_eq!(apply(&node, &template, Some(&target), false), target);
        }

        /// Property: SortedUniqueLines reaches a fixed point after one rollup
        #[test]
        fn sorted_unique_lines_idempotent(template in lines(), target in lines()) {
            let node = node(StrategyKind::SortedUniqueLines, "null");
            let once = apply(&node, template.as_bytes(), Some(target.as_bytes()), false);
            let twice = apply(&node, template.as_bytes(), Some(&once), false);
            prop_assert_eq!(once, twice);
        }

        /// Property: a clean template stamps a file once
        #[test]
        fn template_hash_idempotent(template in lines(), rendered in any::<bool>()) {
            let kind = if rendered {
                StrategyKind::RenderedTemplateFileHash
            } else {
                StrategyKind::TemplateHash
            };
            let node = node(kind, "null");
            let once = apply(&node, template.as_bytes(), None, false);
            let twice = apply(&node, template.as_bytes(), Some(&once), false);
            prop_assert_eq!(once, twice);
        }

        /// Property: preserving every target key converges after one rollup
        #[test]
        fn config_parser_merge_idempotent(template in ini(), target in ini()) {
            let node = node(
                StrategyKind::ConfigParserMerge,
                "preserve_keys:\n  - sections: '.*'\n    keys: '.*'\n",
            );
            let once = apply(&node, template.as_bytes(), Some(target.as_bytes()), false);
            let twice = apply(&node, template.as_bytes(), Some(&once), false);
            prop_assert_eq!(once, twice);
        }
    }
}
