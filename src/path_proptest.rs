//! Property-based tests for path pattern functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{compile_glob, glob_match, has_placeholders, substitute_placeholders, Variables};
    use proptest::prelude::*;

    // ============================================================================
    // substitute_placeholders property tests
    // ============================================================================

    proptest! {
        /// Property: text without braces is returned unchanged
        #[test]
        fn substitute_is_identity_without_braces(input in "[^{}]*") {
            let result = substitute_placeholders(&input, &Variables::new()).unwrap();
            prop_assert_eq!(result, input);
        }

        /// Property: both placeholder forms substitute to the same value
        #[test]
        fn substitute_forms_agree(
            name in "[a-z_][a-z0-9_]{0,10}",
            value in "[a-zA-Z0-9./-]{0,20}",
            prefix in "[a-z/]{0,10}",
        ) {
            let mut variables = Variables::new();
            variables.insert(name.clone(), value.clone());

            let short = substitute_placeholders(&format!("{prefix}{{{{ {name} }}}}"), &variables).unwrap();
            let long = substitute_placeholders(&format!("{prefix}{{{{cookiecutter.{name}}}}}"), &variables).unwrap();
            prop_assert_eq!(&short, &long);
            prop_assert_eq!(short, format!("{prefix}{value}"));
        }

        /// Property: a substituted text never has placeholders left when the
        /// values contain none
        #[test]
        fn substitute_leaves_no_placeholders(
            name in "[a-z][a-z0-9]{0,5}",
            value in "[a-z0-9]{0,8}",
            count in 1usize..4,
        ) {
            let mut variables = Variables::new();
            variables.insert(name.clone(), value);
            let text = format!("{{{{ {name} }}}}/").repeat(count);
            let result = substitute_placeholders(&text, &variables).unwrap();
            prop_assert!(!has_placeholders(&result));
        }

        /// Property: an unknown variable is always an error
        #[test]
        fn substitute_unknown_variable_fails(name in "[a-z][a-z0-9_]{0,10}") {
            let text = format!("dir/{{{{ {name} }}}}");
            prop_assert!(substitute_placeholders(&text, &Variables::new()).is_err());
        }
    }

    // ============================================================================
    // glob property tests
    // ============================================================================

    proptest! {
        /// Property: a literal pattern matches exactly itself
        #[test]
        fn literal_glob_matches_itself(path in "[a-zA-Z0-9_./-]{1,30}") {
            prop_assert!(glob_match(&path, &path).unwrap());
        }

        /// Property: "*" matches every path, including nested ones
        #[test]
        fn star_matches_everything(path in "[a-zA-Z0-9_./-]{0,30}") {
            prop_assert!(glob_match("*", &path).unwrap());
        }

        /// Property: an extension pattern matches every path with that extension
        #[test]
        fn extension_glob_matches(stem in "[a-z0-9/]{0,20}", ext in "[a-z]{1,4}") {
            let pattern = format!("*.{ext}");
            let path = format!("{stem}.{ext}");
            prop_assert!(compile_glob(&pattern).unwrap().matches(&path));
        }
    }
}
