use std::sync::Arc;

use proptest::prelude::*;

use assetdag::fs::mock::MockFileSystem;
use assetdag::names::NameAllocator;
use assetdag::paths::{Group, PathResolver};

fn resolver() -> PathResolver {
    PathResolver::new(Arc::new(MockFileSystem::new()), ".")
}

// Destinations built from short segments, with or without a trailing slash.
fn raw_destination() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z]{1,6}(\\.[a-z]{0,3}){0,2}", 0..4),
        any::<bool>(),
    )
        .prop_map(|(segments, trailing)| {
            let mut raw = segments.join("/");
            if trailing {
                raw.push('/');
            }
            raw
        })
}

fn group() -> impl Strategy<Value = Group> {
    prop_oneof![Just(Group::FILES), Just(Group::CSS), Just(Group::JS)]
}

proptest! {
    #[test]
    fn file_targets_recompose(raw in raw_destination(), group in group()) {
        let mut names = NameAllocator::new("app");
        let d = resolver().resolve_destination(&raw, true, group, "public", &mut names);

        prop_assert!(!d.file.is_empty());
        prop_assert!(!d.directory.is_empty());
        let recomposed = if d.extension.is_empty() {
            d.base_name.clone()
        } else {
            format!("{}.{}", d.base_name, d.extension)
        };
        prop_assert_eq!(recomposed, d.file.clone());
        prop_assert!(!d.file.contains('/'));
    }

    #[test]
    fn directory_targets_have_no_file(raw in raw_destination(), group in group()) {
        let mut names = NameAllocator::new("app");
        let d = resolver().resolve_destination(&raw, false, group, "public", &mut names);

        prop_assert!(d.file.is_empty());
        prop_assert!(d.extension.is_empty());
        prop_assert!(!d.base_name.is_empty());

        let expected_dir = match raw.strip_suffix('/').unwrap_or(&raw) {
            "" => "public",
            dir => dir,
        };
        prop_assert_eq!(d.directory.as_str(), expected_dir);
    }

    #[test]
    fn group_defaults_count_up(n in 1usize..12) {
        let mut names = NameAllocator::new("app");
        let generated: Vec<String> = (0..n).map(|_| names.allocate_group_default("css")).collect();

        prop_assert_eq!(generated[0].as_str(), "app");
        for (i, name) in generated.iter().enumerate().skip(1) {
            prop_assert_eq!(name.clone(), format!("app{}", i + 1));
        }
    }

    #[test]
    fn repeated_candidates_get_distinct_second_name(candidate in "[a-z]{1,8}(_[a-z]{1,4})?") {
        let mut names = NameAllocator::new("app");
        let first = names.allocate_task_name(&candidate);
        let second = names.allocate_task_name(&candidate);

        prop_assert_eq!(first.clone(), format!("_{candidate}"));
        prop_assert_ne!(first, second);
    }
}
