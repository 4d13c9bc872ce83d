use crate::pipeline::negotiate::parse_accept_encoding;
use crate::pipeline::resolve::resolve_path;

use std::fs;

use proptest::prelude::*;
use tempfile::tempdir;

fn path_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        Just("..".to_string()),
        Just(".".to_string()),
        Just("".to_string()),
        Just("a".to_string()),
        Just("b".to_string()),
        Just("index.html".to_string()),
        Just("file.txt".to_string()),
        "[a-z]{1,6}",
        "[a-z]{1,4}\\.[a-z]{1,3}",
    ];
    prop::collection::vec(segment, 0..6).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    /// No request path ever resolves to a file outside the root.
    #[test]
    fn resolver_never_escapes_the_root(raw in path_strategy()) {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("file.txt"), "x").unwrap();
        fs::write(root.join("a/file.txt"), "x").unwrap();
        fs::write(root.join("a/b/index.html"), "x").unwrap();

        let index = vec!["index.html".to_string()];
        if let Ok(resolved) = resolve_path(&root, &index, &raw) {
            prop_assert!(resolved.file.starts_with(&root));
            prop_assert!(resolved.file.is_file());
            prop_assert!(resolved.logical_path.starts_with('/'));
        }
    }

    /// Between two supported codings the heavier weight always ranks
    /// first.
    #[test]
    fn heavier_weight_ranks_first(qa in 1u32..=9, qb in 1u32..=9) {
        prop_assume!(qa != qb);

        let header = format!("gzip;q=0.{qa}, deflate;q=0.{qb}");
        let prefs = parse_accept_encoding(&header);

        prop_assert_eq!(prefs.len(), 2);
        let expected = if qa > qb { "gzip" } else { "deflate" };
        prop_assert_eq!(prefs[0].name.as_str(), expected);
    }

    /// Parsing never panics and never yields a zero-weight token.
    #[test]
    fn parser_is_total_and_drops_zero_weights(header in "[a-zA-Z0-9;=.,* ]{0,60}") {
        for pref in parse_accept_encoding(&header) {
            prop_assert!(pref.weight > 0.0);
            prop_assert!(!pref.name.is_empty());
        }
    }
}
