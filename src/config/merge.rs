// src/config/merge.rs

//! Deep merge of nested configuration tables.

use toml::{Table, Value};

/// Merge `overlay` into `base`.
///
/// Leaves in `overlay` replace leaves in `base`; nested tables are merged
/// key by key so siblings in `base` survive. Arrays are replaced wholesale.
pub fn deep_merge(base: &mut Table, overlay: &Table) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge a sequence of layers, later layers winning, into a fresh table.
pub fn merged<'a, I>(layers: I) -> Table
where
    I: IntoIterator<Item = &'a Table>,
{
    let mut out = Table::new();
    for layer in layers {
        deep_merge(&mut out, layer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        toml::from_str::<Table>(src).unwrap()
    }

    #[test]
    fn leaves_override_and_siblings_survive() {
        let mut base = table(
            r#"
            dest = "public"
            [style]
            compiler = "lessc -"
            banner = "/* a */"
            "#,
        );
        let overlay = table(
            r#"
            [style]
            banner = "/* b */"
            "#,
        );

        deep_merge(&mut base, &overlay);

        assert_eq!(base["dest"].as_str(), Some("public"));
        assert_eq!(base["style"]["compiler"].as_str(), Some("lessc -"));
        assert_eq!(base["style"]["banner"].as_str(), Some("/* b */"));
    }

    #[test]
    fn arrays_are_replaced() {
        let mut base = table(r#"watch = ["a", "b"]"#);
        deep_merge(&mut base, &table(r#"watch = ["c"]"#));
        assert_eq!(base["watch"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn scalar_replaced_by_table_and_back() {
        let mut base = table(r#"opt = 1"#);
        deep_merge(&mut base, &table("[opt]\nx = 1"));
        assert!(base["opt"].is_table());
        deep_merge(&mut base, &table("opt = false"));
        assert_eq!(base["opt"].as_bool(), Some(false));
    }

    #[test]
    fn merged_layers_do_not_alias_inputs() {
        let kind = table("a = 1\n[n]\nx = 1");
        let global = table("[n]\ny = 2");
        let call = table("a = 3");

        let out = merged([&kind, &global, &call]);
        assert_eq!(out["a"].as_integer(), Some(3));
        assert_eq!(out["n"]["x"].as_integer(), Some(1));
        assert_eq!(out["n"]["y"].as_integer(), Some(2));
        // Inputs untouched.
        assert_eq!(kind["a"].as_integer(), Some(1));
        assert!(global["n"].get("x").is_none());
    }
}
