// src/config/validate.rs

use toml::Value;

use crate::config::model::{Manifest, RawManifest, StepConfig};
use crate::errors::{AssetdagError, Result};
use crate::tasks::Kind;

impl TryFrom<RawManifest> for Manifest {
    type Error = crate::errors::AssetdagError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.config, raw.step))
    }
}

fn validate_raw_manifest(raw: &RawManifest) -> Result<()> {
    ensure_has_steps(raw)?;
    validate_global_config(raw)?;
    for (index, step) in raw.step.iter().enumerate() {
        validate_step(index, step)?;
    }
    Ok(())
}

fn ensure_has_steps(raw: &RawManifest) -> Result<()> {
    if raw.step.is_empty() {
        return Err(AssetdagError::ConfigError(
            "manifest must contain at least one [[step]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(raw: &RawManifest) -> Result<()> {
    for key in ["dest", "name"] {
        match raw.config.get(key) {
            None => {}
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(other) => {
                return Err(AssetdagError::ConfigError(format!(
                    "[config].{key} must be a non-empty string (got {other})"
                )));
            }
        }
    }

    for key in ["compress", "watch", "use_hash"] {
        if let Some(value) = raw.config.get(key) {
            if !value.is_bool() {
                return Err(AssetdagError::ConfigError(format!(
                    "[config].{key} must be true or false (got {value})"
                )));
            }
        }
    }

    for kind in Kind::ALL {
        if let Some(value) = raw.config.get(kind.config_key()) {
            if !value.is_table() {
                return Err(AssetdagError::ConfigError(format!(
                    "[config].{} must be a table",
                    kind.config_key()
                )));
            }
        }
    }

    Ok(())
}

fn validate_step(index: usize, step: &StepConfig) -> Result<()> {
    let at = format!("step #{} ({})", index + 1, step.kind.config_key());

    match step.kind {
        Kind::Files | Kind::Style | Kind::Script => {
            let has_sources = step
                .src
                .clone()
                .map(|s| s.into_vec().iter().any(|p| !p.trim().is_empty()))
                .unwrap_or(false);
            if !has_sources {
                return Err(AssetdagError::ConfigError(format!(
                    "{at} needs a non-empty `src`"
                )));
            }
            if step.cmd.is_some() {
                return Err(AssetdagError::ConfigError(format!(
                    "{at} does not accept `cmd`; use kind = \"task\""
                )));
            }
        }
        Kind::Callback => {
            let has_cmd = step.cmd.as_deref().is_some_and(|c| !c.trim().is_empty());
            if !has_cmd {
                return Err(AssetdagError::ConfigError(format!(
                    "{at} needs a non-empty `cmd`"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Manifest> {
        let raw: RawManifest = toml::from_str(src)?;
        Manifest::try_from(raw)
    }

    #[test]
    fn accepts_minimal_manifest() {
        let m = parse(
            r#"
            [[step]]
            kind = "js"
            src = "src/*.js"
            "#,
        )
        .unwrap();
        assert_eq!(m.steps().len(), 1);
        assert_eq!(m.settings().dest(), "public");
    }

    #[test]
    fn rejects_empty_manifest() {
        assert!(matches!(parse(""), Err(AssetdagError::ConfigError(_))));
    }

    #[test]
    fn rejects_missing_sources() {
        let err = parse(
            r#"
            [[step]]
            kind = "style"
            dest = "public/css/"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("src"));
    }

    #[test]
    fn rejects_task_without_cmd() {
        let err = parse(
            r#"
            [[step]]
            kind = "task"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cmd"));
    }

    #[test]
    fn rejects_non_bool_tri_state() {
        let err = parse(
            r#"
            [config]
            watch = "yes"

            [[step]]
            kind = "files"
            src = "a"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("watch"));
    }

    #[test]
    fn rejects_empty_dest_root() {
        let err = parse(
            r#"
            [config]
            dest = ""

            [[step]]
            kind = "files"
            src = "a"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dest"));
    }

    #[test]
    fn unknown_kind_is_a_toml_error() {
        let res: std::result::Result<RawManifest, _> = toml::from_str(
            r#"
            [[step]]
            kind = "sass"
            src = "a"
            "#,
        );
        assert!(res.is_err());
    }
}
