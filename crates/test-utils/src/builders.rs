use assetdag::config::{Manifest, RawManifest, StepConfig};
use assetdag::paths::Sources;
use assetdag::tasks::Kind;
use toml::Table;

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    raw: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawManifest::default(),
        }
    }

    /// Merge a `[config]` snippet written as TOML.
    pub fn with_config(mut self, toml_src: &str) -> Self {
        let overrides: Table = toml::from_str(toml_src).expect("invalid [config] TOML in test");
        assetdag::config::deep_merge(&mut self.raw.config, &overrides);
        self
    }

    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.raw.step.push(step);
        self
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.raw).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `[[step]]`.
pub struct StepBuilder {
    step: StepConfig,
}

impl StepBuilder {
    pub fn new(kind: Kind) -> Self {
        Self {
            step: StepConfig {
                kind,
                src: None,
                dest: None,
                config: None,
                cmd: None,
                watch: None,
            },
        }
    }

    pub fn files(src: impl Into<Sources>, dest: &str) -> Self {
        Self::new(Kind::Files).src(src).dest(dest)
    }

    pub fn style(src: impl Into<Sources>, dest: &str) -> Self {
        Self::new(Kind::Style).src(src).dest(dest)
    }

    pub fn script(src: impl Into<Sources>, dest: &str) -> Self {
        Self::new(Kind::Script).src(src).dest(dest)
    }

    pub fn task(cmd: &str) -> Self {
        Self::new(Kind::Callback).cmd(cmd)
    }

    pub fn src(mut self, src: impl Into<Sources>) -> Self {
        self.step.src = Some(src.into());
        self
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.step.dest = Some(dest.to_string());
        self
    }

    /// Per-step config written as TOML.
    pub fn config(mut self, toml_src: &str) -> Self {
        let config = toml::from_str(toml_src).expect("invalid step config TOML in test");
        self.step.config = Some(config);
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.step.cmd = Some(cmd.to_string());
        self
    }

    pub fn watch(mut self, patterns: &[&str]) -> Self {
        self.step.watch = Some(patterns.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}
