//! Settings precedence for a project.

use crate::core::{Manifest, RawSettings, Settings};
use crate::util::Config;
use crate::Error;

/// Compute the settings a project builds with.
///
/// Precedence, lowest first: detected host, configuration files, the
/// recipe's `[settings]`, then `overrides` (`key=value`) in order.
pub fn effective_settings(
    manifest: &Manifest,
    config: &Config,
    overrides: &[String],
) -> Result<Settings, Error> {
    let mut raw = RawSettings::detect()
        .merge(config.settings.defaults.clone())
        .merge(manifest.settings().clone());

    for assignment in overrides {
        raw.apply_assignment(assignment)?;
    }

    let settings = raw.normalize(&config.policy())?;
    tracing::debug!("effective settings: {}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::path::Path;

    fn manifest(settings: &str) -> Manifest {
        let content = format!(
            "[package]\nname = \"app\"\nversion = \"1.0.0\"\n\n[settings]\n{}",
            settings
        );
        Manifest::parse(&content, Path::new("/proj/Anvil.toml")).unwrap()
    }

    #[test]
    fn test_precedence() {
        let manifest = manifest("os = \"Linux\"\ncompiler = \"gcc\"\nbuild_type = \"Debug\"\narch = \"x86_64\"\n");
        let mut config = Config::default();
        config.settings.defaults.compiler = Some("clang".into());

        let settings =
            effective_settings(&manifest, &config, &["build_type=Release".into()]).unwrap();

        assert_eq!(settings.compiler(), "gcc");
        assert_eq!(settings.build_type(), "Release");
    }

    #[test]
    fn test_config_allow_list_applies() {
        let manifest = manifest("os = \"Linux\"\ncompiler = \"gcc\"\nbuild_type = \"Coverage\"\narch = \"x86_64\"\n");

        let err = effective_settings(&manifest, &Config::default(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSettings);

        let mut config = Config::default();
        config.settings.build_types = Some(vec!["Coverage".into()]);
        let settings = effective_settings(&manifest, &config, &[]).unwrap();
        assert_eq!(settings.build_type(), "Coverage");
    }

    #[test]
    fn test_bad_override() {
        let manifest = manifest("build_type = \"Release\"\n");
        let err = effective_settings(&manifest, &Config::default(), &["flavor=sweet".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSettings);
    }
}
