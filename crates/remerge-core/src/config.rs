//! Settings read from git configuration.
//!
//! | key                     | default  |
//! |-------------------------|----------|
//! | `merge.conflictStyle`   | `merge`  |
//! | `remerge.ancestorLabel` | `base`   |
//! | `remerge.oursLabel`     | `ours`   |
//! | `remerge.theirsLabel`   | `theirs` |
//! | `remerge.checkout`      | `true`   |

use std::str::FromStr;

use git2::{Config, ErrorCode, Repository};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictStyle {
    #[default]
    Merge,
    Diff3,
}

impl FromStr for ConflictStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            // libgit2 has no zealous diff3; plain diff3 is the closest.
            "diff3" | "zdiff3" => Ok(Self::Diff3),
            other => Err(format!("unknown conflict style '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub ancestor: String,
    pub ours: String,
    pub theirs: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            ancestor: "base".to_string(),
            ours: "ours".to_string(),
            theirs: "theirs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub conflict_style: ConflictStyle,
    pub labels: Labels,
    pub checkout: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conflict_style: ConflictStyle::default(),
            labels: Labels::default(),
            checkout: true,
        }
    }
}

impl Settings {
    pub fn load(repo: &Repository) -> Result<Self> {
        let config = repo.config()?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = Self::default();

        let conflict_style = match get_string(config, "merge.conflictStyle")? {
            Some(value) => value.parse().unwrap_or_else(|err| {
                log::warn!("ignoring merge.conflictStyle: {}", err);
                defaults.conflict_style
            }),
            None => defaults.conflict_style,
        };

        let labels = Labels {
            ancestor: get_string(config, "remerge.ancestorLabel")?
                .unwrap_or(defaults.labels.ancestor),
            ours: get_string(config, "remerge.oursLabel")?.unwrap_or(defaults.labels.ours),
            theirs: get_string(config, "remerge.theirsLabel")?.unwrap_or(defaults.labels.theirs),
        };

        let checkout = match config.get_bool("remerge.checkout") {
            Ok(value) => value,
            Err(e) if e.code() == ErrorCode::NotFound => defaults.checkout,
            Err(e) => {
                log::warn!("ignoring remerge.checkout: {}", e.message());
                defaults.checkout
            }
        };

        Ok(Self {
            conflict_style,
            labels,
            checkout,
        })
    }
}

fn get_string(config: &Config, key: &str) -> Result<Option<String>> {
    match config.get_string(key) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(Error::Git(e)),
    }
}

#[cfg(test)]
mod tests {
    use test_repo::TestRepo;

    use super::*;

    type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    #[test]
    fn parses_conflict_styles() {
        assert_eq!("merge".parse::<ConflictStyle>(), Ok(ConflictStyle::Merge));
        assert_eq!("DIFF3".parse::<ConflictStyle>(), Ok(ConflictStyle::Diff3));
        assert_eq!("zdiff3".parse::<ConflictStyle>(), Ok(ConflictStyle::Diff3));
        assert!("fancy".parse::<ConflictStyle>().is_err());
    }

    /// Repository-local config only, so global settings cannot leak in.
    fn local_config(repo: &TestRepo) -> Result<Config> {
        Ok(Config::open(&repo.repo.path().join("config"))?)
    }

    #[test]
    fn reads_repository_config() -> Result {
        let repo = TestRepo::new()?;
        let mut config = local_config(&repo)?;
        config.set_str("merge.conflictStyle", "diff3")?;
        config.set_str("remerge.oursLabel", "HEAD")?;
        config.set_bool("remerge.checkout", false)?;

        let settings = Settings::from_config(&local_config(&repo)?)?;
        assert_eq!(settings.conflict_style, ConflictStyle::Diff3);
        assert_eq!(settings.labels.ours, "HEAD");
        assert_eq!(settings.labels.theirs, "theirs");
        assert_eq!(settings.labels.ancestor, "base");
        assert!(!settings.checkout);
        Ok(())
    }

    #[test]
    fn bad_values_fall_back_to_defaults() -> Result {
        let repo = TestRepo::new()?;
        let mut config = local_config(&repo)?;
        config.set_str("merge.conflictStyle", "sideways")?;
        config.set_str("remerge.checkout", "perhaps")?;

        let settings = Settings::from_config(&local_config(&repo)?)?;
        assert_eq!(settings.conflict_style, ConflictStyle::Merge);
        assert!(settings.checkout);
        Ok(())
    }

    #[test]
    fn load_reads_through_repository() -> Result {
        let repo = TestRepo::new()?;
        local_config(&repo)?.set_str("remerge.theirsLabel", "incoming")?;

        let settings = Settings::load(&repo.repo)?;
        assert_eq!(settings.labels.theirs, "incoming");
        Ok(())
    }
}
