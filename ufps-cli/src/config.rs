// ufps-cli/src/config.rs
//
// Builds the core configuration from command-line flags. Flags already carry
// their environment variable fallbacks (via clap); anything still unset
// falls back to the default install layout under the home directory and to
// codec tool discovery.

use crate::cli::ToolArgs;

use log::debug;
use std::path::{Path, PathBuf};
use ufps_core::CoreConfig;
use ufps_core::external::locate_codec_tools;

/// Resolves a [`CoreConfig`] from flags against the current user's home directory.
pub fn resolve_config(tools: &ToolArgs) -> CoreConfig {
    let home = dirs::home_dir();
    build_config(tools, home.as_deref())
}

/// Resolves a [`CoreConfig`] from flags, using `home` for the default layout.
pub fn build_config(tools: &ToolArgs, home: Option<&Path>) -> CoreConfig {
    let mut config = match home {
        Some(home) => CoreConfig::with_install_root(home),
        None => CoreConfig::new(
            Path::new(ufps_core::config::DEFAULT_INSTALL_DIR).join("RIFE"),
            Path::new(ufps_core::config::DEFAULT_INSTALL_DIR).join("models"),
        ),
    };

    if let Some(dir) = &tools.rife_dir {
        config.rife_dir = dir.clone();
    }
    if let Some(dir) = &tools.models_dir {
        config.models_dir = dir.clone();
    }
    if let Some(python) = &tools.python {
        config.python_path = python.clone();
    }
    config.temp_dir = tools.temp_dir.clone();

    match (&tools.ffmpeg, &tools.ffprobe) {
        (Some(ffmpeg), Some(ffprobe)) => {
            config.ffmpeg_path = ffmpeg.clone();
            config.ffprobe_path = ffprobe.clone();
        }
        (ffmpeg, ffprobe) => {
            let located = locate_codec_tools(home);
            if let Some((found_ffmpeg, found_ffprobe)) = &located {
                debug!(
                    "Located codec tools: {} / {}",
                    found_ffmpeg.display(),
                    found_ffprobe.display()
                );
            }
            config.ffmpeg_path = ffmpeg
                .clone()
                .or_else(|| located.as_ref().map(|(f, _)| f.clone()))
                .unwrap_or(config.ffmpeg_path);
            config.ffprobe_path = ffprobe
                .clone()
                .or_else(|| located.as_ref().map(|(_, p)| p.clone()))
                .unwrap_or(config.ffprobe_path);
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_install_layout() {
        let config = build_config(&ToolArgs::default(), Some(Path::new("/home/me")));
        assert_eq!(config.rife_dir, PathBuf::from("/home/me/.ufps/RIFE"));
        assert_eq!(config.models_dir, PathBuf::from("/home/me/.ufps/models"));
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn resolved_config_follows_home_directory() {
        let config = resolve_config(&ToolArgs::default());
        match dirs::home_dir() {
            Some(home) => assert_eq!(config.rife_dir, home.join(".ufps").join("RIFE")),
            None => assert!(config.rife_dir.ends_with("RIFE")),
        }
    }

    #[test]
    fn flags_override_defaults() {
        let tools = ToolArgs {
            ffmpeg: Some(PathBuf::from("/opt/ff/ffmpeg")),
            ffprobe: Some(PathBuf::from("/opt/ff/ffprobe")),
            python: Some(PathBuf::from("/venv/bin/python")),
            rife_dir: Some(PathBuf::from("/srv/rife")),
            models_dir: Some(PathBuf::from("/srv/models")),
            temp_dir: Some(PathBuf::from("/scratch")),
        };
        let config = build_config(&tools, None);
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ff/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("/opt/ff/ffprobe"));
        assert_eq!(config.python_path, PathBuf::from("/venv/bin/python"));
        assert_eq!(config.rife_dir, PathBuf::from("/srv/rife"));
        assert_eq!(config.models_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn explicit_probe_path_survives_discovery() {
        let tools = ToolArgs {
            ffprobe: Some(PathBuf::from("/custom/ffprobe")),
            ..ToolArgs::default()
        };
        let config = build_config(&tools, None);
        assert_eq!(config.ffprobe_path, PathBuf::from("/custom/ffprobe"));
    }
}
