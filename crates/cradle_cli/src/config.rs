//! Scene file handling

use anyhow::{Context, Result};
use cradle_physics::SceneConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Default scene file name
pub const SCENE_FILE: &str = "cradle.toml";

/// Resolve a scene path: files are used as-is, directories get `cradle.toml`
fn scene_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(SCENE_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Load a scene from an explicit path
pub fn load_scene(path: &Path) -> Result<SceneConfig> {
    let scene_path = scene_path(path);

    if !scene_path.exists() {
        anyhow::bail!(
            "No scene found at {}. Run `cradle init` to create one.",
            scene_path.display()
        );
    }

    let content = fs::read_to_string(&scene_path)
        .with_context(|| format!("Failed to read {}", scene_path.display()))?;

    let scene = SceneConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", scene_path.display()))?;

    tracing::debug!(path = %scene_path.display(), bearings = scene.bearings.len(), "scene loaded");
    Ok(scene)
}

/// Load the scene given on the command line, `./cradle.toml`, or the
/// built-in reference scene, in that order
pub fn resolve_scene(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => load_scene(path),
        None if Path::new(SCENE_FILE).exists() => load_scene(Path::new(SCENE_FILE)),
        None => {
            tracing::debug!("no scene file, using the reference scene");
            Ok(SceneConfig::default())
        }
    }
}

/// Write the reference scene into `dir`
pub fn write_default_scene(dir: &Path, force: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(SCENE_FILE);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let content = SceneConfig::default()
        .to_toml()
        .context("Failed to serialize scene")?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
