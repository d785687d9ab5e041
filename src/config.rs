use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::camera::Camera;
use crate::geometry::{FloatType, WorldPoint};
use crate::renderer::Shading;
use crate::scene::rooms::{GRID_SIZE, mirror_balls, mirror_hall, room_grid};
use crate::scene::skybox::{CheckerSkybox, GradientSkybox, ImageSkybox};
use crate::scene::{Scene, Skybox};
use crate::util::{Color, gray};

/// Which demo world graph to render.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneChoice {
    #[default]
    Rooms,
    MirrorBalls,
    MirrorHall,
}

/// Settings of a render run, loadable from a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub cast_limit: u32,
    pub anti_alias: bool,
    /// Number of render threads, 0 means one per CPU.
    pub threads: usize,
    pub pin_threads: bool,
    /// Number of frames to render.
    pub frames: usize,
    pub scene: SceneChoice,
    /// Panorama images for the worlds of the scene, in order of creation.
    /// Worlds without an image get a procedural skybox.
    pub skyboxes: Vec<PathBuf>,
    pub eye: [FloatType; 3],
    /// Distance moved forward per frame.
    pub speed: FloatType,
    /// Yaw per frame, in radians.
    pub turn: FloatType,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 400,
            height: 300,
            cast_limit: 12,
            anti_alias: false,
            threads: 2,
            pin_threads: false,
            frames: 100,
            scene: SceneChoice::Rooms,
            skyboxes: Vec::new(),
            eye: [0.0, 0.0, -3.0],
            speed: 0.05,
            turn: 0.01,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to load skybox {path:?}: {source}")]
    Skybox {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl RenderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<RenderConfig, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<RenderConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Screenshot quality settings.
    pub fn highres(self) -> RenderConfig {
        RenderConfig {
            width: 1280,
            height: 960,
            cast_limit: 32,
            anti_alias: true,
            threads: 48,
            ..self
        }
    }

    pub fn thread_count(&self) -> usize {
        if self.threads == 0 { num_cpus::get() } else { self.threads }
    }

    pub fn shading(&self) -> Shading {
        match self.scene {
            SceneChoice::MirrorHall => Shading::MirrorHall,
            SceneChoice::Rooms | SceneChoice::MirrorBalls => Shading::Skybox,
        }
    }

    /// Builds the chosen scene and a camera placed in its starting world.
    pub fn build_scene(&self) -> Result<(Scene, Camera), ConfigError> {
        let mut skyboxes = Vec::new();
        for path in &self.skyboxes {
            let skybox = ImageSkybox::open(path).map_err(|source| ConfigError::Skybox {
                path: path.clone(),
                source,
            })?;
            skyboxes.push(Arc::new(skybox) as Arc<dyn Skybox>);
        }
        let skybox = |index: usize| {
            skyboxes
                .get(index)
                .cloned()
                .unwrap_or_else(|| procedural_skybox(index))
        };

        let mut scene = Scene::new();
        let start = match self.scene {
            SceneChoice::Rooms => {
                let layers = std::array::from_fn::<_, GRID_SIZE, _>(skybox);
                room_grid(&mut scene, layers, skybox(GRID_SIZE)).start
            }
            SceneChoice::MirrorBalls => mirror_balls(&mut scene, [skybox(0), skybox(1)])[0],
            SceneChoice::MirrorHall => mirror_hall(&mut scene, skybox(0)),
        };

        let camera = Camera::builder()
            .world(start)
            .eye(WorldPoint::from(self.eye))
            .build();
        Ok((scene, camera))
    }
}

/// Stand-ins for panorama images: blue sky, sunset, forest, then stars.
fn procedural_skybox(index: usize) -> Arc<dyn Skybox> {
    let rgb = |r: u8, g: u8, b: u8| {
        Color::new(r as FloatType, g as FloatType, b as FloatType) * (1.0 / 255.0)
    };
    match index {
        0 => Arc::new(GradientSkybox {
            zenith: rgb(40, 90, 200),
            horizon: rgb(170, 210, 250),
            nadir: rgb(70, 90, 60),
        }),
        1 => Arc::new(GradientSkybox {
            zenith: rgb(60, 40, 110),
            horizon: rgb(250, 140, 60),
            nadir: rgb(50, 30, 30),
        }),
        2 => Arc::new(GradientSkybox {
            zenith: rgb(120, 170, 120),
            horizon: rgb(40, 90, 40),
            nadir: rgb(30, 40, 20),
        }),
        _ => Arc::new(CheckerSkybox {
            even: gray(0.02),
            odd: gray(0.9),
            cells: 64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    #[test]
    fn empty_file_is_default() {
        assert!(RenderConfig::parse("").unwrap() == RenderConfig::default());
    }

    #[test]
    fn partial_file() {
        let config = RenderConfig::parse(
            r#"
            width = 64
            anti_alias = true
            scene = "mirror_hall"
            eye = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();
        assert!(config.width == 64);
        assert!(config.height == 300);
        assert!(config.anti_alias);
        assert!(config.scene == SceneChoice::MirrorHall);
        assert!(config.shading() == Shading::MirrorHall);
        assert!(config.eye == [1.0, 2.0, 3.0]);
    }

    #[test]
    fn unknown_key() {
        assert!(let Err(ConfigError::Parse(_)) = RenderConfig::parse("widht = 3"));
    }

    #[test]
    fn missing_file() {
        let result = RenderConfig::load("/nonexistent/portalcast.toml");
        assert!(let Err(ConfigError::Read { .. }) = result);
    }

    #[test]
    fn highres_preset() {
        let config = RenderConfig {
            frames: 7,
            ..Default::default()
        }
        .highres();
        assert!((config.width, config.height) == (1280, 960));
        assert!(config.cast_limit == 32);
        assert!(config.anti_alias);
        assert!(config.frames == 7);
    }

    #[test]
    fn zero_threads_means_all_cpus() {
        let config = RenderConfig {
            threads: 0,
            ..Default::default()
        };
        assert!(config.thread_count() == num_cpus::get());
    }

    #[test_case(SceneChoice::Rooms, 28)]
    #[test_case(SceneChoice::MirrorBalls, 2)]
    #[test_case(SceneChoice::MirrorHall, 1)]
    fn scenes(choice: SceneChoice, world_count: usize) {
        let config = RenderConfig {
            scene: choice,
            ..Default::default()
        };
        let (scene, camera) = config.build_scene().unwrap();
        assert!(scene.len() == world_count);
        assert!(scene.get(camera.world).is_some());
        assert!(camera.eye == WorldPoint::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn missing_skybox_image() {
        let config = RenderConfig {
            skyboxes: vec![PathBuf::from("/nonexistent/sky.jpg")],
            ..Default::default()
        };
        assert!(let Err(ConfigError::Skybox { .. }) = config.build_scene());
    }
}
