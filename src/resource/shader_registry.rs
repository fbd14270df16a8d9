//! A resource manager to load named shading stages.

use crate::context::Context;
use std::collections::HashMap;
use std::rc::Rc;

/// A compiled shading stage: one WGSL module with `vs_main`/`fs_main` entry
/// points. The shading logic inside the module is opaque to the passes that
/// use it.
pub struct ShaderStage {
    name: String,
    module: wgpu::ShaderModule,
}

impl ShaderStage {
    /// Compiles a shading stage from WGSL source.
    pub fn from_wgsl(name: &str, source: &str) -> ShaderStage {
        let ctxt = Context::get();
        ShaderStage {
            name: name.to_string(),
            module: ctxt.create_shader_module(Some(name), source),
        }
    }

    /// The registered name of this stage.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled shader module.
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

/// Name of the built-in unlit occluder stage.
pub const OCCLUDER_STAGE: &str = "occluder";
/// Name of the built-in radial blur stage.
pub const RADIAL_BLUR_STAGE: &str = "radial_blur";

/// The shading stage registry.
///
/// Upon construction, it contains the two stages the scattering pass needs:
/// * the `occluder` stage, the unlit override used for the silhouette mask.
/// * the `radial_blur` stage, used for the composite blit.
///
/// It keeps a cache of already-loaded stages. A host can replace either
/// built-in (or remove it, which turns the dependent pass into a no-op).
pub struct ShaderRegistry {
    stages: HashMap<String, Rc<ShaderStage>>,
}

impl Default for ShaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderRegistry {
    /// Creates a new registry pre-loaded with the built-in stages.
    pub fn new() -> ShaderRegistry {
        let mut stages = HashMap::new();

        let occluder = Rc::new(ShaderStage::from_wgsl(
            OCCLUDER_STAGE,
            include_str!("../builtin/occluder.wgsl"),
        ));
        let _ = stages.insert(OCCLUDER_STAGE.to_string(), occluder);

        let radial_blur = Rc::new(ShaderStage::from_wgsl(
            RADIAL_BLUR_STAGE,
            include_str!("../builtin/radial_blur.wgsl"),
        ));
        let _ = stages.insert(RADIAL_BLUR_STAGE.to_string(), radial_blur);

        ShaderRegistry { stages }
    }

    /// Creates an empty registry with no stages registered.
    pub fn empty() -> ShaderRegistry {
        ShaderRegistry {
            stages: HashMap::new(),
        }
    }

    /// Gets a stage with the specified name. Returns `None` if the stage is
    /// not registered.
    pub fn find(&self, name: &str) -> Option<Rc<ShaderStage>> {
        self.stages.get(name).cloned()
    }

    /// Adds a stage with the specified name to this registry, replacing any
    /// previous stage with the same name.
    pub fn add(&mut self, stage: Rc<ShaderStage>, name: &str) {
        let _ = self.stages.insert(name.to_string(), stage);
    }

    /// Removes a stage from this registry.
    pub fn remove(&mut self, name: &str) {
        let _ = self.stages.remove(name);
    }
}
