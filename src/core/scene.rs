// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::emitter::Emitter;
use crate::core::medium::Medium;
use std::collections::HashMap;
use std::sync::Arc;

/// Owner of the media and emitters described by a scene file. Media only
/// hold weak handles to their emitters, so the scene must outlive any
/// rendering that needs emission.
pub struct Scene {
    media: HashMap<String, Arc<dyn Medium>>,
    emitters: HashMap<String, Arc<dyn Emitter>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            media: HashMap::new(),
            emitters: HashMap::new(),
        }
    }

    pub fn add_medium(&mut self, medium: Arc<dyn Medium>) {
        let id = medium.id().to_string();
        if self.media.insert(id.clone(), medium).is_some() {
            log::warn!("Scene: medium '{}' redefined, keeping the last definition.", id);
        }
    }

    pub fn add_emitter(&mut self, emitter: Arc<dyn Emitter>) {
        let id = emitter.id().to_string();
        if self.emitters.insert(id.clone(), emitter).is_some() {
            log::warn!("Scene: emitter '{}' redefined, keeping the last definition.", id);
        }
    }

    pub fn medium(&self, id: &str) -> Option<Arc<dyn Medium>> {
        self.media.get(id).cloned()
    }

    pub fn emitter(&self, id: &str) -> Option<Arc<dyn Emitter>> {
        self.emitters.get(id).cloned()
    }

    /// Medium ids in a stable order.
    pub fn medium_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.media.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }
}
