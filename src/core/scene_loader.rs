// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::emitter::Emitter;
use crate::core::medium::{ChannelMode, Medium, MediumConfig, MediumEventSamplingMode};
use crate::core::phase::PhaseFunction;
use crate::core::scene::Scene;
use crate::core::volume::Volume;
use crate::emitters::volume_light::VolumeLight;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::media::heterogeneous_medium::HeterogeneousMedium;
use crate::media::homogeneous_medium::HomogeneousMedium;
use crate::phases::hg::HenyeyGreensteinPhaseFunction;
use crate::phases::isotropic::IsotropicPhaseFunction;
use crate::volumes::const_volume::ConstantVolume;
use crate::volumes::gradient_volume::GradientVolume;
use crate::volumes::Axis;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    UnknownType { element: String, type_name: String },
    InvalidValue { name: String, message: String },
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(name) => write!(f, "missing field: {}", name),
            SceneLoadError::UnknownType { element, type_name } =>
                write!(f, "unsupported {} type: {}", element, type_name),
            SceneLoadError::InvalidValue { name, message } =>
                write!(f, "invalid value for '{}': {}", name, message),
        }
    }
}

impl std::error::Error for SceneLoadError {}

fn invalid(name: &str, message: String) -> SceneLoadError {
    SceneLoadError::InvalidValue { name: name.to_string(), message }
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    log::info!("Loading scene from {}", path.display());
    parse_scene(&xml)
}

pub fn parse_scene(xml: &str) -> Result<Scene, SceneLoadError> {
    let root = parse_tree(xml)?;
    let scene_node = root.children.iter()
        .find(|node| node.tag == "scene")
        .ok_or(SceneLoadError::MissingField("scene"))?;

    let mut defaults: HashMap<String, String> = HashMap::new();
    for node in scene_node.children.iter().filter(|node| node.tag == "default") {
        if let (Some(k), Some(v)) = (node.attr("name"), node.attr("value")) {
            defaults.insert(k.to_string(), v.to_string());
        }
    }
    let scene_node = scene_node.resolved(&defaults);

    let mut scene = Scene::new();

    // Emitters first so media can refer to them regardless of file order.
    for node in scene_node.children.iter().filter(|node| node.tag == "emitter") {
        let emitter = build_emitter(node)?;
        scene.add_emitter(emitter);
    }

    for node in scene_node.children.iter() {
        match node.tag.as_str() {
            "default" | "emitter" => {}
            "medium" => {
                let medium = build_medium(node, &mut scene)?;
                log::info!("Loaded {}", medium.to_string());
                scene.add_medium(medium);
            }
            other => log::warn!("Scene loader: ignoring unsupported element <{}>", other),
        }
    }

    log::info!("Scene loaded: {} media, {} emitters", scene.media_count(), scene.emitter_count());
    Ok(scene)
}

#[derive(Debug, Clone)]
struct XmlNode {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), attrs: HashMap::new(), children: Vec::new() }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|v| v.as_str())
    }

    fn resolved(&self, defaults: &HashMap<String, String>) -> XmlNode {
        XmlNode {
            tag: self.tag.clone(),
            attrs: self.attrs.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, defaults)))
                .collect(),
            children: self.children.iter().map(|c| c.resolved(defaults)).collect(),
        }
    }

    fn child(&self, tag: &str, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag && c.attr("name") == Some(name))
    }
}

fn node_from_start(e: &BytesStart) -> Result<XmlNode, SceneLoadError> {
    let mut node = XmlNode::new(&String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SceneLoadError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()
            .map_err(|err| SceneLoadError::Parse(err.to_string()))?
            .to_string();
        node.attrs.insert(key, value);
    }
    Ok(node)
}

fn parse_tree(xml: &str) -> Result<XmlNode, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack = vec![XmlNode::new("#document")];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => stack.push(node_from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let node = node_from_start(&e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop()
                    .ok_or_else(|| SceneLoadError::Parse("unbalanced closing tag".to_string()))?;
                let parent = stack.last_mut()
                    .ok_or_else(|| SceneLoadError::Parse("unbalanced closing tag".to_string()))?;
                parent.children.push(node);
            }
            Ok(_) => {}
            Err(e) => {
                return Err(SceneLoadError::Parse(
                    format!("xml error at {}: {}", reader.buffer_position(), e)));
            }
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(SceneLoadError::Parse("unclosed element at end of file".to_string()));
    }
    stack.pop().ok_or_else(|| SceneLoadError::Parse("empty document".to_string()))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, String> {
    value.trim().parse::<Float>().map_err(|_| format!("invalid float: {}", value))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("invalid boolean: {}", other)),
    }
}

fn parse_floats(value: &str) -> Result<Vec<Float>, String> {
    value.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_float)
        .collect()
}

fn parse_vec3(value: &str) -> Result<Vector3f, String> {
    let v = parse_floats(value)?;
    if v.len() != 3 {
        return Err(format!("expected 3 components, got '{}'", value));
    }
    Ok(Vector3f::new(v[0], v[1], v[2]))
}

/// A single value is a grey spectrum.
fn parse_rgb(value: &str) -> Result<RGBSpectrum, String> {
    let v = parse_floats(value)?;
    match v.len() {
        1 => Ok(RGBSpectrum::splat(v[0])),
        3 => Ok(RGBSpectrum::new(v[0], v[1], v[2])),
        _ => Err(format!("expected 1 or 3 components, got '{}'", value)),
    }
}

/// Typed view over the `<float|rgb|string|boolean|point>` children of an
/// element.
struct Properties<'a> {
    node: &'a XmlNode,
}

impl<'a> Properties<'a> {
    fn new(node: &'a XmlNode) -> Self {
        Self { node }
    }

    fn find(&self, name: &str) -> Option<&'a XmlNode> {
        self.node.children.iter().find(|c| c.attr("name") == Some(name)
            && matches!(c.tag.as_str(), "float" | "rgb" | "spectrum" | "string" | "boolean" | "point" | "integer"))
    }

    fn raw(&self, name: &str) -> Result<Option<(&'a str, String)>, SceneLoadError> {
        let node = match self.find(name) {
            Some(node) => node,
            None => return Ok(None),
        };
        if node.tag == "point" && node.attr("value").is_none() {
            let mut xyz = Vec::with_capacity(3);
            for key in ["x", "y", "z"].iter() {
                xyz.push(node.attr(key).unwrap_or("0").to_string());
            }
            return Ok(Some((node.tag.as_str(), xyz.join(","))));
        }
        let value = node.attr("value")
            .ok_or_else(|| invalid(name, "property without a value attribute".to_string()))?;
        Ok(Some((node.tag.as_str(), value.to_string())))
    }

    fn float(&self, name: &str) -> Result<Option<Float>, SceneLoadError> {
        match self.raw(name)? {
            Some((_, v)) => parse_float(&v).map(Some).map_err(|e| invalid(name, e)),
            None => Ok(None),
        }
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>, SceneLoadError> {
        match self.raw(name)? {
            Some((_, v)) => parse_bool(&v).map(Some).map_err(|e| invalid(name, e)),
            None => Ok(None),
        }
    }

    fn string(&self, name: &str) -> Result<Option<String>, SceneLoadError> {
        Ok(self.raw(name)?.map(|(_, v)| v))
    }

    fn point(&self, name: &str) -> Result<Option<Vector3f>, SceneLoadError> {
        match self.raw(name)? {
            Some((_, v)) => parse_vec3(&v).map(Some).map_err(|e| invalid(name, e)),
            None => Ok(None),
        }
    }

    /// Spectrum-valued property and whether it was given as a plain float.
    fn spectrum(&self, name: &str) -> Result<Option<(RGBSpectrum, bool)>, SceneLoadError> {
        match self.raw(name)? {
            Some((tag, v)) => {
                let value = parse_rgb(&v).map_err(|e| invalid(name, e))?;
                Ok(Some((value, tag == "float")))
            }
            None => Ok(None),
        }
    }

    fn parsed<T: std::str::FromStr<Err = String>>(&self, name: &str) -> Result<Option<T>, SceneLoadError> {
        match self.raw(name)? {
            Some((_, v)) => v.parse::<T>().map(Some).map_err(|e| invalid(name, e)),
            None => Ok(None),
        }
    }
}

fn node_id(node: &XmlNode, type_name: &str) -> String {
    node.attr("id").map(|s| s.to_string()).unwrap_or_else(|| generate_node_id(type_name))
}

fn node_type<'a>(node: &'a XmlNode) -> Result<&'a str, SceneLoadError> {
    node.attr("type").ok_or(SceneLoadError::MissingField("type"))
}

fn build_volume(node: &XmlNode) -> Result<Arc<dyn Volume>, SceneLoadError> {
    let props = Properties::new(node);
    match node_type(node)? {
        "constvolume" | "constant" => {
            let (value, scalar) = props.spectrum("value")?.unwrap_or((RGBSpectrum::one(), true));
            let volume = if scalar {
                ConstantVolume::new_scalar(value[0])
            } else {
                ConstantVolume::new_rgb(value)
            };
            Ok(Arc::new(volume))
        }
        "gradient" => {
            let p_min = props.point("min")?.ok_or(SceneLoadError::MissingField("min"))?;
            let p_max = props.point("max")?.ok_or(SceneLoadError::MissingField("max"))?;
            let axis = match props.string("axis")? {
                Some(axis) => Axis::parse(&axis).map_err(|e| invalid("axis", e))?,
                None => Axis::X,
            };
            let (start, start_scalar) = props.spectrum("start")?.ok_or(SceneLoadError::MissingField("start"))?;
            let (end, end_scalar) = props.spectrum("end")?.ok_or(SceneLoadError::MissingField("end"))?;
            let bbox = AABB::new(p_min, p_max);
            let volume = if start_scalar && end_scalar {
                GradientVolume::new_scalar(bbox, axis, start[0], end[0])
            } else {
                GradientVolume::new_rgb(bbox, axis, start, end)
            };
            Ok(Arc::new(volume))
        }
        other => Err(SceneLoadError::UnknownType { element: "volume".to_string(), type_name: other.to_string() }),
    }
}

/// Volume-valued property: either a nested `<volume name="..">` or a plain
/// spectrum, which becomes a constant volume.
fn volume_property(node: &XmlNode, name: &str) -> Result<Option<Arc<dyn Volume>>, SceneLoadError> {
    if let Some(child) = node.child("volume", name) {
        return build_volume(child).map(Some);
    }
    Ok(Properties::new(node).spectrum(name)?.map(|(value, scalar)| {
        let volume: Arc<dyn Volume> = if scalar {
            Arc::new(ConstantVolume::new_scalar(value[0]))
        } else {
            Arc::new(ConstantVolume::new_rgb(value))
        };
        volume
    }))
}

fn build_phase(node: &XmlNode) -> Result<Box<dyn PhaseFunction>, SceneLoadError> {
    match node_type(node)? {
        "isotropic" => Ok(Box::new(IsotropicPhaseFunction::new())),
        "hg" => {
            let g = Properties::new(node).float("g")?.unwrap_or(0.8);
            Ok(Box::new(HenyeyGreensteinPhaseFunction::new(g)))
        }
        other => Err(SceneLoadError::UnknownType { element: "phase".to_string(), type_name: other.to_string() }),
    }
}

fn build_emitter(node: &XmlNode) -> Result<Arc<dyn Emitter>, SceneLoadError> {
    match node_type(node)? {
        "volumelight" => {
            let radiance = volume_property(node, "radiance")?
                .ok_or(SceneLoadError::MissingField("radiance"))?;
            let scale = Properties::new(node).float("scale")?.unwrap_or(1.0);
            let light = VolumeLight::new(radiance)
                .with_scale(scale)
                .with_id(&node_id(node, "volumelight"));
            Ok(Arc::new(light))
        }
        other => Err(SceneLoadError::UnknownType { element: "emitter".to_string(), type_name: other.to_string() }),
    }
}

fn build_config(props: &Properties) -> Result<MediumConfig, SceneLoadError> {
    let mut config = MediumConfig::default();
    if let Some(mode) = props.parsed::<MediumEventSamplingMode>("medium_sampling_mode")? {
        config = config.with_sampling_mode(mode);
    }
    if let Some(sample_emitters) = props.boolean("sample_emitters")? {
        config = config.with_sample_emitters(sample_emitters);
    }
    if let Some(spectral) = props.boolean("has_spectral_extinction")? {
        config = config.with_spectral_extinction(spectral);
    }
    if let Some(channel_mode) = props.parsed::<ChannelMode>("channel_mode")? {
        config = config.with_channel_mode(channel_mode);
    }
    Ok(config)
}

/// The emitter a medium refers to, either by `<ref name="emitter">` or
/// declared inline. Inline emitters are handed to the scene, which owns them.
fn medium_emitter(node: &XmlNode, scene: &mut Scene) -> Result<Option<Arc<dyn Emitter>>, SceneLoadError> {
    if let Some(reference) = node.children.iter().find(|c| c.tag == "ref" && c.attr("name") == Some("emitter")) {
        let id = reference.attr("id").ok_or(SceneLoadError::MissingField("id"))?;
        let emitter = scene.emitter(id)
            .ok_or_else(|| invalid("emitter", format!("unknown emitter reference '{}'", id)))?;
        return Ok(Some(emitter));
    }
    if let Some(inline) = node.children.iter().find(|c| c.tag == "emitter") {
        let emitter = build_emitter(inline)?;
        scene.add_emitter(emitter.clone());
        return Ok(Some(emitter));
    }
    Ok(None)
}

fn build_medium(node: &XmlNode, scene: &mut Scene) -> Result<Arc<dyn Medium>, SceneLoadError> {
    let props = Properties::new(node);
    let medium_type = node_type(node)?;
    let config = build_config(&props)?;
    let id = node_id(node, medium_type);
    let scale = props.float("scale")?.unwrap_or(1.0);
    let phase = match node.children.iter().find(|c| c.tag == "phase") {
        Some(phase_node) => Some(build_phase(phase_node)?),
        None => None,
    };
    let emitter = medium_emitter(node, scene)?;

    match medium_type {
        "homogeneous" => {
            let (sigma_t, _) = props.spectrum("sigma_t")?.ok_or(SceneLoadError::MissingField("sigma_t"))?;
            let bbox = match (props.point("bbox_min")?, props.point("bbox_max")?) {
                (Some(p_min), Some(p_max)) => Some(AABB::new(p_min, p_max)),
                (None, None) => None,
                _ => return Err(invalid("bbox_min", "bbox_min and bbox_max must be given together".to_string())),
            };

            let mut medium = HomogeneousMedium::new(sigma_t, RGBSpectrum::splat(0.75), config)
                .with_scale(scale)
                .with_bbox(bbox)
                .with_id(&id);
            if let Some(albedo) = volume_property(node, "albedo")? {
                medium = medium.with_albedo_volume(albedo);
            }
            if let Some(phase) = phase {
                medium = medium.with_phase_function(phase);
            }
            if let Some(emitter) = emitter.as_ref() {
                medium = medium.with_emitter(emitter);
            }
            Ok(Arc::new(medium))
        }
        "heterogeneous" => {
            let sigma_t = volume_property(node, "sigma_t")?.ok_or(SceneLoadError::MissingField("sigma_t"))?;
            let albedo = match volume_property(node, "albedo")? {
                Some(albedo) => albedo,
                None => Arc::new(ConstantVolume::new_scalar(0.75)),
            };

            let mut medium = HeterogeneousMedium::new(sigma_t, albedo, config)
                .with_scale(scale)
                .with_id(&id);
            if let Some(phase) = phase {
                medium = medium.with_phase_function(phase);
            }
            if let Some(emitter) = emitter.as_ref() {
                medium = medium.with_emitter(emitter);
            }
            Ok(Arc::new(medium))
        }
        other => Err(SceneLoadError::UnknownType { element: "medium".to_string(), type_name: other.to_string() }),
    }
}
