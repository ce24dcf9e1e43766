use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::data::model::{FeatureType, Modality};

// ---------------------------------------------------------------------------
// Feature classes & image filters
// ---------------------------------------------------------------------------

/// A family of descriptors the engine can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FeatureClass {
    FirstOrder,
    Shape,
    Shape2D,
    Glcm,
    Gldm,
    Glrlm,
    Glszm,
    Ngtdm,
}

impl FeatureClass {
    /// Gray-level texture classes.
    pub const TEXTURE: [FeatureClass; 5] = [
        FeatureClass::Glcm,
        FeatureClass::Gldm,
        FeatureClass::Glrlm,
        FeatureClass::Glszm,
        FeatureClass::Ngtdm,
    ];

    /// Name used in composite feature keys.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureClass::FirstOrder => "firstorder",
            FeatureClass::Shape => "shape",
            FeatureClass::Shape2D => "shape2D",
            FeatureClass::Glcm => "glcm",
            FeatureClass::Gldm => "gldm",
            FeatureClass::Glrlm => "glrlm",
            FeatureClass::Glszm => "glszm",
            FeatureClass::Ngtdm => "ngtdm",
        }
    }

    /// The seven togglable classes for a modality.
    pub fn togglable(modality: Modality) -> [FeatureClass; 7] {
        [
            FeatureClass::FirstOrder,
            FeatureClass::shape_for(modality),
            FeatureClass::Glcm,
            FeatureClass::Gldm,
            FeatureClass::Glrlm,
            FeatureClass::Glszm,
            FeatureClass::Ngtdm,
        ]
    }

    /// The shape variant matching a modality.
    pub fn shape_for(modality: Modality) -> FeatureClass {
        match modality {
            Modality::TwoD => FeatureClass::Shape2D,
            Modality::ThreeD | Modality::Unknown => FeatureClass::Shape,
        }
    }
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transform applied to the image before features are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ImageFilter {
    Original,
    Wavelet,
}

// ---------------------------------------------------------------------------
// EngineConfig – what one engine call computes
// ---------------------------------------------------------------------------

/// Enabled classes and filters for one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EngineConfig {
    pub feature_classes: BTreeSet<FeatureClass>,
    pub image_filters: BTreeSet<ImageFilter>,
    /// Restrict every neighbourhood to the image plane.
    pub force_2d: bool,
}

impl EngineConfig {
    pub fn enable_class(&mut self, class: FeatureClass, enabled: bool) {
        if enabled {
            self.feature_classes.insert(class);
        } else {
            self.feature_classes.remove(&class);
        }
    }

    pub fn enable_filter(&mut self, filter: ImageFilter, enabled: bool) {
        if enabled {
            self.image_filters.insert(filter);
        } else {
            self.image_filters.remove(&filter);
        }
    }

    pub fn has_class(&self, class: FeatureClass) -> bool {
        self.feature_classes.contains(&class)
    }

    pub fn has_filter(&self, filter: ImageFilter) -> bool {
        self.image_filters.contains(&filter)
    }
}

// ---------------------------------------------------------------------------
// ExtractionPlan – the passes a feature type expands to
// ---------------------------------------------------------------------------

/// Engine passes to run for every region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub original: Option<EngineConfig>,
    pub wavelet: Option<EngineConfig>,
}

impl ExtractionPlan {
    /// Map a requested feature type onto engine configurations.
    pub fn new(feature_type: FeatureType, modality: Modality) -> Self {
        Self {
            original: original_pass(feature_type, modality),
            wavelet: wavelet_pass(feature_type),
        }
    }

    /// Passes in execution order.
    pub fn passes(&self) -> impl Iterator<Item = &EngineConfig> {
        self.original.iter().chain(self.wavelet.iter())
    }
}

fn original_pass(feature_type: FeatureType, modality: Modality) -> Option<EngineConfig> {
    let selected: Vec<FeatureClass> = match feature_type {
        FeatureType::All | FeatureType::Original => FeatureClass::togglable(modality).to_vec(),
        FeatureType::Shape => vec![FeatureClass::shape_for(modality)],
        FeatureType::Texture => FeatureClass::TEXTURE.to_vec(),
        FeatureType::FirstOrder => vec![FeatureClass::FirstOrder],
        FeatureType::Wavelet => return None,
    };

    let mut config = EngineConfig::default();
    config.enable_filter(ImageFilter::Original, true);
    for class in FeatureClass::togglable(modality) {
        config.enable_class(class, selected.contains(&class));
    }
    config.force_2d = modality == Modality::TwoD;
    Some(config)
}

fn wavelet_pass(feature_type: FeatureType) -> Option<EngineConfig> {
    match feature_type {
        FeatureType::Wavelet | FeatureType::All => {
            let mut config = EngineConfig::default();
            config.enable_filter(ImageFilter::Original, false);
            config.enable_filter(ImageFilter::Wavelet, true);
            config.enable_class(FeatureClass::FirstOrder, true);
            config.enable_class(FeatureClass::Glcm, true);
            Some(config)
        }
        FeatureType::FirstOrder | FeatureType::Texture | FeatureType::Shape | FeatureType::Original => {
            None
        }
    }
}
