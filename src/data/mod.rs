/// Data layer: core types, file discovery, loading and mask decomposition.
///
/// Architecture:
/// ```text
///  image dir            mask dir
///      │                   │
///      ▼                   ▼
///   ┌────────┐        ┌────────┐
///   │ detect │        │ detect │   file extensions → Modality
///   └────────┘        └────────┘
///      │                   │
///      └───────┬───────────┘
///              ▼
///        ┌──────────┐
///        │ pairing  │   image name → expected mask path
///        └──────────┘
///              │
///              ▼
///        ┌──────────┐
///        │  loader  │   .nii/.nii.gz/.png → Volume / RasterMask
///        └──────────┘
///              │
///              ▼
///        ┌───────────┐
///        │ decompose │  multi-region mask → Vec<RegionMask>
///        └───────────┘
/// ```

pub mod decompose;
pub mod detect;
pub mod loader;
pub mod model;
pub mod pairing;
