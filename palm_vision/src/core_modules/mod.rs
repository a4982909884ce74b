// Layers of the segmentation engine, leaf-first.
pub mod hsv;
pub mod geometry;
pub mod gaussian_model;
pub mod skin_classifier;
pub mod sample_region;
pub mod skin_blob;
pub mod blob_detector;
pub mod refinement;
pub mod convex_hull;
pub mod fingertips;
