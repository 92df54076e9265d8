//! Learned model components: scaler, trees, forest, and the persisted
//! artifact that ties a fitted forest to the scaler from the same run.

pub mod artifact;
pub mod forest;
pub mod scaler;
pub mod tree;

pub use artifact::{ArtifactError, ArtifactMetadata, ModelArtifact, MODEL_FILE, SCALER_FILE};
pub use forest::{ForestParams, InferenceError, RandomForest, DEFAULT_MAX_DEPTH, DEFAULT_NUM_TREES};
pub use scaler::{ScaleError, StandardScaler};
pub use tree::{DecisionTree, TreeParams};
