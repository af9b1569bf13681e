pub mod stream;
pub mod synthetic;

// Re-exports for convenience
pub use stream::{KeypointSource, KeypointStream, latest_frame, start_keypoint_stream};
pub use synthetic::{BodyLayout, SyntheticPerformer, render_keypoints};
