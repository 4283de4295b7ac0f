pub mod narrative;
pub mod vertex;

pub use narrative::{build_story_prompt, GenerationError, NarrativeGenerator};
pub use vertex::VertexNarrativeGenerator;
