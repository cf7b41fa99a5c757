pub mod error;
pub mod messages;
pub mod model;
pub mod overlay;
pub mod palette;
pub mod placement;
pub mod raster;
pub mod recognition;
pub mod session;
pub mod surface;
pub mod typeset;
pub mod variables;

pub use error::SketchError;
pub use messages::{SessionEvent, SubmitOutcome};
pub use recognition::{HttpRecognizer, RecognitionItem, RecognitionRequest, Recognizer};
pub use session::{SessionConfig, SketchSession};
