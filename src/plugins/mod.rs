pub mod method;
pub mod registry;

pub use method::{CallOutcome, MapState, Method, MethodValue};
pub use registry::JMapPlugin;
