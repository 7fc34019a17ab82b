pub mod registry;
pub mod relations;

pub use registry::Registry;
