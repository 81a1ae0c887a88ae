// User domain module
// Value objects for identity and access control

pub mod value_objects;

pub use value_objects::{Email, Role, Viewer};
