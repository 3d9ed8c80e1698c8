// parser crate

pub mod entities;
pub mod namespaces;
pub mod outline;
pub mod wellformed;

pub use entities::decode_entities;
pub use namespaces::extract_namespaces;
pub use outline::{outline, Element};
pub use wellformed::{check_well_formed, XmlError};
