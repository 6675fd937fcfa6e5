pub mod declaration;
pub mod ids;
pub mod name;
pub mod scope;
pub mod source;

pub use declaration::*;
pub use ids::*;
pub use name::*;
pub use scope::*;
pub use source::*;
