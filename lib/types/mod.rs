pub mod batch;
pub mod call;
pub mod ids;
pub mod recipient;

pub use batch::*;
pub use call::*;
pub use ids::*;
pub use recipient::*;
