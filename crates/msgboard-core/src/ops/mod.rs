pub mod comment_ops;
pub mod community_ops;
pub mod extent;
pub mod hydration;
pub mod post_ops;
pub mod store;
pub mod subscription_ops;
pub mod user_ops;

pub use extent::{Extent, Keyed};
pub use hydration::rebuild_back_references;
pub use store::{ExtentContents, Store};
