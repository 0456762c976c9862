pub mod comment;
pub mod community;
pub mod post;
pub mod preferences;
pub mod subscription;
pub mod user;
pub mod votes;

pub use comment::Comment;
pub use community::{ActionRecord, Community, ModerationAction};
pub use post::{Post, PostContent, PostKind};
pub use preferences::{Preferences, Theme};
pub use subscription::Subscription;
pub use user::{BadgeType, MemberProfile, StaffProfile, User, UserKind, UserRole};
pub use votes::Votes;
