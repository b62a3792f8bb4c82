pub mod notification;
pub mod settings;
pub mod topic;

pub use notification::*;
pub use settings::*;
pub use topic::{topics_page, ActionOutcome, TopicActions};
