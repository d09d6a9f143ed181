// src/lib.rs
pub use engine::ConditionEngine;
pub use error::ConditionError;
pub use groups::{NumberGroup, number_group, register_number_group};
pub use keywords::{Keyword, keyword_table};
pub use models::Condition;
pub use number::{NumberUnion, Radix, ValueRange};
pub use request::{
    DeviceNumber, FixedStat, MiniStat, ObjectInfo, PathSlot, RequestInfo, TaskCredentials,
};
pub use store::ConditionStore;
pub use traits::{FixedQuota, MemoryQuota, StatSource, UnboundedQuota};

mod engine;
mod error;
mod groups;
mod keywords;
mod models;
mod number;
mod parser;
mod request;
mod store;
mod traits;
