// Learning-resources resolution: secondary search → AI discovery + structuring
// → static catalog. Never fails the caller.

pub mod catalog;
pub mod handlers;
pub mod resolver;
pub mod sanitize;
