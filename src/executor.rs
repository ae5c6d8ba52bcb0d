pub mod conductor;
pub mod job;
pub mod template;
