pub mod catalog;
pub mod directive;
pub mod render_context;
pub mod template;
pub mod tree;
