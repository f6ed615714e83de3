mod todos;

pub use todos::{apply_when, TodoService};
