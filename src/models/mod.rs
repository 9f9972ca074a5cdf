pub mod todo;

pub use todo::{DeleteTodoRequest, NewTodoRequest, Todo, filter_valid};
