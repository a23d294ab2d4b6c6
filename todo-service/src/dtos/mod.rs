pub mod todos;

pub use todos::{
    CreateTodoResponse, DeleteTodoResponse, MessageResponse, TodoListResponse, TodoPayload,
    TodoResponse,
};
