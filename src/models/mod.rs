pub mod task;
pub mod user;

pub use task::{ListQuery, Task, TaskInput};
pub use user::{User, UserInput};
