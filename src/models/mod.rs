pub mod note;
pub mod project;
pub mod task;
pub mod token;
pub mod user;

pub use note::{Note, NoteInput};
pub use project::{Project, ProjectDetails, ProjectInput};
pub use task::{StatusInput, Task, TaskInput, TaskStatus};
pub use token::Token;
pub use user::{PublicUser, User};
