/// Domain models
///
/// - `task`: reminder tasks and their creation input

pub mod task;

pub use task::{NewTask, Task};
