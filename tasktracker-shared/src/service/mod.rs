/// Task operations shared by both front doors
///
/// - `task`: create (with validation), list, delete

pub mod task;

pub use task::TaskService;
