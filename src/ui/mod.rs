//! Ratatui front end for the movie catalog. It only talks to the view-model:
//! lists and detail views render the observable states, and every key that
//! changes data issues a fire-and-forget command.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
