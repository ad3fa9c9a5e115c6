//! Terminal front end: lifecycle, input polling and painting.

mod input;
pub mod render;
mod screen;
pub mod terminal;

pub use input::{InputPoller, convert_event};
pub use screen::TuiScreen;
