pub mod console;
pub mod side_panel;
pub mod swipe_canvas;
