pub mod gate;
pub mod line;
