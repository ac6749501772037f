pub mod clock;
pub mod sampling;
pub mod text;
