pub mod compute;
pub mod display;
pub mod entities;
pub mod input;
pub mod session;
pub mod sprites;
