pub mod coordinates;
pub mod nearest;
