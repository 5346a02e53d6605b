mod coordinates;
mod tile;
mod view;

pub use coordinates::*;
pub use tile::*;
pub use view::*;
