pub mod item;
pub mod path;
pub mod row;
