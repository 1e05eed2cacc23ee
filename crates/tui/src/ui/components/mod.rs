pub mod banner;
pub mod hints;
pub mod tabs;
