pub mod confirm;
pub mod hints;
pub mod notice;
pub mod tabs;
pub mod toast;
