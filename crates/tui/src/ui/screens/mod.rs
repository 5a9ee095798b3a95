pub mod add;
pub mod settings;
pub mod table;
pub mod trash;
