pub mod dynamodb;
pub mod item_store;
