pub mod health;
pub mod objects;
pub mod resize;
pub mod upload_url;
