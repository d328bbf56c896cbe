pub mod auth;
pub mod comment;
pub mod machine;
pub mod material;
pub mod shared;
