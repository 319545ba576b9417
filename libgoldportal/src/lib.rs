pub mod auth;
pub mod failure;
pub mod portal;
pub mod remote;
pub mod routing;
pub mod storage;
pub mod validation;
