pub mod csv;
pub mod error;
pub mod extract;
pub mod response;
pub mod validation;
