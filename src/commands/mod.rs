pub mod config;
pub mod dockerrm;
pub mod enter;
pub mod go;
pub mod images;
