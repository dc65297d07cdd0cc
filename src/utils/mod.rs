pub mod dates;
pub mod jwt;
pub mod locks;
pub mod pricing;
