pub mod dates;
pub mod jwt;
pub mod pricing;
pub mod stops;
