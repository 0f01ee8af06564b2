pub mod connect;
pub mod params;
pub mod report;
pub mod sink;
