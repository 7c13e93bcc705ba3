pub mod aggregate;
pub mod frame;
pub mod merged;
pub mod reproject;
pub mod zone_groups;
