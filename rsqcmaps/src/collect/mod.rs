pub mod global_variables;
pub mod results;
pub mod zones;
