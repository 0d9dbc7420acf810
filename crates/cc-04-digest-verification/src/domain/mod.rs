pub mod descriptor;
pub mod tree;
