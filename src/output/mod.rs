// Output generation module

pub mod diagrams;

pub use diagrams::*;
