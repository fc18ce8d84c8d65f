#[allow(non_snake_case)]
pub mod Airfoils;
#[allow(non_snake_case)]
pub mod BEMT;
pub mod cli;
