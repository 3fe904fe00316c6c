pub mod linear_assignment;
