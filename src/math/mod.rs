// Math module for score sampling, pairwise correlation, and seed streams

pub mod correlation;
pub mod distributions;
pub mod seeding;
