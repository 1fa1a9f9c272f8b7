pub mod dissectors;
