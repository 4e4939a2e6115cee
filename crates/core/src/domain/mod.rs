pub mod expertise;
